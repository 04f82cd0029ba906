use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::accounts::{AccountStore, PgAccountStore};
use crate::config::{AppConfig, PaymentMode};
use crate::images::{ClipDropClient, ImageGenerator};
use crate::payments::{DemoGateway, PaymentProvider, RazorpayGateway};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AccountStore>,
    pub generator: Arc<dyn ImageGenerator>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("imagify/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;

        let generator = Arc::new(ClipDropClient::new(http.clone(), &config.clipdrop))
            as Arc<dyn ImageGenerator>;

        let payments: Arc<dyn PaymentProvider> = match config.payment_mode {
            PaymentMode::Demo => {
                tracing::warn!("payment gateway in demo mode; purchases settle immediately");
                Arc::new(DemoGateway)
            }
            PaymentMode::Razorpay => Arc::new(RazorpayGateway::new(http, &config.razorpay)),
        };

        tracing::info!(
            clipdrop_key = config.clipdrop.api_key.is_some(),
            razorpay_keys = config.razorpay.credentials().is_some(),
            payment_mode = ?config.payment_mode,
            "providers configured"
        );

        Ok(Self {
            config,
            store: Arc::new(PgAccountStore::new(db)),
            generator,
            payments,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn AccountStore>,
        generator: Arc<dyn ImageGenerator>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            config,
            store,
            generator,
            payments,
        }
    }
}
