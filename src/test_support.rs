//! Fakes shared by unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    accounts::{memory::MemoryAccountStore, Transaction},
    config::{AppConfig, ClipDropConfig, JwtConfig, PaymentMode, RazorpayConfig},
    error::AppError,
    images::ImageGenerator,
    payments::{
        provider::{Checkout, Order},
        DemoGateway, PaymentProvider,
    },
    state::AppState,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_days: 7,
        },
        clipdrop: ClipDropConfig {
            api_key: Some("fake".into()),
            endpoint: "http://127.0.0.1:9/unused".into(),
        },
        payment_mode: PaymentMode::Demo,
        razorpay: RazorpayConfig {
            key_id: None,
            key_secret: None,
            api_base: "http://127.0.0.1:9/unused".into(),
            currency: "INR".into(),
        },
    }
}

type FailWith = Box<dyn Fn() -> AppError + Send + Sync>;

pub struct FakeGenerator {
    image: Option<Bytes>,
    fail: Option<FailWith>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl FakeGenerator {
    pub fn returning(image: &[u8]) -> Self {
        Self {
            image: Some(Bytes::copy_from_slice(image)),
            fail: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(f: impl Fn() -> AppError + Send + Sync + 'static) -> Self {
        Self {
            image: None,
            fail: Some(Box::new(f)),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<Bytes, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match (&self.image, &self.fail) {
            (_, Some(fail)) => Err(fail()),
            (Some(image), None) => Ok(image.clone()),
            (None, None) => Err(AppError::Internal(anyhow::anyhow!("no image configured"))),
        }
    }
}

/// Gateway that hands out orders and lets the test decide when they are paid.
pub struct FakeGateway {
    configured: bool,
    orders: Mutex<HashMap<String, Order>>,
    checkouts: AtomicUsize,
    fetches: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            configured: true,
            orders: Mutex::new(HashMap::new()),
            checkouts: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn mark_paid(&self, order_id: &str) {
        if let Some(o) = self.orders.lock().unwrap().get_mut(order_id) {
            o.status = "paid".into();
        }
    }

    pub fn set_receipt(&self, order_id: &str, receipt: &str) {
        if let Some(o) = self.orders.lock().unwrap().get_mut(order_id) {
            o.receipt = Some(receipt.into());
        }
    }

    pub fn checkouts(&self) -> usize {
        self.checkouts.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProvider for FakeGateway {
    fn ready(&self) -> Result<(), AppError> {
        if !self.configured {
            return Err(AppError::ServiceMisconfigured("Payment service not configured"));
        }
        Ok(())
    }

    async fn checkout(&self, tx: &Transaction) -> Result<Checkout, AppError> {
        let n = self.checkouts.fetch_add(1, Ordering::SeqCst) + 1;
        let order = Order {
            id: format!("order_{n}"),
            amount: tx.amount * 100,
            currency: "INR".into(),
            receipt: Some(tx.id.to_string()),
            status: "created".into(),
        };
        self.orders
            .lock()
            .unwrap()
            .insert(order.id.clone(), order.clone());
        Ok(Checkout::Order(order))
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Order, AppError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or(AppError::NotFound("Order not found"))
    }
}

pub struct TestEnv {
    pub state: AppState,
    pub store: Arc<MemoryAccountStore>,
    pub generator: Arc<FakeGenerator>,
    pub gateway: Arc<FakeGateway>,
}

impl TestEnv {
    /// Demo gateway: purchases settle at checkout.
    pub fn new(generator: FakeGenerator) -> Self {
        Self::build(generator, FakeGateway::new(), true)
    }

    pub fn with_payments(generator: FakeGenerator, gateway: FakeGateway) -> Self {
        Self::build(generator, gateway, false)
    }

    fn build(generator: FakeGenerator, gateway: FakeGateway, demo: bool) -> Self {
        let store = Arc::new(MemoryAccountStore::new());
        let generator = Arc::new(generator);
        let gateway = Arc::new(gateway);
        let payments: Arc<dyn PaymentProvider> = if demo {
            Arc::new(DemoGateway)
        } else {
            gateway.clone()
        };
        let state = AppState::from_parts(
            Arc::new(test_config()),
            store.clone(),
            generator.clone(),
            payments,
        );
        Self {
            state,
            store,
            generator,
            gateway,
        }
    }
}
