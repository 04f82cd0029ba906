use serde::Deserialize;

const PLACEHOLDER_KEY_ID: &str = "rzp_test_your_key_id_here";
const PLACEHOLDER_KEY_SECRET: &str = "your_razorpay_key_secret_here";
const DEMO_KEY_ID: &str = "rzp_test_1234567890";
const DEMO_KEY_SECRET: &str = "test_secret_1234567890";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClipDropConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Razorpay,
    Demo,
}

impl PaymentMode {
    /// Explicit `PAYMENT_MODE` wins; otherwise the well-known demo key pair
    /// selects demo mode.
    pub fn from_env_value(mode: Option<&str>, key_id: Option<&str>, key_secret: Option<&str>) -> Self {
        match mode.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("demo") => PaymentMode::Demo,
            Some("razorpay") => PaymentMode::Razorpay,
            _ if key_id == Some(DEMO_KEY_ID) || key_secret == Some(DEMO_KEY_SECRET) => {
                PaymentMode::Demo
            }
            _ => PaymentMode::Razorpay,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    pub api_base: String,
    pub currency: String,
}

impl RazorpayConfig {
    /// Both halves of the key pair, when they are real values.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.key_id.as_deref(), self.key_secret.as_deref()) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub clipdrop: ClipDropConfig,
    pub payment_mode: PaymentMode,
    pub razorpay: RazorpayConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "imagify".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "imagify-users".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let clipdrop = ClipDropConfig {
            api_key: non_empty_var("CLIPDROP_API_KEY"),
            endpoint: std::env::var("CLIPDROP_ENDPOINT")
                .unwrap_or_else(|_| "https://clipdrop-api.co/text-to-image/v1".into()),
        };

        let key_id = non_empty_var("RAZORPAY_KEY_ID");
        let key_secret = non_empty_var("RAZORPAY_KEY_SECRET");
        let payment_mode = PaymentMode::from_env_value(
            std::env::var("PAYMENT_MODE").ok().as_deref(),
            key_id.as_deref(),
            key_secret.as_deref(),
        );
        let razorpay = RazorpayConfig {
            key_id: key_id.filter(|v| v != PLACEHOLDER_KEY_ID),
            key_secret: key_secret.filter(|v| v != PLACEHOLDER_KEY_SECRET),
            api_base: std::env::var("RAZORPAY_API_BASE")
                .unwrap_or_else(|_| "https://api.razorpay.com/v1".into()),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "INR".into()),
        };

        Ok(Self {
            database_url,
            jwt,
            clipdrop,
            payment_mode,
            razorpay,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
