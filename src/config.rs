// Runtime Configuration
// Everything comes from environment variables; the binary loads .env first.

use crate::services::segmenter::SegmentPolicy;
use std::env;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_PRICE_ID: &str = "price_1Si7DABRQf6twr2KetcquMg5";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub stripe_secret_key: Option<String>,
    pub stripe_price_id: String,
    pub allowed_origins: Vec<String>,
    pub segment_policy: SegmentPolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let stripe_price_id =
            env::var("STRIPE_PRICE_ID").unwrap_or_else(|_| DEFAULT_PRICE_ID.to_string());

        let allowed_origins = env::var("REFINER_SHIELD_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| default_origins());

        let segment_policy = env::var("REFINER_SHIELD_SEGMENT_POLICY")
            .map(|v| SegmentPolicy::from_str(&v))
            .unwrap_or_default();

        Self {
            port,
            stripe_secret_key,
            stripe_price_id,
            allowed_origins,
            segment_policy,
        }
    }
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "https://refiner-shield.vercel.app".to_string(),
    ]
}
