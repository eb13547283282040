// Payment Checkout Service
// Creates Stripe hosted checkout sessions. Everything here delegates to the
// Stripe API; the only local state is the credential and price.

use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const STRIPE_CHECKOUT_SESSIONS_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("payment provider credential not configured")]
    MissingSecretKey,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payment provider error: {status} - {message}")]
    Provider { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(String),
    #[error("checkout session has no url")]
    MissingUrl,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    id: Option<String>,
    url: Option<String>,
}

pub struct CheckoutClient {
    client: Client,
    secret_key: Option<String>,
    price_id: String,
    endpoint: String,
}

impl CheckoutClient {
    pub fn new(secret_key: Option<String>, price_id: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let endpoint = env::var("STRIPE_CHECKOUT_URL")
            .unwrap_or_else(|_| STRIPE_CHECKOUT_SESSIONS_URL.to_string());

        Self { client, secret_key, price_id, endpoint }
    }

    /// Create a hosted checkout session and return its redirect URL.
    pub async fn create_checkout_session(
        &self,
        user_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String, CheckoutError> {
        let secret_key = self
            .secret_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(CheckoutError::MissingSecretKey)?;

        let params = [
            ("payment_method_types[0]", "card"),
            ("line_items[0][price]", self.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("mode", "payment"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("client_reference_id", user_id),
            ("metadata[user_id]", user_id),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(secret_key)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| CheckoutError::Json(e.to_string()))?;

        let url = session.url.ok_or(CheckoutError::MissingUrl)?;
        info!(session_id = session.id.as_deref().unwrap_or("unknown"), user_id, "checkout session created");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_secret_key_is_a_config_error() {
        let client = CheckoutClient::new(None, "price_test".to_string());
        let err = client
            .create_checkout_session("user-1", "http://localhost/s", "http://localhost/c")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingSecretKey));
    }

    #[tokio::test]
    async fn test_blank_secret_key_is_a_config_error() {
        let client = CheckoutClient::new(Some("   ".to_string()), "price_test".to_string());
        let err = client
            .create_checkout_session("user-1", "http://localhost/s", "http://localhost/c")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingSecretKey));
    }
}
