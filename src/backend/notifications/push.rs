/**
 * Push Delivery
 *
 * Browser push subscriptions and the transport that delivers to them.
 *
 * # VAPID
 *
 * [`VapidPushDelivery`] signs an ES256 JWT per request (`aud` is the push
 * service origin, `sub` the operator contact) and POSTs to the subscription
 * endpoint with `Authorization: vapid t=<jwt>, k=<public key>`.
 *
 * # Payload
 *
 * The payload is encrypted for the subscription's `p256dh`/`auth` keys
 * (RFC 8291, `aes128gcm` content coding) and sent as the request body. Any
 * non-2xx answer is a delivery error.
 */

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::shared::SharedError;

/// Lifetime of a VAPID token
const VAPID_TOKEN_SECS: i64 = 12 * 60 * 60;

/// How long the push service should hold an undelivered message
const MESSAGE_TTL_SECS: u32 = 24 * 60 * 60;

/// Client keys of a push subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser push subscription, as produced by `PushManager.subscribe()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: PushKeys,
}

impl PushSubscription {
    pub fn from_body(body: &Value) -> Result<Self, SharedError> {
        if body.get("endpoint").is_none() || body.get("keys").is_none() {
            return Err(SharedError::validation(
                "body",
                "no endpoint or keys in subscription",
            ));
        }
        serde_json::from_value(body.clone())
            .map_err(|err| SharedError::validation("keys", format!("Invalid subscription: {}", err)))
    }

    /// Encrypt `payload` for this subscription with the `aes128gcm` coding
    pub fn encrypt(&self, payload: &[u8]) -> Result<Vec<u8>, PushError> {
        let public_key = decode_key("p256dh", &self.keys.p256dh)?;
        let auth_secret = decode_key("auth", &self.keys.auth)?;
        ece::encrypt(&public_key, &auth_secret, payload).map_err(|err| PushError::Encryption(err.to_string()))
    }
}

/// Browsers send base64url keys, with or without padding
fn decode_key(name: &str, value: &str) -> Result<Vec<u8>, PushError> {
    URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|err| PushError::Malformed(format!("{} is not base64url: {}", name, err)))
}

/// Stored form of a subscription, keyed by session id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(rename = "sub")]
    pub subscription: PushSubscription,
    pub user_name: String,
}

/// Failure to deliver one push message
#[derive(Debug, Error)]
pub enum PushError {
    /// The push service answered with a non-success status
    #[error("push service rejected delivery with status {0}")]
    Rejected(u16),

    #[error("push transport failed: {0}")]
    Transport(String),

    #[error("could not sign VAPID token: {0}")]
    Signing(String),

    #[error("could not encrypt payload: {0}")]
    Encryption(String),

    /// The subscription cannot be delivered to at all
    #[error("malformed subscription: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for PushError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Something that can deliver a payload to a push subscription
#[async_trait]
pub trait PushDelivery: Send + Sync {
    async fn deliver(&self, subscription: &PushSubscription, payload: &str) -> Result<(), PushError>;
}

#[derive(Debug, Serialize)]
struct VapidClaims<'a> {
    aud: String,
    exp: i64,
    sub: &'a str,
}

/// Web Push delivery authenticated with VAPID
pub struct VapidPushDelivery {
    client: reqwest::Client,
    signing_key: EncodingKey,
    public_key: String,
    contact: String,
}

impl VapidPushDelivery {
    /// Build from a PEM-encoded P-256 private key
    pub fn from_pem(private_key_pem: &[u8], public_key: &str, contact: &str) -> Result<Self, PushError> {
        let signing_key =
            EncodingKey::from_ec_pem(private_key_pem).map_err(|err| PushError::Signing(err.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            signing_key,
            public_key: public_key.to_string(),
            contact: contact.to_string(),
        })
    }

    fn authorization(&self, endpoint: &reqwest::Url) -> Result<String, PushError> {
        let claims = VapidClaims {
            aud: endpoint.origin().ascii_serialization(),
            exp: Utc::now().timestamp() + VAPID_TOKEN_SECS,
            sub: &self.contact,
        };
        let token = encode(&Header::new(Algorithm::ES256), &claims, &self.signing_key)
            .map_err(|err| PushError::Signing(err.to_string()))?;
        Ok(format!("vapid t={}, k={}", token, self.public_key))
    }

    fn build_request(&self, subscription: &PushSubscription, payload: &str) -> Result<reqwest::Request, PushError> {
        let endpoint = reqwest::Url::parse(&subscription.endpoint)
            .map_err(|err| PushError::Malformed(err.to_string()))?;
        if endpoint.scheme() != "https" {
            return Err(PushError::Malformed(format!(
                "endpoint must be https, got {}",
                endpoint.scheme()
            )));
        }

        let body = subscription.encrypt(payload.as_bytes())?;
        tracing::debug!("[Push] Encrypted {} byte payload into {} bytes", payload.len(), body.len());

        let request = self
            .client
            .post(endpoint.clone())
            .header(AUTHORIZATION, self.authorization(&endpoint)?)
            .header("TTL", MESSAGE_TTL_SECS.to_string())
            .header(CONTENT_ENCODING, "aes128gcm")
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .build()?;
        Ok(request)
    }
}

#[async_trait]
impl PushDelivery for VapidPushDelivery {
    async fn deliver(&self, subscription: &PushSubscription, payload: &str) -> Result<(), PushError> {
        let request = self.build_request(subscription, payload)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PushError::Rejected(status.as_u16()))
        }
    }
}
