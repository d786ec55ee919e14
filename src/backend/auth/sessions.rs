/**
 * Session Management and JWT Tokens
 *
 * A session is an HS256 JWT naming the user and a random per-login session
 * id. The token travels either as a `Bearer` header or in the `session`
 * cookie; `EventSource` clients can only use the cookie.
 *
 * The session id is what push subscriptions are keyed by, so two logins of the
 * same user are two distinct sessions.
 */

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User name
    pub sub: String,
    /// Session id, fresh for every login
    pub sid: String,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Signing material and lifetime for session tokens
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: u64,
}

impl SessionKeys {
    pub fn new(secret: &[u8], session_days: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime_secs: session_days * 24 * 60 * 60,
        }
    }

    /// Seconds a freshly issued session stays valid
    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs
    }

    /// Start a new session for `user_name`
    ///
    /// # Returns
    /// The signed token and the claims it carries
    pub fn issue(&self, user_name: &str) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let claims = Claims {
            sub: user_name.to_string(),
            sid: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.lifetime_secs,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok((token, claims))
    }

    /// Verify and decode a session token
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(token_data.claims)
    }
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict", SESSION_COOKIE)
}
