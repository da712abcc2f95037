/// Identity verification
///
/// Exchanges an opaque external credential for a stored user and a session
/// token. The credential itself is only ever inspected by an
/// [`IdentityProvider`]; the rest of the service sees the resulting
/// [`ExternalProfile`].
///
/// ## Google
///
/// - The ID token is checked by Google's `tokeninfo` endpoint (signature, expiry)
/// - `aud` must equal the configured client id
/// - `iss` must be one of Google's issuers
/// - The email must be verified
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::models::{ExternalProfile, User};
use chrono::Duration;
use crypto_core::JwtKeys;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const GOOGLE_PROVIDER: &str = "google";
pub const DEFAULT_GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Verifies an external credential and describes who it belongs to
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Stored alongside the subject so ids from different providers never collide
    fn name(&self) -> &str;

    /// `Unauthenticated` when the credential is rejected, `IdentityProvider`
    /// when the provider cannot be reached or answers something unusable.
    async fn verify(&self, credential: &str) -> Result<ExternalProfile>;
}

/// Google ID token verification through the `tokeninfo` endpoint
pub struct GoogleIdentityProvider {
    http: Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

/// Subset of the `tokeninfo` response we rely on
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    aud: String,
    iss: String,
    sub: String,
    email: Option<String>,
    /// Google sends this as the string "true"/"false"
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(tokeninfo_url: impl Into<String>, client_id: Option<String>) -> Result<Self> {
        if client_id.is_none() {
            warn!("GOOGLE_CLIENT_ID not set; ID token audience will not be checked");
        }

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            tokeninfo_url: tokeninfo_url.into(),
            client_id,
        })
    }

    fn profile_from(&self, info: GoogleTokenInfo) -> Result<ExternalProfile> {
        if let Some(client_id) = &self.client_id {
            if &info.aud != client_id {
                return Err(AppError::Unauthenticated(
                    "ID token was issued for another client".into(),
                ));
            }
        }

        if !GOOGLE_ISSUERS.contains(&info.iss.as_str()) {
            return Err(AppError::Unauthenticated(format!(
                "Unexpected token issuer: {}",
                info.iss
            )));
        }

        let verified = match &info.email_verified {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        };
        let email = match info.email {
            Some(email) if verified && !email.is_empty() => email,
            _ => {
                return Err(AppError::Unauthenticated(
                    "Google account email is not verified".into(),
                ))
            }
        };

        let name = info
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        Ok(ExternalProfile {
            provider: GOOGLE_PROVIDER.to_string(),
            subject: info.sub,
            email,
            name,
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn name(&self) -> &str {
        GOOGLE_PROVIDER
    }

    async fn verify(&self, credential: &str) -> Result<ExternalProfile> {
        let response = self
            .http
            .get(&self.tokeninfo_url)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            // tokeninfo answers 400 for invalid or expired tokens
            return Err(AppError::Unauthenticated("Invalid Google credential".into()));
        }
        if !status.is_success() {
            return Err(AppError::IdentityProvider(format!(
                "tokeninfo returned {status}"
            )));
        }

        let info = response
            .json::<GoogleTokenInfo>()
            .await
            .map_err(|e| AppError::IdentityProvider(e.to_string()))?;

        self.profile_from(info)
    }
}

/// Result of a successful sign-in
#[derive(Debug, Clone, Serialize)]
pub struct SignIn {
    pub user: User,
    pub token: String,
    #[serde(skip)]
    pub is_new_user: bool,
}

pub struct IdentityVerifier {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    keys: Arc<JwtKeys>,
    session_ttl: Duration,
}

impl IdentityVerifier {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        keys: Arc<JwtKeys>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            users,
            keys,
            session_ttl,
        }
    }

    /// Verify the credential, create or refresh the user and issue a session token
    pub async fn sign_in(&self, credential: &str) -> Result<SignIn> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AppError::Unauthenticated("Missing credential".into()));
        }

        let profile = self.provider.verify(credential).await?;
        let (user, is_new_user) = self.users.upsert_user(&profile).await?;

        let token = self
            .keys
            .issue_session_token(user.id, &user.email, &user.name, self.session_ttl)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        info!(
            user_id = %user.id,
            provider = self.provider.name(),
            is_new_user,
            "user signed in"
        );

        Ok(SignIn {
            user,
            token,
            is_new_user,
        })
    }
}
