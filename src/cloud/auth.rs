//! Credential acquisition for the management API.
//!
//! # Responsibilities
//! - Resolve a bearer token for the management resource
//! - Mirror the platform's default credential chain: service-principal env
//!   variables first, instance-metadata managed identity otherwise
//! - Cache tokens and refresh ahead of expiry
//!
//! # Security Constraints
//! - Secrets ONLY from environment variables
//! - Never log tokens or client secrets

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use crate::cloud::types::{CloudError, CloudResult};
use crate::config::schema::CloudConfig;

const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";

/// Refresh the cached token once it is this close to expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(120);

/// How the token is obtained.
#[derive(Debug, Clone)]
enum Flow {
    /// Client-credentials grant against the configured authority.
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// Instance-metadata managed identity, optionally a user-assigned one.
    ManagedIdentity { client_id: Option<String> },
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Token provider for the management API.
pub struct TokenCredential {
    flow: Flow,
    resource: String,
    authority: String,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenCredential {
    /// Build the credential from config and the standard environment
    /// variables (`AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`).
    pub fn from_config(config: &CloudConfig) -> Self {
        let tenant = std::env::var("AZURE_TENANT_ID").ok().filter(|v| !v.is_empty());
        let client = std::env::var("AZURE_CLIENT_ID").ok().filter(|v| !v.is_empty());
        let secret = std::env::var("AZURE_CLIENT_SECRET").ok().filter(|v| !v.is_empty());

        let flow = match (tenant, client, secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Flow::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            },
            _ => Flow::ManagedIdentity {
                client_id: config.managed_identity_client_id.clone(),
            },
        };

        Self {
            flow,
            resource: config.endpoint.trim_end_matches('/').to_string(),
            authority: config.authority.trim_end_matches('/').to_string(),
            cache: Mutex::new(None),
        }
    }

    /// A valid bearer token, from cache when fresh enough.
    pub async fn bearer_token(&self, http: &reqwest::Client) -> CloudResult<String> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.expires_at.saturating_duration_since(Instant::now()) > REFRESH_MARGIN {
                return Ok(cached.token.clone());
            }
        }

        let response = self.acquire(http).await?;
        let expires_in = response.expires_in_secs().unwrap_or(3600);
        let token = response.access_token;

        *cache = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        });

        tracing::debug!(expires_in_secs = expires_in, "Acquired management API token");
        Ok(token)
    }

    async fn acquire(&self, http: &reqwest::Client) -> CloudResult<TokenResponse> {
        match &self.flow {
            Flow::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let url = format!("{}/{}/oauth2/v2.0/token", self.authority, tenant_id);
                let scope = format!("{}/.default", self.resource);
                let form = [
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("scope", scope.as_str()),
                ];

                let response = http.post(&url).form(&form).send().await?;
                Self::parse_token_response(response).await
            }
            Flow::ManagedIdentity { client_id } => {
                let mut url =
                    Url::parse(IMDS_TOKEN_ENDPOINT).map_err(CloudError::Url)?;
                url.query_pairs_mut()
                    .append_pair("api-version", IMDS_API_VERSION)
                    .append_pair("resource", &self.resource);
                if let Some(client_id) = client_id {
                    url.query_pairs_mut().append_pair("client_id", client_id);
                }

                let response = http.get(url).header("Metadata", "true").send().await?;
                Self::parse_token_response(response).await
            }
        }
    }

    async fn parse_token_response(response: reqwest::Response) -> CloudResult<TokenResponse> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudError::Auth(format!(
                "token endpoint returned {}: {}",
                status,
                truncate(&body, 256)
            )));
        }
        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| CloudError::Auth(format!("malformed token response: {}", e)))
    }
}

/// Token endpoint response. The instance-metadata service reports
/// `expires_in` as a string, the authority as a number; accept both.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    fn expires_in_secs(&self) -> Option<u64> {
        match self.expires_in.as_ref()? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}
