// ==========================================
// Brick Buildability - REST provider adapter
// ==========================================
// GET  {base}/sets/{set_id}/parts     -> requirements
// GET  {base}/inventory               -> inventory
// POST {base}/inventory/add           -> resulting line
// POST {base}/inventory/decrement     -> resulting line
// ==========================================
// No retries here: a retried decrement could apply twice.
// ==========================================

use crate::domain::lines::{InventoryLine, RequirementLine};
use crate::domain::types::PartKey;
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::normalize;
use crate::provider::{InventoryProvider, RequirementsProvider};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

// ==========================================
// Credentials
// ==========================================

/// Source of the caller's bearer token. Session handling lives elsewhere.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
        }
    }

    pub fn none() -> Self {
        Self { token: None }
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

// ==========================================
// Request context (for status mapping)
// ==========================================
#[derive(Debug, Clone)]
enum RequestContext {
    Requirements { set_id: String },
    Inventory,
    Mutation { part_key: PartKey },
}

// ==========================================
// RestProvider
// ==========================================
pub struct RestProvider {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl RestProvider {
    /// # Errors
    /// `Unavailable` if the base URL cannot be parsed or the client cannot
    /// be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> ProviderResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ProviderError::Unavailable(format!("invalid base url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::Unavailable(format!(
                "base url {} cannot carry a path",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Base URL with path segments appended (each segment percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder, required: bool) -> ProviderResult<RequestBuilder> {
        match self.credentials.bearer_token() {
            Some(token) => Ok(request.bearer_auth(token)),
            None if required => Err(ProviderError::Unauthorized(
                "no credentials available".to_string(),
            )),
            None => Ok(request),
        }
    }

    async fn send(&self, request: RequestBuilder, ctx: RequestContext) -> ProviderResult<Value> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            ProviderError::Unavailable(format!("transport error: {}", e))
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("reading response body: {}", e)))?;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        debug!(status = status.as_u16(), "response received");

        if status.is_success() {
            if body.is_null() {
                return Err(ProviderError::Unavailable(format!(
                    "empty or non-JSON success response ({})",
                    status
                )));
            }
            Ok(body)
        } else {
            Err(map_error_status(status, &body, &ctx))
        }
    }

    async fn mutate(&self, action: &str, part_key: &PartKey, amount: i64) -> ProviderResult<InventoryLine> {
        let url = self.endpoint(&["inventory", action]);
        let request = self.client.post(url).json(&json!({
            "part_num": part_key.part_num,
            "color_id": part_key.color_id,
            "quantity": amount,
        }));
        let request = self.authorize(request, true)?;
        let body = self
            .send(
                request,
                RequestContext::Mutation {
                    part_key: part_key.clone(),
                },
            )
            .await?;
        normalize::inventory_line_from_json(&body)
    }
}

#[async_trait]
impl RequirementsProvider for RestProvider {
    #[instrument(skip(self))]
    async fn fetch_requirements(&self, set_id: &str) -> ProviderResult<Vec<RequirementLine>> {
        let url = self.endpoint(&["sets", set_id, "parts"]);
        let request = self.authorize(self.client.get(url), false)?;
        let body = self
            .send(
                request,
                RequestContext::Requirements {
                    set_id: set_id.to_string(),
                },
            )
            .await?;
        normalize::requirements_from_json(&body)
    }
}

#[async_trait]
impl InventoryProvider for RestProvider {
    #[instrument(skip(self))]
    async fn fetch_inventory(&self) -> ProviderResult<Vec<InventoryLine>> {
        let url = self.endpoint(&["inventory"]);
        let request = self.authorize(self.client.get(url), true)?;
        let body = self.send(request, RequestContext::Inventory).await?;
        normalize::inventory_from_json(&body)
    }

    #[instrument(skip(self, part_key), fields(part_key = %part_key))]
    async fn add_inventory(&self, part_key: &PartKey, amount: i64) -> ProviderResult<InventoryLine> {
        self.mutate("add", part_key, amount).await
    }

    #[instrument(skip(self, part_key), fields(part_key = %part_key))]
    async fn decrement_inventory(
        &self,
        part_key: &PartKey,
        amount: i64,
    ) -> ProviderResult<InventoryLine> {
        self.mutate("decrement", part_key, amount).await
    }
}

// ==========================================
// Status mapping
// ==========================================
// 401/403 -> Unauthorized
// 404     -> NotFound for a set lookup, Unavailable otherwise
// 409/423 -> Locked for a mutation
// rest    -> Unavailable
fn map_error_status(status: StatusCode, body: &Value, ctx: &RequestContext) -> ProviderError {
    let message = normalize::message_from_json(body).unwrap_or_else(|| status.to_string());

    match (status, ctx) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
            ProviderError::Unauthorized(message)
        }
        (StatusCode::NOT_FOUND, RequestContext::Requirements { set_id }) => {
            ProviderError::NotFound {
                set_id: set_id.clone(),
            }
        }
        (StatusCode::CONFLICT | StatusCode::LOCKED, RequestContext::Mutation { part_key }) => {
            ProviderError::Locked {
                part_key: part_key.clone(),
                blocking: normalize::locks_from_json(body),
                message,
            }
        }
        _ => ProviderError::Unavailable(format!("{}: {}", status, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(credentials: StaticCredentials) -> RestProvider {
        RestProvider::new(
            "http://127.0.0.1:9/api/",
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
            Arc::new(credentials),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let p = provider(StaticCredentials::none());
        assert_eq!(
            p.endpoint(&["sets", "10696-1", "parts"]).as_str(),
            "http://127.0.0.1:9/api/sets/10696-1/parts"
        );
        assert_eq!(
            p.endpoint(&["sets", "a/b", "parts"]).as_str(),
            "http://127.0.0.1:9/api/sets/a%2Fb/parts"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = RestProvider::new(
            "not a url",
            Duration::from_secs(1),
            Arc::new(StaticCredentials::none()),
        );
        assert!(matches!(result, Err(ProviderError::Unavailable(_))));
    }

    #[test]
    fn test_blank_token_counts_as_none() {
        assert!(StaticCredentials::new("  ").bearer_token().is_none());
        assert_eq!(StaticCredentials::new("t0k").bearer_token().as_deref(), Some("t0k"));
    }

    #[tokio::test]
    async fn test_inventory_without_credentials_is_unauthorized_before_any_request() {
        let p = provider(StaticCredentials::none());
        assert!(matches!(
            p.fetch_inventory().await,
            Err(ProviderError::Unauthorized(_))
        ));
        assert!(matches!(
            p.decrement_inventory(&PartKey::new("3001", 0), 1).await,
            Err(ProviderError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        let set_ctx = RequestContext::Requirements {
            set_id: "0000-1".to_string(),
        };
        let mutation_ctx = RequestContext::Mutation {
            part_key: PartKey::new("3001", 2),
        };

        assert_eq!(
            map_error_status(StatusCode::NOT_FOUND, &Value::Null, &set_ctx),
            ProviderError::NotFound {
                set_id: "0000-1".to_string()
            }
        );
        assert!(matches!(
            map_error_status(StatusCode::UNAUTHORIZED, &Value::Null, &RequestContext::Inventory),
            ProviderError::Unauthorized(_)
        ));
        assert!(matches!(
            map_error_status(StatusCode::NOT_FOUND, &Value::Null, &RequestContext::Inventory),
            ProviderError::Unavailable(_)
        ));
        assert!(matches!(
            map_error_status(StatusCode::BAD_GATEWAY, &Value::Null, &mutation_ctx),
            ProviderError::Unavailable(_)
        ));

        let body = serde_json::json!({
            "message": "used in completed build",
            "blocking": [{"build_id": "b-1", "set_id": "6020-1", "quantity": 2}]
        });
        match map_error_status(StatusCode::CONFLICT, &body, &mutation_ctx) {
            ProviderError::Locked {
                part_key,
                blocking,
                message,
            } => {
                assert_eq!(part_key, PartKey::new("3001", 2));
                assert_eq!(blocking.len(), 1);
                assert_eq!(message, "used in completed build");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
