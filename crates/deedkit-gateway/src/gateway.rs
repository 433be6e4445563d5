//! The ledger gateway: batch submission, status queries and state reads.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use tracing::{debug, warn};

use deedkit_core::{Address, Batch, BatchId, BatchList};

use crate::error::{GatewayError, Result};
use crate::status::{BatchStatusResponse, CommitStatus, StateListResponse, StateResponse};
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport, TransportError};

/// Content type of a serialized batch list.
pub const BATCH_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `Authorization` header value.
    pub fn header_value(&self) -> String {
        let token = BASE64.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", token)
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What the `batches` endpoint answered for a submission.
///
/// This acknowledges receipt, not commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub batch_id: BatchId,
    /// Raw response body, passed through untouched.
    pub acknowledgement: String,
}

/// Normalize a ledger base URL.
///
/// A URL without a scheme gets `http://`; trailing slashes are dropped.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    let normalized = with_scheme.trim_end_matches('/').to_string();

    let parsed = url::Url::parse(&normalized).map_err(|e| GatewayError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(GatewayError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".into(),
        });
    }
    Ok(normalized)
}

/// Client for the ledger REST surface.
pub struct LedgerGateway<T: HttpTransport = ReqwestTransport> {
    base_url: String,
    auth: Option<BasicAuth>,
    transport: T,
}

impl LedgerGateway<ReqwestTransport> {
    /// Gateway over a fresh `reqwest` client.
    pub fn connect(base_url: &str) -> Result<Self> {
        Self::new(base_url, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> LedgerGateway<T> {
    /// Create a gateway over the given transport.
    pub fn new(base_url: &str, transport: T) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            auth: None,
            transport,
        })
    }

    /// Attach basic-auth credentials to every request.
    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Post a single batch.
    ///
    /// `resource_name` only feeds error messages.
    pub async fn submit(
        &self,
        batch: &Batch,
        resource_name: Option<&str>,
    ) -> Result<SubmissionReceipt> {
        let batch_id = batch.id();
        let body = BatchList::single(batch.clone()).to_bytes();
        let url = format!("{}/batches", self.base_url);

        debug!(
            batch_id = %batch_id,
            transactions = batch.transactions().len(),
            bytes = body.len(),
            "submitting batch"
        );

        let request = HttpRequest::post(url, BATCH_CONTENT_TYPE, body);
        let response = self.send(request, resource_name).await?;

        Ok(SubmissionReceipt {
            batch_id,
            acknowledgement: String::from_utf8_lossy(&response).into_owned(),
        })
    }

    /// Ask for the status of a batch, letting the ledger block for up to
    /// `wait_secs` seconds.
    pub async fn query_status(&self, batch_id: &BatchId, wait_secs: u64) -> Result<CommitStatus> {
        let id = batch_id.to_hex();
        let url = format!(
            "{}/batch_statuses?id={}&wait={}",
            self.base_url, id, wait_secs
        );

        let body = self.send(HttpRequest::get(url), None).await?;
        let response: BatchStatusResponse = serde_json::from_slice(&body)
            .map_err(|e| malformed("status response", e))?;

        let status = response.status_of(&id);
        debug!(batch_id = %batch_id, %status, wait_secs, "batch status");
        Ok(status)
    }

    /// Fetch every state entry under `prefix`.
    ///
    /// Returns `None` when the response or any entry cannot be decoded;
    /// partial results are never returned.
    pub async fn list(&self, prefix: &str) -> Result<Option<Vec<Vec<u8>>>> {
        let url = format!("{}/state?address={}", self.base_url, prefix);
        let body = self.send(HttpRequest::get(url), None).await?;

        let decoded = serde_json::from_slice::<StateListResponse>(&body)
            .map_err(|e| e.to_string())
            .and_then(|response| {
                response
                    .data
                    .iter()
                    .map(|entry| BASE64.decode(&entry.data))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| e.to_string())
            });

        match decoded {
            Ok(entries) => {
                debug!(prefix, entries = entries.len(), "listed state");
                Ok(Some(entries))
            }
            Err(reason) => {
                warn!(prefix, %reason, "discarding undecodable state listing");
                Ok(None)
            }
        }
    }

    /// Fetch the state stored at one address.
    pub async fn fetch_state(&self, address: &Address, resource_name: &str) -> Result<Vec<u8>> {
        let url = format!("{}/state/{}", self.base_url, address);
        let body = self.send(HttpRequest::get(url), Some(resource_name)).await?;

        let response: StateResponse = serde_json::from_slice(&body)
            .map_err(|e| malformed("state response", e))?;
        BASE64
            .decode(&response.data)
            .map_err(|e| malformed(resource_name, e))
    }

    async fn send(&self, mut request: HttpRequest, resource_name: Option<&str>) -> Result<Bytes> {
        if let Some(auth) = &self.auth {
            request = request.header("Authorization", auth.header_value());
        }
        let url = request.url.clone();

        match self.transport.send(request).await {
            Ok(response) if response.is_success() => Ok(response.body),
            Ok(response) if response.status == 404 => Err(GatewayError::NotFound {
                resource: resource_name.map(str::to_string).unwrap_or(url),
            }),
            Ok(response) => Err(GatewayError::Request {
                url,
                status: response.status,
                reason: response.reason,
            }),
            Err(TransportError::Connect(message)) => {
                Err(GatewayError::Connectivity { url, message })
            }
            Err(TransportError::Other(message)) => {
                Err(GatewayError::Ledger(format!("{}: {}", url, message)))
            }
        }
    }
}

fn malformed(what: &str, err: impl std::fmt::Display) -> GatewayError {
    GatewayError::Ledger(format!("malformed {}: {}", what, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{MockTransport, Reply};
    use crate::transport::{HttpResponse, Method};
    use deedkit_core::{EnvelopeBuilder, Identity};

    fn sample_batch() -> Batch {
        let identity = Identity::from_seed(&[0x42; 32]);
        let builder = EnvelopeBuilder::new();
        let tx = builder.build_transaction(&identity, "house1", "create", "alice");
        builder.build_batch(vec![tx], &identity).unwrap()
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("localhost:8008").unwrap(),
            "http://localhost:8008"
        );
        assert_eq!(
            normalize_base_url("https://ledger.example/api/").unwrap(),
            "https://ledger.example/api"
        );
        assert!(matches!(
            normalize_base_url("http://"),
            Err(GatewayError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_basic_auth_header() {
        let auth = BasicAuth::new("alice", "secret");
        assert_eq!(auth.header_value(), "Basic YWxpY2U6c2VjcmV0");
        assert!(!format!("{:?}", auth).contains("secret"));
    }

    #[tokio::test]
    async fn test_submit_posts_batch_list() {
        let transport = MockTransport::new().respond(
            Method::Post,
            "/batches",
            HttpResponse::with_status(202, r#"{"link":"x"}"#),
        );
        let gateway = LedgerGateway::new("ledger:8008", transport)
            .unwrap()
            .with_auth(BasicAuth::new("alice", "secret"));
        let batch = sample_batch();

        let receipt = gateway.submit(&batch, Some("house1")).await.unwrap();
        assert_eq!(receipt.batch_id, batch.id());
        assert_eq!(receipt.acknowledgement, r#"{"link":"x"}"#);

        let requests = gateway.transport().requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.url, "http://ledger:8008/batches");
        assert_eq!(
            request.header_value("content-type"),
            Some(BATCH_CONTENT_TYPE)
        );
        assert_eq!(
            request.header_value("authorization"),
            Some("Basic YWxpY2U6c2VjcmV0")
        );
        let body = request.body.as_ref().unwrap();
        let sent = BatchList::from_bytes(body).unwrap();
        assert_eq!(sent, BatchList::single(batch));
    }

    #[tokio::test]
    async fn test_submit_404_names_resource() {
        let transport = MockTransport::new().respond(
            Method::Post,
            "/batches",
            HttpResponse::with_status(404, ""),
        );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();

        let err = gateway
            .submit(&sample_batch(), Some("house1"))
            .await
            .unwrap_err();
        assert!(matches!(&err, GatewayError::NotFound { resource } if resource == "house1"));
        assert!(err.to_string().contains("house1"));
    }

    #[tokio::test]
    async fn test_submit_500_carries_status() {
        let transport = MockTransport::new().respond(
            Method::Post,
            "/batches",
            HttpResponse::with_status(500, "boom"),
        );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();

        let err = gateway
            .submit(&sample_batch(), Some("house1"))
            .await
            .unwrap_err();
        match err {
            GatewayError::Request { url, status, reason } => {
                assert_eq!(status, 500);
                assert_eq!(reason, "Internal Server Error");
                assert_eq!(url, "http://ledger/batches");
            }
            other => panic!("expected Request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failures_mapped() {
        let transport = MockTransport::new()
            .on(
                Method::Post,
                "/batches",
                vec![Reply::Fail(TransportError::Connect("refused".into()))],
            )
            .on(
                Method::Get,
                "/batch_statuses",
                vec![Reply::Fail(TransportError::Other("reset".into()))],
            );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();
        let batch = sample_batch();

        assert!(matches!(
            gateway.submit(&batch, None).await,
            Err(GatewayError::Connectivity { .. })
        ));
        assert!(matches!(
            gateway.query_status(&batch.id(), 0).await,
            Err(GatewayError::Ledger(_))
        ));
    }

    #[tokio::test]
    async fn test_query_status() {
        let batch = sample_batch();
        let body = format!(
            r#"{{"data":[{{"id":"{}","status":"COMMITTED"}}]}}"#,
            batch.id()
        );
        let transport = MockTransport::new().respond(
            Method::Get,
            "/batch_statuses",
            HttpResponse::ok(body),
        );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();

        let status = gateway.query_status(&batch.id(), 7).await.unwrap();
        assert_eq!(status, CommitStatus::Committed);

        let url = gateway.transport().requests()[0].url.clone();
        assert_eq!(
            url,
            format!("http://ledger/batch_statuses?id={}&wait=7", batch.id())
        );
    }

    #[tokio::test]
    async fn test_query_status_ignores_other_batches() {
        let body = r#"{"data":[{"id":"someoneelse","status":"COMMITTED"}]}"#;
        let transport = MockTransport::new().respond(
            Method::Get,
            "/batch_statuses",
            HttpResponse::ok(body),
        );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();

        let status = gateway.query_status(&sample_batch().id(), 0).await.unwrap();
        assert_eq!(status, CommitStatus::Unknown);
    }

    #[tokio::test]
    async fn test_query_status_malformed() {
        let transport = MockTransport::new().respond(
            Method::Get,
            "/batch_statuses",
            HttpResponse::ok("not json"),
        );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();
        assert!(matches!(
            gateway.query_status(&sample_batch().id(), 0).await,
            Err(GatewayError::Ledger(_))
        ));
    }

    #[tokio::test]
    async fn test_list_decodes_entries() {
        let body = format!(
            r#"{{"data":[{{"address":"a","data":"{}"}},{{"address":"b","data":"{}"}}]}}"#,
            BASE64.encode("house1,alice"),
            BASE64.encode("house2,bob")
        );
        let transport = MockTransport::new().respond(
            Method::Get,
            "/state?address=",
            HttpResponse::ok(body),
        );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();

        let entries = gateway.list("e8fc6a").await.unwrap().unwrap();
        assert_eq!(
            entries,
            vec![b"house1,alice".to_vec(), b"house2,bob".to_vec()]
        );
        assert_eq!(
            gateway.transport().requests()[0].url,
            "http://ledger/state?address=e8fc6a"
        );
    }

    #[tokio::test]
    async fn test_list_with_bad_entry_is_none() {
        let body = format!(
            r#"{{"data":[{{"address":"a","data":"{}"}},{{"address":"b","data":"!!bad!!"}}]}}"#,
            BASE64.encode("house1,alice")
        );
        let transport = MockTransport::new().respond(
            Method::Get,
            "/state?address=",
            HttpResponse::ok(body),
        );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();

        assert_eq!(gateway.list("e8fc6a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_with_unparseable_body_is_none() {
        let transport = MockTransport::new().respond(
            Method::Get,
            "/state?address=",
            HttpResponse::ok("<html>"),
        );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();

        assert_eq!(gateway.list("e8fc6a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_state_404_names_resource() {
        let transport = MockTransport::new();
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();
        let address = deedkit_core::address_for("barn");

        let err = gateway.fetch_state(&address, "barn").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { resource } if resource == "barn"));
    }

    #[tokio::test]
    async fn test_fetch_state() {
        let address = deedkit_core::address_for("barn");
        let body = format!(r#"{{"data":"{}"}}"#, BASE64.encode("barn,carol"));
        let transport = MockTransport::new().respond(
            Method::Get,
            &format!("/state/{}", address),
            HttpResponse::ok(body),
        );
        let gateway = LedgerGateway::new("http://ledger", transport).unwrap();

        let state = gateway.fetch_state(&address, "barn").await.unwrap();
        assert_eq!(state, b"barn,carol");
    }
}
