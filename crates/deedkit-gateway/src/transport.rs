//! HTTP transport abstraction for the gateway.
//!
//! The gateway speaks in [`HttpRequest`]/[`HttpResponse`] values and leaves
//! delivery to an [`HttpTransport`]. Production code uses
//! [`ReqwestTransport`]; tests use [`mock::MockTransport`].

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// HTTP method used by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// A GET request with no body.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST request with a body of the given content type.
    pub fn post(url: impl Into<String>, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: Some(body.into()),
        }
    }

    /// Add a header.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Look up a header value (case-insensitive name).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: Bytes,
}

impl HttpResponse {
    /// A 200 response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::with_status(200, body)
    }

    /// A response with the given status and body.
    pub fn with_status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: reason_phrase(status).to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        202 => "Accepted",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}

/// Transport-level failures, before any HTTP status is known.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Delivers HTTP requests to the ledger.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the full response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, TLS roots, timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

/// A scripted in-memory transport for testing.
///
/// Routes match on method and a URL substring. Each route replays its
/// replies in order and then keeps repeating the last one. Every request is
/// recorded.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Builds a response from the request it answers.
    pub type Responder = Arc<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

    /// What a route answers with.
    #[derive(Clone)]
    pub enum Reply {
        Response(HttpResponse),
        Fail(TransportError),
        With(Responder),
    }

    impl fmt::Debug for Reply {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Reply::Response(response) => f.debug_tuple("Response").field(response).finish(),
                Reply::Fail(error) => f.debug_tuple("Fail").field(error).finish(),
                Reply::With(_) => f.write_str("With(..)"),
            }
        }
    }

    struct Route {
        method: Method,
        fragment: String,
        replies: VecDeque<Reply>,
    }

    impl Route {
        fn matches(&self, request: &HttpRequest) -> bool {
            self.method == request.method && request.url.contains(&self.fragment)
        }
    }

    /// In-memory transport implementation.
    #[derive(Default)]
    pub struct MockTransport {
        routes: Mutex<Vec<Route>>,
        requests: Mutex<Vec<HttpRequest>>,
        long_poll_floor: Option<Duration>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer requests matching `method` and `fragment` with `replies`.
        pub fn on(self, method: Method, fragment: &str, replies: Vec<Reply>) -> Self {
            self.lock_routes().push(Route {
                method,
                fragment: fragment.to_string(),
                replies: replies.into(),
            });
            self
        }

        /// Shorthand for a route that always answers with one response.
        pub fn respond(self, method: Method, fragment: &str, response: HttpResponse) -> Self {
            self.on(method, fragment, vec![Reply::Response(response)])
        }

        /// Answer matching requests with whatever `responder` builds from them.
        pub fn respond_with<F>(self, method: Method, fragment: &str, responder: F) -> Self
        where
            F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
        {
            self.on(method, fragment, vec![Reply::With(Arc::new(responder))])
        }

        /// Make requests carrying a `wait=N` query parameter block for N
        /// seconds (at least `floor`) before answering, the way a ledger's
        /// long-poll status endpoint does.
        pub fn simulate_long_poll(mut self, floor: Duration) -> Self {
            self.long_poll_floor = Some(floor);
            self
        }

        /// All requests seen so far.
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        }

        /// Number of requests matching `method` and `fragment`.
        pub fn count(&self, method: Method, fragment: &str) -> usize {
            self.requests()
                .iter()
                .filter(|r| r.method == method && r.url.contains(fragment))
                .count()
        }

        fn lock_routes(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
            self.routes
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        fn next_reply(&self, request: &HttpRequest) -> Option<Reply> {
            let mut routes = self.lock_routes();
            let route = routes.iter_mut().find(|r| r.matches(request))?;
            if route.replies.len() > 1 {
                route.replies.pop_front()
            } else {
                route.replies.front().cloned()
            }
        }

        fn long_poll_delay(&self, request: &HttpRequest) -> Option<Duration> {
            let floor = self.long_poll_floor?;
            let url = url::Url::parse(&request.url).ok()?;
            let wait = url
                .query_pairs()
                .find(|(k, _)| k == "wait")
                .and_then(|(_, v)| v.parse::<u64>().ok())?;
            Some(Duration::from_secs(wait).max(floor))
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(request.clone());

            let reply = self.next_reply(&request);
            if let Some(delay) = self.long_poll_delay(&request) {
                tokio::time::sleep(delay).await;
            }

            match reply {
                Some(Reply::Response(response)) => Ok(response),
                Some(Reply::Fail(error)) => Err(error),
                Some(Reply::With(responder)) => Ok(responder(&request)),
                None => Ok(HttpResponse::with_status(404, "")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockTransport, Reply};
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_then_repeats_last() {
        let transport = MockTransport::new().on(
            Method::Get,
            "/status",
            vec![
                Reply::Response(HttpResponse::ok("first")),
                Reply::Response(HttpResponse::ok("second")),
            ],
        );

        let url = "http://ledger/status";
        let bodies: Vec<Bytes> = vec![
            transport.send(HttpRequest::get(url)).await.unwrap().body,
            transport.send(HttpRequest::get(url)).await.unwrap().body,
            transport.send(HttpRequest::get(url)).await.unwrap().body,
        ];
        assert_eq!(bodies, vec!["first", "second", "second"]);
        assert_eq!(transport.count(Method::Get, "/status"), 3);
    }

    #[tokio::test]
    async fn test_mock_responder_sees_request() {
        let transport = MockTransport::new().respond_with(Method::Get, "/echo", |request| {
            HttpResponse::ok(request.url.clone())
        });

        let response = transport
            .send(HttpRequest::get("http://ledger/echo?id=abc"))
            .await
            .unwrap();
        assert_eq!(response.body, "http://ledger/echo?id=abc");
    }

    #[tokio::test]
    async fn test_mock_unrouted_is_404() {
        let transport = MockTransport::new();
        let response = transport
            .send(HttpRequest::get("http://ledger/missing"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_mock_failure_reply() {
        let transport = MockTransport::new().on(
            Method::Post,
            "/batches",
            vec![Reply::Fail(TransportError::Connect("refused".into()))],
        );
        let request = HttpRequest::post(
            "http://ledger/batches",
            "application/octet-stream",
            vec![1u8],
        );
        let result = transport.send(request).await;
        assert_eq!(result, Err(TransportError::Connect("refused".into())));
    }

    #[test]
    fn test_request_headers() {
        let request = HttpRequest::post(
            "http://ledger/batches",
            "application/octet-stream",
            Vec::<u8>::new(),
        )
        .header("Authorization", "Basic abc");
        assert_eq!(
            request.header_value("content-type"),
            Some("application/octet-stream")
        );
        assert_eq!(request.header_value("authorization"), Some("Basic abc"));
        assert_eq!(request.header_value("x-missing"), None);
    }
}
