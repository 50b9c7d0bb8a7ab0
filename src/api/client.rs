use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::config::ApiConfig;
use crate::store::auth::BearerToken;

enum RequestBody {
    Empty,
    Json(Vec<u8>),
    Multipart(Form),
    /// Body serialization failed; reported when the request is executed.
    Invalid(String),
}

/// One call against the REST service, described independently of the
/// session that will eventually send it.
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: RequestBody,
    anonymous: bool,
}

impl ApiRequest {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            anonymous: false,
        }
    }

    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub fn post(segments: &[&str]) -> Self {
        Self::new(Method::POST, segments)
    }

    pub fn put(segments: &[&str]) -> Self {
        Self::new(Method::PUT, segments)
    }

    pub fn delete(segments: &[&str]) -> Self {
        Self::new(Method::DELETE, segments)
    }

    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Explicit header; replaces anything the gateway would set itself,
    /// including `Authorization`.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = match serde_json::to_vec(body) {
            Ok(bytes) => RequestBody::Json(bytes),
            Err(e) => RequestBody::Invalid(format!("failed to encode body: {}", e)),
        };
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Never attach the session's bearer credential (login, signup).
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the API base, for logs.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Thin mapping between [`ApiRequest`]s and the remote REST service.
///
/// The gateway is stateless with respect to the session: the caller hands
/// in the current bearer token per call and reacts to
/// [`ApiError::is_authorization_failure`] itself.
#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: Url,
}

impl ApiGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Request(format!("invalid base url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Request(format!(
                "base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(u64::from(config.connect_timeout_seconds)))
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(ApiError::from_client)?;

        Ok(Self { client, base_url })
    }

    /// Send a request and decode its 2xx body as `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        bearer: Option<&BearerToken>,
    ) -> Result<T, ApiError> {
        let path = request.path();
        let method = request.method.clone();
        tracing::debug!(%method, %path, authenticated = bearer.is_some() && !request.anonymous, "API request");

        let result = self.send(request, bearer).await;
        if let Err(ref e) = result {
            tracing::debug!(%method, %path, error_type = e.error_type(), status = ?e.status(), "API request failed");
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        bearer: Option<&BearerToken>,
    ) -> Result<T, ApiError> {
        let url = self.url_for(&request)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = bearer.filter(|_| !request.anonymous) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
                .map_err(|_| ApiError::Request("bearer token is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        if matches!(request.body, RequestBody::Json(_)) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Request(format!("invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Request(format!("invalid value for header '{}': {}", name, e)))?;
            headers.insert(name, value);
        }

        let builder = self.client.request(request.method, url).headers(headers);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes),
            RequestBody::Multipart(form) => builder.multipart(form),
            RequestBody::Invalid(reason) => return Err(ApiError::Request(reason)),
        };

        let response = builder.send().await.map_err(ApiError::from_client)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::from_client)?;

        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        if body.is_empty() {
            return Err(ApiError::Decode("empty response body".to_string()));
        }
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Request(format!("base url '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(&request.segments);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}
