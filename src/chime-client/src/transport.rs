use chime_core::config::ServiceConfig;
use chime_core::{BridgeError, BridgeResult};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Header carrying the device identity on every request.
pub const DEVICE_ID_HEADER: &str = "x-chime-device";

/// HTTP client shared by all remote operations.
///
/// The cookie jar is the session-cookie store: cookies set by the service
/// during login polling are replayed on every subsequent request
/// automatically.
pub struct Transport {
    http: Client,
    base_url: Url,
    retry_attempts: u32,
    device_id: String,
}

impl Transport {
    pub fn new(service: &ServiceConfig, device_id: impl Into<String>) -> BridgeResult<Self> {
        let base_url = Url::parse(&service.base_url)
            .map_err(|e| BridgeError::invalid_argument(format!("invalid base_url: {e}")))?;
        let http = Client::builder()
            .cookie_store(true)
            .connect_timeout(service.connect_timeout())
            .timeout(service.request_timeout())
            .user_agent(format!("Chime/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::internal(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            retry_attempts: service.retry_attempts,
            device_id: device_id.into(),
        })
    }

    /// Single GET, no retry. Login polling uses this so the caller's poll
    /// loop stays in charge of timing.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> BridgeResult<T> {
        let url = self.join(path)?;
        let response = self
            .send_get(url, query, bearer)
            .await
            .map_err(map_send_error)?;
        decode_json(response).await
    }

    /// GET with bounded retry on transient connection failures. Only for
    /// requests the service treats as idempotent.
    pub async fn get_json_retrying<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> BridgeResult<T> {
        let url = self.join(path)?;
        let mut attempt = 0u32;
        loop {
            match self.send_get(url.clone(), query, bearer).await {
                Ok(response) => return decode_json(response).await,
                Err(err) if err.is_connect() && attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::debug!(path, attempt, "retrying after transient connection failure");
                    tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
                }
                Err(err) => return Err(map_send_error(err)),
            }
        }
    }

    async fn send_get(
        &self,
        url: Url,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self
            .http
            .get(url)
            .query(query)
            .header(DEVICE_ID_HEADER, &self.device_id);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        request.send().await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> BridgeResult<T> {
        let response = self.send_post(path, body, bearer).await?;
        decode_json(response).await
    }

    /// POST where the response body is irrelevant (cancel/logout endpoints).
    pub async fn post_no_content(
        &self,
        path: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> BridgeResult<()> {
        let response = self.send_post(path, body, bearer).await?;
        check_status(response).await.map(|_| ())
    }

    async fn send_post(
        &self,
        path: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> BridgeResult<reqwest::Response> {
        let url = self.join(path)?;
        let mut request = self
            .http
            .post(url)
            .json(body)
            .header(DEVICE_ID_HEADER, &self.device_id);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        request.send().await.map_err(map_send_error)
    }

    fn join(&self, path: &str) -> BridgeResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BridgeError::internal(format!("bad request path {path}: {e}")))
    }
}

fn map_send_error(err: reqwest::Error) -> BridgeError {
    if err.is_timeout() {
        BridgeError::Timeout {
            message: err.to_string(),
        }
    } else {
        BridgeError::Network {
            message: err.to_string(),
        }
    }
}

async fn check_status(response: reqwest::Response) -> BridgeResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(BridgeError::SessionExpired);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BridgeError::Http {
        code: status.as_u16(),
        body,
    })
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> BridgeResult<T> {
    let response = check_status(response).await?;
    response.json().await.map_err(|e| {
        tracing::debug!(error = %e, "response body did not decode");
        BridgeError::Parse { skipped: 0 }
    })
}
