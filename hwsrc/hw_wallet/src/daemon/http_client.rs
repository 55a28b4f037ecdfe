use super::{DaemonBody, DaemonRequest, DaemonTransport, DaemonTransportError};
use async_trait::async_trait;
use common::log::debug;
use http::StatusCode;
use hw_net::transport::{slurp_json_req, slurp_multipart, MultipartForm, SlurpError};
use serde_json::Value as Json;

impl From<SlurpError> for DaemonTransportError {
    fn from(e: SlurpError) -> Self {
        match e {
            SlurpError::Timeout { .. } => DaemonTransportError::Timeout(e.to_string()),
            e => DaemonTransportError::Unreachable(e.to_string()),
        }
    }
}

/// Talks to the daemon over plain HTTP.
pub struct HttpDaemonClient {
    base_url: String,
}

impl HttpDaemonClient {
    pub fn new(base_url: &str) -> HttpDaemonClient {
        HttpDaemonClient {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String { format!("{}/{}", self.base_url, path.trim_start_matches('/')) }
}

#[async_trait]
impl DaemonTransport for HttpDaemonClient {
    async fn send(&self, request: DaemonRequest) -> Result<Json, DaemonTransportError> {
        let url = self.url(&request.path);
        debug!("HW daemon request: {} {}", request.method, url);

        let method = request.method.to_http();
        let (status, _headers, body) = match request.body {
            DaemonBody::Empty => slurp_json_req(method, &url, None).await?,
            DaemonBody::Json(params) => slurp_json_req(method, &url, Some(params.to_string())).await?,
            DaemonBody::File {
                field,
                file_name,
                content,
            } => {
                let form = MultipartForm::new().file(&field, &file_name, content);
                slurp_multipart(method, &url, form).await?
            },
        };

        let body = decode_body(&body);
        if status.is_success() {
            return Ok(body);
        }
        debug!("HW daemon responded to {} with {} status: {}", url, status, body);
        if status == StatusCode::REQUEST_TIMEOUT {
            return Err(DaemonTransportError::Timeout(body.to_string()));
        }
        Err(DaemonTransportError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// The daemon answers with JSON, anything else is kept as text.
fn decode_body(body: &[u8]) -> Json {
    match serde_json::from_slice(body) {
        Ok(json) => json,
        Err(_) => Json::String(String::from_utf8_lossy(body).trim().to_owned()),
    }
}
