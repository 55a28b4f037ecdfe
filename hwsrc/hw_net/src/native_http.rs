use crate::multipart::MultipartForm;
use crate::transport::{SlurpError, SlurpResult};
use common::wio::{drive03, HYPER};
use futures::channel::oneshot::Canceled;
use http::{header, HeaderValue, Method, Request};
use hyper::Body;

impl From<Canceled> for SlurpError {
    fn from(_: Canceled) -> Self { SlurpError::Internal("Spawned Slurp future has been canceled".to_owned()) }
}

impl SlurpError {
    fn from_hyper_error(e: hyper::Error, uri: String) -> SlurpError {
        let error = e.to_string();
        if e.is_parse() || e.is_parse_status() || e.is_parse_too_large() {
            SlurpError::ErrorDeserializing { uri, error }
        } else if e.is_user() {
            SlurpError::InvalidRequest(error)
        } else if e.is_timeout() {
            SlurpError::Timeout { uri, error }
        } else {
            SlurpError::Transport { uri, error }
        }
    }
}

/// `http::Error` can appear on an HTTP request [`http::Builder::build`] building.
impl From<http::Error> for SlurpError {
    fn from(e: http::Error) -> Self { SlurpError::InvalidRequest(e.to_string()) }
}

/// Executes a Hyper request, returning the response status, headers and body.
pub async fn slurp_req(request: Request<Vec<u8>>) -> SlurpResult {
    let uri = request.uri().to_string();
    let (head, body) = request.into_parts();
    let request = Request::from_parts(head, Body::from(body));

    let request_f = HYPER.request(request);
    let response = drive03(request_f)
        .await?
        .map_err(|e| SlurpError::from_hyper_error(e, uri.clone()))?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body();
    let output = drive03(hyper::body::to_bytes(body))
        .await?
        .map_err(|e| SlurpError::from_hyper_error(e, uri.clone()))?;
    Ok((status, headers, output.to_vec()))
}

/// Executes a GET request, returning the response status, headers and body.
pub async fn slurp_url(url: &str) -> SlurpResult {
    let req = Request::builder().uri(url).body(Vec::new())?;
    slurp_req(req).await
}

/// Executes a POST request, returning the response status, headers and body.
pub async fn slurp_post_json(url: &str, body: String) -> SlurpResult {
    slurp_json_req(Method::POST, url, Some(body)).await
}

/// Executes a request with the given method and an optional JSON body.
pub async fn slurp_json_req(method: Method, url: &str, body: Option<String>) -> SlurpResult {
    let mut builder = Request::builder().method(method).uri(url);
    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
            body.into_bytes()
        },
        None => Vec::new(),
    };
    let request = builder.body(body)?;
    slurp_req(request).await
}

/// Executes a request carrying a `multipart/form-data` body.
pub async fn slurp_multipart(method: Method, url: &str, form: MultipartForm) -> SlurpResult {
    let content_type = HeaderValue::from_str(&form.content_type())
        .map_err(|e| SlurpError::InvalidRequest(format!("Invalid multipart boundary: {}", e)))?;
    let request = Request::builder()
        .method(method)
        .uri(url)
        .header(header::CONTENT_TYPE, content_type)
        .body(form.into_body())?;
    slurp_req(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::block_on;

    #[test]
    fn test_slurp_url_connection_refused() {
        // Nothing is expected to listen on the discard port.
        let error = block_on(slurp_url("http://127.0.0.1:9/")).unwrap_err();
        match error {
            SlurpError::Transport { uri, .. } => assert_eq!(uri, "http://127.0.0.1:9/"),
            other => panic!("Expected 'SlurpError::Transport', found {:?}", other),
        }
    }

    #[test]
    fn test_slurp_url_invalid_uri() {
        let error = block_on(slurp_url("not a uri")).unwrap_err();
        assert!(matches!(error, SlurpError::InvalidRequest(_)), "{:?}", error);
    }
}
