//! Executes `HttpRequest` values on behalf of the view-model.

use ureq::http::Response;
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Non-2xx statuses are returned as data; only failures to obtain a response
/// at all are `Err`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status interpretation belongs to `TodoClient`, not the agent.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let path = request.path.as_str();
        let headers = request.headers.as_slice();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(path), headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(path), headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(path), headers), body),
            HttpMethod::Patch => send(with_headers(self.agent.patch(path), headers), body),
        };

        let mut response = result.map_err(|e| ApiError::TransportError(e.to_string()))?;
        into_response(&mut response)
    }
}

fn with_headers<B>(builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |builder, (name, value)| builder.header(name.as_str(), value.as_str()))
}

fn send(builder: RequestBuilder<WithBody>, body: Option<&str>) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn into_response(response: &mut Response<Body>) -> Result<HttpResponse, ApiError> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::TransportError(e.to_string()))?;

    Ok(HttpResponse { status, headers, body })
}
