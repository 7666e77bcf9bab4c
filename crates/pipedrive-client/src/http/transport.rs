/*
[INPUT]:  Prepared request (method, target, encoded payload) and client configuration
[OUTPUT]: Raw response (status, header block, body) or a transport failure
[POS]:    HTTP layer - network I/O boundary
[UPDATE]: When changing connection options or the raw response format
*/

use std::borrow::Cow;
use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, redirect};

use crate::config::ClientConfig;
use crate::http::error::{PipedriveError, Result};
use crate::http::payload::{FieldValue, FormField, Payload};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("pipedrive-client-rs/", env!("CARGO_PKG_VERSION"));

/// A request ready for the wire. Re-issued unchanged after a rate-limit backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub payload: Option<Payload>,
}

/// Response as seen on the wire: header block followed by the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub raw: Vec<u8>,
    /// Length of the header block at the start of `raw`
    pub header_size: usize,
}

impl RawResponse {
    pub fn new(status: u16, head: &str, body: &[u8]) -> Self {
        let mut raw = Vec::with_capacity(head.len() + body.len());
        raw.extend_from_slice(head.as_bytes());
        raw.extend_from_slice(body);
        Self {
            status,
            raw,
            header_size: head.len(),
        }
    }

    /// Split into (header block, body) at the reported header length
    pub fn split(&self) -> (Cow<'_, str>, Cow<'_, str>) {
        let at = self.header_size.min(self.raw.len());
        let (head, body) = self.raw.split_at(at);
        (String::from_utf8_lossy(head), String::from_utf8_lossy(body))
    }
}

/// Executes one request at a time for a single session
#[async_trait]
pub trait Transport: Send {
    async fn execute(&mut self, request: &PreparedRequest) -> Result<RawResponse>;
}

/// Default transport backed by a reqwest client
#[derive(Debug)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&mut self, request: &PreparedRequest) -> Result<RawResponse> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), request.url.as_str());

        builder = match &request.payload {
            None => builder,
            Some(Payload::Form(body)) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body.clone()),
            // multipart forms cannot be cloned, so one is rebuilt per attempt
            Some(Payload::Multipart(fields)) => builder.multipart(build_form(fields).await?),
        };

        let response = builder.send().await?;
        let status = response.status();

        let mut head = format!("{:?} {}\r\n", response.version(), status);
        for (name, value) in response.headers() {
            head.push_str(name.as_str());
            head.push_str(": ");
            head.push_str(&String::from_utf8_lossy(value.as_bytes()));
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let body = response.bytes().await?;
        Ok(RawResponse::new(status.as_u16(), &head, &body))
    }
}

async fn build_form(fields: &[FormField]) -> Result<Form> {
    let mut form = Form::new();
    for field in fields {
        form = match &field.value {
            FieldValue::Text(text) => form.text(field.name.clone(), text.clone()),
            FieldValue::File(path) => form.part(field.name.clone(), file_part(path).await?),
            FieldValue::Empty => form.text(field.name.clone(), ""),
        };
    }
    Ok(form)
}

async fn file_part(path: &Path) -> Result<Part> {
    let content = tokio::fs::read(path).await.map_err(|e| {
        PipedriveError::Transport(format!("failed to read upload file {}: {e}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    Ok(Part::bytes(content).file_name(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_header_size() {
        let raw = RawResponse::new(200, "HTTP/1.1 200 OK\r\nA: 1\r\n\r\n", br#"{"data":1}"#);
        let (head, body) = raw.split();
        assert_eq!(head, "HTTP/1.1 200 OK\r\nA: 1\r\n\r\n");
        assert_eq!(body, r#"{"data":1}"#);
    }

    #[test]
    fn test_split_clamps_oversized_header_length() {
        let raw = RawResponse {
            status: 200,
            raw: b"A: 1\r\n".to_vec(),
            header_size: 100,
        };
        let (head, body) = raw.split();
        assert_eq!(head, "A: 1\r\n");
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn test_missing_upload_file_is_transport_error() {
        let fields = vec![FormField {
            name: "file".into(),
            value: FieldValue::File("/definitely/not/here.pdf".into()),
        }];
        let err = build_form(&fields).await.expect_err("file should be missing");
        assert!(matches!(err, PipedriveError::Transport(message) if message.contains("here.pdf")));
    }
}
