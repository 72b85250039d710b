//! The response sink handlers write into.
//!
//! A [`ResponseWriter`] buffers everything: status, headers, body. Handlers
//! write to it as a side effect and return nothing. The host turns the
//! finished writer into an [`http::Response`] with
//! [`ResponseWriter::into_response`] once the whole chain has returned.

use std::io;

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseWriter::content_type`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

impl From<ContentType> for HeaderValue {
    fn from(ct: ContentType) -> Self {
        HeaderValue::from_static(ct.as_str())
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// Buffered response sink.
///
/// ```rust
/// use std::io::Write;
/// use synapse::{ContentType, ResponseWriter};
///
/// let mut w = ResponseWriter::new();
/// w.content_type(ContentType::Text);
/// write!(w, "Hello, {}!", "alice").unwrap();
///
/// assert_eq!(w.status(), http::StatusCode::OK);
/// assert_eq!(w.body(), b"Hello, alice!");
/// ```
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Headers stay mutable until the writer is converted; nothing is sent
    /// before the chain returns.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Shortcut for setting the `content-type` header.
    pub fn content_type(&mut self, ct: ContentType) {
        self.headers.insert(CONTENT_TYPE, ct.into());
    }

    /// Commits the response status.
    ///
    /// Only the first call counts. Writing to the body without calling this
    /// commits `200 OK`.
    pub fn write_header(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(committed) => {
                warn!(%committed, ignored = %status, "superfluous write_header call");
            }
        }
    }

    /// The committed status, `200 OK` if none was committed.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the buffered response into an [`http::Response`].
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Appends to the body. Never fails.
impl io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
