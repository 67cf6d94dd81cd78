//! The response sink handed to typed handlers.
//!
//! [`ResponseWriter`] mirrors the contract of a streaming HTTP response: headers may be changed
//! until the status line is committed, the status line is committed at most once, and the body is
//! written after it. The difference is that everything is buffered, and the finished response is
//! produced by [`ResponseWriter::into_response`] once the handler has returned.

use crate::body::ResponseBody;
use bytes::{BufMut, BytesMut};
use http::header::{CONTENT_LENGTH, HeaderName, HeaderValue};
use http::{HeaderMap, Response, StatusCode};
use std::io;
use tracing::warn;

#[derive(Debug, Default)]
pub struct ResponseWriter {
    headers: HeaderMap,
    committed: Option<Committed>,
    body: BytesMut,
}

#[derive(Debug)]
struct Committed {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the committed status, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.committed.as_ref().map(|c| c.status)
    }

    /// Whether the status line has been written.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed.is_some()
    }

    /// The headers that will be sent: the committed set once the status is written, the pending
    /// set before that.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        match &self.committed {
            Some(committed) => &committed.headers,
            None => &self.headers,
        }
    }

    /// Returns the pending header map for modification.
    ///
    /// Changes made after the status is committed never reach the response.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        if self.is_committed() {
            warn!("header map borrowed after status was committed, changes will be dropped");
        }
        &mut self.headers
    }

    /// Sets a header, replacing any previous value. Ignored after the status is committed.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.is_committed() {
            warn!(header = %name, "header write after status was committed, ignored");
            return;
        }
        self.headers.insert(name, value);
    }

    /// Commits the status line and the current headers. Only the first call has an effect.
    pub fn write_status(&mut self, status: StatusCode) {
        if let Some(committed) = &self.committed {
            warn!(committed = %committed.status, ignored = %status, "superfluous status write");
            return;
        }
        self.committed = Some(Committed { status, headers: self.headers.clone() });
    }

    /// Appends bytes to the body, committing `200 OK` first if no status was written.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if !self.is_committed() {
            self.write_status(StatusCode::OK);
        }
        self.body.put_slice(bytes);
    }

    /// Finishes the sink. An untouched writer yields an empty `200 OK`.
    pub fn into_response(self) -> Response<ResponseBody> {
        let (status, headers) = match self.committed {
            Some(Committed { status, headers }) => (status, headers),
            None => (StatusCode::OK, self.headers),
        };
        let body = self.body.freeze();
        let content_length = HeaderValue::from(body.len());

        let mut response = Response::new(ResponseBody::once(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response.headers_mut().insert(CONTENT_LENGTH, content_length);
        response
    }
}

impl io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
