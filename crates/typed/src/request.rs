//! The request side envelope.
//!
//! [`JsonRequest`] pairs the request head with the decoded body. Decoding never fails: a body
//! that is missing, malformed, truncated or of the wrong shape leaves [`JsonRequest::data`] as
//! `None`, and it is up to the handler to turn that into a client error. This differs from
//! extractors that reject bad input before the handler runs, so handlers must always check.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri};
use http_body::Body;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::pin::pin;
use tracing::debug;

/// The largest number of body bytes that will be read, 1 MiB. Anything past it is dropped.
pub const MAX_BODY_SIZE: usize = 1 << 20;

#[derive(Debug)]
pub struct JsonRequest<T> {
    parts: Parts,
    /// The decoded body, `None` when it could not be decoded.
    pub data: Option<T>,
}

impl<T> JsonRequest<T> {
    pub fn new(parts: Parts, data: Option<T>) -> Self {
        Self { parts, data }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn into_parts(self) -> (Parts, Option<T>) {
        (self.parts, self.data)
    }
}

impl<T: DeserializeOwned> JsonRequest<T> {
    /// Builds the envelope from a raw request, consuming its body.
    pub async fn from_request<B>(req: Request<B>) -> Self
    where
        B: Body,
        B::Error: Display,
    {
        let (parts, body) = req.into_parts();
        let bytes = read_limited(body, MAX_BODY_SIZE).await;
        let data = decode_first(&bytes);
        Self { parts, data }
    }
}

/// Reads at most `limit` bytes from `body`, stopping as soon as the limit is reached.
///
/// A body error ends the read early and keeps what was collected so far.
pub async fn read_limited<B>(body: B, limit: usize) -> Bytes
where
    B: Body,
    B::Error: Display,
{
    let mut body = pin!(body);
    let mut buf = BytesMut::new();

    while buf.len() < limit {
        let frame = match body.frame().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                debug!(cause = %e, read = buf.len(), "request body read failed");
                break;
            }
            None => break,
        };

        let Ok(mut data) = frame.into_data() else {
            // trailers
            continue;
        };

        let take = (limit - buf.len()).min(data.remaining());
        buf.put(Buf::take(&mut data, take));
    }

    buf.freeze()
}

/// Decodes the first JSON value in `bytes`, ignoring anything that follows it.
fn decode_first<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    let mut values = serde_json::Deserializer::from_slice(bytes).into_iter::<Option<T>>();
    match values.next() {
        Some(Ok(data)) => data,
        Some(Err(e)) => {
            debug!(cause = %e, "request body is not valid json, leaving data empty");
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonRequest, MAX_BODY_SIZE, read_limited};
    use bytes::Bytes;
    use http::{Method, Request};
    use http_body_util::{Empty, Full};
    use indoc::indoc;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Sum {
        a: i64,
        b: i64,
    }

    fn post(body: impl Into<Bytes>) -> Request<Full<Bytes>> {
        Request::builder().method(Method::POST).uri("/add").body(Full::new(body.into())).unwrap()
    }

    #[tokio::test]
    async fn decodes_valid_body() {
        let req = JsonRequest::<Sum>::from_request(post(r#"{"a":1,"b":2}"#)).await;

        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.uri().path(), "/add");
        assert_eq!(req.data(), Some(&Sum { a: 1, b: 2 }));
    }

    #[tokio::test]
    async fn decodes_pretty_body() {
        let body = indoc! {r#"
            {
              "a": 40,
              "b": 2
            }
        "#};
        let req = JsonRequest::<Sum>::from_request(post(body)).await;
        assert_eq!(req.into_data(), Some(Sum { a: 40, b: 2 }));
    }

    #[tokio::test]
    async fn empty_body_leaves_data_empty() {
        let req = Request::builder().method(Method::POST).body(Empty::<Bytes>::new()).unwrap();
        let req = JsonRequest::<Sum>::from_request(req).await;
        assert!(req.data.is_none());
    }

    #[tokio::test]
    async fn malformed_body_leaves_data_empty() {
        for body in [r#"{"a":1,"#, "not json", r#"{"a":"one","b":2}"#, "null", "[]"] {
            let req = JsonRequest::<Sum>::from_request(post(body)).await;
            assert!(req.data.is_none(), "body {body:?} should not decode");
        }
    }

    #[tokio::test]
    async fn trailing_data_is_ignored() {
        let req = JsonRequest::<Sum>::from_request(post(r#"{"a":1,"b":2} {"a":3,"b":4} garbage"#)).await;
        assert_eq!(req.data, Some(Sum { a: 1, b: 2 }));
    }

    #[tokio::test]
    async fn padding_past_the_limit_is_dropped() {
        let mut body = br#"{"a":5,"b":6}"#.to_vec();
        body.resize(MAX_BODY_SIZE + 4096, b' ');

        let req = JsonRequest::<Sum>::from_request(post(body)).await;
        assert_eq!(req.data, Some(Sum { a: 5, b: 6 }));
    }

    #[tokio::test]
    async fn oversized_document_is_truncated() {
        let mut body = br#"{"a":5,"b":6,"pad":""#.to_vec();
        body.resize(MAX_BODY_SIZE + 16, b'x');
        body.extend_from_slice(br#""}"#);

        let req = JsonRequest::<Sum>::from_request(post(body)).await;
        assert!(req.data.is_none());
    }

    #[tokio::test]
    async fn read_limited_stops_at_limit() {
        let bytes = read_limited(Full::new(Bytes::from_static(b"0123456789")), 4).await;
        assert_eq!(&bytes[..], b"0123");
    }
}
