use bytes::Bytes;
use http_body::Body as HttpBody;
use http_body::{Frame, SizeHint};
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A fully buffered response body, yielding at most one data frame.
///
/// Every response produced by [`ResponseWriter`](crate::ResponseWriter) ends up here, so the
/// host transport only ever has to deal with a single concrete body type.
#[derive(Debug, Default)]
pub struct ResponseBody {
    inner: Option<Bytes>,
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self { inner: None }
    }

    pub fn once(bytes: Bytes) -> Self {
        if bytes.is_empty() { Self::empty() } else { Self { inner: Some(bytes) } }
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::once(bytes)
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        Self::once(Bytes::from_static(value.as_bytes()))
    }
}

impl From<()> for ResponseBody {
    fn from((): ()) -> Self {
        Self::empty()
    }
}

impl HttpBody for ResponseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.get_mut().inner.take().map(|bytes| Ok(Frame::data(bytes))))
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        match &self.inner {
            None => SizeHint::with_exact(0),
            Some(bytes) => SizeHint::with_exact(bytes.len() as u64),
        }
    }
}
