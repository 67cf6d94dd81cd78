//! Typed handlers and the adapter that turns them into plain request handlers.

use crate::body::ResponseBody;
use crate::encode::{write_json_code, write_json_error};
use crate::error::HandlerError;
use crate::request::JsonRequest;
use crate::response::JsonResponse;
use crate::writer::ResponseWriter;
use async_trait::async_trait;
use http::{Request, Response};
use http_body::Body;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{self, Display};
use std::future::Future;
use std::marker::PhantomData;

/// The untyped entry point a host transport calls once per request.
///
/// It never fails: every handler error has already been turned into a response.
#[async_trait]
pub trait RequestHandler<B>: Send + Sync {
    async fn invoke(&self, req: Request<B>) -> Response<ResponseBody>;
}

/// A handler taking the decoded request body of type `R` and answering with a payload of type `W`.
///
/// The writer is only needed by handlers that produce a non-JSON response themselves, in which
/// case they return [`JsonResponse::empty`].
#[async_trait]
pub trait TypedHandler<R, W>: Send + Sync
where
    R: Send + 'static,
    W: Send + 'static,
{
    async fn call(
        &self,
        writer: &mut ResponseWriter,
        req: JsonRequest<R>,
    ) -> Result<JsonResponse<W>, HandlerError>;
}

/// Holds an async fn taking a raw request, see [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn { f }
}

#[async_trait]
impl<B, F, Fut> RequestHandler<B> for HandlerFn<F>
where
    B: Send + 'static,
    F: Fn(Request<B>) -> Fut + Send + Sync,
    Fut: Future<Output = Response<ResponseBody>> + Send,
{
    async fn invoke(&self, req: Request<B>) -> Response<ResponseBody> {
        (self.f)(req).await
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

/// Holds an async fn taking a [`JsonRequest`], see [`typed_fn`].
pub struct TypedFn<F> {
    f: F,
}

/// Turns an async fn from [`JsonRequest<R>`] to [`JsonResponse<W>`] into a [`TypedHandler`].
pub fn typed_fn<F>(f: F) -> TypedFn<F> {
    TypedFn { f }
}

#[async_trait]
impl<R, W, F, Fut> TypedHandler<R, W> for TypedFn<F>
where
    R: Send + 'static,
    W: Send + 'static,
    F: Fn(JsonRequest<R>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<JsonResponse<W>, HandlerError>> + Send,
{
    async fn call(
        &self,
        _writer: &mut ResponseWriter,
        req: JsonRequest<R>,
    ) -> Result<JsonResponse<W>, HandlerError> {
        (self.f)(req).await
    }
}

impl<F> fmt::Debug for TypedFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedFn").finish_non_exhaustive()
    }
}

/// The dispatch adapter produced by [`json`].
pub struct JsonAdapter<H, R, W> {
    handler: H,
    _phantom: PhantomData<fn(R) -> W>,
}

/// Wraps a typed handler so it can be served as a [`RequestHandler`].
///
/// Per request the adapter decodes the body into a [`JsonRequest<R>`] (see
/// [`JsonRequest::from_request`] for the decoding rules), calls the handler, and then:
///
/// - on `Err`, renders the error with [`write_json_error`];
/// - on `Ok` with a payload, writes `{"data": ...}` with the response status;
/// - on `Ok` without a payload, writes nothing and leaves the response to the handler.
///
/// Nothing is written to the response before the handler runs.
pub fn json<H, R, W>(handler: H) -> JsonAdapter<H, R, W>
where
    H: TypedHandler<R, W>,
    R: Send + 'static,
    W: Send + 'static,
{
    JsonAdapter { handler, _phantom: PhantomData }
}

impl<H, R, W> JsonAdapter<H, R, W> {
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H: fmt::Debug, R, W> fmt::Debug for JsonAdapter<H, R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonAdapter").field("handler", &self.handler).finish()
    }
}

#[async_trait]
impl<B, H, R, W> RequestHandler<B> for JsonAdapter<H, R, W>
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Display,
    H: TypedHandler<R, W>,
    R: DeserializeOwned + Send + 'static,
    W: Serialize + Send + 'static,
{
    async fn invoke(&self, req: Request<B>) -> Response<ResponseBody> {
        let req = JsonRequest::<R>::from_request(req).await;

        let mut writer = ResponseWriter::new();
        match self.handler.call(&mut writer, req).await {
            Err(e) => write_json_error(&mut writer, e.get_ref()),
            Ok(resp) if !resp.is_empty() => write_json_code(&mut writer, resp.status(), &resp),
            Ok(_) => {}
        }
        writer.into_response()
    }
}
