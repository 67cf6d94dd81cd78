//! Typed JSON request handlers for `http`-based servers.
//!
//! Instead of reading raw bodies and writing status codes by hand, a handler is an async function
//! from a decoded request payload to a response payload or an error:
//!
//! ```
//! use micro_typed::{BadRequestError, HandlerError, JsonRequest, JsonResponse, json, typed_fn};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct AddRequest {
//!     a: i64,
//!     b: i64,
//! }
//!
//! #[derive(Serialize)]
//! struct AddResponse {
//!     result: i64,
//! }
//!
//! async fn add(req: JsonRequest<AddRequest>) -> Result<JsonResponse<AddResponse>, HandlerError> {
//!     let Some(data) = req.data else {
//!         return Err(BadRequestError::with_message("Missing request data").into());
//!     };
//!     Ok(JsonResponse::new(AddResponse { result: data.a + data.b }))
//! }
//!
//! let handler = json(typed_fn(add));
//! # let _ = handler;
//! ```
//!
//! [`json`] turns the typed handler into a [`RequestHandler`], the untyped entry point a host
//! transport calls once per request.
//!
//! # Wire format
//!
//! - a payload is sent as `{"data": <payload>}` with `Content-Type: application/json`;
//! - an error is sent as `{"message": "..."}`, see [`ResponseError`] for how the status and
//!   message are picked;
//! - a response without payload sends nothing, the handler is expected to have written through
//!   its [`ResponseWriter`].
//!
//! # Decoding
//!
//! Request bodies are read up to [`MAX_BODY_SIZE`] and decoded leniently: when decoding fails
//! the handler still runs, with [`JsonRequest::data`] set to `None`. Rejecting missing input is
//! the handler's job.

mod body;
mod encode;
mod error;
mod handler;
mod request;
mod response;
mod writer;

pub use body::ResponseBody;
pub use encode::{write_json, write_json_code, write_json_error};
pub use error::{BadRequestError, ConflictError, HandlerError, NotFoundError, ResponseError};
pub use handler::{HandlerFn, JsonAdapter, RequestHandler, TypedFn, TypedHandler, handler_fn, json, typed_fn};
pub use request::{JsonRequest, MAX_BODY_SIZE, read_limited};
pub use response::JsonResponse;
pub use writer::ResponseWriter;
