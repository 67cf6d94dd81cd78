//! JSON rendering into a [`ResponseWriter`].
//!
//! Encoding happens after the status line is committed, so an encoding failure cannot change
//! the response any more. Such failures are logged and otherwise dropped.

use crate::error::ResponseError;
use crate::writer::ResponseWriter;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::StatusCode;
use serde::Serialize;
use tracing::{debug, error};

const FALLBACK_MESSAGE: &str = "Internal server error";

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

/// Writes `data` as JSON with status `200 OK`.
pub fn write_json<T>(writer: &mut ResponseWriter, data: &T)
where
    T: Serialize + ?Sized,
{
    write_json_code(writer, StatusCode::OK, data);
}

/// Writes `data` as JSON with the given status.
pub fn write_json_code<T>(writer: &mut ResponseWriter, status: StatusCode, data: &T)
where
    T: Serialize + ?Sized,
{
    writer.set_header(CONTENT_TYPE, HeaderValue::from_static(mime::APPLICATION_JSON.as_ref()));
    writer.write_status(status);

    match serde_json::to_vec(data) {
        Ok(mut encoded) => {
            encoded.push(b'\n');
            writer.write_bytes(&encoded);
        }
        Err(e) => {
            error!(cause = %e, status = %status, "failed to encode json response");
        }
    }
}

/// Renders an error as `{"message": ...}`.
///
/// The status comes from [`ResponseError::status_code`] and the message from
/// [`ResponseError::message`], falling back to `500` and `"Internal server error"`.
pub fn write_json_error<E>(writer: &mut ResponseWriter, err: &E)
where
    E: ResponseError + ?Sized,
{
    let status = err.status_code().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = err.message();

    if status.is_server_error() {
        error!(cause = %err, status = %status, "handler failed");
    } else {
        debug!(cause = %err, status = %status, "handler rejected request");
    }

    let body = ErrorBody { message: message.as_deref().unwrap_or(FALLBACK_MESSAGE) };
    write_json_code(writer, status, &body);
}

#[cfg(test)]
mod tests {
    use super::{write_json, write_json_code, write_json_error};
    use crate::error::{BadRequestError, ConflictError, HandlerError, NotFoundError, ResponseError};
    use crate::writer::ResponseWriter;
    use http::header::CONTENT_TYPE;
    use http::{Response, StatusCode};
    use http_body_util::BodyExt;
    use serde::ser::{Error as _, Serialize, Serializer};
    use serde_json::{Value, json};
    use std::io;

    async fn body_of(response: Response<crate::ResponseBody>) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn json_is_written_with_content_type() {
        let mut writer = ResponseWriter::new();
        write_json(&mut writer, &json!({"hello": "world"}));

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(body_of(response).await, b"{\"hello\":\"world\"}\n");
    }

    #[tokio::test]
    async fn json_code_keeps_status() {
        let mut writer = ResponseWriter::new();
        write_json_code(&mut writer, StatusCode::ACCEPTED, &[1, 2, 3]);

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_of(response).await, b"[1,2,3]\n");
    }

    #[tokio::test]
    async fn error_with_both_capabilities() {
        let mut writer = ResponseWriter::new();
        write_json_error(&mut writer, &ConflictError::with_message("name taken"));

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        let body: Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body, json!({"message": "name taken"}));
    }

    #[tokio::test]
    async fn error_without_capabilities_is_internal() {
        let mut writer = ResponseWriter::new();
        write_json_error(&mut writer, &io::Error::other("secret detail"));

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, b"{\"message\":\"Internal server error\"}\n");
    }

    #[tokio::test]
    async fn bad_request_default_message() {
        let mut writer = ResponseWriter::new();
        write_json_error(&mut writer, &BadRequestError::new());

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await, b"{\"message\":\"Bad request\"}\n");
    }

    async fn render_error(err: &(impl ResponseError + ?Sized)) -> (StatusCode, Vec<u8>) {
        let mut writer = ResponseWriter::new();
        write_json_error(&mut writer, err);
        let response = writer.into_response();
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        (response.status(), body_of(response).await)
    }

    #[tokio::test]
    async fn not_found_messages() {
        let (status, body) = render_error(&NotFoundError::new()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"{\"message\":\"Not found\"}\n");

        let (status, body) = render_error(&NotFoundError::with_message("no such user")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"{\"message\":\"no such user\"}\n");
    }

    #[tokio::test]
    async fn conflict_default_message() {
        let (status, body) = render_error(&ConflictError::new()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, b"{\"message\":\"Conflict\"}\n");
    }

    #[tokio::test]
    async fn opaque_error_is_internal() {
        let err = HandlerError::opaque("connection pool exhausted");

        let (status, body) = render_error(err.get_ref()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"{\"message\":\"Internal server error\"}\n");
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot encode"))
        }
    }

    #[tokio::test]
    async fn encode_failure_keeps_committed_status() {
        let mut writer = ResponseWriter::new();
        write_json_code(&mut writer, StatusCode::CREATED, &Unserializable);

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(body_of(response).await.is_empty());
    }
}
