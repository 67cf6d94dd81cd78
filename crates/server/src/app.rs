//! The demo application: a clock at `/` and a JSON adder at `/add`.

use crate::routes::Routes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Request, Response};
use http_body::Body;
use micro_typed::{
    BadRequestError, HandlerError, JsonRequest, JsonResponse, ResponseBody, ResponseWriter, handler_fn, json, typed_fn,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::Write;
use tracing::warn;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddRequest {
    pub a: i64,
    pub b: i64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddResponse {
    pub result: i64,
}

/// Builds the demo routes.
pub fn routes<B>() -> Routes<B>
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Display,
{
    Routes::builder()
        .route("/", handler_fn(|_req: Request<B>| async { now() }))
        .route("/add", json(typed_fn(add)))
        .build()
}

/// Answers with the current local time as plain text.
fn now() -> Response<ResponseBody> {
    let mut writer = ResponseWriter::new();
    writer.set_header(CONTENT_TYPE, HeaderValue::from_static(mime::TEXT_PLAIN_UTF_8.as_ref()));
    if let Err(e) = writeln!(writer, "Time: {}", chrono::Local::now().to_rfc3339()) {
        warn!(cause = %e, "failed to write time");
    }
    writer.into_response()
}

/// Adds two numbers.
///
/// ```text
/// POST /add
/// Content-Type: application/json
///
/// {"a": 1, "b": 2}
/// ```
///
/// answers `{"data": {"result": 3}}`. Overflow wraps around.
pub async fn add(req: JsonRequest<AddRequest>) -> Result<JsonResponse<AddResponse>, HandlerError> {
    let Some(AddRequest { a, b }) = req.data else {
        return Err(BadRequestError::with_message("Missing request data").into());
    };
    Ok(JsonResponse::new(AddResponse { result: a.wrapping_add(b) }))
}

#[cfg(test)]
mod tests {
    use super::routes;
    use crate::routes::Routes;
    use bytes::Bytes;
    use http::header::CONTENT_TYPE;
    use http::{Method, Request, Response, StatusCode};
    use http_body_util::{BodyExt, Empty, Full};
    use indoc::indoc;
    use micro_typed::{RequestHandler, ResponseBody};

    fn post(path: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    fn app() -> Routes<Full<Bytes>> {
        routes()
    }

    async fn body(response: Response<ResponseBody>) -> String {
        String::from_utf8(response.into_body().collect().await.unwrap().to_bytes().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn add_sums_the_numbers() {
        let response = app().invoke(post("/add", r#"{"a":1,"b":2}"#)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(body(response).await, "{\"data\":{\"result\":3}}\n");
    }

    #[tokio::test]
    async fn add_accepts_pretty_json() {
        let request = indoc! {r#"
            {
                "a": -10,
                "b": 4
            }
        "#};
        let response = app().invoke(post("/add", request)).await;

        assert_eq!(body(response).await, "{\"data\":{\"result\":-6}}\n");
    }

    #[tokio::test]
    async fn add_without_body_is_bad_request() {
        let routes = routes::<Empty<Bytes>>();
        let request = Request::builder().method(Method::POST).uri("/add").body(Empty::new()).unwrap();

        let response = routes.invoke(request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(body(response).await, "{\"message\":\"Missing request data\"}\n");
    }

    #[tokio::test]
    async fn add_with_wrong_shape_is_bad_request() {
        let response = app().invoke(post("/add", r#"{"a":"1","b":2}"#)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await, "{\"message\":\"Missing request data\"}\n");
    }

    #[tokio::test]
    async fn root_tells_the_time() {
        let response = app().invoke(post("/", "")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/plain; charset=utf-8");
        let text = body(response).await;
        assert!(text.starts_with("Time: "), "unexpected body {text:?}");
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn unknown_path_falls_back_to_root() {
        let response = app().invoke(post("/nope", "")).await;
        assert!(body(response).await.starts_with("Time: "));
    }
}
