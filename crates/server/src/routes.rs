//! An exact-path handler table.
//!
//! A path either matches a registered route exactly, or falls through to the handler registered
//! for `/`, which acts as the catch-all. Without a `/` route unmatched paths get `404`.

use async_trait::async_trait;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Request, Response, StatusCode};
use micro_typed::{RequestHandler, ResponseBody, ResponseWriter};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct Routes<B> {
    exact: HashMap<String, Arc<dyn RequestHandler<B>>>,
}

impl<B> Routes<B> {
    pub fn builder() -> RoutesBuilder<B> {
        RoutesBuilder { exact: HashMap::new() }
    }

    /// Finds the handler for `path`, falling back to the `/` route.
    pub fn at(&self, path: &str) -> Option<&Arc<dyn RequestHandler<B>>> {
        self.exact.get(path).or_else(|| self.exact.get("/"))
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

impl<B> fmt::Debug for Routes<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths = self.exact.keys().collect::<Vec<_>>();
        paths.sort();
        f.debug_struct("Routes").field("paths", &paths).finish()
    }
}

pub struct RoutesBuilder<B> {
    exact: HashMap<String, Arc<dyn RequestHandler<B>>>,
}

impl<B> RoutesBuilder<B> {
    /// Registers `handler` for `path`, replacing an earlier registration of the same path.
    #[must_use]
    pub fn route(mut self, path: impl Into<String>, handler: impl RequestHandler<B> + 'static) -> Self {
        self.exact.insert(path.into(), Arc::new(handler));
        self
    }

    pub fn build(self) -> Routes<B> {
        Routes { exact: self.exact }
    }
}

#[async_trait]
impl<B> RequestHandler<B> for Routes<B>
where
    B: Send + 'static,
{
    async fn invoke(&self, req: Request<B>) -> Response<ResponseBody> {
        match self.at(req.uri().path()) {
            Some(handler) => handler.invoke(req).await,
            None => {
                debug!(path = req.uri().path(), "no route matched");
                not_found()
            }
        }
    }
}

fn not_found() -> Response<ResponseBody> {
    let mut writer = ResponseWriter::new();
    writer.set_header(CONTENT_TYPE, HeaderValue::from_static(mime::TEXT_PLAIN_UTF_8.as_ref()));
    writer.write_status(StatusCode::NOT_FOUND);
    writer.write_bytes(b"404 page not found\n");
    writer.into_response()
}
