use http::StatusCode;
use serde::Serialize;

/// The response side envelope: an optional payload plus the status it should be sent with.
///
/// Serializes as `{"data": ...}`, with `data` left out when there is no payload. The status is
/// never part of the body.
#[derive(Debug, Clone, Serialize)]
pub struct JsonResponse<T> {
    #[serde(skip)]
    status: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T> JsonResponse<T> {
    /// A `200 OK` response carrying `data`.
    pub fn new(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    /// A response carrying `data` with the given status, passed through as is.
    pub fn with_status(status: StatusCode, data: T) -> Self {
        Self { status, data: Some(data) }
    }

    /// Pairs `status` with an optional payload.
    ///
    /// Without a payload the adapter writes nothing, so `status` only takes effect together with
    /// `data`, the same as for [`JsonResponse::empty`].
    pub fn from_parts(status: StatusCode, data: Option<T>) -> Self {
        Self { status, data }
    }

    /// A response without a payload.
    ///
    /// Returning it tells the adapter the handler has written its own response, so nothing more
    /// is written.
    pub fn empty() -> Self {
        Self { status: StatusCode::OK, data: None }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn into_parts(self) -> (StatusCode, Option<T>) {
        (self.status, self.data)
    }
}

impl<T> Default for JsonResponse<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Option<T>> for JsonResponse<T> {
    fn from(data: Option<T>) -> Self {
        Self::from_parts(StatusCode::OK, data)
    }
}
