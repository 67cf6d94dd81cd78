//! Errors that know how to present themselves over HTTP.
//!
//! A handler error may expose a status code, a client-facing message, both, or neither. Both
//! capabilities are default methods on [`ResponseError`], so an error opts in by overriding them.
//! Whatever is not provided falls back to `500 Internal Server Error` and the fixed text
//! `"Internal server error"`, so internal details never leak by accident.

use http::StatusCode;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

pub trait ResponseError: StdError + Send + Sync + 'static {
    /// The status to respond with, `None` for the default `500`.
    fn status_code(&self) -> Option<StatusCode> {
        None
    }

    /// The message shown to the client, `None` for the generic fallback.
    fn message(&self) -> Option<Cow<'_, str>> {
        None
    }
}

impl ResponseError for std::io::Error {}

impl ResponseError for serde_json::Error {}

/// The error type returned by typed handlers.
///
/// Any [`ResponseError`] converts into it, which makes `?` work inside handlers. Errors from
/// elsewhere can be wrapped with [`HandlerError::opaque`] and render as a plain `500`.
pub struct HandlerError {
    inner: Box<dyn ResponseError>,
}

impl HandlerError {
    pub fn new<E: ResponseError>(error: E) -> Self {
        Self { inner: Box::new(error) }
    }

    /// Wraps an error that exposes neither a status code nor a message.
    pub fn opaque<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::new(Opaque(error.into()))
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.inner.status_code()
    }

    pub fn message(&self) -> Option<Cow<'_, str>> {
        self.inner.message()
    }

    pub fn get_ref(&self) -> &dyn ResponseError {
        self.inner.as_ref()
    }
}

impl<E: ResponseError> From<E> for HandlerError {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

#[derive(Debug)]
struct Opaque(Box<dyn StdError + Send + Sync>);

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for Opaque {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl ResponseError for Opaque {}

macro_rules! status_error {
    ($(#[$doc:meta])* $name:ident, $status:expr, $default:literal) => {
        $(#[$doc])*
        #[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
        #[error("{}", .message.as_deref().unwrap_or($default))]
        pub struct $name {
            message: Option<String>,
        }

        impl $name {
            #[doc = concat!("Creates the error with the default message `\"", $default, "\"`.")]
            pub fn new() -> Self {
                Self { message: None }
            }

            pub fn with_message(message: impl Into<String>) -> Self {
                let message = message.into();
                Self { message: (!message.is_empty()).then_some(message) }
            }

            fn effective_message(&self) -> &str {
                self.message.as_deref().unwrap_or($default)
            }
        }

        impl ResponseError for $name {
            fn status_code(&self) -> Option<StatusCode> {
                Some($status)
            }

            fn message(&self) -> Option<Cow<'_, str>> {
                Some(Cow::Borrowed(self.effective_message()))
            }
        }
    };
}

status_error! {
    /// `400 Bad Request`, message defaults to `"Bad request"`.
    BadRequestError, StatusCode::BAD_REQUEST, "Bad request"
}

status_error! {
    /// `404 Not Found`, message defaults to `"Not found"`.
    NotFoundError, StatusCode::NOT_FOUND, "Not found"
}

status_error! {
    /// `409 Conflict`, message defaults to `"Conflict"`.
    ConflictError, StatusCode::CONFLICT, "Conflict"
}
