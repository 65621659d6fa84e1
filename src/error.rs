// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A composite error type for errors that can occur while interacting with Twitter.
//!
//! Any action that crosses the network to call Twitter has many places where it can go wrong.
//! Whether it's a bad network connection, a revoked authorization token, a deleted tweet, or
//! anything in between, those errors are all represented in the (rather sprawling) [`Error`] enum.
//! Any errors direct from Twitter are represented as an [`ApiError`], and contain the title,
//! detail and problem type Twitter sent back.
//!
//! Not every error reported by Twitter fails the call. The v2 API reports problems with single
//! items of a multi-item request (a deleted tweet among a batch lookup, for example) inside an
//! otherwise successful response; those are [`PartialError`]s, and are exposed through the
//! [`PartialErrors`] trait on the response types that can carry them.
//!
//! [`Error`]: enum.Error.html
//! [`ApiError`]: struct.ApiError.html
//! [`PartialError`]: struct.PartialError.html
//! [`PartialErrors`]: trait.PartialErrors.html

use std::fmt;

use hyper::StatusCode;
use serde::{Deserialize, Serialize};

/// Convenient alias to a Result containing a local Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error returned by Twitter for a failed request, or sent as a frame on a stream.
///
/// The v2 API reports request-level errors with a small JSON object, following the "problem
/// details" layout of RFC 7807:
///
/// ```json
/// {"title": "Unauthorized", "detail": "Unauthorized", "type": "about:blank", "status": 401}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiError {
    /// A short summary of the problem.
    pub title: String,
    /// A longer description of what went wrong with this specific request.
    #[serde(default)]
    pub detail: String,
    /// A URI identifying the kind of problem.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// The HTTP status Twitter reported alongside the problem, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ApiError {
    /// Returns whether this error tells the client that Twitter is closing the connection, and
    /// that reconnecting is the expected response.
    pub fn is_disconnect(&self) -> bool {
        self.title == "operational-disconnect"
            || self.title == "ConnectionException"
            || self.kind.ends_with("/operational-disconnect")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        if !self.kind.is_empty() {
            write!(f, " ({})", self.kind)?;
        }
        Ok(())
    }
}

/// An error scoped to a single item of an otherwise successful response.
///
/// These appear in the `errors` array of a v2 response body, next to whatever `data` could be
/// loaded. Every field is optional on the wire; absent fields are left empty and are not written
/// back out when re-serialized.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PartialError {
    /// The kind of resource the error refers to, e.g. `tweet` or `user`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
    /// The field of the resource that caused the error.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
    /// The request parameter that caused the error.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parameter: String,
    /// The ID of the resource that could not be loaded.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
    /// A short summary of the problem.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// The section of the response the error belongs to, e.g. `data` or `includes`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub section: String,
    /// A longer description of the problem.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
    /// The offending value, if Twitter echoed it back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// A URI identifying the kind of problem.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// Response types that can carry per-item errors alongside their data.
pub trait PartialErrors {
    /// Returns the `errors` list of the response, if it had one.
    fn partial_errors(&self) -> Option<&[PartialError]>;

    /// Returns `true` if the response carried at least one partial error.
    ///
    /// A missing `errors` list and an empty one are both reported as `false`.
    fn has_partial_error(&self) -> bool {
        self.partial_errors().map_or(false, |errors| !errors.is_empty())
    }
}

/// Represents an error that can occur while building, sending, or reading a request.
///
/// A call that returns `MissingParameter`, `MissingCredential`, or `InvalidUrl` failed before any
/// network traffic happened.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The endpoint could not be resolved from the given parameters, usually because a required
    /// path value (like an ID) was missing or empty. The enclosed value is the endpoint template.
    #[error("Required parameter missing for endpoint {0}")]
    MissingParameter(String),
    /// A credential needed to authenticate the request was missing or empty. The enclosed value
    /// names the credential.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
    /// The response from Twitter was missing a value that was expected to be present.
    #[error("Value missing from response: {0}")]
    MissingValue(&'static str),
    /// The resolved endpoint was not a valid URL.
    #[error("Invalid URL given: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Twitter returned an error status along with a structured error body. The `status`
    /// carries both the code and its reason text.
    #[error("Twitter error ({status}): {error}")]
    TwitterError {
        /// The HTTP status of the response.
        status: StatusCode,
        /// The decoded error body.
        error: ApiError,
    },
    /// Twitter returned an error status whose body could not be decoded as an error. The raw
    /// body is kept so it can still be inspected.
    #[error("Error status received ({status}): {body}")]
    BadStatus {
        /// The HTTP status of the response.
        status: StatusCode,
        /// The response body, lossily converted to text.
        body: String,
    },
    /// An error frame was received in place of a payload on an open stream.
    #[error("Error received from stream: {0}")]
    StreamError(ApiError),
    /// The stream was stopped before it could be opened.
    #[error("Stream was stopped")]
    StreamStopped,
    /// A stream sent more than the enclosed number of bytes without a line ending. The
    /// connection is closed when this is returned.
    #[error("Stream frame exceeded {0} bytes without a line ending")]
    StreamFrameTooLarge(usize),
    /// The request could not be assembled.
    #[error("Could not build request: {0}")]
    RequestError(#[from] hyper::http::Error),
    /// A configured value could not be used as an HTTP header.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] hyper::header::InvalidHeaderValue),
    /// The web request experienced an error. The enclosed error was returned from hyper.
    #[error("Network error: {0}")]
    NetError(#[from] hyper::Error),
    /// An error was experienced while processing the response stream. The enclosed error was
    /// returned from libstd.
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    /// An error occurred while serializing a request body or loading the JSON response from
    /// Twitter. The enclosed error was returned from `serde_json`.
    #[error("JSON deserialize error: {0}")]
    DeserializeError(#[from] serde_json::Error),
}

impl Error {
    /// Returns whether this error suggests that the connection itself failed or was closed by
    /// Twitter, so that reopening the stream (after a backoff of the caller's choosing) is the
    /// right response.
    ///
    /// This covers transport errors, server-side statuses (5xx), rate-limit statuses (429), and
    /// operational-disconnect frames sent on a stream. Errors caused by the request itself, like
    /// a missing parameter or a bad credential, are not reconnect-worthy.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::NetError(_) | Error::IOError(_) => true,
            Error::TwitterError { status, .. } | Error::BadStatus { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Error::StreamError(err) => err.is_disconnect(),
            _ => false,
        }
    }

    /// Returns the HTTP status Twitter responded with, if this error came from an error
    /// response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::TwitterError { status, .. } | Error::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
