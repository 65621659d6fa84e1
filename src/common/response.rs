// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Infrastructure types related to packaging rate-limit information alongside responses from
//! Twitter, and the functions every web call goes through.

use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::{Body, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::Headers;
use crate::error::{self, ApiError, Error, PartialError, PartialErrors};

#[cfg(feature = "native_tls")]
type Connector = hyper_tls::HttpsConnector<HttpConnector>;

#[cfg(all(not(feature = "native_tls"), any(feature = "rustls", feature = "rustls_webpki")))]
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

#[cfg(not(any(feature = "native_tls", feature = "rustls", feature = "rustls_webpki")))]
compile_error!("one of the `native_tls`, `rustls`, or `rustls_webpki` features must be enabled");

// n.b. this type alias is re-exported in the `raw` module - these docs are public!
/// The hyper client every request is sent through, with the TLS connector selected by the
/// crate's features.
pub type HttpClient = hyper::Client<Connector, Body>;

pub(crate) fn new_http_client() -> HttpClient {
    #[cfg(feature = "native_tls")]
    let connector = hyper_tls::HttpsConnector::new();
    #[cfg(all(feature = "rustls", not(feature = "native_tls")))]
    let connector = hyper_rustls::HttpsConnector::with_native_roots();
    #[cfg(all(
        feature = "rustls_webpki",
        not(any(feature = "native_tls", feature = "rustls"))
    ))]
    let connector = hyper_rustls::HttpsConnector::with_webpki_roots();

    hyper::Client::builder().build(connector)
}

const X_RATE_LIMIT_LIMIT: &str = "x-rate-limit-limit";
const X_RATE_LIMIT_REMAINING: &str = "x-rate-limit-remaining";
const X_RATE_LIMIT_RESET: &str = "x-rate-limit-reset";

/// Rate-limit information returned with a response.
///
/// Twitter sends these headers on most calls; any that are missing are set to `-1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimit {
    /// The rate limit ceiling for the given request.
    pub limit: i32,
    /// The number of requests left for the 15-minute window.
    pub remaining: i32,
    /// The UTC Unix timestamp at which the rate window resets.
    pub reset: i32,
}

impl From<&Headers> for RateLimit {
    fn from(headers: &Headers) -> Self {
        fn read(headers: &Headers, name: &str) -> i32 {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(-1)
        }

        RateLimit {
            limit: read(headers, X_RATE_LIMIT_LIMIT),
            remaining: read(headers, X_RATE_LIMIT_REMAINING),
            reset: read(headers, X_RATE_LIMIT_RESET),
        }
    }
}

/// A helper struct to wrap response data with accompanying rate limit information.
///
/// This is returned by every function that calls a REST endpoint. It derefs to the decoded
/// response, so in most cases the rate-limit information can be ignored.
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The rate limit information returned with this response.
    pub rate_limit_status: RateLimit,
    /// The decoded response from the request.
    pub response: T,
}

impl<T> Response<T> {
    /// Convert a `Response<T>` to a `Response<U>` by running its contained response through the
    /// given function. This preserves its rate-limit information.
    pub fn map<F, U>(src: Response<T>, fun: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            rate_limit_status: src.rate_limit_status,
            response: fun(src.response),
        }
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.response
    }
}

impl<T> std::ops::DerefMut for Response<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.response
    }
}

/// The envelope every v2 endpoint wraps its result in.
///
/// `data` holds the primary object (or list of objects), `includes` holds any objects pulled in
/// through `expansions`, and `meta` holds paging or summary information. Any items that could not
/// be loaded are described in `errors`, which does not make the call fail; check
/// [`has_partial_error`](../error/trait.PartialErrors.html#method.has_partial_error) to see
/// whether everything requested came back.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiResponse<D, M = serde_json::Value> {
    /// The requested object or objects, if any could be loaded.
    pub data: Option<D>,
    /// Objects referenced by `data` and requested through `expansions`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub includes: Option<serde_json::Value>,
    /// Paging or summary information about the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<M>,
    /// Errors for items that could not be loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<PartialError>>,
}

impl<D, M> PartialErrors for ApiResponse<D, M> {
    fn partial_errors(&self) -> Option<&[PartialError]> {
        self.errors.as_deref()
    }
}

/// Converts an error response from Twitter into an `Error`.
///
/// If the body decodes as Twitter's error shape, a `TwitterError` is returned; otherwise the raw
/// body is returned in a `BadStatus` so no information is lost.
pub(crate) fn error_from_body(status: StatusCode, body: &[u8]) -> Error {
    match serde_json::from_slice::<ApiError>(body) {
        Ok(error) => Error::TwitterError { status, error },
        Err(err) => {
            tracing::warn!(%status, %err, "could not decode error response");
            Error::BadStatus {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            }
        }
    }
}

// n.b. this function is re-exported in the `raw` module - these docs are public!
/// Sends the given request and waits for the response headers.
///
/// If Twitter returns an error status, the body is read and converted into an error; otherwise
/// the response is returned with its body untouched, so it can be read incrementally.
pub async fn get_response(
    http: &HttpClient,
    request: Request<Body>,
) -> error::Result<hyper::Response<Body>> {
    tracing::debug!(method = %request.method(), uri = %request.uri(), "sending request");
    let resp = http.request(request).await?;
    let status = resp.status();

    if status.is_success() {
        Ok(resp)
    } else {
        let body = hyper::body::to_bytes(resp.into_body()).await?;
        Err(error_from_body(status, &body))
    }
}

// n.b. this function is re-exported in the `raw` module - these docs are public!
/// Sends the given request and loads the full response body, returning it with the response
/// headers.
pub async fn raw_request(http: &HttpClient, request: Request<Body>) -> error::Result<(Headers, Bytes)> {
    let resp = get_response(http, request).await?;
    let (parts, body) = resp.into_parts();
    let body = hyper::body::to_bytes(body).await?;
    tracing::debug!(status = %parts.status, bytes = body.len(), "received response");

    Ok((parts.headers, body))
}

// n.b. this function is re-exported in the `raw` module - these docs are public!
/// Sends the given request and deserializes the JSON response into the target type, alongside
/// the rate-limit information from the response headers.
pub async fn request_with_json_response<T: DeserializeOwned>(
    http: &HttpClient,
    request: Request<Body>,
) -> error::Result<Response<T>> {
    let (headers, body) = raw_request(http, request).await?;
    let response = serde_json::from_slice(&body)?;

    Ok(Response {
        rate_limit_status: RateLimit::from(&headers),
        response,
    })
}
