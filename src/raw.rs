// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Raw access to request- and response-building primitives used internally by egg-mode-v2.
//!
//! The functions and types exposed in this module allow you to access Twitter API functions that
//! aren't currently wrapped by this crate, or to provide parameters that this crate doesn't
//! currently use. In return, much more knowledge of the Twitter API is required to effectively
//! use them.
//!
//! The functions in this module can be divided into two categories: assembling a request, and
//! executing it to get a response.
//!
//! Requests can be assembled with `Client::build_request`, which resolves the endpoint template
//! and authorizes the request with the client's token, or by hand with `RequestBuilder`, which
//! takes the URL and the token directly. Query strings can be built with `ParamList` and
//! `resolve_endpoint`.
//!
//! Once you have a `Request`, you can hand it to the `response_*` functions in this module to
//! process it. Which one you select depends on how much processing you want done with the
//! response.
//!
//! * At the most hands-off end, there's `response_future`, which sends the request and hands
//!   back the `hyper::Response` once its status has been checked, so you can read the body
//!   yourself.
//! * In the middle, there's `response_raw_bytes`, which reads the whole body and returns it
//!   alongside the response headers.
//! * Then there's `response_json`, which picks up from `response_raw_bytes` to parse the
//!   response as JSON and deserialize it into the target type, alongside the rate-limit
//!   information from the response headers.
//! * Finally, `response_as_stream` treats the body as a stream of newline-separated JSON
//!   objects.

use hyper::{Body, Response};
use serde::de::DeserializeOwned;

use crate::stream::{StopHandle, TwitterStream};

pub use crate::auth::raw::RequestBuilder;
pub use crate::common::{HttpClient, Headers, ParamList};
pub use crate::params::{json_body, resolve_endpoint};

pub use crate::common::get_response as response_future;
pub use crate::common::raw_request as response_raw_bytes;
pub use crate::common::request_with_json_response as response_json;

/// Reads the body of the given response as a stream of newline-separated JSON objects.
///
/// The response should come from `response_future`, so that an error status has already been
/// turned into an error.
pub fn response_as_stream<T: DeserializeOwned>(response: Response<Body>) -> TwitterStream<T> {
    TwitterStream::from_body(response.into_body(), StopHandle::new())
}
