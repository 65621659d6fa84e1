// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The contract between a set of request parameters and the code that builds requests from them.
//!
//! Every API call in this crate takes its inputs as a struct implementing [`Parameters`]. The
//! struct decides what varies per endpoint: which path segments it fills in, which query
//! parameters it recognizes, and whether it sends a JSON body. The [`Client`] decides everything
//! else: the base URL, the authorization, and how the request is sent.
//!
//! Most implementations are a few lines long, and lean on [`resolve_endpoint`] and [`json_body`]:
//!
//! ```
//! use egg_mode_v2::params::{resolve_endpoint, Parameters};
//! use egg_mode_v2::raw::ParamList;
//!
//! struct ListMembers {
//!     id: String,
//!     max_results: Option<u32>,
//! }
//!
//! impl Parameters for ListMembers {
//!     fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
//!         let query = ParamList::new()
//!             .add_opt_param("max_results", self.max_results.map(|n| n.to_string()));
//!         resolve_endpoint(endpoint, &[("id", &self.id)], &query)
//!     }
//! }
//!
//! let params = ListMembers { id: "84839422".to_string(), max_results: Some(5) };
//! assert_eq!(
//!     params.resolve_endpoint("https://api.twitter.com/2/lists/:id/members").as_deref(),
//!     Some("https://api.twitter.com/2/lists/84839422/members?max_results=5"),
//! );
//!
//! let missing = ListMembers { id: String::new(), max_results: None };
//! assert_eq!(missing.resolve_endpoint("https://api.twitter.com/2/lists/:id/members"), None);
//! ```
//!
//! [`Parameters`]: trait.Parameters.html
//! [`Client`]: ../struct.Client.html
//! [`resolve_endpoint`]: fn.resolve_endpoint.html
//! [`json_body`]: fn.json_body.html

use serde::Serialize;

use crate::common::*;
use crate::error;

/// The inputs of one API operation.
///
/// The credential used to authorize the request is not part of this trait: the [`Client`] passes
/// it to the request builder directly, so one parameter value can be reused across calls, clients,
/// and threads.
///
/// [`Client`]: ../struct.Client.html
pub trait Parameters {
    /// Resolves the given endpoint template into the URL to call.
    ///
    /// Placeholder segments like `:id` are replaced with values from these parameters, and the
    /// query parameters this operation recognizes are appended in alphabetical order. Returns
    /// `None` if a required path value is missing or empty; the request is never sent in that
    /// case.
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String>;

    /// Returns the JSON body to send with the request, if this operation has one.
    fn body(&self) -> error::Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

impl<P: Parameters + ?Sized> Parameters for &P {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        (**self).resolve_endpoint(endpoint)
    }

    fn body(&self) -> error::Result<Option<Vec<u8>>> {
        (**self).body()
    }
}

/// Parameters for endpoints that take no input at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParams;

impl Parameters for NoParams {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        resolve_endpoint(endpoint, &[], &ParamList::new())
    }
}

/// Fills in the given endpoint template and appends the given query parameters.
///
/// Every segment of `template` that starts with a colon (like `:id` in `/2/tweets/:id`) is
/// replaced with the percent-encoded value paired with that name in `path`. If a placeholder has
/// no value, or its value is empty, this returns `None`. Only whole path segments are
/// placeholders, so the scheme and port of a full URL are left alone.
pub fn resolve_endpoint(template: &str, path: &[(&str, &str)], query: &ParamList) -> Option<String> {
    let mut segments = Vec::new();
    for segment in template.split('/') {
        match segment.strip_prefix(':') {
            Some(name) => {
                let value = path
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .filter(|value| !value.is_empty())?;
                segments.push(percent_encode(value).to_string());
            }
            None => segments.push(segment.to_string()),
        }
    }

    let mut url = segments.join("/");
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.to_urlencoded());
    }

    Some(url)
}

/// Serializes the given value as a request body.
pub fn json_body<T: Serialize + ?Sized>(body: &T) -> error::Result<Option<Vec<u8>>> {
    Ok(Some(serde_json::to_vec(body)?))
}
