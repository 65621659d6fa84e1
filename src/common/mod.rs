// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Set of structs and methods that act as a sort of internal prelude.
//!
//! The elements available in this module and its children are fairly basic building blocks that
//! the other modules all glob-import to make available as a common language. A lot of
//! infrastructure code goes in here.
//!
//! # Module contents
//!
//! ## Type Aliases
//!
//! * `hyper::header::HeaderMap<hyper::header::HeaderValue>` (re-exported as the alias `Headers`)
//! * `Cow<'static, str>` (re-exported as the alias `CowStr`)
//!
//! ## `ParamList`
//!
//! `ParamList` is the collection of query parameters for a given web call. It's ordered by key,
//! so the query string it renders (and the OAuth signature computed over it) always lists its
//! parameters alphabetically. Its builder methods take care of the presence rules every endpoint
//! shares: `add_opt_param` skips `None`, and `add_joined_param` comma-joins multi-valued fields
//! like `tweet.fields` and skips them entirely when they're empty.
//!
//! ## `percent_encode`
//!
//! The one encoder used for query strings, path segments, and OAuth signatures.
//!
//! ## `Response`
//!
//! In its own module, `Response` is the public structure that contains rate-limit information
//! from Twitter alongside the decoded response. The module also contains the functions that all
//! web calls go through: `raw_request` loads a web call and checks its status, and
//! `request_with_json_response` decodes its body into the desired type.

use std::borrow::Cow;
use std::collections::BTreeMap;

use hyper::header::{HeaderMap, HeaderValue};
use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode};

mod response;

pub use crate::common::response::*;

// n.b. this type alias is re-exported in the `raw` module - these docs are public!
/// A set of headers returned with a response.
pub type Headers = HeaderMap<HeaderValue>;
pub type CowStr = Cow<'static, str>;

// n.b. this type is re-exported in the `raw` module - these docs are public!
/// Represents a list of query parameters to a Twitter API call.
///
/// This type is a wrapper around a `BTreeMap<Cow<'static, str>, Cow<'static, str>>` to collect a
/// set of parameter key/value pairs. Since the map is ordered, the rendered query string always
/// lists its keys alphabetically, which keeps request URLs (and OAuth signatures) deterministic.
/// The `Cow` type is used to avoid having to allocate a `String` if a string literal is used for
/// a parameter.
///
/// Most of the functions to add parameters follow a builder pattern, so that you can assemble a
/// `ParamList` in a single statement:
///
/// ```
/// use egg_mode_v2::raw::ParamList;
///
/// let params = ParamList::new()
///     .add_param("max_results", "10")
///     .add_joined_param("expansions", &["author_id".to_string()]);
///
/// assert_eq!(params.to_urlencoded(), "expansions=author_id&max_results=10");
/// ```
#[derive(Debug, Clone, Default, PartialEq, derive_more::Deref, derive_more::DerefMut, derive_more::From)]
pub struct ParamList(BTreeMap<CowStr, CowStr>);

impl ParamList {
    /// Creates a new, empty `ParamList`.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds the given key/value parameter to this `ParamList`.
    pub fn add_param(mut self, key: impl Into<CowStr>, value: impl Into<CowStr>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Adds the given key/value parameter to this `ParamList` only if the given value is `Some`.
    ///
    /// Optional fields use this so that an unset field never reaches the query string, while an
    /// explicitly set zero still does.
    pub fn add_opt_param(self, key: impl Into<CowStr>, value: Option<impl Into<CowStr>>) -> Self {
        match value {
            Some(val) => self.add_param(key, val),
            None => self,
        }
    }

    /// Adds the given values as a single comma-separated parameter, or leaves the `ParamList`
    /// unmodified if there are no values.
    pub fn add_joined_param<S: AsRef<str>>(self, key: impl Into<CowStr>, values: &[S]) -> Self {
        if values.is_empty() {
            return self;
        }

        let joined = values.iter().map(|v| v.as_ref()).collect::<Vec<_>>().join(",");
        self.add_param(key, joined)
    }

    /// Renders this `ParamList` as an `application/x-www-form-urlencoded` string.
    ///
    /// The key/value pairs are printed as `key1=value1&key2=value2`, in key order, with all keys
    /// and values being percent-encoded according to Twitter's requirements.
    pub fn to_urlencoded(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// Helper trait to stringify the contents of an Option
pub(crate) trait MapString {
    fn map_string(&self) -> Option<String>;
}

impl<T: std::fmt::Display> MapString for Option<T> {
    fn map_string(&self) -> Option<String> {
        self.as_ref().map(|v| v.to_string())
    }
}

/// Percent-encodes the given string based on the Twitter API specification.
///
/// Twitter bases its encoding scheme on RFC 3986, Section 2.1. They describe the process in full
/// [in their documentation][twitter-percent], but the process can be summarized by saying that
/// every *byte* that is not an ASCII number or letter, or the ASCII characters `-`, `.`, `_`, or
/// `~` must be replaced with a percent sign (`%`) and the byte value in hexadecimal.
///
/// [twitter-percent]: https://developer.twitter.com/en/docs/basics/authentication/oauth-1-0a/percent-encoding-parameters
pub fn percent_encode(src: &str) -> PercentEncode {
    lazy_static::lazy_static! {
        static ref ENCODER: AsciiSet = percent_encoding::NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');
    }
    utf8_percent_encode(src, &*ENCODER)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Read;

    pub(crate) fn load_file(path: &str) -> String {
        let mut file = File::open(path).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn encode_reserved_characters() {
        assert_eq!(percent_encode("Ladies + Gentlemen").to_string(), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("An encoded string!").to_string(), "An%20encoded%20string%21");
        assert_eq!(percent_encode("Dogs, Cats & Mice").to_string(), "Dogs%2C%20Cats%20%26%20Mice");
        assert_eq!(percent_encode("☃").to_string(), "%E2%98%83");
        assert_eq!(percent_encode("tweet.fields-_~").to_string(), "tweet.fields-_~");
    }

    #[test]
    fn params_render_in_key_order() {
        let params = ParamList::new()
            .add_param("user.fields", "created_at")
            .add_param("max_results", "5")
            .add_param("expansions", "pinned_tweet_id");

        assert_eq!(
            params.to_urlencoded(),
            "expansions=pinned_tweet_id&max_results=5&user.fields=created_at"
        );
    }

    #[test]
    fn optional_and_joined_params() {
        let empty: Vec<String> = Vec::new();
        let params = ParamList::new()
            .add_opt_param("pagination_token", None::<String>)
            .add_opt_param("max_results", Some(0).map_string())
            .add_joined_param("ids", &["1", "2", "3"])
            .add_joined_param("tweet.fields", &empty);

        assert_eq!(params.len(), 2);
        assert_eq!(params.to_urlencoded(), "ids=1%2C2%2C3&max_results=0");
    }
}
