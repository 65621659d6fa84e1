// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Endpoint templates for every call this crate wraps.
//!
//! Templates are relative to `ClientConfig::api_url`; `:name` segments are filled in from the
//! call's parameters.

pub const API_BASE: &str = "https://api.twitter.com";

pub mod auth {
    pub const BEARER_TOKEN: &str = "https://api.twitter.com/oauth2/token";
}

pub mod tweets {
    pub const LOOKUP: &str = "/2/tweets";
    pub const SHOW: &str = "/2/tweets/:id";
    pub const CREATE: &str = "/2/tweets";
    pub const DELETE: &str = "/2/tweets/:id";
    pub const USER_TIMELINE: &str = "/2/users/:id/tweets";
    pub const USER_MENTIONS: &str = "/2/users/:id/mentions";
}

pub mod users {
    pub const LOOKUP: &str = "/2/users";
    pub const SHOW: &str = "/2/users/:id";
    pub const SHOW_BY_USERNAME: &str = "/2/users/by/username/:username";
    pub const ME: &str = "/2/users/me";
}

pub mod lists {
    pub const SHOW: &str = "/2/lists/:id";
    pub const CREATE: &str = "/2/lists";
    pub const DELETE: &str = "/2/lists/:id";
    pub const MEMBERS: &str = "/2/lists/:id/members";
    pub const OWNED: &str = "/2/users/:id/owned_lists";
}

pub mod stream {
    pub const SAMPLE: &str = "/2/tweets/sample/stream";
    pub const SEARCH: &str = "/2/tweets/search/stream";
    pub const RULES: &str = "/2/tweets/search/stream/rules";
}
