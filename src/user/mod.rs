// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structs and functions for looking up users.
//!
//! Users can be loaded by ID (`show`, `lookup`), by username (`show_by_username`), or as whoever
//! the client is authorized as (`me`, which needs user-context authorization).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::common::*;
use crate::params::{resolve_endpoint, Parameters};

mod fun;

pub use self::fun::*;

/// Represents a Twitter user.
///
/// As with tweets, only `id`, `name`, and `username` are always present; the rest depend on the
/// `user.fields` you asked for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    /// The name the user has chosen to display.
    pub name: String,
    /// The handle, without the leading `@`.
    pub username: String,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub pinned_tweet_id: Option<String>,
    pub profile_image_url: Option<String>,
    pub protected: Option<bool>,
    pub public_metrics: Option<UserMetrics>,
    pub url: Option<String>,
    pub verified: Option<bool>,
}

/// Follower and tweet counts for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UserMetrics {
    pub followers_count: u64,
    pub following_count: u64,
    pub tweet_count: u64,
    pub listed_count: u64,
}

/// The `expansions` and `*.fields` options accepted by every call that returns users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields {
    /// Only `pinned_tweet_id` is recognized.
    pub expansions: Vec<String>,
    pub tweet_fields: Vec<String>,
    pub user_fields: Vec<String>,
}

impl UserFields {
    pub(crate) fn add_to(&self, params: ParamList) -> ParamList {
        params
            .add_joined_param("expansions", &self.expansions)
            .add_joined_param("tweet.fields", &self.tweet_fields)
            .add_joined_param("user.fields", &self.user_fields)
    }
}

/// Parameters for `show`, and for `me` when `id` is left empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserLookup {
    pub id: String,
    pub fields: UserFields,
}

impl UserLookup {
    pub fn new(id: impl Into<String>) -> Self {
        UserLookup {
            id: id.into(),
            fields: UserFields::default(),
        }
    }
}

impl Parameters for UserLookup {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        resolve_endpoint(endpoint, &[("id", &self.id)], &self.fields.add_to(ParamList::new()))
    }
}

/// Parameters for `lookup`: up to 100 users by ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsersLookup {
    pub ids: Vec<String>,
    pub fields: UserFields,
}

impl Parameters for UsersLookup {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        if self.ids.is_empty() {
            return None;
        }

        let query = self.fields.add_to(ParamList::new()).add_joined_param("ids", &self.ids);
        resolve_endpoint(endpoint, &[], &query)
    }
}

/// Parameters for `show_by_username`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserByUsername {
    /// The handle to look up, without the leading `@`.
    pub username: String,
    pub fields: UserFields,
}

impl UserByUsername {
    pub fn new(username: impl Into<String>) -> Self {
        UserByUsername {
            username: username.into(),
            fields: UserFields::default(),
        }
    }
}

impl Parameters for UserByUsername {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        let username = self.username.trim_start_matches('@');
        resolve_endpoint(endpoint, &[("username", username)], &self.fields.add_to(ParamList::new()))
    }
}
