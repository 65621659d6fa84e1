// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structs and functions for working with lists.
//!
//! A list is a named, curated set of users. This module can look lists up, create and delete
//! them, and load their members and the lists a user owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::error;
use crate::params::{json_body, resolve_endpoint, Parameters};
use crate::user::UserFields;

mod fun;

pub use self::fun::*;

/// Represents a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct List {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub follower_count: Option<u64>,
    pub member_count: Option<u64>,
    pub owner_id: Option<String>,
    pub private: Option<bool>,
}

/// Result of deleting a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeletedList {
    pub deleted: bool,
}

/// Paging information returned alongside list members and owned lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub result_count: u32,
    pub next_token: Option<String>,
    pub previous_token: Option<String>,
}

/// Parameters for `show` and `delete`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListLookup {
    pub id: String,
    /// Only `owner_id` is recognized.
    pub expansions: Vec<String>,
    pub list_fields: Vec<String>,
    pub user_fields: Vec<String>,
}

impl ListLookup {
    pub fn new(id: impl Into<String>) -> Self {
        ListLookup {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Parameters for ListLookup {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        let query = ParamList::new()
            .add_joined_param("expansions", &self.expansions)
            .add_joined_param("list.fields", &self.list_fields)
            .add_joined_param("user.fields", &self.user_fields);
        resolve_endpoint(endpoint, &[("id", &self.id)], &query)
    }
}

/// A new list, to be created with `create`.
///
/// `private` is always sent; `description` only when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateList {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub private: bool,
}

impl CreateList {
    pub fn new(name: impl Into<String>) -> Self {
        CreateList {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Parameters for CreateList {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        if self.name.is_empty() {
            return None;
        }
        resolve_endpoint(endpoint, &[], &ParamList::new())
    }

    fn body(&self) -> error::Result<Option<Vec<u8>>> {
        json_body(self)
    }
}

/// Parameters for `delete`: only the list's `id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteList {
    pub id: String,
}

impl DeleteList {
    pub fn new(id: impl Into<String>) -> Self {
        DeleteList { id: id.into() }
    }
}

impl Parameters for DeleteList {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        resolve_endpoint(endpoint, &[("id", &self.id)], &ParamList::new())
    }
}

/// Parameters for `members`: the list `id`, paging, and the user fields to load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListMembers {
    pub id: String,
    /// Between 1 and 100.
    pub max_results: Option<u32>,
    pub pagination_token: Option<String>,
    pub fields: UserFields,
}

impl ListMembers {
    pub fn new(id: impl Into<String>) -> Self {
        ListMembers {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Parameters for ListMembers {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        let query = self
            .fields
            .add_to(ParamList::new())
            .add_opt_param("max_results", self.max_results.map_string())
            .add_opt_param("pagination_token", self.pagination_token.clone());
        resolve_endpoint(endpoint, &[("id", &self.id)], &query)
    }
}

/// Parameters for `owned`: the owning user's `id`, paging, and the list fields to load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnedLists {
    pub id: String,
    /// Between 1 and 100.
    pub max_results: Option<u32>,
    pub pagination_token: Option<String>,
    /// Only `owner_id` is recognized.
    pub expansions: Vec<String>,
    pub list_fields: Vec<String>,
    pub user_fields: Vec<String>,
}

impl OwnedLists {
    pub fn new(id: impl Into<String>) -> Self {
        OwnedLists {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Parameters for OwnedLists {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        let query = ParamList::new()
            .add_joined_param("expansions", &self.expansions)
            .add_joined_param("list.fields", &self.list_fields)
            .add_joined_param("user.fields", &self.user_fields)
            .add_opt_param("max_results", self.max_results.map_string())
            .add_opt_param("pagination_token", self.pagination_token.clone());
        resolve_endpoint(endpoint, &[("id", &self.id)], &query)
    }
}
