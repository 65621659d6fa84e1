// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use hyper::Method;
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::error::{self, PartialError, PartialErrors};
use crate::links;
use crate::params::{json_body, resolve_endpoint, Parameters};
use crate::tweet::{Tweet, TweetFields};
use crate::Client;

use super::{StopHandle, TwitterStream};

/// A single tweet delivered over a stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamedTweet {
    pub data: Tweet,
    pub includes: Option<serde_json::Value>,
    /// For the filtered stream, the rules this tweet matched.
    #[serde(default)]
    pub matching_rules: Vec<MatchingRule>,
    pub errors: Option<Vec<PartialError>>,
}

impl PartialErrors for StreamedTweet {
    fn partial_errors(&self) -> Option<&[PartialError]> {
        self.errors.as_deref()
    }
}

/// Identifies a filtered-stream rule a tweet matched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchingRule {
    pub id: String,
    pub tag: Option<String>,
}

/// Parameters for `sample` and `search`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamParams {
    /// Minutes of tweets to replay after a reconnect, up to 5. Needs elevated access.
    pub backfill_minutes: Option<u32>,
    pub fields: TweetFields,
}

/// Parameters for the 1% sample stream.
pub type SampleStream = StreamParams;
/// Parameters for the filtered stream.
pub type SearchStream = StreamParams;

impl Parameters for StreamParams {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        let query = self
            .fields
            .add_to(ParamList::new())
            .add_opt_param("backfill_minutes", self.backfill_minutes.map_string());
        resolve_endpoint(endpoint, &[], &query)
    }
}

/// Open the sample stream: roughly 1% of all public tweets, as they're posted.
pub async fn sample(client: &Client, params: &SampleStream) -> error::Result<TwitterStream<StreamedTweet>> {
    client.call_stream(Method::GET, links::stream::SAMPLE, params).await
}

/// Open the filtered stream, delivering tweets that match the client's rules.
///
/// Rules are managed with `rules` and `update_rules`. The stream can be stopped with the given
/// handle, including while it's still connecting.
pub async fn search(
    client: &Client,
    params: &SearchStream,
    stop: StopHandle,
) -> error::Result<TwitterStream<StreamedTweet>> {
    client
        .call_stream_with_stop(Method::GET, links::stream::SEARCH, params, stop)
        .await
}

/// A rule for the filtered stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Assigned by Twitter; leave empty when adding a rule.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Rule {
    pub fn new(value: impl Into<String>) -> Self {
        Rule {
            id: String::new(),
            value: value.into(),
            tag: None,
        }
    }

    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        Rule {
            tag: Some(tag.into()),
            ..self
        }
    }
}

/// Metadata returned by the rule endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RulesMeta {
    pub sent: Option<String>,
    pub result_count: Option<u32>,
    pub summary: Option<serde_json::Value>,
}

/// Parameters for `rules`: the IDs of the rules to load, or none to load all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleLookup {
    pub ids: Vec<String>,
}

impl Parameters for RuleLookup {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        resolve_endpoint(endpoint, &[], &ParamList::new().add_joined_param("ids", &self.ids))
    }
}

/// A change to the filtered stream's rules: either rules to add, or IDs of rules to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleUpdate {
    Add(Vec<Rule>),
    Delete(Vec<String>),
}

/// Parameters for `update_rules`.
///
/// With `dry_run` set, Twitter validates the change without applying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRules {
    pub update: RuleUpdate,
    pub dry_run: bool,
}

impl UpdateRules {
    pub fn add(rules: Vec<Rule>) -> Self {
        UpdateRules {
            update: RuleUpdate::Add(rules),
            dry_run: false,
        }
    }

    pub fn delete(ids: Vec<String>) -> Self {
        UpdateRules {
            update: RuleUpdate::Delete(ids),
            dry_run: false,
        }
    }

    pub fn dry_run(self) -> Self {
        UpdateRules { dry_run: true, ..self }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum RuleUpdateBody<'a> {
    Add(&'a [Rule]),
    Delete { ids: &'a [String] },
}

impl Parameters for UpdateRules {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        let empty = match &self.update {
            RuleUpdate::Add(rules) => rules.is_empty(),
            RuleUpdate::Delete(ids) => ids.is_empty(),
        };
        if empty {
            return None;
        }

        let query = ParamList::new().add_opt_param("dry_run", if self.dry_run { Some("true") } else { None });
        resolve_endpoint(endpoint, &[], &query)
    }

    fn body(&self) -> error::Result<Option<Vec<u8>>> {
        match &self.update {
            RuleUpdate::Add(rules) => json_body(&RuleUpdateBody::Add(rules)),
            RuleUpdate::Delete(ids) => json_body(&RuleUpdateBody::Delete { ids }),
        }
    }
}

/// Load the filtered stream's rules.
pub async fn rules(client: &Client, params: &RuleLookup) -> error::Result<Response<ApiResponse<Vec<Rule>, RulesMeta>>> {
    client.call(Method::GET, links::stream::RULES, params).await
}

/// Add or delete filtered stream rules.
///
/// Rules Twitter refused are reported in the response's `errors`.
pub async fn update_rules(
    client: &Client,
    params: &UpdateRules,
) -> error::Result<Response<ApiResponse<Vec<Rule>, RulesMeta>>> {
    client.call(Method::POST, links::stream::RULES, params).await
}
