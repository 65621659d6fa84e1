// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structs and functions for working with tweets and timelines.
//!
//! In this module, you can find the types Twitter's v2 API uses for tweets, the parameter structs
//! for the tweet endpoints, and the functions that call them. Streams of tweets live in the
//! [`stream`][] module instead.
//!
//! [`stream`]: ../stream/index.html
//!
//! ## Types
//!
//! - `Tweet`: a single tweet, as returned in the `data` of a v2 response. Only `id` and `text`
//!   are always present; everything else depends on the `tweet.fields` you asked for.
//! - `TweetFields`: the `expansions` and `*.fields` options every tweet-returning call accepts.
//! - `CreateTweet`: what you use to post a new tweet.
//!
//! ## Functions
//!
//! - `show`/`lookup`
//! - `create`/`delete`
//! - `user_timeline`/`mentions`

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::error;
use crate::params::{json_body, resolve_endpoint, Parameters};

mod fun;

pub use self::fun::*;

/// Represents a single tweet.
///
/// Twitter only sends the fields requested through `tweet.fields`, so everything past `id` and
/// `text` is optional here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tweet {
    /// Numeric ID of this tweet, as a string.
    pub id: String,
    /// The text of the tweet.
    pub text: String,
    /// ID of the user who posted this tweet.
    pub author_id: Option<String>,
    /// ID of the tweet that started the conversation this tweet belongs to.
    pub conversation_id: Option<String>,
    /// UTC timestamp from when the tweet was posted.
    pub created_at: Option<DateTime<Utc>>,
    /// If this tweet is a reply, the ID of the user being replied to.
    pub in_reply_to_user_id: Option<String>,
    /// The language Twitter detected in the text, as a BCP 47 code.
    pub lang: Option<String>,
    /// Whether the tweet's links might lead to sensitive content.
    pub possibly_sensitive: Option<bool>,
    /// Engagement counts for this tweet.
    pub public_metrics: Option<TweetMetrics>,
    /// The tweets this one quotes, retweets, or replies to.
    #[serde(default)]
    pub referenced_tweets: Vec<ReferencedTweet>,
    /// The app that posted this tweet.
    pub source: Option<String>,
}

/// Engagement counts for a tweet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TweetMetrics {
    pub retweet_count: u64,
    pub reply_count: u64,
    pub like_count: u64,
    pub quote_count: u64,
}

/// A link from one tweet to another.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferencedTweet {
    /// One of `retweeted`, `quoted`, or `replied_to`.
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// Result of deleting a tweet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeletedTweet {
    pub deleted: bool,
}

/// Paging information returned alongside a timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TimelineMeta {
    #[serde(default)]
    pub result_count: u32,
    pub newest_id: Option<String>,
    pub oldest_id: Option<String>,
    /// Pass this as `pagination_token` to load the next page.
    pub next_token: Option<String>,
    pub previous_token: Option<String>,
}

/// The `expansions` and `*.fields` options accepted by every call that returns tweets.
///
/// Empty lists are left out of the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TweetFields {
    pub expansions: Vec<String>,
    pub media_fields: Vec<String>,
    pub place_fields: Vec<String>,
    pub poll_fields: Vec<String>,
    pub tweet_fields: Vec<String>,
    pub user_fields: Vec<String>,
}

impl TweetFields {
    pub(crate) fn add_to(&self, params: ParamList) -> ParamList {
        params
            .add_joined_param("expansions", &self.expansions)
            .add_joined_param("media.fields", &self.media_fields)
            .add_joined_param("place.fields", &self.place_fields)
            .add_joined_param("poll.fields", &self.poll_fields)
            .add_joined_param("tweet.fields", &self.tweet_fields)
            .add_joined_param("user.fields", &self.user_fields)
    }
}

/// Parameters for `show`: a single tweet by ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TweetLookup {
    pub id: String,
    pub fields: TweetFields,
}

impl TweetLookup {
    pub fn new(id: impl Into<String>) -> Self {
        TweetLookup {
            id: id.into(),
            fields: TweetFields::default(),
        }
    }
}

impl Parameters for TweetLookup {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        resolve_endpoint(endpoint, &[("id", &self.id)], &self.fields.add_to(ParamList::new()))
    }
}

/// Parameters for `lookup`: up to 100 tweets by ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TweetsLookup {
    pub ids: Vec<String>,
    pub fields: TweetFields,
}

impl Parameters for TweetsLookup {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        if self.ids.is_empty() {
            return None;
        }

        let query = self.fields.add_to(ParamList::new()).add_joined_param("ids", &self.ids);
        resolve_endpoint(endpoint, &[], &query)
    }
}

/// A new tweet, to be posted with `create`.
///
/// ```
/// use egg_mode_v2::tweet::CreateTweet;
///
/// let draft = CreateTweet::new("hello").in_reply_to("1228393702244134912");
/// assert_eq!(draft.reply.unwrap().in_reply_to_tweet_id, "1228393702244134912");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateTweet {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_tweet_id: Option<String>,
}

/// Marks a new tweet as a reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reply {
    pub in_reply_to_tweet_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_reply_user_ids: Vec<String>,
}

impl CreateTweet {
    pub fn new(text: impl Into<String>) -> Self {
        CreateTweet {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Marks this tweet as a reply to the given tweet.
    pub fn in_reply_to(self, id: impl Into<String>) -> Self {
        CreateTweet {
            reply: Some(Reply {
                in_reply_to_tweet_id: id.into(),
                exclude_reply_user_ids: Vec::new(),
            }),
            ..self
        }
    }

    /// Quotes the given tweet.
    pub fn quoting(self, id: impl Into<String>) -> Self {
        CreateTweet {
            quote_tweet_id: Some(id.into()),
            ..self
        }
    }
}

impl Parameters for CreateTweet {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        resolve_endpoint(endpoint, &[], &ParamList::new())
    }

    fn body(&self) -> error::Result<Option<Vec<u8>>> {
        json_body(self)
    }
}

/// Parameters for `delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteTweet {
    pub id: String,
}

impl Parameters for DeleteTweet {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        resolve_endpoint(endpoint, &[("id", &self.id)], &ParamList::new())
    }
}

/// Parameters for `user_timeline`.
///
/// `id` is the user whose timeline to load. Every other field is optional, and left out of the
/// request when unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTimeline {
    pub id: String,
    /// Between 5 and 100; Twitter defaults to 10.
    pub max_results: Option<u32>,
    pub pagination_token: Option<String>,
    pub since_id: Option<String>,
    pub until_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Kinds of tweets to leave out: `retweets`, `replies`, or both.
    pub exclude: Vec<String>,
    pub fields: TweetFields,
}

impl UserTimeline {
    pub fn new(id: impl Into<String>) -> Self {
        UserTimeline {
            id: id.into(),
            ..Default::default()
        }
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Parameters for UserTimeline {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        let query = self
            .fields
            .add_to(ParamList::new())
            .add_opt_param("max_results", self.max_results.map_string())
            .add_opt_param("pagination_token", self.pagination_token.clone())
            .add_opt_param("since_id", self.since_id.clone())
            .add_opt_param("until_id", self.until_id.clone())
            .add_opt_param("start_time", self.start_time.as_ref().map(format_time))
            .add_opt_param("end_time", self.end_time.as_ref().map(format_time))
            .add_joined_param("exclude", &self.exclude);

        resolve_endpoint(endpoint, &[("id", &self.id)], &query)
    }
}

/// Parameters for `mentions`.
///
/// Same as `UserTimeline`, without `exclude`: the mentions timeline doesn't filter by tweet kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserMentions {
    pub id: String,
    /// Between 5 and 100; Twitter defaults to 10.
    pub max_results: Option<u32>,
    pub pagination_token: Option<String>,
    pub since_id: Option<String>,
    pub until_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub fields: TweetFields,
}

impl UserMentions {
    pub fn new(id: impl Into<String>) -> Self {
        UserMentions {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Parameters for UserMentions {
    fn resolve_endpoint(&self, endpoint: &str) -> Option<String> {
        let query = self
            .fields
            .add_to(ParamList::new())
            .add_opt_param("max_results", self.max_results.map_string())
            .add_opt_param("pagination_token", self.pagination_token.clone())
            .add_opt_param("since_id", self.since_id.clone())
            .add_opt_param("until_id", self.until_id.clone())
            .add_opt_param("start_time", self.start_time.as_ref().map(format_time))
            .add_opt_param("end_time", self.end_time.as_ref().map(format_time));

        resolve_endpoint(endpoint, &[("id", &self.id)], &query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::load_file;
    use chrono::{Datelike, TimeZone, Timelike};

    const BASE: &str = "https://api.twitter.com";

    #[test]
    fn parse_tweet() {
        let content = load_file("sample_payloads/tweet.json");
        let resp: ApiResponse<Tweet> = serde_json::from_str(&content).unwrap();
        let tweet = resp.data.unwrap();

        assert_eq!(tweet.id, "1228393702244134912");
        assert!(tweet.text.starts_with("What did the developer"));
        assert_eq!(tweet.author_id.as_deref(), Some("2244994945"));

        let created_at = tweet.created_at.unwrap();
        assert_eq!(created_at.year(), 2020);
        assert_eq!(created_at.month(), 2);
        assert_eq!(created_at.hour(), 18);

        let metrics = tweet.public_metrics.unwrap();
        assert_eq!(metrics.like_count, 129);
        assert_eq!(tweet.referenced_tweets.len(), 1);
        assert_eq!(tweet.referenced_tweets[0].kind, "quoted");
        assert!(resp.includes.is_some());
    }

    #[test]
    fn parse_timeline() {
        let content = load_file("sample_payloads/user_timeline.json");
        let resp: ApiResponse<Vec<Tweet>, TimelineMeta> = serde_json::from_str(&content).unwrap();

        let tweets = resp.data.unwrap();
        assert_eq!(tweets.len(), 2);
        assert!(tweets.iter().all(|t| t.created_at.is_none()));

        let meta = resp.meta.unwrap();
        assert_eq!(meta.result_count, 2);
        assert_eq!(meta.next_token.as_deref(), Some("7140dibdnow9c7btw3w29grvxfcgvpb9n9coehpk7xz5i"));
        assert_eq!(meta.previous_token, None);
    }

    #[test]
    fn show_with_fields() {
        let mut params = TweetLookup::new("20");
        params.fields.tweet_fields = vec!["created_at".to_string(), "lang".to_string()];
        params.fields.expansions = vec!["author_id".to_string()];

        assert_eq!(
            params.resolve_endpoint(&format!("{}{}", BASE, crate::links::tweets::SHOW)).as_deref(),
            Some("https://api.twitter.com/2/tweets/20?expansions=author_id&tweet.fields=created_at%2Clang")
        );
    }

    #[test]
    fn lookup_requires_ids() {
        let endpoint = format!("{}{}", BASE, crate::links::tweets::LOOKUP);
        assert_eq!(TweetsLookup::default().resolve_endpoint(&endpoint), None);

        let params = TweetsLookup {
            ids: vec!["20".to_string(), "21".to_string()],
            ..Default::default()
        };
        assert_eq!(
            params.resolve_endpoint(&endpoint).as_deref(),
            Some("https://api.twitter.com/2/tweets?ids=20%2C21")
        );
    }

    #[test]
    fn timeline_query_is_sorted() {
        let params = UserTimeline {
            max_results: Some(5),
            since_id: Some("1".to_string()),
            start_time: Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()),
            exclude: vec!["retweets".to_string(), "replies".to_string()],
            ..UserTimeline::new("2244994945")
        };

        assert_eq!(
            params.resolve_endpoint(&format!("{}{}", BASE, crate::links::tweets::USER_TIMELINE)).as_deref(),
            Some(
                "https://api.twitter.com/2/users/2244994945/tweets?exclude=retweets%2Creplies\
                 &max_results=5&since_id=1&start_time=2021-01-01T00%3A00%3A00Z"
            )
        );
    }

    #[test]
    fn timeline_requires_user() {
        let endpoint = format!("{}{}", BASE, crate::links::tweets::USER_TIMELINE);
        assert_eq!(UserTimeline::default().resolve_endpoint(&endpoint), None);
    }

    #[test]
    fn mentions_query() {
        let mut params = UserMentions {
            max_results: Some(5),
            end_time: Some(Utc.with_ymd_and_hms(2021, 6, 30, 12, 0, 0).unwrap()),
            ..UserMentions::new("2244994945")
        };
        params.fields.tweet_fields = vec!["created_at".to_string()];

        let url = params
            .resolve_endpoint(&format!("{}{}", BASE, crate::links::tweets::USER_MENTIONS))
            .unwrap();
        assert_eq!(
            url,
            "https://api.twitter.com/2/users/2244994945/mentions?end_time=2021-06-30T12%3A00%3A00Z\
             &max_results=5&tweet.fields=created_at"
        );
        assert!(!url.contains("exclude"));

        let endpoint = format!("{}{}", BASE, crate::links::tweets::USER_MENTIONS);
        assert_eq!(UserMentions::default().resolve_endpoint(&endpoint), None);
    }

    #[test]
    fn create_body() {
        let draft = CreateTweet::new("hello").quoting("20");
        let body = draft.body().unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value, serde_json::json!({"text": "hello", "quote_tweet_id": "20"}));

        let reply = CreateTweet::new("hi").in_reply_to("20");
        let value: serde_json::Value = serde_json::from_slice(&reply.body().unwrap().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"text": "hi", "reply": {"in_reply_to_tweet_id": "20"}}));
    }
}
