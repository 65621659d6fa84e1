// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A library for interacting with Twitter's v2 API.
//!
//! [Documentation for the Twitter API][api-docs]
//!
//! [api-docs]: https://developer.twitter.com/en/docs/twitter-api
//!
//! To start using this library, you'll need to register an app with Twitter and get its consumer
//! key and secret. Those can be used on their own, in which case the client asks Twitter for a
//! bearer token and calls the API on behalf of the app, or together with a user's access token, in
//! which case every request is signed on behalf of that user.
//!
//! ```rust,no_run
//! use egg_mode_v2::{Client, ClientConfig};
//! use egg_mode_v2::auth::Credentials;
//! use egg_mode_v2::user::{self, UserByUsername};
//!
//! # #[tokio::main]
//! # async fn main() -> egg_mode_v2::error::Result<()> {
//! let creds = Credentials::AppOnly {
//!     consumer_key: "consumer key".to_string(),
//!     consumer_secret: "consumer secret".to_string(),
//! };
//! let client = Client::new(creds, ClientConfig::default()).await?;
//!
//! let rustlang = user::show_by_username(&client, &UserByUsername::new("rustlang")).await?;
//! if let Some(user) = &rustlang.data {
//!     println!("{} (@{})", user.name, user.username);
//! }
//! println!("{} calls left", rustlang.rate_limit_status.remaining);
//! # Ok(())
//! # }
//! ```
//!
//! Every call goes through `Client::call`, or `Client::call_stream` for the streaming endpoints.
//! The `tweet`, `user`, `list`, and `stream` modules wrap the most common endpoints; the `params`
//! and `raw` modules have what you need to call the rest.
//!
//! Responses come back as a `Response<T>`, which derefs to the decoded value and also carries the
//! rate-limit headers Twitter sent. Most v2 endpoints return an `ApiResponse`, whose `errors`
//! can report problems with part of a request that otherwise succeeded.
//!
//! This crate doesn't retry failed calls or wait out rate limits. It logs through `tracing`, and
//! installs no subscriber of its own.

mod common;
pub mod auth;
mod client;
mod config;
pub mod error;
mod links;
pub mod list;
pub mod params;
pub mod raw;
pub mod stream;
pub mod tweet;
pub mod user;

pub use crate::auth::{Credentials, KeyPair, Token};
pub use crate::client::Client;
pub use crate::common::{ApiResponse, RateLimit, Response};
pub use crate::config::ClientConfig;
pub use crate::error::PartialErrors;
