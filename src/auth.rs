// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Types and functions relating to authentication with Twitter.
//!
//! Every request to the Twitter API must be authenticated, and there are two ways to do it:
//!
//! * **Bearer tokens** ("app-only" or OAuth2 authentication) represent your application itself.
//!   A bearer token is a single opaque string sent as `Authorization: Bearer <token>` on every
//!   call. You can either hand one in directly, or have it loaded from your app's consumer
//!   key/secret with a token exchange, which happens when a [`Client`] is built with
//!   [`Credentials::AppOnly`].
//! * **Access tokens** ("user context" or OAuth1 authentication) represent a specific user who
//!   authorized your app. Every request is signed with HMAC-SHA1 using both your app's consumer
//!   secret and the user's access token secret, so both key pairs must be available.
//!
//! Which one you use is decided once, when the [`Client`] is built from a [`Credentials`] value.
//! Some endpoints only accept one kind of token (the sampled stream only works with a bearer
//! token, and posting a tweet only works with an access token), so check Twitter's
//! documentation for the endpoints you need.
//!
//! [`Client`]: ../struct.Client.html
//! [`Credentials`]: enum.Credentials.html
//! [`Credentials::AppOnly`]: enum.Credentials.html#variant.AppOnly

use std::borrow::Cow;

use hyper::Method;
use serde::Deserialize;

use crate::common::*;
use crate::error::{self, Error};

pub(crate) mod raw;

use raw::RequestBuilder;

/// A key/secret pair representing an OAuth token.
///
/// This struct is used as part of the authentication process. You'll need to manually create at
/// least one of these, to hold onto your consumer token.
///
/// For more information, see the module documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// A key used to identify an application or user.
    pub key: Cow<'static, str>,
    /// A private key used to sign messages from an application or user.
    pub secret: Cow<'static, str>,
}

impl KeyPair {
    /// Creates a KeyPair with the given key and secret.
    ///
    /// This can be called with either `&'static str` (a string literal) or `String` for either
    /// parameter.
    pub fn new<K, S>(key: K, secret: S) -> KeyPair
    where
        K: Into<Cow<'static, str>>,
        S: Into<Cow<'static, str>>,
    {
        KeyPair {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Checks that both halves of this pair are present, naming the missing one if not.
    fn check(&self, key_name: &'static str, secret_name: &'static str) -> error::Result<()> {
        if self.key.is_empty() {
            Err(Error::MissingCredential(key_name))
        } else if self.secret.is_empty() {
            Err(Error::MissingCredential(secret_name))
        } else {
            Ok(())
        }
    }

    pub(crate) fn check_consumer(&self) -> error::Result<()> {
        self.check("consumer_key", "consumer_secret")
    }

    pub(crate) fn check_access(&self) -> error::Result<()> {
        self.check("access_token", "access_token_secret")
    }
}

/// A token that can be used to sign requests to Twitter.
///
/// A `Token` is the resolved form of a [`Credentials`] value: either the user-context key pairs
/// used to sign every request, or the bearer token obtained for the application.
///
/// [`Credentials`]: enum.Credentials.html
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An OAuth Access token indicating the request is coming from a specific user.
    Access {
        /// A "consumer" key/secret that represents the application sending the request.
        consumer: KeyPair,
        /// An "access" key/secret that represents the user's authorization of the application.
        access: KeyPair,
    },
    /// An OAuth Bearer token indicating the request is coming from the application itself, not a
    /// particular user.
    Bearer(String),
}

impl Token {
    /// Checks that every credential this token needs to authorize a request is present.
    pub(crate) fn check(&self) -> error::Result<()> {
        match self {
            Token::Access { consumer, access } => {
                consumer.check_consumer()?;
                access.check_access()
            }
            Token::Bearer(token) if token.is_empty() => Err(Error::MissingCredential("bearer_token")),
            Token::Bearer(_) => Ok(()),
        }
    }
}

/// The credentials a [`Client`] authenticates with.
///
/// This is the configuration-facing side of authentication: it can be deserialized from whatever
/// configuration source your application uses, with a `type` field selecting the variant.
///
/// ```
/// use egg_mode_v2::auth::Credentials;
///
/// let creds: Credentials = serde_json::from_str(r#"{
///     "type": "app_only",
///     "consumer_key": "xvz1evFS4wEEPTGEFPHBog",
///     "consumer_secret": "L8qq9PZyRg6ieKGEKhZolGC0vJWLw8iEJ88DRdyOg"
/// }"#).unwrap();
/// # match creds { Credentials::AppOnly { .. } => (), _ => panic!() }
/// ```
///
/// [`Client`]: ../struct.Client.html
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// A bearer token that was obtained ahead of time.
    Bearer {
        /// The bearer token to send with every request.
        token: String,
    },
    /// The application's consumer key and secret, exchanged for a bearer token when the client is
    /// built.
    AppOnly {
        /// The consumer ("API") key of the application.
        consumer_key: String,
        /// The consumer ("API") secret of the application.
        consumer_secret: String,
    },
    /// The consumer key pair of the application and the access token pair of a user, used to
    /// sign each request.
    UserContext {
        /// The consumer ("API") key of the application.
        consumer_key: String,
        /// The consumer ("API") secret of the application.
        consumer_secret: String,
        /// The user's access token.
        access_token: String,
        /// The user's access token secret.
        access_token_secret: String,
    },
}

impl Credentials {
    /// Resolves these credentials into a `Token`, performing the bearer token exchange if
    /// necessary.
    pub(crate) async fn into_token(self, http: &HttpClient, token_url: &str) -> error::Result<Token> {
        let token = match self {
            Credentials::Bearer { token } => Token::Bearer(token),
            Credentials::AppOnly {
                consumer_key,
                consumer_secret,
            } => {
                let consumer = KeyPair::new(consumer_key, consumer_secret);
                bearer_token(http, token_url, &consumer).await?
            }
            Credentials::UserContext {
                consumer_key,
                consumer_secret,
                access_token,
                access_token_secret,
            } => Token::Access {
                consumer: KeyPair::new(consumer_key, consumer_secret),
                access: KeyPair::new(access_token, access_token_secret),
            },
        };

        token.check()?;
        Ok(token)
    }
}

#[derive(Deserialize)]
struct BearerResponse {
    #[serde(default)]
    access_token: String,
}

/// With the given consumer KeyPair, ask Twitter for an app-only bearer token.
///
/// The token is requested with an HTTP Basic authorization built from the consumer key and
/// secret. An error status from Twitter, or a successful response that doesn't contain a token,
/// is returned as an error.
pub(crate) async fn bearer_token(
    http: &HttpClient,
    token_url: &str,
    con_token: &KeyPair,
) -> error::Result<Token> {
    con_token.check_consumer()?;

    let req = RequestBuilder::new(Method::POST, token_url)
        .with_body(
            "grant_type=client_credentials",
            "application/x-www-form-urlencoded;charset=UTF-8",
        )
        .request_consumer_bearer(con_token)?;

    let resp = request_with_json_response::<BearerResponse>(http, req).await?;
    if resp.access_token.is_empty() {
        return Err(Error::MissingValue("access_token"));
    }

    tracing::debug!("loaded bearer token");
    Ok(Token::Bearer(resp.response.access_token))
}
