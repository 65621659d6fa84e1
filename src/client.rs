// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use hyper::header::{HeaderValue, USER_AGENT};
use hyper::{Body, Method, Request};
use serde::de::DeserializeOwned;

use crate::auth::raw::RequestBuilder;
use crate::auth::{Credentials, Token};
use crate::common::*;
use crate::config::ClientConfig;
use crate::error::{self, Error};
use crate::params::Parameters;
use crate::stream::{StopHandle, TwitterStream};

/// A handle to the Twitter API.
///
/// A `Client` bundles the HTTP connection pool, the token requests are authorized with, and the
/// configuration that says where requests go. It's cheap to clone, and clones can be used from
/// several tasks at once; the token is only ever replaced through [`set_token`].
///
/// Every API function in this crate goes through one of two methods: [`call`] for regular
/// request/response endpoints, and [`call_stream`] for endpoints that keep the connection open.
/// They can also be used directly to reach endpoints this crate doesn't wrap.
///
/// ```rust,no_run
/// use egg_mode_v2::{Client, ClientConfig};
/// use egg_mode_v2::auth::Credentials;
/// use egg_mode_v2::tweet::{self, TweetLookup};
///
/// # #[tokio::main]
/// # async fn main() -> egg_mode_v2::error::Result<()> {
/// let creds = Credentials::AppOnly {
///     consumer_key: "consumer key".to_string(),
///     consumer_secret: "consumer secret".to_string(),
/// };
/// let client = Client::new(creds, ClientConfig::default()).await?;
///
/// let tweet = tweet::show(&client, &TweetLookup::new("1228393702244134912")).await?;
/// if let Some(tweet) = &tweet.data {
///     println!("{}", tweet.text);
/// }
/// # Ok(())
/// # }
/// ```
///
/// [`set_token`]: #method.set_token
/// [`call`]: #method.call
/// [`call_stream`]: #method.call_stream
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    token: Token,
    config: ClientConfig,
}

impl Client {
    /// Builds a client from the given credentials.
    ///
    /// If the credentials are `Credentials::AppOnly`, this requests a bearer token from Twitter
    /// before returning, and fails if Twitter doesn't hand one back. Missing keys or secrets are
    /// reported here rather than on the first call.
    pub async fn new(credentials: Credentials, config: ClientConfig) -> error::Result<Client> {
        let http = new_http_client();
        let token = credentials.into_token(&http, &config.token_url).await?;

        Ok(Client { http, token, config })
    }

    /// Builds a client around a token you already have. This never touches the network.
    pub fn with_token(token: Token, config: ClientConfig) -> Client {
        Client {
            http: new_http_client(),
            token,
            config,
        }
    }

    /// Returns the token requests are authorized with.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Replaces the token requests are authorized with.
    pub fn set_token(&mut self, token: Token) {
        self.token = token;
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the underlying hyper client, for use with the functions in the `raw` module.
    pub fn http_client(&self) -> &HttpClient {
        &self.http
    }

    /// Assembles an authorized request for the given endpoint, without sending it.
    ///
    /// `endpoint` is either a template relative to the configured API URL (like
    /// `/2/tweets/:id`) or a full URL. If the parameters can't fill in the template, this returns
    /// `Error::MissingParameter`.
    pub fn build_request<P>(&self, method: Method, endpoint: &str, params: &P) -> error::Result<Request<Body>>
    where
        P: Parameters + ?Sized,
    {
        let template = self.config.endpoint_url(endpoint);
        let url = params
            .resolve_endpoint(&template)
            .ok_or_else(|| Error::MissingParameter(template.clone()))?;

        let mut builder = RequestBuilder::new(method, &url);
        if let Some(body) = params.body()? {
            builder = builder.with_body_json(body);
        }

        let mut request = builder.request_token(&self.token)?;
        request
            .headers_mut()
            .insert(USER_AGENT, HeaderValue::from_str(&self.config.user_agent)?);

        Ok(request)
    }

    /// Calls the given endpoint and decodes its JSON response.
    pub async fn call<P, T>(&self, method: Method, endpoint: &str, params: &P) -> error::Result<Response<T>>
    where
        P: Parameters + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, endpoint, params)?;
        request_with_json_response(&self.http, request).await
    }

    /// Opens a stream on the given endpoint.
    ///
    /// This returns once Twitter has accepted the connection; an error status at that point is
    /// returned as an error. The stream then decodes one `T` per line Twitter sends. See
    /// [`TwitterStream`] for how to read it.
    ///
    /// [`TwitterStream`]: stream/struct.TwitterStream.html
    pub async fn call_stream<P, T>(&self, method: Method, endpoint: &str, params: &P) -> error::Result<TwitterStream<T>>
    where
        P: Parameters + ?Sized,
        T: DeserializeOwned,
    {
        self.call_stream_with_stop(method, endpoint, params, StopHandle::new())
            .await
    }

    /// Opens a stream on the given endpoint, which will be closed when the given `StopHandle` is
    /// stopped.
    ///
    /// Stopping the handle while the connection is still being opened abandons it and returns
    /// `Error::StreamStopped`.
    pub async fn call_stream_with_stop<P, T>(
        &self,
        method: Method,
        endpoint: &str,
        params: &P,
        stop: StopHandle,
    ) -> error::Result<TwitterStream<T>>
    where
        P: Parameters + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, endpoint, params)?;
        TwitterStream::open(&self.http, request, stop).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth = match self.token {
            Token::Access { .. } => "user context",
            Token::Bearer(_) => "bearer",
        };
        f.debug_struct("Client")
            .field("auth", &auth)
            .field("config", &self.config)
            .finish()
    }
}
