// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Internal mechanisms for the `auth` module.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac, NewMac};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Method, Request};
use rand::{self, Rng};
use sha1::Sha1;
use url::Url;

use crate::common::*;
use crate::error;

use super::{KeyPair, Token};

/// Assembles a request to a fully-resolved URL and attaches its authorization.
///
/// The URL given here already carries its query string; when the request is signed with OAuth1,
/// the query is split back out of it so it can take part in the signature.
pub struct RequestBuilder<'a> {
    uri: &'a str,
    method: Method,
    body: Option<(Body, &'static str)>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(method: Method, uri: &'a str) -> Self {
        RequestBuilder {
            uri,
            method,
            body: None,
        }
    }

    pub fn with_body_json(self, body: impl Into<Body>) -> Self {
        self.with_body(body, "application/json; charset=UTF-8")
    }

    pub fn with_body(self, body: impl Into<Body>, content: &'static str) -> Self {
        RequestBuilder {
            body: Some((body.into(), content)),
            ..self
        }
    }

    pub fn request_keys(self, consumer_key: &KeyPair, token: &KeyPair) -> error::Result<Request<Body>> {
        consumer_key.check_consumer()?;
        token.check_access()?;

        let (base_uri, params) = signature_target(self.uri)?;
        let oauth = OAuthParams::from_keys(consumer_key.clone(), token.clone())
            .sign_request(&self.method, &base_uri, &params);
        self.request_authorization(oauth.to_string())
    }

    pub fn request_token(self, token: &Token) -> error::Result<Request<Body>> {
        token.check()?;

        match token {
            Token::Access { consumer, access } => self.request_keys(consumer, access),
            Token::Bearer(bearer) => self.request_authorization(format!("Bearer {}", bearer)),
        }
    }

    pub fn request_consumer_bearer(self, consumer_key: &KeyPair) -> error::Result<Request<Body>> {
        self.request_authorization(bearer_request(consumer_key))
    }

    fn request_authorization(self, authorization: String) -> error::Result<Request<Body>> {
        let request = Request::builder()
            .method(self.method)
            .uri(self.uri)
            .header(AUTHORIZATION, authorization);

        let request = if let Some((body, content)) = self.body {
            request.header(CONTENT_TYPE, content).body(body)?
        } else {
            request.body(Body::empty())?
        };

        Ok(request)
    }
}

/// Splits the given URL into the base URL used in an OAuth signature (scheme, host, port, and
/// path) and the parameters from its query string.
fn signature_target(uri: &str) -> error::Result<(String, ParamList)> {
    let mut url = Url::parse(uri)?;
    let params = url.query_pairs().fold(ParamList::new(), |params, (k, v)| {
        params.add_param(k.into_owned(), v.into_owned())
    });

    url.set_query(None);
    url.set_fragment(None);

    Ok((url.to_string(), params))
}

/// OAuth header set used to create an OAuth signature.
#[derive(Clone, Debug)]
struct OAuthParams {
    /// The consumer key that represents the app making the API request.
    consumer_key: KeyPair,
    /// The token that represents the user authorizing the request.
    token: KeyPair,
    /// A random token representing the request itself. Used to de-duplicate requests on Twitter's
    /// end.
    nonce: String,
    /// A Unix timestamp for when the request was created.
    timestamp: u64,
}

impl OAuthParams {
    /// Creates a new `OAuthParams` header with the given keys, a new `timestamp`, and a new
    /// `nonce`.
    fn from_keys(consumer_key: KeyPair, token: KeyPair) -> OAuthParams {
        let timestamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(dur) => dur,
            Err(err) => err.duration(),
        }
        .as_secs();
        let mut rng = rand::thread_rng();
        let nonce = ::std::iter::repeat(())
            .map(|()| char::from(rng.sample(rand::distributions::Alphanumeric)))
            .take(32)
            .collect::<String>();
        OAuthParams {
            consumer_key,
            token,
            nonce,
            timestamp,
        }
    }

    /// Uses the parameters in this `OAuthParams` instance to generate a signature for the given
    /// request, returning it as a `SignedHeader`.
    ///
    /// `uri` must already be normalized: no query string, no fragment.
    fn sign_request(self, method: &Method, uri: &str, params: &ParamList) -> SignedHeader {
        let query_string = {
            let sig_params = params
                .clone()
                .add_param("oauth_consumer_key", self.consumer_key.key.clone())
                .add_param("oauth_nonce", self.nonce.clone())
                .add_param("oauth_signature_method", "HMAC-SHA1")
                .add_param("oauth_timestamp", self.timestamp.to_string())
                .add_param("oauth_token", self.token.key.clone())
                .add_param("oauth_version", "1.0");

            let mut query = sig_params
                .iter()
                .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
                .collect::<Vec<_>>();
            query.sort();

            query.join("&")
        };

        let base_str = format!(
            "{}&{}&{}",
            percent_encode(method.as_str()),
            percent_encode(uri),
            percent_encode(&query_string)
        );
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer_key.secret),
            percent_encode(&self.token.secret)
        );

        let mut digest =
            Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
        digest.update(base_str.as_bytes());

        let mut params: BTreeMap<&'static str, Cow<'static, str>> = BTreeMap::new();
        params.insert("oauth_signature_method", "HMAC-SHA1".into());
        params.insert("oauth_version", "1.0".into());
        params.insert("oauth_consumer_key", self.consumer_key.key);
        params.insert("oauth_token", self.token.key);
        params.insert("oauth_nonce", self.nonce.into());
        params.insert("oauth_timestamp", self.timestamp.to_string().into());
        params.insert(
            "oauth_signature",
            base64::encode(&digest.finalize().into_bytes()).into(),
        );

        SignedHeader { params }
    }
}

/// A set of `OAuthParams` parameters combined with a request signature, ready to be attached to a
/// request.
struct SignedHeader {
    /// The OAuth parameters used to create the signature.
    params: BTreeMap<&'static str, Cow<'static, str>>,
}

/// The `Display` impl for `SignedHeader` formats it as an `Authorization` header for an HTTP
/// request.
impl fmt::Display for SignedHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // authorization scheme
        write!(f, "OAuth ")?;

        // authorization data

        let mut first = true;
        for (k, v) in &self.params {
            if first {
                first = false;
            } else {
                write!(f, ", ")?;
            }

            write!(f, "{}=\"{}\"", k, percent_encode(v))?;
        }

        Ok(())
    }
}

/// Creates a basic `Authorization` header based on the given consumer token.
///
/// The authorization created by this function can only be used with requests to generate or
/// invalidate a bearer token. Using this authorization with any other endpoint will result in an
/// invalid request.
fn bearer_request(con_token: &KeyPair) -> String {
    let text = format!("{}:{}", con_token.key, con_token.secret);
    format!("Basic {}", base64::encode(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    // The worked example from Twitter's "Creating a signature" guide.
    fn sample_params() -> OAuthParams {
        OAuthParams {
            consumer_key: KeyPair::new(
                "xvz1evFS4wEEPTGEFPHBog",
                "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            ),
            token: KeyPair::new(
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
                "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
            ),
            nonce: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".to_string(),
            timestamp: 1318622958,
        }
    }

    fn sample_request_params() -> ParamList {
        ParamList::new()
            .add_param("include_entities", "true")
            .add_param("status", "Hello Ladies + Gentlemen, a signed OAuth request!")
    }

    #[test]
    fn signature_matches_reference() {
        let header = sample_params().sign_request(
            &Method::POST,
            "https://api.twitter.com/1.1/statuses/update.json",
            &sample_request_params(),
        );

        assert_eq!(header.params["oauth_signature"], "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
        assert_eq!(
            header.to_string(),
            "OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", \
             oauth_nonce=\"kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg\", \
             oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\", \
             oauth_signature_method=\"HMAC-SHA1\", \
             oauth_timestamp=\"1318622958\", \
             oauth_token=\"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\", \
             oauth_version=\"1.0\""
        );
    }

    #[test]
    fn signature_is_deterministic() {
        let sign = || {
            sample_params()
                .sign_request(
                    &Method::GET,
                    "https://api.twitter.com/2/users/2244994945/tweets",
                    &ParamList::new().add_param("max_results", "10"),
                )
                .to_string()
        };

        assert_eq!(sign(), sign());
    }

    #[test]
    fn query_is_split_from_signature_target() {
        let (base, params) = signature_target(
            "https://api.twitter.com/2/tweets?ids=1%2C2&tweet.fields=created_at",
        )
        .unwrap();

        assert_eq!(base, "https://api.twitter.com/2/tweets");
        assert_eq!(params.get("ids").map(|v| v.as_ref()), Some("1,2"));
        assert_eq!(params.get("tweet.fields").map(|v| v.as_ref()), Some("created_at"));
    }

    #[test]
    fn fresh_nonce_per_request() {
        let consumer = KeyPair::new("key", "secret");
        let token = KeyPair::new("token", "token secret");
        let first = OAuthParams::from_keys(consumer.clone(), token.clone());
        let second = OAuthParams::from_keys(consumer, token);

        assert_eq!(first.nonce.len(), 32);
        assert!(first.nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first.nonce, second.nonce);
    }

    #[test]
    fn signed_request_carries_oauth_header() {
        let token = Token::Access {
            consumer: KeyPair::new("key", "secret"),
            access: KeyPair::new("token", "token secret"),
        };
        let req = RequestBuilder::new(Method::GET, "https://api.twitter.com/2/tweets/20")
            .request_token(&token)
            .unwrap();

        let auth = req.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with("OAuth oauth_consumer_key=\"key\", oauth_nonce=\""));
        assert!(auth.contains("oauth_token=\"token\""));
        assert!(auth.contains("oauth_signature=\""));
    }

    #[test]
    fn missing_token_secret_is_never_signed() {
        let token = Token::Access {
            consumer: KeyPair::new("key", "secret"),
            access: KeyPair::new("token", ""),
        };

        match RequestBuilder::new(Method::GET, "https://api.twitter.com/2/tweets/20").request_token(&token) {
            Err(Error::MissingCredential("access_token_secret")) => (),
            other => panic!("unexpected result: {:?}", other.map(|r| r.headers().clone())),
        }
    }

    #[test]
    fn bearer_header() {
        let con_key = "xvz1evFS4wEEPTGEFPHBog";
        let con_secret = "L8qq9PZyRg6ieKGEKhZolGC0vJWLw8iEJ88DRdyOg";
        let con_token = KeyPair::new(con_key, con_secret);

        let output = bearer_request(&con_token);

        assert_eq!(output, "Basic eHZ6MWV2RlM0d0VFUFRHRUZQSEJvZzpMOHFxOVBaeVJnNmllS0dFS2hab2xHQzB2SldMdzhpRUo4OERSZHlPZw==");
    }

    #[test]
    fn json_body_gets_content_type() {
        let req = RequestBuilder::new(Method::POST, "https://api.twitter.com/2/tweets")
            .with_body_json(r#"{"text":"hello"}"#)
            .request_token(&Token::Bearer("abc123".to_string()))
            .unwrap();

        assert_eq!(req.headers()[AUTHORIZATION], "Bearer abc123");
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json; charset=UTF-8");
    }
}
