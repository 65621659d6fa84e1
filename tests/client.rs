// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use egg_mode_v2::auth::Credentials;
use egg_mode_v2::error::Error;
use egg_mode_v2::params::NoParams;
use egg_mode_v2::stream::{self, SampleStream, StopHandle};
use egg_mode_v2::tweet::{self, TweetLookup};
use egg_mode_v2::{Client, ClientConfig, PartialErrors, Token};
use httpmock::prelude::*;
use hyper::StatusCode;

const BASIC_AUTH: &str = "Basic Y29uc3VtZXIta2V5OmNvbnN1bWVyLXNlY3JldA==";

fn app_only() -> Credentials {
    Credentials::AppOnly {
        consumer_key: "consumer-key".to_string(),
        consumer_secret: "consumer-secret".to_string(),
    }
}

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_api_url(server.base_url())
        .with_token_url(server.url("/oauth2/token"))
}

fn bearer_client(server: &MockServer) -> Client {
    Client::with_token(Token::Bearer("abc123".to_string()), config(server))
}

#[tokio::test]
async fn bearer_exchange_then_call() {
    let server = MockServer::start_async().await;

    let token = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth2/token")
                .header("authorization", BASIC_AUTH)
                .body("grant_type=client_credentials");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"token_type":"bearer","access_token":"abc123"}"#);
        })
        .await;

    let show = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/tweets/123")
                .header("authorization", "Bearer abc123");
            then.status(200)
                .header("content-type", "application/json")
                .header("x-rate-limit-limit", "300")
                .header("x-rate-limit-remaining", "299")
                .header("x-rate-limit-reset", "1600000000")
                .body(r#"{"data":{"id":"123","text":"hello"}}"#);
        })
        .await;

    let client = Client::new(app_only(), config(&server)).await.unwrap();
    token.assert_async().await;
    match client.token() {
        Token::Bearer(token) => assert_eq!(token, "abc123"),
        other => panic!("unexpected token: {:?}", other),
    }

    let resp = tweet::show(&client, &TweetLookup::new("123")).await.unwrap();
    show.assert_async().await;

    let tweet = resp.data.as_ref().unwrap();
    assert_eq!(tweet.id, "123");
    assert_eq!(tweet.text, "hello");
    assert!(!resp.has_partial_error());
    assert_eq!(resp.rate_limit_status.limit, 300);
    assert_eq!(resp.rate_limit_status.remaining, 299);
    assert_eq!(resp.rate_limit_status.reset, 1600000000);
}

#[tokio::test]
async fn empty_bearer_token_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"token_type":"bearer","access_token":""}"#);
        })
        .await;

    match Client::new(app_only(), config(&server)).await {
        Err(Error::MissingValue("access_token")) => (),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn rejected_bearer_exchange() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(403)
                .header("content-type", "application/json")
                .body(r#"{"title":"Forbidden","type":"about:blank","detail":"Unable to verify your credentials"}"#);
        })
        .await;

    match Client::new(app_only(), config(&server)).await {
        Err(Error::TwitterError { status, error }) => {
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(error.detail, "Unable to verify your credentials");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn error_status_is_returned() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/2/users/me");
            then.status(403)
                .header("content-type", "application/json")
                .body(include_str!("../sample_payloads/error_forbidden.json"));
        })
        .await;

    let client = bearer_client(&server);
    let resp = client
        .call::<_, serde_json::Value>(hyper::Method::GET, "/2/users/me", &NoParams)
        .await;
    mock.assert_async().await;

    match resp {
        Err(err) => {
            assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
            assert!(!err.is_disconnect());
            match err {
                Error::TwitterError { error, .. } => assert_eq!(error.title, "Forbidden"),
                other => panic!("unexpected error: {:?}", other),
            }
        }
        Ok(resp) => panic!("unexpected response: {:?}", resp.response),
    }
}

#[tokio::test]
async fn missing_parameter_sends_nothing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/2/tweets/");
            then.status(200).body("{}");
        })
        .await;

    let client = bearer_client(&server);
    match tweet::show(&client, &TweetLookup::new("")).await {
        Err(Error::MissingParameter(_)) => (),
        other => panic!("unexpected result: {:?}", other.map(|r| r.response)),
    }
    assert_eq!(mock.calls_async().await, 0);
}

#[tokio::test]
async fn sample_stream() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/tweets/sample/stream")
                .header("authorization", "Bearer abc123");
            then.status(200).body(
                "\r\n{\"data\":{\"id\":\"1\",\"text\":\"one\"}}\r\n\r\n{\"data\":{\"id\":\"2\",\"text\":\"two\"}}\r\n",
            );
        })
        .await;

    let client = bearer_client(&server);
    let mut tweets = stream::sample(&client, &SampleStream::default()).await.unwrap();

    let mut texts = Vec::new();
    let mut pings = 0;
    while tweets.advance().await {
        match tweets.read() {
            Some(tweet) => texts.push(tweet.unwrap().data.text),
            None => pings += 1,
        }
    }

    assert_eq!(texts, vec!["one", "two"]);
    assert_eq!(pings, 2);
}

#[tokio::test]
async fn stream_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/tweets/search/stream");
            then.status(429)
                .header("content-type", "application/json")
                .body(r#"{"title":"ConnectionException","detail":"This stream is currently at the maximum allowed connection limit.","type":"https://api.twitter.com/2/problems/streaming-connection"}"#);
        })
        .await;

    let client = bearer_client(&server);
    match stream::search(&client, &SampleStream::default(), StopHandle::new()).await {
        Err(err) => {
            assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
            assert!(err.is_disconnect());
        }
        Ok(_) => panic!("stream opened despite error status"),
    }
}

#[tokio::test]
async fn stopped_before_connecting() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/2/tweets/search/stream");
            then.status(200).body("");
        })
        .await;

    let stop = StopHandle::new();
    stop.stop();

    let client = bearer_client(&server);
    match stream::search(&client, &SampleStream::default(), stop).await {
        Err(Error::StreamStopped) => (),
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("stream opened after stop"),
    }
    assert_eq!(mock.calls_async().await, 0);
}
