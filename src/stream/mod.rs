// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Access to Twitter's streaming endpoints.
//!
//! A stream is a request Twitter never finishes answering. Once it's open, Twitter sends one JSON
//! object per line as matching tweets come in, and a blank line every so often to show the
//! connection is still alive. [`TwitterStream`] reads those lines one at a time.
//!
//! There are two ways to read a stream. The pull-style methods [`advance`] and [`read`] step
//! through it one line at a time:
//!
//! ```rust,no_run
//! # use egg_mode_v2::Client;
//! # #[tokio::main]
//! # async fn main() -> egg_mode_v2::error::Result<()> {
//! # let client: Client = unimplemented!();
//! use egg_mode_v2::stream::{self, SampleStream};
//!
//! let mut tweets = stream::sample(&client, &SampleStream::default()).await?;
//! let stop = tweets.stop_handle();
//! let mut count = 0;
//!
//! while tweets.advance().await {
//!     match tweets.read() {
//!         Some(Ok(tweet)) => {
//!             println!("{}", tweet.data.text);
//!             count += 1;
//!             if count == 100 {
//!                 stop.stop();
//!             }
//!         }
//!         Some(Err(err)) => println!("stream error: {}", err),
//!         None => (), // keep-alive
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! `TwitterStream` also implements `futures::Stream`, yielding a [`StreamMessage`] per line, so
//! it can be used with the `StreamExt` combinators.
//!
//! A stream can be stopped at any time with its [`StopHandle`], from any task or thread. Stopping
//! it closes the connection, even while a read is waiting on a quiet connection. Nothing here
//! reconnects on its own: when `advance` returns `false`, or `read` returns an error for which
//! [`Error::is_disconnect`] is true, open a new stream if you want to keep going.
//!
//! [`TwitterStream`]: struct.TwitterStream.html
//! [`advance`]: struct.TwitterStream.html#method.advance
//! [`read`]: struct.TwitterStream.html#method.read
//! [`StreamMessage`]: enum.StreamMessage.html
//! [`StopHandle`]: struct.StopHandle.html
//! [`Error::is_disconnect`]: ../error/enum.Error.html#method.is_disconnect

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::future::{self, Either};
use futures::task::AtomicWaker;
use futures::Stream;
use hyper::{Body, Request};
use serde::de::DeserializeOwned;

use crate::common::*;
use crate::error::{self, ApiError, Error};

mod fun;

pub use self::fun::*;

/// The longest line a stream will buffer while waiting for its line ending.
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// Represents the kinds of messages that can be sent over a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage<T> {
    /// A blank line, sent periodically to keep the connection alive.
    Ping,
    /// A decoded payload.
    Data(T),
}

/// A handle that stops a [`TwitterStream`] from anywhere.
///
/// Handles are cheap to clone, and every clone stops the same stream. A handle can be created
/// ahead of time and passed to [`Client::call_stream_with_stop`], so the stream can be stopped
/// while it's still connecting. Each handle controls a single stream.
///
/// The handle holds the stream's connection, so stopping it closes the connection right away,
/// whether or not anything is reading from the stream at the time.
///
/// [`TwitterStream`]: struct.TwitterStream.html
/// [`Client::call_stream_with_stop`]: ../struct.Client.html#method.call_stream_with_stop
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    inner: Arc<StopInner>,
}

#[derive(Debug, Default)]
struct StopInner {
    stopped: AtomicBool,
    waker: AtomicWaker,
    body: Mutex<Option<Body>>,
}

impl StopHandle {
    /// Creates a new handle, not yet stopped.
    pub fn new() -> StopHandle {
        StopHandle::default()
    }

    /// Stops the stream and closes its connection. Any `advance` call waiting on the stream
    /// returns `false`.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        if self.lock_body().take().is_some() {
            tracing::debug!("stream stopped");
        }
        self.inner.waker.wake();
    }

    /// Returns whether `stop` has been called on this handle or any of its clones.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    fn lock_body(&self) -> MutexGuard<'_, Option<Body>> {
        // the slot is only ever replaced whole, so a poisoned lock is still usable
        self.inner.body.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn attach(&self, body: Body) {
        *self.lock_body() = Some(body);

        // stop() may have run before the body was in place
        if self.is_stopped() {
            self.close();
        }
    }

    fn close(&self) {
        self.lock_body().take();
    }

    fn poll_stopped(&self, cx: &mut Context<'_>) -> Poll<()> {
        if self.is_stopped() {
            return Poll::Ready(());
        }

        self.inner.waker.register(cx.waker());

        // stop() may have run between the first check and the registration
        if self.is_stopped() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }

    fn stopped(&self) -> Stopped<'_> {
        Stopped(self)
    }
}

/// Future that resolves once its `StopHandle` is stopped.
struct Stopped<'a>(&'a StopHandle);

impl Future for Stopped<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.0.poll_stopped(cx)
    }
}

/// A connection to one of Twitter's streaming endpoints.
///
/// The stream holds at most one decoded item at a time: each call to [`advance`] replaces it,
/// and [`read`] hands it out. The connection is closed when the stream is stopped, when Twitter
/// closes it, or when the stream is dropped.
///
/// Only one task should read from a stream. Stopping it through a [`StopHandle`] is safe from
/// anywhere.
///
/// [`advance`]: #method.advance
/// [`read`]: #method.read
/// [`StopHandle`]: struct.StopHandle.html
pub struct TwitterStream<T> {
    buf: Vec<u8>,
    /// How much of `buf` is known to contain no line ending.
    scanned: usize,
    stop: StopHandle,
    current: Option<error::Result<T>>,
}

impl<T> Unpin for TwitterStream<T> {}

impl<T: DeserializeOwned> TwitterStream<T> {
    /// Sends the given request and waits for Twitter to accept it, or for the handle to be
    /// stopped.
    pub(crate) async fn open(http: &HttpClient, request: Request<Body>, stop: StopHandle) -> error::Result<Self> {
        if stop.is_stopped() {
            return Err(Error::StreamStopped);
        }

        let uri = request.uri().clone();
        let connect = get_response(http, request);
        futures::pin_mut!(connect);

        match future::select(connect, stop.stopped()).await {
            Either::Left((resp, _)) => {
                let resp = resp?;
                tracing::debug!(%uri, "stream opened");
                Ok(TwitterStream::from_body(resp.into_body(), stop))
            }
            Either::Right(((), _)) => {
                tracing::debug!(%uri, "stream stopped while connecting");
                Err(Error::StreamStopped)
            }
        }
    }

    /// Wraps an already-open response body.
    pub(crate) fn from_body(body: Body, stop: StopHandle) -> Self {
        stop.attach(body);
        TwitterStream {
            buf: Vec::new(),
            scanned: 0,
            stop,
            current: None,
        }
    }

    /// Waits for the next line from the stream.
    ///
    /// Returns `true` if a line was received, even if it was only a keep-alive or couldn't be
    /// decoded; call [`read`] to see what it was. Returns `false` once the stream is over:
    /// Twitter closed the connection, the stream was stopped, or an earlier read failed.
    ///
    /// [`read`]: #method.read
    pub async fn advance(&mut self) -> bool {
        self.current = None;

        match future::poll_fn(|cx| self.poll_message(cx)).await {
            None => false,
            Some(Ok(StreamMessage::Ping)) => true,
            Some(Ok(StreamMessage::Data(item))) => {
                self.current = Some(Ok(item));
                true
            }
            Some(Err(err)) => {
                self.current = Some(Err(err));
                true
            }
        }
    }

    /// Takes the item decoded by the last call to [`advance`].
    ///
    /// Returns `None` if that line was a keep-alive, if the item was already read, or if
    /// `advance` hasn't been called. An error frame sent by Twitter is returned as
    /// `Error::StreamError`, and a line that wasn't valid JSON as `Error::DeserializeError`.
    ///
    /// [`advance`]: #method.advance
    pub fn read(&mut self) -> Option<error::Result<T>> {
        self.current.take()
    }

    fn poll_message(&mut self, cx: &mut Context<'_>) -> Poll<Option<error::Result<StreamMessage<T>>>> {
        loop {
            if self.stop.poll_stopped(cx).is_ready() {
                self.stop.close();
                self.clear();
                return Poll::Ready(None);
            }

            match self.next_frame() {
                Ok(Some(frame)) => return Poll::Ready(Some(decode_frame(&frame))),
                Ok(None) => (),
                Err(err) => {
                    tracing::debug!(%err, "closing stream");
                    self.stop.close();
                    self.clear();
                    return Poll::Ready(Some(Err(err)));
                }
            }

            let polled = match self.stop.lock_body().as_mut() {
                Some(body) => Pin::new(body).poll_next(cx),
                None => return Poll::Ready(None),
            };

            match polled {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => self.buf.extend_from_slice(&chunk),
                Poll::Ready(Some(Err(err))) => {
                    tracing::debug!(%err, "stream connection failed");
                    self.stop.close();
                    self.clear();
                    return Poll::Ready(Some(Err(err.into())));
                }
                Poll::Ready(None) => {
                    tracing::debug!("stream closed by remote");
                    self.stop.close();
                    let rest = std::mem::take(&mut self.buf);
                    self.scanned = 0;
                    if rest.iter().all(u8::is_ascii_whitespace) {
                        return Poll::Ready(None);
                    }
                    return Poll::Ready(Some(decode_frame(&rest)));
                }
            }
        }
    }

    /// Pulls the next complete line out of the buffer, without its line ending.
    ///
    /// Fails once more than `MAX_FRAME_LEN` bytes are waiting for a line ending.
    fn next_frame(&mut self) -> error::Result<Option<Vec<u8>>> {
        let pos = match self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            Some(pos) => self.scanned + pos,
            None => {
                self.scanned = self.buf.len();
                if self.buf.len() > MAX_FRAME_LEN {
                    return Err(Error::StreamFrameTooLarge(MAX_FRAME_LEN));
                }
                return Ok(None);
            }
        };

        let mut frame = self.buf.drain(..=pos).collect::<Vec<u8>>();
        self.scanned = 0;
        frame.pop();
        if frame.last() == Some(&b'\r') {
            frame.pop();
        }
        Ok(Some(frame))
    }
}

impl<T> TwitterStream<T> {
    /// Stops the stream and closes its connection.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Returns a handle that can stop this stream from another task or thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.scanned = 0;
    }
}

impl<T> Drop for TwitterStream<T> {
    fn drop(&mut self) {
        self.stop.close();
    }
}

impl<T: DeserializeOwned> Stream for TwitterStream<T> {
    type Item = error::Result<StreamMessage<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_message(cx)
    }
}

/// Decodes a single line received from a stream.
fn decode_frame<T: DeserializeOwned>(frame: &[u8]) -> error::Result<StreamMessage<T>> {
    if frame.iter().all(u8::is_ascii_whitespace) {
        tracing::trace!("stream keep-alive");
        return Ok(StreamMessage::Ping);
    }

    tracing::trace!(bytes = frame.len(), "stream frame");
    let value: serde_json::Value = serde_json::from_slice(frame)?;
    if let Some(err) = error_frame(&value) {
        return Err(Error::StreamError(err));
    }

    Ok(StreamMessage::Data(serde_json::from_value(value)?))
}

/// Recognizes the frames Twitter sends in place of a payload when something went wrong: either a
/// bare error object, or an `errors` list with no `data` next to it.
fn error_frame(value: &serde_json::Value) -> Option<ApiError> {
    if value.get("data").is_some() {
        return None;
    }

    if value.get("title").is_some() {
        return serde_json::from_value(value.clone()).ok();
    }

    value
        .get("errors")
        .and_then(|errors| errors.as_array())
        .and_then(|errors| errors.first())
        .and_then(|first| serde_json::from_value(first.clone()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use hyper::body::Bytes;
    use serde::Deserialize;
    use std::time::Duration;

    use crate::common::tests::load_file;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        data: ItemData,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ItemData {
        id: String,
    }

    fn stream_of<B: Into<Bytes>>(chunks: Vec<B>) -> TwitterStream<Item> {
        let chunks = chunks
            .into_iter()
            .map(|c| Ok::<_, std::io::Error>(c.into()))
            .collect::<Vec<_>>();
        TwitterStream::from_body(Body::wrap_stream(futures::stream::iter(chunks)), StopHandle::new())
    }

    #[test]
    fn decode_frames() {
        assert_eq!(decode_frame::<Item>(b"").unwrap(), StreamMessage::Ping);
        assert_eq!(decode_frame::<Item>(b"  ").unwrap(), StreamMessage::Ping);

        match decode_frame::<Item>(br#"{"data":{"id":"1"}}"#).unwrap() {
            StreamMessage::Data(item) => assert_eq!(item.data.id, "1"),
            other => panic!("unexpected frame: {:?}", other),
        }

        match decode_frame::<Item>(br#"{"data":{"id":"1""#) {
            Err(Error::DeserializeError(_)) => (),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn decode_error_frames() {
        let frame = load_file("sample_payloads/stream_disconnect.json");
        match decode_frame::<Item>(frame.trim().as_bytes()) {
            Err(Error::StreamError(err)) => {
                assert_eq!(err.title, "operational-disconnect");
                assert!(err.is_disconnect());
            }
            other => panic!("unexpected frame: {:?}", other),
        }

        let frame = br#"{"title":"ConnectionException","detail":"This stream is currently at the maximum allowed connection limit.","type":"https://api.twitter.com/2/problems/streaming-connection"}"#;
        match decode_frame::<Item>(frame) {
            Err(Error::StreamError(err)) => assert_eq!(err.title, "ConnectionException"),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[tokio::test]
    async fn keep_alive_then_item_then_close() {
        let mut stream = stream_of(vec!["\r\n", "{\"data\":{\"id\":\"1\"}}\r\n"]);

        assert!(stream.advance().await);
        assert!(stream.read().is_none());

        assert!(stream.advance().await);
        assert_eq!(stream.read().unwrap().unwrap().data.id, "1");
        assert!(stream.read().is_none());

        assert!(!stream.advance().await);
        assert!(!stream.advance().await);
    }

    #[tokio::test]
    async fn frames_split_across_chunks() {
        let mut stream = stream_of(vec![
            "{\"data\":{\"i",
            "d\":\"1\"}}\r\n{\"data\":{\"id\":\"2\"}}\r",
            "\n\r\n{\"data\":{\"id\":\"3\"}}",
        ]);

        let mut ids = Vec::new();
        while stream.advance().await {
            if let Some(item) = stream.read() {
                ids.push(item.unwrap().data.id);
            }
        }

        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn bad_frame_does_not_end_stream() {
        let mut stream = stream_of(vec!["not json\n{\"data\":{\"id\":\"2\"}}\n"]);

        assert!(stream.advance().await);
        match stream.read() {
            Some(Err(Error::DeserializeError(_))) => (),
            other => panic!("unexpected item: {:?}", other),
        }

        assert!(stream.advance().await);
        assert_eq!(stream.read().unwrap().unwrap().data.id, "2");
    }

    #[tokio::test]
    async fn error_frame_does_not_end_stream() {
        let mut stream = stream_of(vec![
            "{\"title\":\"operational-disconnect\",\"detail\":\"stream reset\",\"type\":\"https://api.twitter.com/2/problems/operational-disconnect\"}\n",
            "{\"data\":{\"id\":\"1\"}}\n",
        ]);

        assert!(stream.advance().await);
        match stream.read() {
            Some(Err(Error::StreamError(err))) => {
                assert_eq!(err.title, "operational-disconnect");
                assert!(err.is_disconnect());
            }
            other => panic!("unexpected item: {:?}", other),
        }
        assert!(stream.read().is_none());

        assert!(stream.advance().await);
        assert_eq!(stream.read().unwrap().unwrap().data.id, "1");
        assert!(!stream.advance().await);
    }

    #[tokio::test]
    async fn unterminated_frame_is_capped() {
        let mut stream = stream_of(vec![
            "{\"data\":{\"id\":\"1\"}}\n".to_string(),
            "x".repeat(MAX_FRAME_LEN / 2),
            "x".repeat(MAX_FRAME_LEN / 2 + 1),
            "\n{\"data\":{\"id\":\"2\"}}\n".to_string(),
        ]);

        assert!(stream.advance().await);
        assert_eq!(stream.read().unwrap().unwrap().data.id, "1");

        assert!(stream.advance().await);
        match stream.read() {
            Some(Err(Error::StreamFrameTooLarge(limit))) => assert_eq!(limit, MAX_FRAME_LEN),
            other => panic!("unexpected item: {:?}", other.map(|r| r.map(|_| ()))),
        }
        assert!(stream.buf.is_empty());
        assert!(stream.stop.lock_body().is_none());

        assert!(!stream.advance().await);
    }

    #[tokio::test]
    async fn many_frames_in_one_chunk() {
        let chunk = (0..1000)
            .map(|i| format!("{{\"data\":{{\"id\":\"{}\"}}}}\r\n", i))
            .collect::<String>();
        let mut stream = stream_of(vec![chunk]);

        let mut count = 0;
        while stream.advance().await {
            let item = stream.read().unwrap().unwrap();
            assert_eq!(item.data.id, count.to_string());
            count += 1;
        }
        assert_eq!(count, 1000);
    }

    #[tokio::test]
    async fn connection_failure_is_reported_once() {
        let chunks: Vec<std::io::Result<Bytes>> = vec![
            Ok(Bytes::from("{\"data\":{\"id\":\"1\"}}\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let mut stream: TwitterStream<Item> =
            TwitterStream::from_body(Body::wrap_stream(futures::stream::iter(chunks)), StopHandle::new());

        assert!(stream.advance().await);
        assert!(stream.read().unwrap().is_ok());

        assert!(stream.advance().await);
        match stream.read() {
            Some(Err(err)) => assert!(err.is_disconnect()),
            other => panic!("unexpected item: {:?}", other),
        }

        assert!(!stream.advance().await);
    }

    #[tokio::test]
    async fn stop_unblocks_idle_stream() {
        let (_sender, body) = Body::channel();
        let mut stream: TwitterStream<Item> = TwitterStream::from_body(body, StopHandle::new());
        let stop = stream.stop_handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stop.stop();
        });

        let advanced = tokio::time::timeout(Duration::from_secs(5), stream.advance())
            .await
            .expect("advance did not return after stop");
        assert!(!advanced);
        assert!(stream.stop.lock_body().is_none());
    }

    #[tokio::test]
    async fn stop_closes_connection_without_reading() {
        let (mut sender, body) = Body::channel();
        let mut stream: TwitterStream<Item> = TwitterStream::from_body(body, StopHandle::new());

        stream.stop_handle().stop();

        let sent = tokio::time::timeout(Duration::from_secs(5), sender.send_data(Bytes::from("{}\n")))
            .await
            .expect("send_data did not return after stop");
        assert!(sent.is_err());
        assert!(!stream.advance().await);
    }

    #[tokio::test]
    async fn dropping_stream_closes_connection() {
        let (mut sender, body) = Body::channel();
        let stream: TwitterStream<Item> = TwitterStream::from_body(body, StopHandle::new());
        let stop = stream.stop_handle();

        drop(stream);

        let sent = tokio::time::timeout(Duration::from_secs(5), sender.send_data(Bytes::from("{}\n")))
            .await
            .expect("send_data did not return after drop");
        assert!(sent.is_err());
        assert!(!stop.is_stopped());
    }

    #[tokio::test]
    async fn stopped_handle_closes_new_body() {
        let stop = StopHandle::new();
        stop.stop();

        let (mut sender, body) = Body::channel();
        let mut stream: TwitterStream<Item> = TwitterStream::from_body(body, stop);

        let sent = tokio::time::timeout(Duration::from_secs(5), sender.send_data(Bytes::from("{}\n")))
            .await
            .expect("send_data did not return after stop");
        assert!(sent.is_err());
        assert!(!stream.advance().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_from_another_thread() {
        let (_sender, body) = Body::channel();
        let mut stream: TwitterStream<Item> = TwitterStream::from_body(body, StopHandle::new());
        let stop = stream.stop_handle();

        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            stop.stop();
        });

        let advanced = tokio::time::timeout(Duration::from_secs(5), stream.advance())
            .await
            .expect("advance did not return after stop");
        assert!(!advanced);
        stopper.join().unwrap();
    }

    #[tokio::test]
    async fn stream_messages() {
        let stream = stream_of(vec!["\r\n{\"data\":{\"id\":\"1\"}}\r\n"]);
        let messages = stream.collect::<Vec<_>>().await;

        assert_eq!(messages.len(), 2);
        assert_eq!(*messages[0].as_ref().unwrap(), StreamMessage::Ping);
        match &messages[1] {
            Ok(StreamMessage::Data(item)) => assert_eq!(item.data.id, "1"),
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
