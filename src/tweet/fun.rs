// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use hyper::Method;

use crate::common::*;
use crate::error;
use crate::links;
use crate::Client;

use super::*;

/// Lookup a single tweet by ID.
pub async fn show(client: &Client, params: &TweetLookup) -> error::Result<Response<ApiResponse<Tweet>>> {
    client.call(Method::GET, links::tweets::SHOW, params).await
}

/// Lookup tweet information for the given list of tweet IDs.
///
/// Tweets that couldn't be loaded are reported in the response's `errors`, next to the ones that
/// could; see `PartialErrors`.
pub async fn lookup(client: &Client, params: &TweetsLookup) -> error::Result<Response<ApiResponse<Vec<Tweet>>>> {
    client.call(Method::GET, links::tweets::LOOKUP, params).await
}

/// Post a new tweet as the authenticated user.
///
/// This needs user-context authorization; Twitter rejects it with a bearer token.
pub async fn create(client: &Client, draft: &CreateTweet) -> error::Result<Response<ApiResponse<Tweet>>> {
    client.call(Method::POST, links::tweets::CREATE, draft).await
}

/// Delete a tweet the authenticated user posted.
pub async fn delete(client: &Client, params: &DeleteTweet) -> error::Result<Response<ApiResponse<DeletedTweet>>> {
    client.call(Method::DELETE, links::tweets::DELETE, params).await
}

/// Load the tweets posted by the given user, most recent first.
pub async fn user_timeline(
    client: &Client,
    params: &UserTimeline,
) -> error::Result<Response<ApiResponse<Vec<Tweet>, TimelineMeta>>> {
    client.call(Method::GET, links::tweets::USER_TIMELINE, params).await
}

/// Load the tweets mentioning the given user, most recent first.
pub async fn mentions(
    client: &Client,
    params: &UserMentions,
) -> error::Result<Response<ApiResponse<Vec<Tweet>, TimelineMeta>>> {
    client.call(Method::GET, links::tweets::USER_MENTIONS, params).await
}
