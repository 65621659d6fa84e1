// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use hyper::Method;

use crate::common::*;
use crate::error;
use crate::links;
use crate::user::User;
use crate::Client;

use super::*;

/// Look up information for a single list.
pub async fn show(client: &Client, params: &ListLookup) -> error::Result<Response<ApiResponse<List>>> {
    client.call(Method::GET, links::lists::SHOW, params).await
}

/// Create a new list owned by the authenticated user.
///
/// Twitter only sends back the new list's `id` and `name`.
pub async fn create(client: &Client, draft: &CreateList) -> error::Result<Response<ApiResponse<List>>> {
    client.call(Method::POST, links::lists::CREATE, draft).await
}

/// Delete a list owned by the authenticated user.
pub async fn delete(client: &Client, params: &DeleteList) -> error::Result<Response<ApiResponse<DeletedList>>> {
    client.call(Method::DELETE, links::lists::DELETE, params).await
}

/// Look up the users that have been added to the given list.
pub async fn members(client: &Client, params: &ListMembers) -> error::Result<Response<ApiResponse<Vec<User>, PageMeta>>> {
    client.call(Method::GET, links::lists::MEMBERS, params).await
}

/// Look up the lists owned by the given user.
pub async fn owned(client: &Client, params: &OwnedLists) -> error::Result<Response<ApiResponse<Vec<List>, PageMeta>>> {
    client.call(Method::GET, links::lists::OWNED, params).await
}
