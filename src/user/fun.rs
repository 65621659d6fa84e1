// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use hyper::Method;

use crate::common::*;
use crate::error;
use crate::links;
use crate::Client;

use super::*;

/// Lookup a single user by ID.
pub async fn show(client: &Client, params: &UserLookup) -> error::Result<Response<ApiResponse<User>>> {
    client.call(Method::GET, links::users::SHOW, params).await
}

/// Lookup a set of users by ID.
pub async fn lookup(client: &Client, params: &UsersLookup) -> error::Result<Response<ApiResponse<Vec<User>>>> {
    client.call(Method::GET, links::users::LOOKUP, params).await
}

/// Lookup a single user by username.
pub async fn show_by_username(
    client: &Client,
    params: &UserByUsername,
) -> error::Result<Response<ApiResponse<User>>> {
    client.call(Method::GET, links::users::SHOW_BY_USERNAME, params).await
}

/// Lookup the user the client is authorized as. The `id` in `params` is not used.
pub async fn me(client: &Client, params: &UserLookup) -> error::Result<Response<ApiResponse<User>>> {
    client.call(Method::GET, links::users::ME, params).await
}
