//! Social graph API handlers.
//!
//! ```text
//! POST /api/v1/friends/requests {"addresseeId":"..."}
//! POST /api/v1/friends/requests/{id}/accept
//! GET  /api/v1/friends
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{BearerCredential, Error, Friendship};
use crate::inbound::http::auth::authenticate;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_user_id, parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/v1/friends/requests`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    /// User the caller wants to befriend.
    pub addressee_id: String,
}

/// Send a friend request.
#[utoipa::path(
    post,
    path = "/api/v1/friends/requests",
    request_body = FriendRequestBody,
    responses(
        (status = 201, description = "Request created", body = Friendship),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Edge already exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["friends"],
    operation_id = "createFriendRequest"
)]
#[post("/friends/requests")]
pub async fn create_request(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    payload: web::Json<FriendRequestBody>,
) -> ApiResult<HttpResponse> {
    let identity = authenticate(&state, &credential).await?;
    let addressee = parse_user_id(FieldName::new("addresseeId"), &payload.addressee_id)?;
    let friendship = state.social.request(&identity.id, &addressee).await?;
    Ok(HttpResponse::Created().json(friendship))
}

/// Accept a pending friend request. Only the addressee may accept.
#[utoipa::path(
    post,
    path = "/api/v1/friends/requests/{id}/accept",
    params(("id" = String, Path, description = "Friend request id")),
    responses(
        (status = 200, description = "Request accepted", body = Friendship),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is not the addressee", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Request already settled", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["friends"],
    operation_id = "acceptFriendRequest"
)]
#[post("/friends/requests/{id}/accept")]
pub async fn accept_request(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    path: web::Path<String>,
) -> ApiResult<web::Json<Friendship>> {
    let identity = authenticate(&state, &credential).await?;
    let id = parse_uuid(FieldName::new("id"), &path.into_inner())?;
    let friendship = state.social.accept(&id, &identity.id).await?;
    Ok(web::Json(friendship))
}

/// List the caller's friendships, pending and accepted.
#[utoipa::path(
    get,
    path = "/api/v1/friends",
    responses(
        (status = 200, description = "Caller's friendships", body = [Friendship]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["friends"],
    operation_id = "listFriendships"
)]
#[get("/friends")]
pub async fn list(
    state: web::Data<HttpState>,
    credential: BearerCredential,
) -> ApiResult<web::Json<Vec<Friendship>>> {
    let identity = authenticate(&state, &credential).await?;
    let friendships = state.social.friendships(&identity.id).await?;
    Ok(web::Json(friendships))
}
