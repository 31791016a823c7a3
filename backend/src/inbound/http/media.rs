//! Media API handlers.
//!
//! ```text
//! POST   /api/v1/media                       (raw body, Content-Type header)
//! GET    /api/v1/media                       (caller's objects)
//! GET    /api/v1/media/{key}                 (download, gated)
//! DELETE /api/v1/media/{key}                 (gated)
//! GET    /api/v1/admin/media/{owner}         (admin listing)
//! DELETE /api/v1/admin/media/{key}           (admin delete)
//! ```
//!
//! Every read, list, and delete passes through the access gate before any
//! bytes move; denial responses carry no object content.

use actix_web::http::header;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};

use crate::domain::{BearerCredential, Error, MediaObject};
use crate::inbound::http::auth::authenticate;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_media_key, parse_user_id, FieldName};
use crate::inbound::http::ApiResult;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

fn declared_content_type(req: &HttpRequest) -> String {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| DEFAULT_CONTENT_TYPE.to_owned(), str::to_owned)
}

/// Upload a media object under the caller's prefix.
#[utoipa::path(
    post,
    path = "/api/v1/media",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Object stored", body = MediaObject),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["media"],
    operation_id = "uploadMedia"
)]
#[post("/media")]
pub async fn upload(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let identity = authenticate(&state, &credential).await?;
    let content_type = declared_content_type(&req);
    let object = state
        .media
        .put(&identity.id, &content_type, body.to_vec())
        .await?;
    Ok(HttpResponse::Created().json(object))
}

/// List the caller's media objects.
#[utoipa::path(
    get,
    path = "/api/v1/media",
    responses(
        (status = 200, description = "Caller's objects", body = [MediaObject]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["media"],
    operation_id = "listMedia"
)]
#[get("/media")]
pub async fn list(
    state: web::Data<HttpState>,
    credential: BearerCredential,
) -> ApiResult<web::Json<Vec<MediaObject>>> {
    let identity = authenticate(&state, &credential).await?;
    let objects = state.media.list(&identity.id).await?;
    Ok(web::Json(objects))
}

/// Download a media object the caller may access.
#[utoipa::path(
    get,
    path = "/api/v1/media/{key}",
    params(("key" = String, Path, description = "Storage key")),
    responses(
        (status = 200, description = "Object bytes"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["media"],
    operation_id = "downloadMedia"
)]
#[get("/media/{key:.+}")]
pub async fn download(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let identity = authenticate(&state, &credential).await?;
    let key = parse_media_key(FieldName::new("key"), &path.into_inner())?;
    state.gate.authorize(&identity, &key).await?;
    let download = state.media.get(&key).await?;
    Ok(HttpResponse::Ok()
        .content_type(download.content_type)
        .body(download.bytes))
}

/// Delete a media object the caller may access.
#[utoipa::path(
    delete,
    path = "/api/v1/media/{key}",
    params(("key" = String, Path, description = "Storage key")),
    responses(
        (status = 204, description = "Object deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["media"],
    operation_id = "deleteMedia"
)]
#[delete("/media/{key:.+}")]
pub async fn remove(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let identity = authenticate(&state, &credential).await?;
    let key = parse_media_key(FieldName::new("key"), &path.into_inner())?;
    state.gate.authorize(&identity, &key).await?;
    state.media.delete(&key).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List any user's media objects. Admin only; non-admins see `not_found`.
#[utoipa::path(
    get,
    path = "/api/v1/admin/media/{owner}",
    params(("owner" = String, Path, description = "Owner user id")),
    responses(
        (status = 200, description = "Owner's objects", body = [MediaObject]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListMedia"
)]
#[get("/admin/media/{owner}")]
pub async fn admin_list(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MediaObject>>> {
    let identity = authenticate(&state, &credential).await?;
    state.gate.require_admin(&identity)?;
    let owner = parse_user_id(FieldName::new("owner"), &path.into_inner())?;
    let objects = state.media.list(&owner).await?;
    Ok(web::Json(objects))
}

/// Delete any media object. Admin only; non-admins see `not_found`.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/media/{key}",
    params(("key" = String, Path, description = "Storage key")),
    responses(
        (status = 204, description = "Object deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteMedia"
)]
#[delete("/admin/media/{key:.+}")]
pub async fn admin_remove(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let identity = authenticate(&state, &credential).await?;
    state.gate.require_admin(&identity)?;
    let key = parse_media_key(FieldName::new("key"), &path.into_inner())?;
    state.media.delete(&key).await?;
    Ok(HttpResponse::NoContent().finish())
}
