//! Challenge API handlers.
//!
//! ```text
//! POST /api/v1/challenges
//! GET  /api/v1/challenges
//! GET  /api/v1/challenges/{id}
//! POST /api/v1/challenges/{id}/progress {"value":123}
//! ```

use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BearerCredential, Challenge, Error};
use crate::inbound::http::auth::authenticate;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_user_id, parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/v1/challenges`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeBody {
    /// User being challenged; must be an accepted friend.
    pub challenged_id: String,
    /// Activity label, e.g. `steps`.
    pub challenge_type: String,
    /// Value a participant must reach to finish.
    pub target_value: i64,
    /// Points credited to the winner.
    pub points_reward: i32,
    /// Start of the challenge window.
    pub start_date: DateTime<Utc>,
    /// End of the challenge window.
    pub end_date: DateTime<Utc>,
}

/// Request body for `POST /api/v1/challenges/{id}/progress`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBody {
    /// The caller's latest cumulative progress value.
    pub value: i64,
}

/// Issue a challenge to an accepted friend.
#[utoipa::path(
    post,
    path = "/api/v1/challenges",
    request_body = CreateChallengeBody,
    responses(
        (status = 201, description = "Challenge created", body = Challenge),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an accepted friend", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["challenges"],
    operation_id = "createChallenge"
)]
#[post("/challenges")]
pub async fn create(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    payload: web::Json<CreateChallengeBody>,
) -> ApiResult<HttpResponse> {
    let identity = authenticate(&state, &credential).await?;
    let body = payload.into_inner();
    let challenged = parse_user_id(FieldName::new("challengedId"), &body.challenged_id)?;
    let challenge = state
        .challenges
        .create(
            &identity.id,
            &challenged,
            &body.challenge_type,
            body.target_value,
            body.points_reward,
            body.start_date,
            body.end_date,
        )
        .await?;
    Ok(HttpResponse::Created().json(challenge))
}

/// List the caller's challenges.
#[utoipa::path(
    get,
    path = "/api/v1/challenges",
    responses(
        (status = 200, description = "Caller's challenges", body = [Challenge]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["challenges"],
    operation_id = "listChallenges"
)]
#[get("/challenges")]
pub async fn list(
    state: web::Data<HttpState>,
    credential: BearerCredential,
) -> ApiResult<web::Json<Vec<Challenge>>> {
    let identity = authenticate(&state, &credential).await?;
    let challenges = state.challenges.list(&identity.id).await?;
    Ok(web::Json(challenges))
}

/// Fetch one challenge the caller participates in.
#[utoipa::path(
    get,
    path = "/api/v1/challenges/{id}",
    params(("id" = String, Path, description = "Challenge id")),
    responses(
        (status = 200, description = "Challenge", body = Challenge),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["challenges"],
    operation_id = "getChallenge"
)]
#[get("/challenges/{id}")]
pub async fn get(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    path: web::Path<String>,
) -> ApiResult<web::Json<Challenge>> {
    let identity = authenticate(&state, &credential).await?;
    let id = parse_uuid(FieldName::new("id"), &path.into_inner())?;
    let challenge = state.challenges.get(&id, &identity.id).await?;
    Ok(web::Json(challenge))
}

/// Report the caller's progress; may settle the challenge.
///
/// Reporting against a completed challenge returns the terminal row
/// unchanged.
#[utoipa::path(
    post,
    path = "/api/v1/challenges/{id}/progress",
    params(("id" = String, Path, description = "Challenge id")),
    request_body = ProgressBody,
    responses(
        (status = 200, description = "Updated challenge", body = Challenge),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["challenges"],
    operation_id = "updateChallengeProgress"
)]
#[post("/challenges/{id}/progress")]
pub async fn progress(
    state: web::Data<HttpState>,
    credential: BearerCredential,
    path: web::Path<String>,
    payload: web::Json<ProgressBody>,
) -> ApiResult<web::Json<Challenge>> {
    let identity = authenticate(&state, &credential).await?;
    let id = parse_uuid(FieldName::new("id"), &path.into_inner())?;
    let challenge = state
        .challenges
        .update_progress(&id, &identity.id, payload.value)
        .await?;
    Ok(web::Json(challenge))
}
