//! Achievements and points API handlers.
//!
//! ```text
//! GET /api/v1/achievements
//! GET /api/v1/points
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};

use crate::domain::{AchievementRecord, BearerCredential, Error};
use crate::inbound::http::auth::authenticate;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Points summary for `GET /api/v1/points`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointsSummary {
    /// Sum of every ledger entry for the caller.
    pub total_points: i64,
}

/// List the caller's unlocked achievements.
#[utoipa::path(
    get,
    path = "/api/v1/achievements",
    responses(
        (status = 200, description = "Caller's achievements", body = [AchievementRecord]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["gamification"],
    operation_id = "listAchievements"
)]
#[get("/achievements")]
pub async fn achievements(
    state: web::Data<HttpState>,
    credential: BearerCredential,
) -> ApiResult<web::Json<Vec<AchievementRecord>>> {
    let identity = authenticate(&state, &credential).await?;
    let records = state.gamification.achievements(&identity.id).await?;
    Ok(web::Json(records))
}

/// Report the caller's total points.
#[utoipa::path(
    get,
    path = "/api/v1/points",
    responses(
        (status = 200, description = "Caller's points", body = PointsSummary),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["gamification"],
    operation_id = "getPoints"
)]
#[get("/points")]
pub async fn points(
    state: web::Data<HttpState>,
    credential: BearerCredential,
) -> ApiResult<web::Json<PointsSummary>> {
    let identity = authenticate(&state, &credential).await?;
    let total_points = state.gamification.total_points(&identity.id).await?;
    Ok(web::Json(PointsSummary { total_points }))
}
