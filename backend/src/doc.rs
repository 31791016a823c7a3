//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: all inbound paths, the shared error schema, and the bearer
//! token security scheme. Swagger UI serves the document in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AchievementRecord, Challenge, Error, ErrorCode, Friendship, MediaObject};
use crate::inbound::http::challenges::{CreateChallengeBody, ProgressBody};
use crate::inbound::http::friends::FriendRequestBody;
use crate::inbound::http::gamification::PointsSummary;

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(
                        "Opaque token verified against the external identity provider on \
                         every request.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Fitness platform backend API",
        description = "HTTP interface for media storage, gamification, the social graph, \
                       and challenges.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::media::upload,
        crate::inbound::http::media::list,
        crate::inbound::http::media::download,
        crate::inbound::http::media::remove,
        crate::inbound::http::media::admin_list,
        crate::inbound::http::media::admin_remove,
        crate::inbound::http::gamification::achievements,
        crate::inbound::http::gamification::points,
        crate::inbound::http::friends::create_request,
        crate::inbound::http::friends::accept_request,
        crate::inbound::http::friends::list,
        crate::inbound::http::challenges::create,
        crate::inbound::http::challenges::list,
        crate::inbound::http::challenges::get,
        crate::inbound::http::challenges::progress,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        MediaObject,
        AchievementRecord,
        PointsSummary,
        Friendship,
        FriendRequestBody,
        Challenge,
        CreateChallengeBody,
        ProgressBody,
    )),
    tags(
        (name = "media", description = "Media upload, download, and listing"),
        (name = "gamification", description = "Achievements and points"),
        (name = "friends", description = "Friendship requests and edges"),
        (name = "challenges", description = "Head-to-head challenges"),
        (name = "admin", description = "Administrative media operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_registers_all_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/v1/media",
            "/api/v1/media/{key}",
            "/api/v1/admin/media/{owner}",
            "/api/v1/achievements",
            "/api/v1/points",
            "/api/v1/friends",
            "/api/v1/friends/requests",
            "/api/v1/friends/requests/{id}/accept",
            "/api/v1/challenges",
            "/api/v1/challenges/{id}",
            "/api/v1/challenges/{id}/progress",
            "/health/ready",
            "/health/live",
        ] {
            assert!(
                paths.iter().any(|path| path.as_str() == expected),
                "missing path {expected}"
            );
        }
    }

    #[test]
    fn document_registers_the_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
