//! Builders assembling the HTTP state from configuration.
//!
//! Repository-backed adapters are used when a pool is available, fixtures
//! otherwise. The identity verifier has no fixture fallback in production
//! wiring: without a configured endpoint, every request is refused.

use std::sync::Arc;

use actix_web::web;

use backend::domain::ports::{
    ChallengeRepository, FixtureChallengeRepository, FixtureFriendshipRepository,
    FixtureGamificationRepository, FixtureIdentityVerifier, FixtureMediaIndexRepository,
    FriendshipRepository, GamificationRepository, IdentityVerifier, MediaIndexRepository,
    ObjectStore,
};
use backend::domain::{
    AccessGate, ChallengeService, GamificationService, MediaService, SocialGraphService,
};
use backend::inbound::http::state::HttpState;
use backend::outbound::identity::HttpIdentityVerifier;
use backend::outbound::object_store::FsObjectStore;
use backend::outbound::persistence::{
    DieselChallengeRepository, DieselFriendshipRepository, DieselGamificationRepository,
    DieselMediaIndexRepository,
};

use super::ServerConfig;

struct Repositories {
    media_index: Arc<dyn MediaIndexRepository>,
    gamification: Arc<dyn GamificationRepository>,
    friendships: Arc<dyn FriendshipRepository>,
    challenges: Arc<dyn ChallengeRepository>,
}

fn build_repositories(config: &ServerConfig) -> Repositories {
    match &config.db_pool {
        Some(pool) => Repositories {
            media_index: Arc::new(DieselMediaIndexRepository::new(pool.clone())),
            gamification: Arc::new(DieselGamificationRepository::new(pool.clone())),
            friendships: Arc::new(DieselFriendshipRepository::new(pool.clone())),
            challenges: Arc::new(DieselChallengeRepository::new(pool.clone())),
        },
        None => Repositories {
            media_index: Arc::new(FixtureMediaIndexRepository),
            gamification: Arc::new(FixtureGamificationRepository),
            friendships: Arc::new(FixtureFriendshipRepository),
            challenges: Arc::new(FixtureChallengeRepository),
        },
    }
}

fn build_verifier(config: &ServerConfig) -> std::io::Result<Arc<dyn IdentityVerifier>> {
    match &config.identity_endpoint {
        Some(endpoint) => {
            let verifier =
                HttpIdentityVerifier::with_timeout(endpoint.clone(), config.identity_timeout)
                    .map_err(|err| {
                        std::io::Error::other(format!("identity verifier construction: {err}"))
                    })?;
            Ok(Arc::new(verifier))
        }
        // Fail closed: every credential is rejected until an endpoint is
        // configured.
        None => Ok(Arc::new(FixtureIdentityVerifier)),
    }
}

/// Assemble the full HTTP state for the server.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let repos = build_repositories(config);
    let verifier = build_verifier(config)?;
    let store: Arc<dyn ObjectStore> = Arc::new(
        FsObjectStore::new(config.media_root.clone())
            .map_err(|err| std::io::Error::other(format!("object store root: {err}")))?,
    );

    let gamification = GamificationService::new(repos.gamification);
    let media = MediaService::new(store, Arc::clone(&repos.media_index), gamification.clone());
    let social = SocialGraphService::new(repos.friendships, gamification.clone());
    let challenges = ChallengeService::new(repos.challenges, social.clone(), gamification.clone());
    let gate = Arc::new(AccessGate::new(
        config.admin_emails.iter().cloned(),
        repos.media_index,
    ));

    Ok(web::Data::new(HttpState {
        verifier,
        gate,
        media,
        gamification,
        social,
        challenges,
    }))
}
