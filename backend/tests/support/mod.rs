//! Shared harness for HTTP integration suites.
//!
//! Builds the full handler stack over the in-memory adapters, so suites
//! exercise real request flows without a database or identity provider.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::test::TestRequest;
use actix_web::{web, App};

use backend::domain::{
    AccessGate, ChallengeService, GamificationService, Identity, MediaService,
    SocialGraphService, UserId,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::{challenges, friends, gamification, media};
use backend::test_support::{
    InMemoryChallengeRepository, InMemoryFriendshipRepository, InMemoryGamificationRepository,
    InMemoryMediaIndexRepository, InMemoryObjectStore, StaticIdentityVerifier,
};
use backend::Trace;

/// A registered account: the bearer token resolves to the identity.
pub struct Account {
    pub token: String,
    pub identity: Identity,
}

impl Account {
    pub fn new(token: &str, email: &str) -> Self {
        Self {
            token: token.to_owned(),
            identity: Identity {
                id: UserId::random(),
                email: email.to_owned(),
            },
        }
    }

    pub fn id(&self) -> &UserId {
        &self.identity.id
    }
}

/// Assembled state plus handles on the adapters suites inspect directly.
pub struct World {
    pub state: web::Data<HttpState>,
    pub gamification_repo: Arc<InMemoryGamificationRepository>,
}

impl World {
    /// Wire the services over fresh in-memory adapters.
    ///
    /// Tokens from `accounts` verify successfully; anything else is
    /// rejected. Admin status comes only from the allow-list.
    pub fn build(admin_emails: &[&str], accounts: &[&Account]) -> Self {
        let mut verifier = StaticIdentityVerifier::new();
        for account in accounts {
            verifier = verifier.with_identity(account.token.clone(), account.identity.clone());
        }

        let object_store = Arc::new(InMemoryObjectStore::new());
        let media_index = Arc::new(InMemoryMediaIndexRepository::new());
        let gamification_repo = Arc::new(InMemoryGamificationRepository::new());
        let friendship_repo = Arc::new(InMemoryFriendshipRepository::new());
        let challenge_repo = Arc::new(InMemoryChallengeRepository::new());

        let gamification = GamificationService::new(gamification_repo.clone());
        let media = MediaService::new(
            object_store,
            media_index.clone(),
            gamification.clone(),
        );
        let social = SocialGraphService::new(friendship_repo, gamification.clone());
        let challenge_service =
            ChallengeService::new(challenge_repo, social.clone(), gamification.clone());
        let gate = Arc::new(AccessGate::new(
            admin_emails.iter().map(|email| (*email).to_owned()),
            media_index,
        ));

        let state = web::Data::new(HttpState {
            verifier: Arc::new(verifier),
            gate,
            media,
            gamification,
            social,
            challenges: challenge_service,
        });

        Self {
            state,
            gamification_repo,
        }
    }
}

/// Application with every API route registered, mirroring the server wiring.
pub fn app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).wrap(Trace).service(
        web::scope("/api/v1")
            .service(media::upload)
            .service(media::list)
            .service(media::download)
            .service(media::remove)
            .service(media::admin_list)
            .service(media::admin_remove)
            .service(gamification::achievements)
            .service(gamification::points)
            .service(friends::create_request)
            .service(friends::accept_request)
            .service(friends::list)
            .service(challenges::create)
            .service(challenges::list)
            .service(challenges::get)
            .service(challenges::progress),
    )
}

/// Attach the account's bearer token to a request.
pub fn authed(req: TestRequest, account: &Account) -> TestRequest {
    req.insert_header((
        header::AUTHORIZATION,
        format!("Bearer {}", account.token),
    ))
}
