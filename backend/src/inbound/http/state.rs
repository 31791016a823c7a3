//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data`, so they depend
//! only on domain services and ports and stay testable without real I/O.

use std::sync::Arc;

use crate::domain::ports::IdentityVerifier;
use crate::domain::{
    AccessGate, ChallengeService, GamificationService, MediaService, SocialGraphService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Resolves bearer credentials against the external provider.
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Decides media access for every read, list, and delete.
    pub gate: Arc<AccessGate>,
    /// Media blobs and their index.
    pub media: MediaService,
    /// Achievements and the points ledger.
    pub gamification: GamificationService,
    /// Friendship edges.
    pub social: SocialGraphService,
    /// Head-to-head challenges.
    pub challenges: ChallengeService,
}
