//! Domain ports: trait seams between services and adapters.
//!
//! Each port ships a `Fixture*` implementation for tests that do not care
//! about the port's behaviour, and a mockall mock (test builds only) for
//! tests that do.

mod challenge_repository;
mod friendship_repository;
mod gamification_repository;
mod identity_verifier;
pub(crate) mod macros;
mod media_index_repository;
mod object_store;

pub(crate) use macros::define_port_error;

pub use challenge_repository::{
    ChallengeRepository, ChallengeRepositoryError, FixtureChallengeRepository,
};
pub use friendship_repository::{
    FixtureFriendshipRepository, FriendshipRepository, FriendshipRepositoryError,
};
pub use gamification_repository::{
    FixtureGamificationRepository, GamificationRepository, GamificationRepositoryError,
};
pub use identity_verifier::{
    FixtureIdentityVerifier, IdentityVerifier, IdentityVerifierError,
};
pub use media_index_repository::{
    FixtureMediaIndexRepository, MediaIndexRepository, MediaIndexRepositoryError,
};
pub use object_store::{FixtureObjectStore, ObjectStore, ObjectStoreError};

#[cfg(test)]
pub use challenge_repository::MockChallengeRepository;
#[cfg(test)]
pub use friendship_repository::MockFriendshipRepository;
#[cfg(test)]
pub use gamification_repository::MockGamificationRepository;
#[cfg(test)]
pub use identity_verifier::MockIdentityVerifier;
#[cfg(test)]
pub use media_index_repository::MockMediaIndexRepository;
#[cfg(test)]
pub use object_store::MockObjectStore;
