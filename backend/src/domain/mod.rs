//! Domain layer: entities, services, and the ports they depend on.
//!
//! Services hold `Arc<dyn Port>` trait objects so inbound adapters and tests
//! can swap persistence and transport implementations freely.

pub mod access;
pub mod challenges;
pub mod error;
pub mod gamification;
pub mod identity;
pub mod media;
pub mod ports;
pub mod social;

pub use access::AccessGate;
pub use challenges::{Challenge, ChallengeService, ChallengeSide, ChallengeStatus};
pub use error::{Error, ErrorCode};
pub use gamification::{
    challenge_reward_reason, AchievementCode, AchievementRecord, AwardOutcome,
    GamificationService,
};
pub use identity::{BearerCredential, Identity, IdentityValidationError, UserId};
pub use media::{
    generate_media_key, MediaDownload, MediaKey, MediaObject, MediaService,
};
pub use social::{FriendPair, Friendship, FriendshipStatus, SocialGraphService};
