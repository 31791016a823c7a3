//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` connection pooling.
//!
//! Adapters stay thin: they translate between Diesel rows and domain types
//! and map database failures onto the port error enums. Row structs and the
//! schema are internal and never leak past this module. State transitions
//! with at-most-once semantics (awards, friendship acceptance, challenge
//! completion) are expressed as conditional SQL so the database arbitrates
//! races, not the application.

mod diesel_basic_error_mapping;
mod diesel_challenge_repository;
mod diesel_friendship_repository;
mod diesel_gamification_repository;
mod diesel_media_index_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_challenge_repository::DieselChallengeRepository;
pub use diesel_friendship_repository::DieselFriendshipRepository;
pub use diesel_gamification_repository::DieselGamificationRepository;
pub use diesel_media_index_repository::DieselMediaIndexRepository;
pub use migrations::{run_pending_migrations, MigrationError, MIGRATIONS};
pub use pool::{DbPool, PoolConfig, PoolError};
