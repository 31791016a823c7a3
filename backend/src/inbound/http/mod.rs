//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod challenges;
pub mod error;
pub mod friends;
pub mod gamification;
pub mod health;
pub mod media;
pub mod state;
pub mod validation;

pub use error::ApiResult;
