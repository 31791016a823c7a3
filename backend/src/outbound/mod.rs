//! Outbound adapters implementing domain ports against real infrastructure.

pub mod identity;
pub mod object_store;
pub mod persistence;
