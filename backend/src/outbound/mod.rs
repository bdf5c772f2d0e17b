//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: in-memory catalogue, user and loan stores
//! - **security**: Argon2id password hashing
//!
//! Adapters are thin translators between domain types and whatever backs
//! them. They contain no business logic.

pub mod memory;
pub mod security;
