//! Folio Store - storage backends
//!
//! - [`JsonFileRepository`]: read-only content served from `<collection>.json` files
//! - [`PgStore`]: PostgreSQL for content, users and refresh tokens
//! - [`memory`]: in-process stores for tests and embedding

pub mod json;
pub mod memory;
pub mod pg;

pub use json::JsonFileRepository;
pub use memory::{MemoryRefreshTokenStore, MemoryRepository, MemoryUserStore};
pub use pg::PgStore;
