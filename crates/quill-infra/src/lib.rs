//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//!
//! The in-memory repositories are always built; they back the no-database
//! fallback mode and the handler tests.

pub mod database;
pub mod memory;

pub use database::DatabaseConfig;
pub use memory::InMemoryBlogStore;

#[cfg(feature = "postgres")]
pub use database::{
    PostgresAuthorRepository, PostgresCommentRepository, PostgresPostRepository,
};
