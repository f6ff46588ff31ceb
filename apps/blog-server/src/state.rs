//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{AuthorRepository, CommentRepository, PostRepository};
use quill_infra::InMemoryBlogStore;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub site_base_url: String,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            match quill_infra::database::connect(db_config).await {
                Ok(conn) => {
                    tracing::info!("Application state initialized (PostgreSQL)");
                    return Self {
                        posts: Arc::new(quill_infra::PostgresPostRepository::new(conn.clone())),
                        comments: Arc::new(quill_infra::PostgresCommentRepository::new(
                            conn.clone(),
                        )),
                        authors: Arc::new(quill_infra::PostgresAuthorRepository::new(conn)),
                        site_base_url: config.site_base_url.clone(),
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Self::in_memory(config.site_base_url.clone())
    }

    /// State backed by the in-memory store. One store instance serves all
    /// three ports so deletes cascade consistently.
    pub fn in_memory(site_base_url: String) -> Self {
        let store = Arc::new(InMemoryBlogStore::new());
        tracing::info!("Application state initialized (in-memory)");
        Self {
            posts: store.clone(),
            comments: store.clone(),
            authors: store,
            site_base_url,
        }
    }
}
