use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Author, Comment, Post};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// A page of published posts plus the total published count.
#[derive(Debug, Clone)]
pub struct PublishedPage {
    pub posts: Vec<Post>,
    pub total: u64,
}

/// Post repository.
///
/// The published-only finders are the sole query surface used by the reader
/// routes and the sitemap; drafts are reachable only through the base CRUD.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Create a post, rejecting a slug already taken on the same publish
    /// date with `RepoError::Constraint`.
    async fn create(&self, post: Post) -> Result<Post, RepoError>;

    /// One page of published posts, newest first. Pages are 1-based.
    async fn list_published(&self, page: u64, per_page: u64) -> Result<PublishedPage, RepoError>;

    /// All published posts, newest first (sitemap enumeration).
    async fn list_all_published(&self) -> Result<Vec<Post>, RepoError>;

    /// Look up one published post by its UTC publish date and slug.
    async fn find_published_by_date_and_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Persist a brand-new comment. `save` is for updates of existing rows
    /// (moderation); a fresh row must go through an insert.
    async fn create(&self, comment: Comment) -> Result<Comment, RepoError>;

    /// Comments visible to readers: active only, oldest first.
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// Author repository.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    /// Persist a brand-new author, rejecting a taken username with
    /// `RepoError::Constraint`.
    async fn create(&self, author: Author) -> Result<Author, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Author>, RepoError>;
}
