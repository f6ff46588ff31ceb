//! In-memory repositories - used as the fallback when no database is
//! configured, and as the double in handler tests.
//!
//! One store backs all three ports so the comment cascade can be honoured
//! without a database. Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Author, Comment, Post, PostStatus};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthorRepository, BaseRepository, CommentRepository, PostRepository, PublishedPage,
};

/// In-memory blog store over async RwLocks.
#[derive(Default)]
pub struct InMemoryBlogStore {
    posts: RwLock<HashMap<Uuid, Post>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
    authors: RwLock<HashMap<Uuid, Author>>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sort_reverse_chronological(posts: &mut [Post]) {
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.updated_at.cmp(&a.updated_at))
        });
    }

    async fn published(&self) -> Vec<Post> {
        let posts = self.posts.read().await;
        let mut published: Vec<Post> = posts
            .values()
            .filter(|p| p.status == PostStatus::Published)
            .cloned()
            .collect();
        Self::sort_reverse_chronological(&mut published);
        published
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        self.posts.write().await.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let removed = self.posts.write().await.remove(&id);
        if removed.is_none() {
            return Err(RepoError::NotFound);
        }

        // Cascade: a post takes its comments with it.
        self.comments.write().await.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;

        let date = post.publish_date();
        let clash = posts
            .values()
            .any(|p| p.slug == post.slug && p.publish_date() == date);
        if clash {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already used on {}",
                post.slug, date
            )));
        }

        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list_published(&self, page: u64, per_page: u64) -> Result<PublishedPage, RepoError> {
        let published = self.published().await;
        let total = published.len() as u64;

        let per_page = per_page.max(1);
        let offset = (page.max(1) - 1) * per_page;
        let posts = published
            .into_iter()
            .skip(offset as usize)
            .take(per_page as usize)
            .collect();

        Ok(PublishedPage { posts, total })
    }

    async fn list_all_published(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.published().await)
    }

    async fn find_published_by_date_and_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        Ok(self
            .published()
            .await
            .into_iter()
            .find(|p| p.slug == slug && p.publish_date() == date))
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.comments.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Comment) -> Result<Comment, RepoError> {
        self.comments
            .write()
            .await
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.comments.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        self.comments
            .write()
            .await
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let comments = self.comments.read().await;
        let mut active: Vec<Comment> = comments
            .values()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(active)
    }
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        Ok(self.authors.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Author) -> Result<Author, RepoError> {
        self.authors.write().await.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.authors.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl AuthorRepository for InMemoryBlogStore {
    async fn create(&self, author: Author) -> Result<Author, RepoError> {
        let mut authors = self.authors.write().await;
        if authors.values().any(|a| a.username == author.username) {
            return Err(RepoError::Constraint(format!(
                "username '{}' already taken",
                author.username
            )));
        }
        authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Author>, RepoError> {
        Ok(self
            .authors
            .read()
            .await
            .values()
            .find(|a| a.username == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn draft(title: &str) -> Post {
        Post::new(
            Uuid::new_v4(),
            title.to_string(),
            None,
            "body".to_string(),
        )
    }

    #[tokio::test]
    async fn published_list_never_contains_drafts() {
        let store = InMemoryBlogStore::new();

        let draft_post = draft("Draft Post");
        PostRepository::create(&store, draft_post).await.unwrap();

        let mut live = draft("Live Post");
        live.publish();
        PostRepository::create(&store, live).await.unwrap();

        let page = store.list_published(1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.posts[0].slug, "live-post");
        assert!(page.posts.iter().all(|p| p.is_published()));
    }

    #[tokio::test]
    async fn duplicate_slug_on_same_date_is_rejected() {
        let store = InMemoryBlogStore::new();
        let when = Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap();

        let mut first = draft("Same Title");
        first.published_at = when;
        PostRepository::create(&store, first).await.unwrap();

        let mut second = draft("Same Title");
        second.published_at = when + Duration::hours(5);
        let err = PostRepository::create(&store, second).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn same_slug_on_different_dates_is_allowed() {
        let store = InMemoryBlogStore::new();

        let mut first = draft("Same Title");
        first.published_at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap();
        PostRepository::create(&store, first).await.unwrap();

        let mut second = draft("Same Title");
        second.published_at = Utc.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap();
        PostRepository::create(&store, second).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_to_its_comments() {
        let store = InMemoryBlogStore::new();

        let post = PostRepository::create(&store, draft("Doomed")).await.unwrap();
        let other = PostRepository::create(&store, draft("Survivor")).await.unwrap();

        let doomed_comment = Comment::new(
            post.id,
            "A".to_string(),
            "a@example.com".to_string(),
            "bye".to_string(),
        );
        let surviving_comment = Comment::new(
            other.id,
            "B".to_string(),
            "b@example.com".to_string(),
            "hi".to_string(),
        );
        CommentRepository::create(&store, doomed_comment.clone()).await.unwrap();
        CommentRepository::create(&store, surviving_comment.clone()).await.unwrap();

        BaseRepository::<Post, Uuid>::delete(&store, post.id)
            .await
            .unwrap();

        let gone: Option<Comment> = store.find_by_id(doomed_comment.id).await.unwrap();
        assert!(gone.is_none());
        let kept: Option<Comment> = store.find_by_id(surviving_comment.id).await.unwrap();
        assert!(kept.is_some());
    }

    #[tokio::test]
    async fn detail_lookup_matches_publish_date_and_slug_for_published_only() {
        let store = InMemoryBlogStore::new();

        let mut post = draft("Findable");
        post.published_at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap();
        post.publish();
        PostRepository::create(&store, post).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let hit = store
            .find_published_by_date_and_slug(date, "findable")
            .await
            .unwrap();
        assert!(hit.is_some());

        let wrong_day = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let miss = store
            .find_published_by_date_and_slug(wrong_day, "findable")
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn moderated_comments_are_hidden_from_readers() {
        let store = InMemoryBlogStore::new();
        let post = PostRepository::create(&store, draft("Commented")).await.unwrap();

        let visible = Comment::new(
            post.id,
            "A".to_string(),
            "a@example.com".to_string(),
            "fine".to_string(),
        );
        let mut hidden = Comment::new(
            post.id,
            "B".to_string(),
            "b@example.com".to_string(),
            "spam".to_string(),
        );
        hidden.set_active(false);

        CommentRepository::create(&store, visible).await.unwrap();
        CommentRepository::create(&store, hidden).await.unwrap();

        let shown = store.list_active_for_post(post.id).await.unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].name, "A");
    }

    #[tokio::test]
    async fn taken_usernames_are_rejected() {
        let store = InMemoryBlogStore::new();

        AuthorRepository::create(
            &store,
            Author::new("ana".to_string(), "ana@example.com".to_string()),
        )
        .await
        .unwrap();

        let err = AuthorRepository::create(
            &store,
            Author::new("ana".to_string(), "other@example.com".to_string()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }
}
