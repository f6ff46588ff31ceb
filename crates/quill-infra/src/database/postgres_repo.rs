//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set, TryIntoModel,
};
use uuid::Uuid;

use quill_core::domain::{Author, Comment, Post};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthorRepository, BaseRepository, CommentRepository, PostRepository, PublishedPage,
};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::{post_tag, tag};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// The UTC day window `[midnight, midnight + 1 day)` slug uniqueness and the
/// detail route are scoped to.
fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Published posts, newest first. The only projection the reader routes and
/// the sitemap consume.
pub(crate) fn published_select() -> Select<PostEntity> {
    PostEntity::find()
        .filter(post::Column::Status.eq(post::Status::Published))
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::UpdatedAt)
}

/// One published post by publish date and slug.
pub(crate) fn detail_select(date: NaiveDate, slug: &str) -> Select<PostEntity> {
    let (start, end) = day_window(date);
    PostEntity::find()
        .filter(post::Column::Status.eq(post::Status::Published))
        .filter(post::Column::Slug.eq(slug))
        .filter(post::Column::PublishedAt.gte(start))
        .filter(post::Column::PublishedAt.lt(end))
}

/// Active comments of a post, oldest first.
pub(crate) fn active_comments_select(post_id: Uuid) -> Select<CommentEntity> {
    CommentEntity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .filter(comment::Column::Active.eq(true))
        .order_by_asc(comment::Column::CreatedAt)
}

/// PostgreSQL post repository.
///
/// Posts do not go through the generic base repository: every read carries
/// the tag associations and every write keeps them in sync.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn with_tags(&self, model: post::Model) -> Result<Post, RepoError> {
        let tags = model
            .find_related(tag::Entity)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let mut domain: Post = model.into();
        domain.tags = tags.into_iter().map(|t| t.name).collect();
        Ok(domain)
    }

    /// Replace the post's tag associations, creating missing tag rows.
    async fn sync_tags(&self, post_id: Uuid, names: &[String]) -> Result<(), RepoError> {
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        for name in names {
            let existing = tag::Entity::find()
                .filter(tag::Column::Name.eq(name.as_str()))
                .one(&self.db)
                .await
                .map_err(|e| RepoError::Query(e.to_string()))?;

            let tag_id = match existing {
                Some(t) => t.id,
                None => {
                    let id = Uuid::new_v4();
                    let row = tag::ActiveModel {
                        id: Set(id),
                        name: Set(name.clone()),
                    };
                    tag::Entity::insert(row)
                        .exec(&self.db)
                        .await
                        .map_err(map_db_err)?;
                    id
                }
            };

            let assoc = post_tag::ActiveModel {
                post_id: Set(post_id),
                tag_id: Set(tag_id),
            };
            post_tag::Entity::insert(assoc)
                .exec(&self.db)
                .await
                .map_err(map_db_err)?;
        }

        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        match result {
            Some(model) => Ok(Some(self.with_tags(model).await?)),
            None => Ok(None),
        }
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let id = entity.id;
        let tags = entity.tags.clone();

        let active_model: post::ActiveModel = entity.into();
        let result = active_model.save(&self.db).await.map_err(map_db_err)?;
        let model = result
            .try_into_model()
            .map_err(|e| RepoError::Query(e.to_string()))?;

        self.sync_tags(id, &tags).await?;

        let mut saved: Post = model.into();
        saved.tags = tags;
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // Comments and tag associations go with the post via ON DELETE CASCADE.
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        // Slug uniqueness is scoped to the publish date. The functional
        // unique index is the backstop; this check produces the friendlier
        // error.
        let (start, end) = day_window(post.publish_date());
        let clash = PostEntity::find()
            .filter(post::Column::Slug.eq(post.slug.as_str()))
            .filter(post::Column::PublishedAt.gte(start))
            .filter(post::Column::PublishedAt.lt(end))
            .count(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if clash > 0 {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already used on {}",
                post.slug,
                post.publish_date()
            )));
        }

        let active_model: post::ActiveModel = post.clone().into();
        PostEntity::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        self.sync_tags(post.id, &post.tags).await?;

        Ok(post)
    }

    async fn list_published(&self, page: u64, per_page: u64) -> Result<PublishedPage, RepoError> {
        let paginator = published_select().paginate(&self.db, per_page.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let models = paginator
            .fetch_page(page.max(1) - 1)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let mut posts = Vec::with_capacity(models.len());
        for model in models {
            posts.push(self.with_tags(model).await?);
        }

        Ok(PublishedPage { posts, total })
    }

    async fn list_all_published(&self) -> Result<Vec<Post>, RepoError> {
        let models = published_select()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let mut posts = Vec::with_capacity(models.len());
        for model in models {
            posts.push(self.with_tags(model).await?);
        }
        Ok(posts)
    }

    async fn find_published_by_date_and_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let result = detail_select(date, slug)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        match result {
            Some(model) => Ok(Some(self.with_tags(model).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        let active_model: comment::ActiveModel = comment.clone().into();
        CommentEntity::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(comment)
    }

    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = active_comments_select(post_id)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn create(&self, author: Author) -> Result<Author, RepoError> {
        let active_model: author::ActiveModel = author.clone().into();
        AuthorEntity::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(author)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Author>, RepoError> {
        tracing::debug!(author = %username, "Finding author by username");

        let result = AuthorEntity::find()
            .filter(author::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}
