//! Editorial routes - the write side the admin UI would normally drive.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Author, Post};
use quill_core::error::DomainError;
use quill_shared::dto::{CreateAuthorRequest, CreatePostRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/authors
pub async fn create_author(
    state: web::Data<AppState>,
    body: web::Json<CreateAuthorRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.username.trim().is_empty() {
        return Err(AppError::BadRequest("username must not be empty".to_string()));
    }
    if state.authors.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "author '{}' already exists",
            req.username
        )));
    }

    let author = Author::new(req.username, req.email);
    let saved = state.authors.create(author).await?;

    Ok(HttpResponse::Created().json(saved))
}

/// POST /api/posts - create a draft.
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }

    state
        .authors
        .find_by_id(req.author_id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(format!("unknown author {}", req.author_id))
        })?;

    let mut post = Post::new(req.author_id, req.title, req.slug, req.body);
    post.tags = req
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    post.tags.sort();
    post.tags.dedup();

    // A duplicate (publish-date, slug) pair comes back as RepoError::Constraint
    // and surfaces as 409.
    let created = state.posts.create(post).await?;

    tracing::info!(post = %created.slug, "Draft created");

    Ok(HttpResponse::Created().json(crate::handlers::blog::detail(&created, &[])))
}

/// POST /api/posts/{id}/publish - draft -> published.
pub async fn publish_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let mut post = state.posts.find_by_id(id).await?.ok_or_else(|| {
        AppError::from(DomainError::NotFound {
            entity_type: "Post",
            id,
        })
    })?;

    post.publish();
    let saved = state.posts.save(post).await?;

    tracing::info!(post = %saved.slug, url = %saved.canonical_path(), "Post published");

    Ok(HttpResponse::Ok().json(crate::handlers::blog::detail(&saved, &[])))
}

/// DELETE /api/posts/{id} - comments go with the post.
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.delete(id).await?;

    tracing::info!(post = %id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}
