//! Comment creation and moderation.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Comment;
use quill_core::error::DomainError;
use quill_shared::dto::{CommentResponse, CreateCommentRequest, ModerateCommentRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn validate(req: &CreateCommentRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if !req.email.contains('@') {
        errors.push("email is not valid".to_string());
    }
    if req.body.trim().is_empty() {
        errors.push("body must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// POST /blog/{year}/{month}/{day}/{slug}/comments
///
/// Readers can only comment on published posts; a draft's URL behaves as if
/// the post does not exist.
pub async fn create_comment(
    state: web::Data<AppState>,
    path: web::Path<(i32, u32, u32, String)>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let (year, month, day, slug) = path.into_inner();
    let req = body.into_inner();
    validate(&req)?;

    let date = super::blog::parse_date(year, month, day, &slug)?;
    let post = state
        .posts
        .find_published_by_date_and_slug(date, &slug)
        .await?
        .ok_or(AppError::from(DomainError::PostNotFound {
            year,
            month,
            day,
            slug: slug.clone(),
        }))?;

    let comment = Comment::new(post.id, req.name, req.email, req.body);
    let saved = state.comments.create(comment).await?;

    tracing::info!(post = %post.slug, comment = %saved.id, "Comment created");

    Ok(HttpResponse::Created().json(CommentResponse {
        id: saved.id,
        name: saved.name,
        body: saved.body,
        created_at: saved.created_at.to_rfc3339(),
    }))
}

/// PUT /api/comments/{id}/active - moderation toggle.
pub async fn moderate_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ModerateCommentRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let mut comment = state.comments.find_by_id(id).await?.ok_or_else(|| {
        AppError::from(DomainError::NotFound {
            entity_type: "Comment",
            id,
        })
    })?;

    comment.set_active(body.active);
    let saved = state.comments.save(comment).await?;

    // The commenter's email stays server-side; the response mirrors what
    // readers see.
    Ok(HttpResponse::Ok().json(CommentResponse {
        id: saved.id,
        name: saved.name,
        body: saved.body,
        created_at: saved.created_at.to_rfc3339(),
    }))
}
