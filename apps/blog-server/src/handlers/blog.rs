//! Reader-facing post routes.

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;

use quill_core::domain::{Comment, Post};
use quill_core::error::DomainError;
use quill_shared::Page;
use quill_shared::dto::{CommentResponse, PageQuery, PostDetail, PostSummary};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub(crate) fn summary(post: &Post) -> PostSummary {
    PostSummary {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        url: post.canonical_path(),
        published_at: post.published_at.to_rfc3339(),
        tags: post.tags.clone(),
    }
}

pub(crate) fn detail(post: &Post, comments: &[Comment]) -> PostDetail {
    PostDetail {
        id: post.id,
        author_id: post.author_id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        url: post.canonical_path(),
        body: post.body.clone(),
        status: post.status.to_string(),
        published_at: post.published_at.to_rfc3339(),
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
        tags: post.tags.clone(),
        comments: comments
            .iter()
            .map(|c| CommentResponse {
                id: c.id,
                name: c.name.clone(),
                body: c.body.clone(),
                created_at: c.created_at.to_rfc3339(),
            })
            .collect(),
    }
}

/// Resolve the date segments of a detail URL; an impossible date is just an
/// unknown URL, i.e. 404.
pub(crate) fn parse_date(year: i32, month: u32, day: u32, slug: &str) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        DomainError::PostNotFound {
            year,
            month,
            day,
            slug: slug.to_string(),
        }
        .into()
    })
}

/// A page can never request more rows than this, whatever the query says.
const MAX_PER_PAGE: u64 = 100;

/// GET /blog/ - published posts, newest first.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let per_page = q.per_page.clamp(1, MAX_PER_PAGE);
    let page = state.posts.list_published(q.page, per_page).await?;

    let items: Vec<PostSummary> = page.posts.iter().map(summary).collect();
    Ok(HttpResponse::Ok().json(Page::new(items, q.page, per_page, page.total)))
}

/// GET /blog/{year}/{month}/{day}/{slug}/ - one published post with its
/// active comments, or 404.
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<(i32, u32, u32, String)>,
) -> AppResult<HttpResponse> {
    let (year, month, day, slug) = path.into_inner();
    let date = parse_date(year, month, day, &slug)?;

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

    let comments = state.comments.list_active_for_post(post.id).await?;

    Ok(HttpResponse::Ok().json(detail(&post, &comments)))
}
