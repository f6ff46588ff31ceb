//! Sitemap endpoint.

use actix_web::{HttpResponse, web};

use crate::middleware::error::AppResult;
use crate::sitemap::render_sitemap;
use crate::state::AppState;

/// GET /sitemap.xml - enumerates published posts, recomputed per request.
pub async fn sitemap_xml(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_all_published().await?;
    let xml = render_sitemap(&state.site_base_url, &posts);

    Ok(HttpResponse::Ok()
        .content_type("application/xml")
        .body(xml))
}
