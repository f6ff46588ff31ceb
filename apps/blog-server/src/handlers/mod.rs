//! HTTP handlers and route configuration.

pub mod blog;
pub mod comments;
pub mod editorial;
pub mod health;
pub mod sitemap;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Reader routes
        .service(
            web::scope("/blog")
                .route("/", web::get().to(blog::list_posts))
                .route(
                    "/{year}/{month}/{day}/{slug}/",
                    web::get().to(blog::post_detail),
                )
                .route(
                    "/{year}/{month}/{day}/{slug}/comments",
                    web::post().to(comments::create_comment),
                ),
        )
        .route("/sitemap.xml", web::get().to(sitemap::sitemap_xml))
        // Editorial + operational routes
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .route("/authors", web::post().to(editorial::create_author))
                .route("/posts", web::post().to(editorial::create_post))
                .route(
                    "/posts/{id}/publish",
                    web::post().to(editorial::publish_post),
                )
                .route("/posts/{id}", web::delete().to(editorial::delete_post))
                .route(
                    "/comments/{id}/active",
                    web::put().to(comments::moderate_comment),
                ),
        );
}
