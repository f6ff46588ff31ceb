//! Route-level tests against the in-memory store.

use actix_web::{App, test, web};
use serde_json::{Value, json};

use crate::handlers;
use crate::state::AppState;

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(handlers::configure_routes),
        )
        .await
    };
}

fn state() -> AppState {
    AppState::in_memory("https://example.com".to_string())
}

async fn create_author(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/authors")
        .set_json(json!({"username": "antonio", "email": "antonio@example.com"}))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);
    test::read_body_json(resp).await
}

async fn create_post_with(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    author_id: &str,
    title: &str,
    tags: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({
            "author_id": author_id,
            "title": title,
            "body": "Some body text.",
            "tags": tags,
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);
    test::read_body_json(resp).await
}

async fn publish(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    post_id: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/publish"))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200);
    test::read_body_json(resp).await
}

#[actix_web::test]
async fn health_endpoint_reports_ok() {
    let app = test_app!(state());

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn drafts_stay_out_of_the_published_list() {
    let app = test_app!(state());
    let author = create_author(&app).await;
    create_post_with(&app, author["id"].as_str().unwrap(), "Hidden Draft", json!([])).await;

    let req = test::TestRequest::get().uri("/blog/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn publishing_makes_a_post_listable_and_fetchable() {
    let app = test_app!(state());
    let author = create_author(&app).await;
    let post = create_post_with(
        &app,
        author["id"].as_str().unwrap(),
        "Hello World",
        json!(["rust", "blog"]),
    )
    .await;

    let published = publish(&app, post["id"].as_str().unwrap()).await;
    assert_eq!(published["status"], "published");

    let req = test::TestRequest::get().uri("/blog/").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["slug"], "hello-world");

    // The canonical URL the list hands out resolves to the detail view.
    let url = body["items"][0]["url"].as_str().unwrap().to_string();
    let req = test::TestRequest::get().uri(&url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let detail: Value = test::read_body_json(resp).await;
    assert_eq!(detail["title"], "Hello World");
    assert_eq!(detail["tags"], json!(["blog", "rust"]));
}

#[actix_web::test]
async fn unknown_date_slug_combinations_return_404() {
    let app = test_app!(state());

    let req = test::TestRequest::get()
        .uri("/blog/2024/3/7/no-such-post/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // An impossible calendar date is an unknown URL, not a server error.
    let req = test::TestRequest::get()
        .uri("/blog/2024/13/40/slug/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn draft_detail_urls_behave_as_missing() {
    let app = test_app!(state());
    let author = create_author(&app).await;
    let post = create_post_with(&app, author["id"].as_str().unwrap(), "Sneaky", json!([])).await;

    let url = post["url"].as_str().unwrap().to_string();
    let req = test::TestRequest::get().uri(&url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn duplicate_slug_on_the_same_date_conflicts() {
    let app = test_app!(state());
    let author = create_author(&app).await;
    let author_id = author["id"].as_str().unwrap().to_string();
    create_post_with(&app, &author_id, "Same Title", json!([])).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({
            "author_id": author_id,
            "title": "Same Title",
            "body": "Again.",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 409);
}

#[actix_web::test]
async fn comments_flow_create_moderate_and_cascade() {
    let app = test_app!(state());
    let author = create_author(&app).await;
    let post = create_post_with(&app, author["id"].as_str().unwrap(), "Discussed", json!([])).await;
    let post_id = post["id"].as_str().unwrap().to_string();
    publish(&app, &post_id).await;
    let url = post["url"].as_str().unwrap().to_string();

    // Readers comment on the published post.
    let req = test::TestRequest::post()
        .uri(&format!("{url}comments"))
        .set_json(json!({
            "name": "Reader",
            "email": "reader@example.com",
            "body": "Great write-up."
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let comment: Value = test::read_body_json(resp).await;
    let comment_id = comment["id"].as_str().unwrap().to_string();
    assert!(comment.get("email").is_none());

    // The comment shows up on the detail view.
    let req = test::TestRequest::get().uri(&url).to_request();
    let detail: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);

    // Moderating it away hides it from readers. The moderation response is
    // the reader-facing shape; the commenter's email never leaves the API.
    let req = test::TestRequest::put()
        .uri(&format!("/api/comments/{comment_id}/active"))
        .set_json(json!({"active": false}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let moderated: Value = test::read_body_json(resp).await;
    assert_eq!(moderated["id"].as_str().unwrap(), comment_id);
    assert!(moderated.get("email").is_none());

    let req = test::TestRequest::get().uri(&url).to_request();
    let detail: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 0);

    // Deleting the post takes the comment with it.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);

    let req = test::TestRequest::put()
        .uri(&format!("/api/comments/{comment_id}/active"))
        .set_json(json!({"active": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn oversized_page_sizes_are_clamped() {
    let app = test_app!(state());
    let author = create_author(&app).await;
    let post = create_post_with(&app, author["id"].as_str().unwrap(), "Single", json!([])).await;
    publish(&app, post["id"].as_str().unwrap()).await;

    let req = test::TestRequest::get()
        .uri("/blog/?per_page=100000")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["per_page"], 100);
    assert_eq!(body["total"], 1);
}

#[actix_web::test]
async fn comment_input_is_validated() {
    let app = test_app!(state());
    let author = create_author(&app).await;
    let post = create_post_with(&app, author["id"].as_str().unwrap(), "Strict", json!([])).await;
    let post_id = post["id"].as_str().unwrap().to_string();
    publish(&app, &post_id).await;
    let url = post["url"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("{url}comments"))
        .set_json(json!({"name": "", "email": "not-an-email", "body": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
}

#[actix_web::test]
async fn sitemap_lists_published_posts_only() {
    let app = test_app!(state());
    let author = create_author(&app).await;
    let author_id = author["id"].as_str().unwrap().to_string();

    let live = create_post_with(&app, &author_id, "Public Post", json!([])).await;
    publish(&app, live["id"].as_str().unwrap()).await;
    create_post_with(&app, &author_id, "Secret Draft", json!([])).await;

    let req = test::TestRequest::get().uri("/sitemap.xml").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/xml"
    );

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("public-post"));
    assert!(!body.contains("secret-draft"));
    assert!(body.contains("https://example.com/blog/"));
}
