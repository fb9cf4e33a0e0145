use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use blog_api::application::PostService;
use blog_api::data::SqlitePostRepository;
use blog_api::infrastructure::database::run_migrations;
use blog_api::presentation::{http_handlers, images, images::ImageStore};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tempfile::TempDir;

async fn app_data() -> (web::Data<Arc<PostService>>, web::Data<ImageStore>, TempDir) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();

    let service = Arc::new(PostService::new(Arc::new(SqlitePostRepository::new(pool))));
    let upload_dir = TempDir::new().unwrap();
    let store = ImageStore::new(upload_dir.path()).unwrap();

    (web::Data::new(service), web::Data::new(store), upload_dir)
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/posts")
            .route("/upload-image", web::post().to(images::upload_image))
            .route("/images/{filename}", web::get().to(images::get_image))
            .route("", web::get().to(http_handlers::list_posts))
            .route("", web::post().to(http_handlers::create_post))
            .route("/{id}", web::get().to(http_handlers::get_post))
            .route("/{id}", web::put().to(http_handlers::update_post))
            .route("/{id}", web::delete().to(http_handlers::delete_post)),
    )
    .route("/health", web::get().to(http_handlers::health));
}

#[actix_rt::test]
async fn create_then_get_post() {
    let (service, store, _dir) = app_data().await;
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(store)
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(serde_json::json!({
            "title": "Hello",
            "content": "post body",
            "tags": ["rust", "web"]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let created: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(created["title"], "Hello");
    assert_eq!(created["author"], "Anonymous");
    assert_eq!(created["excerpt"], "post body...");
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let fetched: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(fetched["tags"], serde_json::json!(["rust", "web"]));
}

#[actix_rt::test]
async fn missing_post_maps_to_404() {
    let (service, store, _dir) = app_data().await;
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(store)
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/posts/no-such-id")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri("/api/posts/no-such-id")
        .set_json(serde_json::json!({ "title": "T" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn delete_maps_to_204_then_404() {
    let (service, store, _dir) = app_data().await;
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(store)
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(serde_json::json!({ "title": "Doomed", "content": "c" }))
        .to_request();
    let created: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn invalid_read_time_maps_to_400() {
    let (service, store, _dir) = app_data().await;
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(store)
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(serde_json::json!({
            "title": "T",
            "content": "c",
            "read_time": 121
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn missing_image_maps_to_404() {
    let (service, store, _dir) = app_data().await;
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(store)
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/posts/images/nope.png")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn health_endpoint_responds() {
    let (service, store, _dir) = app_data().await;
    let app = test::init_service(
        App::new()
            .app_data(service)
            .app_data(store)
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["status"], "healthy");
}
