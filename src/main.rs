use dotenvy::dotenv;
use std::sync::Arc;

use blog_api::application::PostService;
use blog_api::data::SqlitePostRepository;
use blog_api::infrastructure::{
    database::{create_pool, run_migrations},
    logging::init_logging,
};
use blog_api::presentation::{http_handlers, images, images::ImageStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    init_logging();

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://blog.db?mode=rwc".to_string());
    let http_port = std::env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());
    let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());

    // Получаем разрешенные CORS домены из .env
    let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let http_addr = format!("0.0.0.0:{}", http_port);

    tracing::info!("Starting blog API server...");
    tracing::info!("HTTP server will listen on {}", http_addr);
    tracing::info!("CORS allowed origins: {}", cors_allowed_origins);

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;
    tracing::info!("Migrations completed successfully");

    // Initialize services
    tracing::info!("Initializing services...");

    let post_repo = Arc::new(SqlitePostRepository::new(pool));
    let post_service = Arc::new(PostService::new(post_repo));
    let image_store = ImageStore::new(&upload_dir)?;

    tracing::info!("Services initialized, uploads stored in {}", upload_dir);

    run_http_server(http_addr, post_service, image_store, cors_allowed_origins).await
}

/// Configure CORS for the HTTP server with allowed origins from .env
fn configure_cors(allowed_origins: &str) -> actix_cors::Cors {
    use actix_cors::Cors;
    use actix_web::http::header;

    let origins: Vec<&str> = allowed_origins.split(',').map(|s| s.trim()).collect();

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600);

    // Добавляем каждый разрешенный домен
    for origin in origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
            tracing::debug!("Added allowed CORS origin: {}", origin);
        }
    }

    cors
}

async fn run_http_server(
    addr: String,
    post_service: Arc<PostService>,
    image_store: ImageStore,
    cors_allowed_origins: String,
) -> anyhow::Result<()> {
    use actix_web::{middleware::Logger, web, App, HttpServer};

    tracing::info!("Configuring HTTP server...");

    let image_store = web::Data::new(image_store);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(configure_cors(&cors_allowed_origins))
            .app_data(web::Data::new(post_service.clone()))
            .app_data(image_store.clone())
            .service(
                web::scope("/api/posts")
                    // Literal segments must be registered before the {id} routes
                    .route("/upload-image", web::post().to(images::upload_image))
                    .route("/images/{filename}", web::get().to(images::get_image))
                    .route("", web::get().to(http_handlers::list_posts))
                    .route("", web::post().to(http_handlers::create_post))
                    .route("/{id}", web::get().to(http_handlers::get_post))
                    .route("/{id}", web::put().to(http_handlers::update_post))
                    .route("/{id}", web::delete().to(http_handlers::delete_post)),
            )
            .route("/", web::get().to(http_handlers::root))
            .route("/health", web::get().to(http_handlers::health))
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
