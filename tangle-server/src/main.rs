use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tangle_server::{api, config, db, state::AppState};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tangle_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load settings
    let settings = config::Settings::new().expect("Failed to load settings");

    // Initialize database
    let db = db::Database::new(&settings.database.path).expect("Failed to create database");
    db.initialize()
        .expect("Failed to initialize database schema");
    tracing::info!("Database initialized successfully");

    // Create application state
    let state = AppState::new(db);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // User routes
        .route("/users", post(api::users::create_user))
        .route("/users", get(api::users::list_users))
        .route("/users/:id/posts", get(api::posts::get_user_posts))
        .route("/users/:id/followers", get(api::social::get_followers))
        .route("/users/:id/following", get(api::social::get_following))
        .route("/users/:id/feed", get(api::social::get_feed))
        .route("/users/:id/follow/:target_id", post(api::social::follow_user))
        // Post routes
        .route("/posts", post(api::posts::create_post))
        .route("/posts/search", get(api::posts::search_posts))
        .route("/posts/:id", delete(api::posts::delete_post))
        .route("/posts/:id/comments", get(api::comments::get_post_comments))
        .route("/posts/:id/likes", get(api::posts::get_post_likes))
        .route("/posts/:id/likes/:user_id", post(api::posts::like_post))
        // Comment routes
        .route("/comments", post(api::comments::create_comment))
        // Tag routes
        .route("/tags", post(api::tags::tag_post))
        .route("/tags/:name/posts", get(api::tags::get_posts_by_tag))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .expect("Failed to parse server address");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}

async fn health_check() -> &'static str {
    "OK"
}
