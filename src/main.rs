//! Support chat administration backend
//!
//! (c) Softlandia 2025

use support_chat_admin::api;
use support_chat_admin::core::notify::ChangeNotifier;
use support_chat_admin::core::services::HandoffChatService;
use support_chat_admin::infrastructure::database::DatabaseConnection;
use support_chat_admin::infrastructure::repositories::DbChatRepository;

use axum::Router;
use axum::http::Method;
use axum::response::Html;
use axum::routing::get;
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::{error, info};
use std::env;
use tokio::runtime::{Builder, Runtime};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(web_server_task());

    Ok(())
}

async fn web_server_task() {
    dotenvy::dotenv().ok();

    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(ChangeNotifier::singleton())
        .add(DbChatRepository::scoped())
        .add(HandoffChatService::scoped())
        .build_provider()
        .unwrap();

    let connection = provider.get_required::<DatabaseConnection>();
    if let Err(e) = sqlx::migrate!().run(&**connection).await {
        error!("Error initializing database: {e}");
    }
    if let Err(e) = connection.ensure_read_column().await {
        error!("Error checking/creating read column: {e}");
    }

    let notifier = provider.get_required::<ChangeNotifier>();
    notifier.open();

    // build our application with a route
    let app = Router::new()
        .route("/", get(index))
        .nest_service(
            "/static",
            ServiceBuilder::new().service(ServeDir::new("static")),
        )
        .nest("/api", api::router())
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH])
                .allow_origin(Any),
        )
        .with_provider(provider);

    // run our app with hyper, listening globally on the configured port
    let port = env::var("PORT").unwrap_or_else(|_| "3001".to_owned());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap();
    info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();

    notifier.close();
    info!("Shutting down...");
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
