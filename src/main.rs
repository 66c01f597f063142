use std::sync::Arc;

use axum::http::Method;
use axum::{Router, routing::get};
use clap::Parser;
use redaktion::assets::serve_embedded;
use redaktion::config::{Cli, Config, default_config_path};
use redaktion::github::GithubClient;
use redaktion::handler::{AppState, healthcheck};
use redaktion::{articles, media, posts};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let config_path = match args.config_path {
        Some(path) => std::path::PathBuf::from(path),
        None => default_config_path(),
    };

    tracing_subscriber::fmt().json().init();
    tracing::info!("redaktion.svc starting");

    let cfg = Config::new(config_path.to_str().unwrap()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });
    let cfg = Arc::new(cfg);

    let github = Arc::new(GithubClient::new(&cfg.github).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to build github client");
        std::process::exit(1);
    }));

    // Fail fast on a bad token or repo instead of on the first edit.
    if let Err(e) = github.ping().await {
        tracing::error!(error = %e, "github repository is not reachable");
        std::process::exit(1);
    }

    let address = format!("0.0.0.0:{}", cfg.app.get_port());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(healthcheck))
        .nest("/articles", articles::routes())
        .nest("/posts", posts::routes())
        .nest(
            "/media",
            media::routes().layer(axum::extract::DefaultBodyLimit::max(media::body_limit(
                cfg.upload.max_size_bytes,
            ))),
        )
        .fallback(serve_embedded)
        .layer(cors)
        .with_state(AppState { github, cfg });

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("redaktion.svc running on {}", &address);
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server stopped unexpectedly");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, shutting down");
        }
    }

    tracing::info!("redaktion.svc going off, graceful shutdown complete");
}
