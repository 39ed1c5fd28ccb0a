// Server related imports
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

// General imports
use anyhow::{Context, Result};
use tokio::net::TcpListener;

// From lib
use super::{server_config::ServerConfig, server_state::ServerState};
use crate::handlers::{
    chat::chat_with_document,
    document::{get_document, search_document, upload_pdf},
    health::health_check,
    uploads::serve_uploaded_pdf,
};

/// Upload body cap, matching the original 50 MiB multer limit
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub struct AppBuilder {
    pub app: Router,
}

impl AppBuilder {
    pub fn new(state: ServerState) -> Self {
        // Router
        let app: Router = Router::new()
            .route(
                "/api/document/upload",
                post(upload_pdf).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
            )
            .route("/api/document/search", post(search_document))
            .route("/api/document/{file_id}", get(get_document))
            .route("/api/chat", post(chat_with_document))
            .route("/api/health", get(health_check))
            .route("/uploads/{file_name}", get(serve_uploaded_pdf))
            .with_state(state);
        Self { app }
    }

    pub fn with_trace_layer(self) -> Self {
        Self {
            app: self.app.layer(TraceLayer::new_for_http()),
        }
    }

    /// Restrict the JSON endpoints to the configured origin allow-list.
    /// The static /uploads responses set their own wildcard header.
    pub fn with_cors_layer(self, allowed_origins: &[String]) -> Self {
        let allow_origin = AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        );
        let cors_layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE])
            .allow_origin(allow_origin);
        Self {
            app: self.app.layer(cors_layer),
        }
    }

    pub fn build(self) -> Router {
        self.app
    }
}

pub struct Server {
    /// Server configuration
    config: ServerConfig,
}

impl Server {
    /// Create a new server from a configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Run the server
    pub async fn run(&self) -> Result<()> {
        // Already-existing directories are fine; concurrent creation is too
        tokio::fs::create_dir_all(&self.config.upload_dir)
            .await
            .with_context(|| format!("creating upload dir {}", self.config.upload_dir))?;

        let state = ServerState::new(&self.config);
        let app: Router = AppBuilder::new(state)
            .with_trace_layer()
            .with_cors_layer(&self.config.allowed_origins)
            .build();

        tracing::debug!("listening on {}", self.config.address);
        let listener = TcpListener::bind(&self.config.address)
            .await
            .with_context(|| format!("binding {}", self.config.address))?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}
