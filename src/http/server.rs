//! Static asset server.
//!
//! # Responsibilities
//! - Create the Axum router for the asset port
//! - Answer `/favicon.ico` from memory
//! - Run the request router and rewrite the URI before the static layer
//! - Shape the static layer's response (no-cache, redirects, MIME)
//!
//! # Design Decisions
//! - The static layer is a `ServeDir` fallback rooted at `root_dir`
//! - Routing runs as middleware, so any fallback service can sit below it
//! - Requests other than GET/HEAD reach the fallback untouched

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{HeaderValue, Method, Uri},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::response::{
    apply_mime_override, bad_target_response, favicon_response, render_response,
    restore_redirect, set_no_cache,
};
use crate::observability::metrics;
use crate::routing::{RequestRouter, RouteOutcome};

/// Shared state for the asset middleware.
#[derive(Clone)]
pub struct AssetState {
    pub router: Arc<RequestRouter>,
    pub mime_overrides: Arc<HashMap<String, HeaderValue>>,
    pub favicon: Option<Bytes>,
}

impl AssetState {
    /// Build state from configuration, reading the favicon from disk.
    pub fn from_config(config: &ServerConfig, router: Arc<RequestRouter>) -> Self {
        Self {
            router,
            mime_overrides: Arc::new(mime_table(&config.mime_overrides)),
            favicon: load_favicon(&config.favicon_file()),
        }
    }
}

/// HTTP server for the asset port.
pub struct AssetServer {
    router: Router,
}

impl AssetServer {
    pub fn new(config: &ServerConfig, router: Arc<RequestRouter>) -> Self {
        let state = AssetState::from_config(config, router);
        let app = Router::new().fallback_service(ServeDir::new(&config.root_dir));

        Self {
            router: Self::wrap(app, state),
        }
    }

    /// Layer favicon handling, routing and tracing over `app`.
    pub fn wrap(app: Router, state: AssetState) -> Router {
        app.layer(middleware::from_fn_with_state(state.clone(), route_request))
            .layer(middleware::from_fn_with_state(state, serve_favicon))
            .layer(TraceLayer::new_for_http())
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Asset server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Asset server stopped");
        Ok(())
    }
}

async fn serve_favicon(State(state): State<AssetState>, request: Request, next: Next) -> Response {
    let is_read = request.method() == Method::GET || request.method() == Method::HEAD;
    match &state.favicon {
        Some(icon) if is_read && request.uri().path() == "/favicon.ico" => {
            favicon_response(icon, request.method())
        }
        _ => next.run(request).await,
    }
}

async fn route_request(
    State(state): State<AssetState>,
    mut request: Request,
    next: Next,
) -> Response {
    let original_path = request.uri().path().to_string();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| original_path.clone());

    let outcome = state.router.route(request.method(), &target);
    metrics::record_route(outcome.branch());
    tracing::debug!(
        method = %request.method(),
        url = %target,
        branch = outcome.branch(),
        effective = ?outcome.effective_target(),
        "Request routed"
    );

    let effective = match outcome {
        RouteOutcome::Untouched => return next.run(request).await,
        RouteOutcome::Render(body) => return render_response(body),
        RouteOutcome::Rewrite(target) | RouteOutcome::Default(target) => target,
    };

    match effective.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => {
            tracing::warn!(url = %effective, error = %e, "Effective target is not a valid URI");
            return bad_target_response();
        }
    }
    let effective_path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    set_no_cache(response.headers_mut());
    restore_redirect(&mut response, &effective_path, &original_path);
    apply_mime_override(&mut response, &effective_path, &state.mime_overrides);
    response
}

fn mime_table(overrides: &HashMap<String, String>) -> HashMap<String, HeaderValue> {
    overrides
        .iter()
        .filter_map(|(ext, mime)| match HeaderValue::from_str(mime) {
            Ok(value) => Some((ext.trim_start_matches('.').to_ascii_lowercase(), value)),
            Err(e) => {
                tracing::warn!(extension = %ext, mime = %mime, error = %e, "Ignoring MIME override");
                None
            }
        })
        .collect()
}

fn load_favicon(path: &Path) -> Option<Bytes> {
    match std::fs::read(path) {
        Ok(bytes) => {
            tracing::debug!(path = ?path, size = bytes.len(), "Favicon loaded");
            Some(Bytes::from(bytes))
        }
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Favicon not found, /favicon.ico will be routed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteAction;
    use crate::http::response::NO_CACHE;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;

    async fn echo(request: Request) -> String {
        request.uri().to_string()
    }

    fn echo_app(config: &ServerConfig, favicon: Option<&'static [u8]>) -> Router {
        let state = AssetState {
            router: Arc::new(RequestRouter::from_config(config).unwrap()),
            mime_overrides: Arc::new(mime_table(&config.mime_overrides)),
            favicon: favicon.map(Bytes::from_static),
        };
        AssetServer::wrap(Router::new().fallback(echo), state)
    }

    async fn send(app: Router, method: Method, uri: &str) -> (Response, String) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        (
            Response::from_parts(parts, Body::empty()),
            String::from_utf8(bytes.to_vec()).unwrap(),
        )
    }

    #[tokio::test]
    async fn rewrite_reaches_fallback() {
        let mut config = ServerConfig::default();
        config.rewrite_rules.insert("^/docs/(.+)$".into(), "help/$1".into());

        let (response, body) = send(echo_app(&config, None), Method::GET, "/docs/install").await;
        assert_eq!(body, "/help/install");
        assert_eq!(response.headers()[header::CACHE_CONTROL], NO_CACHE);
    }

    #[tokio::test]
    async fn default_mapping_reaches_fallback() {
        let config = ServerConfig::default();
        let (response, _) = send(echo_app(&config, None), Method::HEAD, "/other?x=1").await;
        assert_eq!(response.headers()[header::CACHE_CONTROL], NO_CACHE);

        let (_, body) = send(echo_app(&config, None), Method::GET, "/other?x=1").await;
        assert_eq!(body, "/public/other?x=1");
    }

    #[tokio::test]
    async fn spaced_paths_reach_fallback_encoded() {
        let mut config = ServerConfig::default();
        config.base_dir = "my site".into();
        config.rewrite_rules.insert("docs".into(), "my docs/index.html".into());

        let (_, body) = send(echo_app(&config, None), Method::GET, "/index.html").await;
        assert_eq!(body, "/my%20site/index.html");

        let (response, body) = send(echo_app(&config, None), Method::GET, "/docs").await;
        assert_eq!(body, "/my%20docs/index.html");
        assert_eq!(response.headers()[header::CACHE_CONTROL], NO_CACHE);
    }

    #[tokio::test]
    async fn post_is_untouched() {
        let mut config = ServerConfig::default();
        config.rewrite_rules.insert("form".into(), "handled.html".into());

        let (response, body) = send(echo_app(&config, None), Method::POST, "/form").await;
        assert_eq!(body, "/form");
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn template_short_circuits() {
        let mut config = ServerConfig::default();
        config
            .template_rules
            .insert("home".into(), RouteAction::render(|| "<main>home</main>".to_string()));
        config.rewrite_rules.insert("home".into(), "index.html".into());

        let (response, body) = send(echo_app(&config, None), Method::GET, "/home").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body, "<main>home</main>");
        assert_eq!(response.headers()[header::CACHE_CONTROL], NO_CACHE);
    }

    #[tokio::test]
    async fn favicon_served_from_memory() {
        let config = ServerConfig::default();
        let (response, body) =
            send(echo_app(&config, Some(b"ICON")), Method::GET, "/favicon.ico").await;
        assert_eq!(body, "ICON");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/x-icon");
    }

    #[tokio::test]
    async fn missing_favicon_is_routed() {
        let config = ServerConfig::default();
        let (_, body) = send(echo_app(&config, None), Method::GET, "/favicon.ico").await;
        assert_eq!(body, "/public/favicon.ico");
    }

    #[tokio::test]
    async fn serve_dir_files_and_redirects() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("public/docs")).unwrap();
        std::fs::write(root.path().join("public/docs/index.html"), "<p>docs</p>").unwrap();
        std::fs::write(root.path().join("public/app.weird"), "x").unwrap();

        let mut config = ServerConfig::default();
        config.root_dir = root.path().to_path_buf();
        config
            .mime_overrides
            .insert("weird".into(), "text/x-weird".into());
        let router = Arc::new(RequestRouter::from_config(&config).unwrap());
        let app = AssetServer::new(&config, router).into_router();

        let (response, body) = send(app.clone(), Method::GET, "/docs/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body, "<p>docs</p>");

        let (response, _) = send(app.clone(), Method::GET, "/docs").await;
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/docs/");

        let (response, _) = send(app.clone(), Method::GET, "/app.weird").await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/x-weird");

        let (response, _) = send(app, Method::GET, "/missing.css").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CACHE_CONTROL], NO_CACHE);
    }
}
