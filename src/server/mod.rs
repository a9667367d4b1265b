//! HTTP server rendering pages from the content repository on request

use anyhow::Result;
use axum::{
    extract::{Path, Query as UrlQuery, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::content::Cursor;
use crate::error::Error;
use crate::prismic::ContentRepository;
use crate::provider::DataProvider;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Server state shared by all handlers
pub struct AppState<R> {
    pub provider: DataProvider<R>,
    pub renderer: TemplateRenderer,
}

#[derive(Debug, Deserialize)]
struct MoreParams {
    cursor: String,
}

/// Build the application router
pub fn router<R>(state: Arc<AppState<R>>) -> Router
where
    R: ContentRepository + 'static,
{
    Router::new()
        .route("/", get(home::<R>))
        .route("/post/:slug", get(post::<R>))
        .route("/api/posts", get(more_posts::<R>))
        .fallback(not_found::<R>)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(AppState {
        provider: blog.provider()?,
        renderer: TemplateRenderer::new()?,
    });
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home<R: ContentRepository>(State(state): State<Arc<AppState<R>>>) -> Response {
    let config = state.provider.config();
    let home = match state.provider.home_props().await {
        Ok(home) => home,
        Err(e) => return error_response(&state, e),
    };

    match state.renderer.render_home(config, &home.props, true) {
        Ok(html) => cached(home.revalidate, Html(html)),
        Err(e) => error_response(&state, e),
    }
}

async fn post<R: ContentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(slug): Path<String>,
) -> Response {
    let config = state.provider.config();
    let detail = match state.provider.post_props(&slug).await {
        Ok(detail) => detail,
        Err(e) => return error_response(&state, e),
    };

    match state.renderer.render_post(config, &detail.props) {
        Ok(html) => cached(detail.revalidate, Html(html)),
        Err(e) => error_response(&state, e),
    }
}

/// JSON page behind the listing's load-more button
async fn more_posts<R: ContentRepository>(
    State(state): State<Arc<AppState<R>>>,
    UrlQuery(params): UrlQuery<MoreParams>,
) -> Response {
    let cursor = Cursor::new(params.cursor);
    match state.provider.more_posts(&cursor).await {
        Ok(pagination) => cached(
            state.provider.config().revalidate.listing(),
            Json(pagination),
        ),
        Err(Error::ForeignCursor { .. }) => {
            (StatusCode::BAD_REQUEST, "Invalid cursor").into_response()
        }
        Err(e) => {
            tracing::warn!("Failed to load more posts: {}", e);
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

async fn not_found<R: ContentRepository>(State(state): State<Arc<AppState<R>>>) -> Response {
    not_found_page(&state, "Page not found")
}

fn not_found_page<R>(state: &AppState<R>, message: &str) -> Response
where
    R: ContentRepository,
{
    match state
        .renderer
        .render_not_found(state.provider.config(), message)
    {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn error_response<R: ContentRepository>(state: &AppState<R>, err: Error) -> Response {
    match err {
        Error::NotFound { .. } => not_found_page(state, "Post not found"),
        e if e.is_network() => {
            tracing::warn!("Content repository unavailable: {}", e);
            (StatusCode::BAD_GATEWAY, "Content repository unavailable").into_response()
        }
        e => {
            tracing::error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Attach the staleness budget for caches in front of the server
fn cached(revalidate: Duration, body: impl IntoResponse) -> Response {
    let value = format!(
        "public, s-maxage={}, stale-while-revalidate",
        revalidate.as_secs()
    );
    ([(header::CACHE_CONTROL, value)], body).into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
