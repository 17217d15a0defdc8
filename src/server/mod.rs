//! HTTP server: content JSON API, newsletter endpoint and the static site

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{
    ContentError, ContentRepository, ContentType, MarkdownRenderer, Post, TimelineKind,
    TimelineReader,
};
use crate::subscribe::{Services, SubscribeError, SubscriptionHandler};
use crate::Site;

/// Shared, read-only request state
struct ServerState {
    content: ContentRepository,
    timeline: TimelineReader,
    renderer: MarkdownRenderer,
    subscriptions: SubscriptionHandler,
    featured_limit: usize,
}

/// Build the application router
pub fn router(site: &Site, services: Services) -> Router {
    let state = Arc::new(ServerState {
        content: site.content(),
        timeline: site.timeline(),
        renderer: MarkdownRenderer::new(),
        subscriptions: SubscriptionHandler::new(services),
        featured_limit: site.config.featured_limit,
    });

    Router::new()
        .route("/api/subscribe", post(subscribe_handler))
        .route("/api/content/:kind", get(list_content_handler))
        .route("/api/content/:kind/:slug", get(get_content_handler))
        .route("/api/tags/:kind", get(tags_handler))
        .route("/api/timeline", get(timeline_handler))
        .fallback_service(ServeDir::new(&site.public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, services: Services, ip: &str, port: u16) -> Result<()> {
    let app = router(site, services);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn content_failure(e: ContentError) -> Response {
    tracing::error!("Content error: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load content")
}

/// Run a content read on the blocking pool; reads scan and parse files
async fn read_content<T, F>(state: &Arc<ServerState>, read: F) -> Result<T, Response>
where
    F: FnOnce(&ServerState) -> Result<T, ContentError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    match tokio::task::spawn_blocking(move || read(&state)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(content_failure(e)),
        Err(e) => {
            tracing::error!("Content read aborted: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load content",
            ))
        }
    }
}

/// `POST /api/subscribe` with `{"email": "..."}`
async fn subscribe_handler(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    // A body that is not JSON counts as a missing email
    let payload: Option<Value> = serde_json::from_slice(&body).ok();
    let email = payload
        .as_ref()
        .and_then(|v| v.get("email"))
        .and_then(Value::as_str);

    match state.subscriptions.subscribe(email).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Successfully subscribed!" })),
        )
            .into_response(),
        Err(e) => subscribe_failure(&e),
    }
}

fn subscribe_failure(e: &SubscribeError) -> Response {
    match e {
        SubscribeError::InvalidInput | SubscribeError::InvalidFormat => {
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        SubscribeError::AlreadySubscribed => error_response(StatusCode::CONFLICT, &e.to_string()),
        SubscribeError::Storage(_) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to subscribe. Please try again later.",
        ),
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    tag: Option<String>,
    #[serde(default)]
    featured: bool,
    limit: Option<usize>,
}

async fn list_content_handler(
    State(state): State<Arc<ServerState>>,
    Path(kind): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let Ok(kind) = kind.parse::<ContentType>() else {
        return not_found();
    };
    let limit = query.limit.unwrap_or(state.featured_limit);

    let posts = read_content(&state, move |state| match (query.tag.as_deref(), query.featured) {
        (None, true) => state.content.list_featured(kind, limit),
        (None, false) => state.content.list_all(kind),
        (Some(tag), featured) => state.content.list_by_tag(tag, kind).map(|posts| {
            if featured {
                posts.into_iter().filter(|p| p.featured).take(limit).collect()
            } else {
                posts
            }
        }),
    })
    .await;

    match posts {
        Ok(posts) => Json(posts).into_response(),
        Err(response) => response,
    }
}

/// A record with its body rendered for display
#[derive(Serialize)]
struct RenderedPost<'a> {
    #[serde(flatten)]
    post: &'a Post,
    html: String,
}

async fn get_content_handler(
    State(state): State<Arc<ServerState>>,
    Path((kind, slug)): Path<(String, String)>,
) -> Response {
    let Ok(kind) = kind.parse::<ContentType>() else {
        return not_found();
    };

    let found = read_content(&state, move |state| {
        Ok(state.content.get_by_slug(&slug, kind)?.map(|post| {
            let html = state.renderer.render(&post.content);
            (post, html)
        }))
    })
    .await;

    match found {
        Ok(Some((post, html))) => Json(RenderedPost { post: &post, html }).into_response(),
        Ok(None) => not_found(),
        Err(response) => response,
    }
}

async fn tags_handler(
    State(state): State<Arc<ServerState>>,
    Path(kind): Path<String>,
) -> Response {
    let Ok(kind) = kind.parse::<ContentType>() else {
        return not_found();
    };

    match read_content(&state, move |state| state.content.list_all_tags(kind)).await {
        Ok(tags) => Json(tags).into_response(),
        Err(response) => response,
    }
}

#[derive(Debug, Deserialize)]
struct TimelineQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn timeline_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<TimelineQuery>,
) -> Response {
    let kind = match query.kind.as_deref().map(str::parse::<TimelineKind>) {
        Some(Ok(kind)) => Some(kind),
        Some(Err(msg)) => return error_response(StatusCode::BAD_REQUEST, &msg),
        None => None,
    };

    let events = read_content(&state, move |state| match kind {
        Some(kind) => state.timeline.list_by_type(kind),
        None => state.timeline.list_all(),
    })
    .await;

    match events {
        Ok(events) => Json(events).into_response(),
        Err(response) => response,
    }
}
