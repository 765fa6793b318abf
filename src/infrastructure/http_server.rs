use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::StreamExt;
use log::{debug, info};
use serde_derive::Deserialize;
use serde_json::json;

use crate::application::{Streamer, Subscription};
use crate::domain::{CurrentlyPlaying, FetchError, GitCommitService};

/// Commits returned when the request names no limit.
const DEFAULT_COMMITS_LIMIT: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub commits: Arc<dyn GitCommitService>,
    pub current: Arc<dyn Streamer<Option<CurrentlyPlaying>>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/commits", get(recent_commits))
        .route("/commits/:sha", get(commit))
        .route("/music/current", get(current))
        .with_state(state)
}

/// Serves until `shutdown` resolves.
pub async fn serve(
    port: u16,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Deserialize, Debug)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn recent_commits(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_COMMITS_LIMIT);
    match state.commits.recent_commits(limit).await {
        Ok(commits) => Json(commits).into_response(),
        Err(why) => upstream_error(why),
    }
}

async fn commit(State(state): State<AppState>, Path(sha): Path<String>) -> Response {
    match state.commits.commit(&sha).await {
        Ok(Some(commit)) => Json(commit).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(why) => upstream_error(why),
    }
}

async fn current(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let subscription = state.current.subscribe();
    ws.on_upgrade(move |socket| forward(socket, subscription))
}

async fn forward(mut socket: WebSocket, mut subscription: Subscription<Option<CurrentlyPlaying>>) {
    debug!("websocket subscriber {} connected", subscription.id());

    while let Some(outcome) = subscription.next().await {
        let payload = match outcome {
            Ok(playing) => json!({ "data": playing }),
            Err(why) => json!({ "error": why.to_string() }),
        };
        if socket.send(Message::Text(payload.to_string())).await.is_err() {
            break;
        }
    }

    let _ = socket.send(Message::Close(None)).await;
    debug!("websocket subscriber {} disconnected", subscription.id());
}

fn upstream_error(why: FetchError) -> Response {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": why.to_string() }))).into_response()
}
