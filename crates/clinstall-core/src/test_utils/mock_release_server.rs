//! In-process HTTP server standing in for GitHub releases and the download CDN

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone)]
struct ServerState {
    base_url: String,
    tag_name: String,
    files: Arc<HashMap<String, Vec<u8>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn latest_release(
    State(state): State<ServerState>,
    Path((org, repo)): Path<(String, String)>,
) -> Json<Value> {
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("/repos/{}/{}/releases/latest", org, repo));

    let mut names: Vec<&String> = state.files.keys().collect();
    names.sort();
    let assets: Vec<Value> = names
        .into_iter()
        .map(|name| {
            json!({
                "name": name,
                "browser_download_url": format!("{}/download/{}", state.base_url, name),
            })
        })
        .collect();

    Json(json!({ "tag_name": state.tag_name, "assets": assets }))
}

async fn download(State(state): State<ServerState>, Path(name): Path<String>) -> Response {
    state.requests.lock().unwrap().push(format!("/download/{}", name));

    match state.files.get(&name) {
        Some(data) => data.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub struct MockReleaseServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockReleaseServer {
    /// Serve `files` as the assets of release `v1.0.0` of any repository
    pub async fn start(files: Vec<(&str, Vec<u8>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock release server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();

        let state = ServerState {
            base_url: format!("http://{}", addr),
            tag_name: "v1.0.0".to_string(),
            files: Arc::new(
                files
                    .into_iter()
                    .map(|(name, data)| (name.to_string(), data))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();

        let app = Router::new()
            .route("/repos/{org}/{repo}/releases/latest", get(latest_release))
            .route("/download/{name}", get(download))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("Mock release server error: {}", e);
                });
        });

        log::info!("Mock release server listening on {}", addr);

        Self {
            addr,
            shutdown_tx,
            requests,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn download_url(&self, name: &str) -> String {
        format!("{}/download/{}", self.address(), name)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock release server already stopped");
        }
    }
}

/// An address nothing is listening on
pub async fn unreachable_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
