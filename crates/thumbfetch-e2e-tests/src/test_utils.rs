use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use eyre::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use thumbfetch_lib::catalog::{AssetDescriptor, RenditionReference};

struct MockState {
    routes: HashMap<String, (u16, Vec<u8>)>,
    hits: Mutex<Vec<String>>,
}

/// In-process HTTP server that answers fixed paths with fixed status codes and bodies.
pub struct MockServer {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockServer {
    /// Paths and query strings requested so far, in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.state.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self, path: &str) -> usize {
        self.hits()
            .iter()
            .filter(|hit| hit.split('?').next() == Some(path))
            .count()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn serve_route(State(state): State<Arc<MockState>>, uri: Uri) -> Response {
    state.hits.lock().unwrap().push(uri.to_string());
    match state.routes.get(uri.path()) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn start_mock_server<P, B>(
    routes: impl IntoIterator<Item = (P, u16, B)>,
) -> Result<MockServer>
where
    P: Into<String>,
    B: Into<Vec<u8>>,
{
    let state = Arc::new(MockState {
        routes: routes
            .into_iter()
            .map(|(path, status, body)| (path.into(), (status, body.into())))
            .collect(),
        hits: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .fallback(serve_route)
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok(MockServer {
        base_url: format!("http://{}", addr),
        state,
    })
}

/// Starts a server that promises `declared_len` body bytes, sends `body`, and
/// closes the connection.
pub async fn start_truncating_server(declared_len: usize, body: &'static [u8]) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut request = vec![0u8; 4096];
            if stream.read(&mut request).await.is_err() {
                continue;
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {declared_len}\r\nConnection: close\r\n\r\n"
            );
            stream.write_all(head.as_bytes()).await.ok();
            stream.write_all(body).await.ok();
            stream.flush().await.ok();
            stream.shutdown().await.ok();
        }
    });
    Ok(format!("http://{}", addr))
}

/// Returns an origin on which nothing is listening.
pub async fn unreachable_origin() -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

pub fn asset(code: &str, renditions: &[(&str, &str)]) -> AssetDescriptor {
    renditions
        .iter()
        .fold(AssetDescriptor::new(code), |asset, (id, url)| {
            asset.with_rendition(*id, RenditionReference::new(*url, 0, 0))
        })
}

/// Builds a listing response body in the shape the catalog endpoint returns.
pub fn catalog_body(photos: &[(&str, &[(&str, &str)])]) -> Value {
    let photos: Vec<Value> = photos
        .iter()
        .map(|(code, renditions)| {
            let thumbnail: serde_json::Map<String, Value> = renditions
                .iter()
                .map(|(id, url)| {
                    (
                        id.to_string(),
                        json!({"path": "", "url": url, "width": 1024, "height": 768}),
                    )
                })
                .collect();
            json!({
                "_id": format!("id-{code}"),
                "photoCode": code,
                "isFavorite": false,
                "likeCount": 0,
                "comments": [],
                "shareInfo": [],
                "shootOn": "2024-10-05T10:00:00.000Z",
                "thumbnail": thumbnail,
            })
        })
        .collect();

    json!({
        "status": 0,
        "msg": "",
        "result": {"photos": photos, "time": 1728122400000i64},
        "localIp": 0
    })
}

pub fn output_dir() -> Result<TempDir> {
    Ok(tempfile::tempdir()?)
}

pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("thumbfetch_lib=debug,thumbfetch_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
