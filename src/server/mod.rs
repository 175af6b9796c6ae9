//! JSON API server for editor frontends

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{slug, NewPost, PostPage};
use crate::error::Error;
use crate::media;
use crate::repository::{Duplicate, Repository};
use crate::Publisher;

/// Start the API server and run until Ctrl+C
pub async fn start(publisher: Arc<Publisher>, ip: &str, port: u16) -> Result<()> {
    let app = router(publisher.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("API server running at http://{}:{}/api", ip, port);
    println!("Content directory: {:?}", publisher.repository.content_dir());
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await?;

    Ok(())
}

/// Build the API router
pub fn router(publisher: Arc<Publisher>) -> Router {
    let mut app = Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/:title",
            get(load_post).put(update_post).delete(delete_post),
        )
        .route("/api/titles", get(list_titles))
        .route("/api/duplicates", get(check_duplicate))
        .route("/api/images", get(load_image).post(upload_image));

    if let Some(root) = publisher.repository.config().site_root.as_ref() {
        app = app.nest_service("/static", ServeDir::new(media::static_path(root, "")));
    }

    app.layer(TraceLayer::new_for_http()).with_state(publisher)
}

/// Error returned by API handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Base64(_) | Error::Image(_) | Error::InvalidImagePath(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Run a repository call on the blocking pool
async fn blocking<T, F>(publisher: Arc<Publisher>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Repository) -> crate::Result<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || f(&publisher.repository))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    Ok(Json(result?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListParams {
    page: Option<i64>,
    page_size: Option<i64>,
    search: String,
}

async fn list_posts(
    State(publisher): State<Arc<Publisher>>,
    Query(params): Query<ListParams>,
) -> ApiResult<PostPage> {
    blocking(publisher, move |repo| {
        let page_size = params.page_size.unwrap_or(repo.config().page_size);
        repo.list(params.page.unwrap_or(1), page_size, &params.search)
    })
    .await
}

async fn list_titles(State(publisher): State<Arc<Publisher>>) -> ApiResult<Vec<String>> {
    blocking(publisher, |repo| repo.list_titles()).await
}

#[derive(Debug, Serialize)]
struct Saved {
    path: String,
}

impl Saved {
    fn new(path: &std::path::Path) -> Self {
        Self {
            path: path.display().to_string(),
        }
    }
}

async fn create_post(
    State(publisher): State<Arc<Publisher>>,
    Json(post): Json<NewPost>,
) -> ApiResult<Saved> {
    blocking(publisher, move |repo| repo.save(&post).map(|p| Saved::new(&p))).await
}

#[derive(Debug, Serialize)]
struct RawPost {
    title: String,
    content: String,
}

async fn load_post(
    State(publisher): State<Arc<Publisher>>,
    Path(title): Path<String>,
) -> ApiResult<RawPost> {
    blocking(publisher, move |repo| {
        let content = repo.load(&title)?;
        Ok(RawPost { title, content })
    })
    .await
}

async fn update_post(
    State(publisher): State<Arc<Publisher>>,
    Path(old_title): Path<String>,
    Json(post): Json<NewPost>,
) -> ApiResult<Saved> {
    blocking(publisher, move |repo| {
        repo.update(&old_title, &post).map(|p| Saved::new(&p))
    })
    .await
}

async fn delete_post(
    State(publisher): State<Arc<Publisher>>,
    Path(title): Path<String>,
) -> ApiResult<Saved> {
    blocking(publisher, move |repo| repo.delete(&title).map(|p| Saved::new(&p))).await
}

#[derive(Debug, Deserialize)]
struct TitleParams {
    title: String,
}

async fn check_duplicate(
    State(publisher): State<Arc<Publisher>>,
    Query(params): Query<TitleParams>,
) -> ApiResult<Duplicate> {
    blocking(publisher, move |repo| repo.check_duplicate(&params.title)).await
}

#[derive(Debug, Deserialize)]
struct ImageParams {
    path: String,
}

#[derive(Debug, Serialize)]
struct ImageData {
    data: String,
}

async fn load_image(
    State(publisher): State<Arc<Publisher>>,
    Query(params): Query<ImageParams>,
) -> ApiResult<ImageData> {
    blocking(publisher, move |repo| {
        let bytes = repo.load_image(&params.path)?;
        Ok(ImageData {
            data: BASE64.encode(bytes),
        })
    })
    .await
}

#[derive(Debug, Deserialize)]
struct Upload {
    filename: String,
    /// Base64 payload, optionally as a `data:` URL
    data: String,
}

async fn upload_image(
    State(publisher): State<Arc<Publisher>>,
    Json(upload): Json<Upload>,
) -> ApiResult<Saved> {
    blocking(publisher, move |repo| {
        let config = repo.config();
        let dir = config
            .image_dir
            .as_ref()
            .ok_or_else(|| Error::Config("image_dir is not configured".to_string()))?;

        let name = upload_file_name(&upload.filename);
        media::save_uploaded_image(strip_data_url(&upload.data), &dir.join(&name))?;
        tracing::info!("Stored upload {:?} as {}", upload.filename, name);

        Ok(Saved {
            path: format!("{}{}", config.upload_prefix, name),
        })
    })
    .await
}

/// Stored name of an upload: slugified stem, always `.jpg`
fn upload_file_name(filename: &str) -> String {
    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    format!("{}.jpg", slug::slugify(stem))
}

fn strip_data_url(data: &str) -> &str {
    match data.split_once(',') {
        Some((header, payload)) if header.starts_with("data:") => payload,
        _ => data,
    }
}
