use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::Response,
};
use mime_guess::from_path;
use rust_embed::RustEmbed;
use std::path::PathBuf;

/// Built marketing frontend, embedded at compile time.
#[derive(RustEmbed)]
#[folder = "frontend/dist"]
pub struct Assets;

/// Serve a frontend asset.
///
/// A configured static directory overrides the embedded bundle, which
/// lets a deployment swap the marketing pages without rebuilding.
/// Extensionless paths fall back to index.html so the page's client
/// routing keeps working on refresh.
pub async fn serve_static(uri: Uri, static_dir: Option<String>) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    if let Some(ref dir) = static_dir {
        let file_path = PathBuf::from(dir).join(path);
        if let Ok(content) = tokio::fs::read(&file_path).await {
            return file_response(path, content.into());
        }
    }

    if let Some(asset) = Assets::get(path) {
        return file_response(path, asset.data.to_vec().into());
    }

    if !path.contains('.') {
        if let Some(index) = Assets::get("index.html") {
            return file_response("index.html", index.data.to_vec().into());
        }
    }

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::from("404 Not Found"))
        .unwrap()
}

fn file_response(path: &str, body: Body) -> Response {
    let mime = from_path(path).first_or_octet_stream();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(body)
        .unwrap()
}
