use crate::error::Error;
use crate::tools::with_cors;
use bytes::Bytes;
use http::{HeaderValue, header};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::error;
use volo_http::{body::Body, response::Response};

const INDEX_FILE: &str = "index.html";

/// Serves `GET <path>` from `root`. Anything that is not a plain file below
/// `root` is a 404.
pub async fn serve_static(root: &Path, uri_path: &str) -> Response {
    let Some(mut path) = resolve(root, uri_path) else {
        return Error::NotFound.to_response();
    };
    if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
        path.push(INDEX_FILE);
    }
    match tokio::fs::read(&path).await {
        Ok(contents) => {
            let mut resp = with_cors(Response::new(Body::from(Bytes::from(contents))));
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(content_type(&path)),
            );
            resp
        }
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            Error::NotFound.to_response()
        }
        Err(e) => {
            error!(path=%path.display(), "failed to read static file: {e}");
            Error::Io(e).to_response()
        }
    }
}

/// Maps a request path onto `root`, refusing anything but normal segments.
fn resolve(root: &Path, uri_path: &str) -> Option<PathBuf> {
    let relative = uri_path.trim_start_matches('/');
    if relative.is_empty() {
        return Some(root.join(INDEX_FILE));
    }
    let relative = Path::new(relative);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
