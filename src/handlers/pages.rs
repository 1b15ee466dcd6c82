use std::path::{Component, Path as FsPath};

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, warn};

use crate::state::AppState;

const FALLBACK_HOME: &str =
    "<h1>Server Running</h1><p>Please place index.html in the templates folder.</p>";

pub async fn home(State(state): State<AppState>) -> Html<String> {
    let index = state.config.templates_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(page) => Html(page),
        Err(err) => {
            debug!("No index page at {}: {}", index.display(), err);
            Html(FALLBACK_HOME.to_string())
        }
    }
}

fn content_type_for(path: &FsPath) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

fn is_safe_relative(path: &FsPath) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

pub async fn static_file(
    State(state): State<AppState>,
    Path(relative): Path<String>,
) -> Response {
    let relative = FsPath::new(&relative);
    if !is_safe_relative(relative) {
        warn!("Rejected static path {}", relative.display());
        return StatusCode::NOT_FOUND.into_response();
    }

    let full = state.config.static_dir.join(relative);
    match tokio::fs::read(&full).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(&full))], bytes).into_response(),
        Err(err) => {
            debug!("Static file {} unavailable: {}", full.display(), err);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_content_types_by_extension() {
        assert_eq!(content_type_for(FsPath::new("script.js")), "text/javascript; charset=utf-8");
        assert_eq!(content_type_for(FsPath::new("uploads/FACE.JPG")), "image/jpeg");
        assert_eq!(content_type_for(FsPath::new("README")), "application/octet-stream");
    }

    #[test]
    fn only_plain_relative_paths_are_served() {
        assert!(is_safe_relative(FsPath::new("script.js")));
        assert!(is_safe_relative(FsPath::new("uploads/face.png")));
        assert!(!is_safe_relative(FsPath::new("../secrets.env")));
        assert!(!is_safe_relative(FsPath::new("uploads/../../x")));
        assert!(!is_safe_relative(FsPath::new("/etc/passwd")));
        assert!(!is_safe_relative(FsPath::new("")));
    }
}
