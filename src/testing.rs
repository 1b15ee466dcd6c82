use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn scratch_dir(label: &str) -> PathBuf {
    let id = SCRATCH_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "styling-advisor-{label}-{}-{id}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Chat-completions stand-in that answers every valid request with `reply`.
pub async fn mock_llm(reply: &'static str) -> String {
    let router = Router::new().route(
        "/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
            let authorized = headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                == Some("Bearer test-key");
            let well_formed = body.get("model").and_then(Value::as_str).is_some()
                && body.pointer("/messages/0/role") == Some(&json!("system"))
                && body.pointer("/messages/1/role") == Some(&json!("user"))
                && body.get("max_tokens").and_then(Value::as_u64).is_some();
            if !authorized || !well_formed {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": {"message": "unexpected request"}})),
                )
                    .into_response();
            }
            Json(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": reply}}]
            }))
            .into_response()
        }),
    );
    spawn_server(router).await
}

pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbImage::from_pixel(width, height, image::Rgb(color))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
