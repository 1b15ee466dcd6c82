use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::analysis::{classify, decode_rgb, ToneCategory};
use crate::config::STYLIST_SYSTEM_PROMPT;
use crate::error::AppError;
use crate::state::AppState;
use crate::styling::{build_prompt, normalize, RecommendationRecord, StylingRequestContext};
use crate::utils::timing::{complete_request_timer, start_request_timer, RequestTimer};
use crate::utils::uploads::save_upload;

const DEFAULT_GENDER: &str = "Female";
const DEFAULT_OCCASION: &str = "Casual";

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub skin_tone: ToneCategory,
    pub gender: String,
    pub occasion: String,
    pub recommendations: RecommendationRecord,
    pub timestamp: String,
}

struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

#[derive(Default)]
struct PredictForm {
    file: Option<UploadedFile>,
    gender: Option<String>,
    occasion: Option<String>,
}

fn non_blank(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

async fn read_form(mut multipart: Multipart) -> Result<PredictForm, AppError> {
    let mut form = PredictForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.file = Some(UploadedFile { file_name, bytes });
            }
            "gender" => form.gender = Some(field.text().await?),
            "occasion" => form.occasion = Some(field.text().await?),
            other => debug!("Ignoring unexpected form field '{}'", other),
        }
    }
    Ok(form)
}

async fn analyze_tone(bytes: Bytes) -> Result<ToneCategory, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let image = decode_rgb(&bytes)?;
        classify(&image)
    })
    .await
    .map_err(|err| AppError::Internal(format!("Image analysis task failed: {err}")))?;

    result.map_err(|err| {
        warn!("Image analysis error: {}", err);
        AppError::from(err)
    })
}

async fn run_predict(
    state: &AppState,
    multipart: Multipart,
    timer: &mut RequestTimer,
) -> Result<PredictResponse, AppError> {
    let form = read_form(multipart).await?;
    let gender = non_blank(form.gender, DEFAULT_GENDER);
    let occasion = non_blank(form.occasion, DEFAULT_OCCASION);
    timer.set_context(&gender, &occasion);

    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest("No file part in request".to_string()))?;
    if file.file_name.trim().is_empty() {
        return Err(AppError::BadRequest("No file selected".to_string()));
    }

    let skin_tone = analyze_tone(file.bytes.clone()).await?;
    info!("Detected skin tone {} for {} / {}", skin_tone, gender, occasion);

    // Only decoded images reach the uploads dir, which may sit under the static root.
    let stored = save_upload(&state.config.upload_dir, &file.file_name, &file.bytes).await?;
    info!(
        "Received {} byte upload stored at {}",
        file.bytes.len(),
        stored.display()
    );

    let context = StylingRequestContext {
        skin_tone,
        gender,
        occasion,
    };
    let prompt = build_prompt(&context);

    let raw = state
        .llm
        .complete(STYLIST_SYSTEM_PROMPT, &prompt)
        .await
        .map_err(|err| {
            error!("Groq inference error: {}", err);
            AppError::from(err)
        })?;

    let recommendations = normalize(&raw).map_err(|err| {
        error!("Failed to parse styling response: {}\nRaw AI output:\n{}", err, raw);
        AppError::from(err)
    })?;

    Ok(PredictResponse {
        success: true,
        skin_tone: context.skin_tone,
        gender: context.gender,
        occasion: context.occasion,
        recommendations,
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut timer = start_request_timer("/predict");

    let result = match multipart {
        Ok(multipart) => run_predict(&state, multipart, &mut timer).await,
        Err(rejection) => {
            debug!("Rejected non-multipart predict request: {}", rejection);
            Err(AppError::BadRequest("No file part in request".to_string()))
        }
    };

    match result {
        Ok(payload) => {
            complete_request_timer(&mut timer, "success", None);
            Json(payload).into_response()
        }
        Err(err) => {
            complete_request_timer(&mut timer, "error", Some(err.to_string()));
            err.into_response()
        }
    }
}
