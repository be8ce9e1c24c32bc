//! OCR endpoints: upload, URL, base64, and document mode.

use std::time::Instant;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::{header, HeaderMap},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info_span, Instrument};

use logging::{RequestEvent, RequestLogger};
use media::{acquire_image, ImageSource};
use visiongate_core::{DocumentSummary, OcrError, RecognitionResult};

use crate::request_id::RequestId;
use crate::response::{ApiError, ApiResponse, NO_TEXT_MESSAGE};
use crate::server::GatewayState;

/// Multipart field names accepted for the image, in preference order.
const IMAGE_FIELDS: &[&str] = &["image", "file"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRequest {
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Base64Request {
    pub image: String,
}

type OcrResponse = Result<Json<ApiResponse<RecognitionResult>>, ApiError>;

fn json_error(e: JsonRejection, request_id: &RequestId) -> ApiError {
    ApiError::from_rejection(e.status(), e.body_text()).with_request_id(request_id.as_str())
}

fn multipart_error(e: MultipartError, request_id: &RequestId) -> ApiError {
    ApiError::from_rejection(e.status(), e.body_text()).with_request_id(request_id.as_str())
}

/// `POST /api/ocr/upload` — multipart form with an `image` (or `file`) part.
pub async fn ocr_upload(
    State(state): State<GatewayState>,
    request_id: RequestId,
    multipart: Result<Multipart, MultipartRejection>,
) -> OcrResponse {
    let multipart = multipart.map_err(|e| {
        ApiError::from_rejection(e.status(), e.body_text()).with_request_id(request_id.as_str())
    })?;
    let source = read_upload(multipart, &request_id).await?;
    recognize(&state, &request_id, source).await
}

/// `POST /api/ocr/url` — `{ "imageUrl": "https://..." }`.
pub async fn ocr_url(
    State(state): State<GatewayState>,
    request_id: RequestId,
    headers: HeaderMap,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> OcrResponse {
    let Json(req) = payload.map_err(|e| json_error(e, &request_id))?;
    if req.image_url.trim().is_empty() {
        return Err(ApiError::bad_request("imageUrl is required").with_request_id(request_id.as_str()));
    }

    let authorization = state
        .forward_authorization
        .then(|| headers.get(header::AUTHORIZATION))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let source = ImageSource::Url {
        url: req.image_url,
        authorization,
    };
    recognize(&state, &request_id, source).await
}

/// `POST /api/ocr/base64` — `{ "image": "<base64 or data URL>" }`.
pub async fn ocr_base64(
    State(state): State<GatewayState>,
    request_id: RequestId,
    payload: Result<Json<Base64Request>, JsonRejection>,
) -> OcrResponse {
    let Json(req) = payload.map_err(|e| json_error(e, &request_id))?;
    recognize(&state, &request_id, ImageSource::Base64 { data: req.image }).await
}

/// `POST /api/ocr/document` — page-level summary for a base64 image.
pub async fn ocr_document(
    State(state): State<GatewayState>,
    request_id: RequestId,
    payload: Result<Json<Base64Request>, JsonRejection>,
) -> Result<Json<ApiResponse<DocumentSummary>>, ApiError> {
    let Json(req) = payload.map_err(|e| json_error(e, &request_id))?;
    let source = ImageSource::Base64 { data: req.image };

    let start = Instant::now();
    let description = source.describe();

    let outcome = async {
        let image = acquire_image(source, &state.fetcher).await?;
        state.recognizer.recognize_document(&image.bytes).await
    }
    .instrument(info_span!("ocr_document", request_id = %request_id.as_str()))
    .await;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(summary) => {
            RequestLogger::log_event(
                request_id.as_str(),
                RequestEvent::Document {
                    source: description,
                    pages: summary.page_count(),
                    elapsed_ms,
                },
            );
            let found = !summary.text.is_empty();
            let message = if found {
                "Document processed successfully"
            } else {
                NO_TEXT_MESSAGE
            };
            Ok(Json(ApiResponse::new(found, message, summary, request_id.as_str(), elapsed_ms)))
        }
        Err(err) => Err(failed(&request_id, description, err)),
    }
}

async fn recognize(state: &GatewayState, request_id: &RequestId, source: ImageSource) -> OcrResponse {
    let start = Instant::now();
    let description = source.describe();

    let outcome = async {
        let image = acquire_image(source, &state.fetcher).await?;
        debug!(mime = %image.mime_type, bytes = image.bytes.len(), "Image acquired");
        state.recognizer.recognize(&image.bytes).await
    }
    .instrument(info_span!("ocr_request", request_id = %request_id.as_str()))
    .await;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(result) if result.found => {
            RequestLogger::log_event(
                request_id.as_str(),
                RequestEvent::Recognized {
                    source: description,
                    words: result.word_count,
                    lines: result.lines.len(),
                    elapsed_ms,
                },
            );
            Ok(Json(ApiResponse::new(
                true,
                "Text extracted successfully",
                result,
                request_id.as_str(),
                elapsed_ms,
            )))
        }
        Ok(result) => {
            RequestLogger::log_event(
                request_id.as_str(),
                RequestEvent::NoText {
                    source: description,
                    elapsed_ms,
                },
            );
            Ok(Json(ApiResponse::new(
                false,
                NO_TEXT_MESSAGE,
                result,
                request_id.as_str(),
                elapsed_ms,
            )))
        }
        Err(err) => Err(failed(request_id, description, err)),
    }
}

fn failed(request_id: &RequestId, source: String, err: OcrError) -> ApiError {
    RequestLogger::log_event(
        request_id.as_str(),
        RequestEvent::Failed {
            source,
            error_msg: err.to_string(),
        },
    );
    ApiError::from(err).with_request_id(request_id.as_str())
}

/// Pull the image part out of a multipart body.
async fn read_upload(mut multipart: Multipart, request_id: &RequestId) -> Result<ImageSource, ApiError> {
    let mut fallback: Option<ImageSource> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, request_id))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_named = IMAGE_FIELDS.contains(&name.as_str());
        let is_file = field.file_name().is_some();
        if !is_named && (!is_file || fallback.is_some()) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, request_id))?;

        let source = ImageSource::Upload {
            bytes,
            filename,
            content_type,
        };
        if is_named {
            return Ok(source);
        }
        fallback = Some(source);
    }

    fallback.ok_or_else(|| {
        ApiError::bad_request("No image file provided (expected field 'image')")
            .with_request_id(request_id.as_str())
    })
}
