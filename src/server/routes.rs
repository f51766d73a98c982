use axum::{
    extract::{multipart::MultipartError, rejection::PathRejection, FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::service::RecordForm;
use crate::{Error, RecordSummary};
use std::sync::Arc;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<T, ApiError>;

/// Map a service error onto its HTTP status and log it at the boundary
fn api_error(err: Error) -> ApiError {
    let status = match &err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Storage(_)
        | Error::Transcode(_)
        | Error::Io(_)
        | Error::Config(_)
        | Error::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        tracing::error!("{}", err);
    } else {
        tracing::warn!("{}", err);
    }

    (status, Json(ErrorResponse { error: err.to_string() }))
}

/// Extractor rejections keep their status but get the `{error}` body
fn rejection_error(status: StatusCode, text: String) -> ApiError {
    tracing::warn!("Rejected request ({}): {}", status, text);
    (status, Json(ErrorResponse { error: text }))
}

fn record_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|r| rejection_error(r.status(), r.body_text()))
}

/// Record fields sent as a JSON object instead of a multipart form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordJson {
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "date_applied")]
    pub date_applied: Option<String>,
}

impl From<RecordJson> for RecordForm {
    fn from(body: RecordJson) -> Self {
        Self {
            company: body.company,
            role: body.role,
            status: body.status,
            date_applied: body.date_applied,
            attachment: None,
        }
    }
}

/// Decode a record body: JSON when the content type says so, multipart otherwise
async fn read_body(request: Request) -> ApiResult<RecordForm> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if is_json {
        let Json(body) = Json::<RecordJson>::from_request(request, &())
            .await
            .map_err(|r| rejection_error(r.status(), r.body_text()))?;
        return Ok(body.into());
    }

    let multipart = Multipart::from_request(request, &())
        .await
        .map_err(|r| rejection_error(r.status(), r.body_text()))?;
    read_form(multipart).await
}

/// Oversized bodies keep axum's 413; anything else goes through `api_error`
fn multipart_error(err: MultipartError, fallback: impl FnOnce(String) -> Error) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Rejected upload: {}", err.body_text());
        return (StatusCode::PAYLOAD_TOO_LARGE, Json(ErrorResponse { error: err.body_text() }));
    }
    api_error(fallback(err.body_text()))
}

/// Collect the record fields of a multipart body.
///
/// Accepts `dateApplied`/`date_applied` and `attachment`/`resume`; unknown
/// fields are skipped.
async fn read_form(mut multipart: Multipart) -> ApiResult<RecordForm> {
    let mut form = RecordForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, |m| Error::Validation(format!("Invalid multipart content: {}", m))))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "attachment" | "resume" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, |m| Error::Transcode(format!("Could not read attachment: {}", m))))?;
                form.attachment = Some(bytes.to_vec());
            }
            "company" | "role" | "status" | "dateApplied" | "date_applied" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, |m| Error::Validation(format!("Could not read field '{}': {}", name, m))))?;
                match name.as_str() {
                    "company" => form.company = Some(text),
                    "role" => form.role = Some(text),
                    "status" => form.status = Some(text),
                    _ => form.date_applied = Some(text),
                }
            }
            other => {
                tracing::debug!("Ignoring multipart field '{}'", other);
            }
        }
    }

    Ok(form)
}

pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<String> {
    let count = state.service.count().await.map_err(api_error)?;
    Ok(format!("Job Tracker API is running ({} records). See /records.", count))
}

pub async fn list_records(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<RecordSummary>>> {
    let records = state.service.list().await.map_err(api_error)?;
    Ok(Json(records))
}

pub async fn get_record(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<RecordSummary>> {
    let id = record_id(path)?;
    let record = state.service.get(id).await.map_err(api_error)?;
    Ok(Json(record))
}

pub async fn create_record(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<(StatusCode, Json<RecordSummary>)> {
    let form = read_body(request).await?;
    let record = state.service.create(form).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_record(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    request: Request,
) -> ApiResult<Json<RecordSummary>> {
    let id = record_id(path)?;
    let form = read_body(request).await?;
    let record = state.service.update(id, form).await.map_err(api_error)?;
    Ok(Json(record))
}

pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = record_id(path)?;
    state.service.delete(id).await.map_err(api_error)?;
    Ok(Json(MessageResponse {
        message: "Record deleted successfully".to_string(),
    }))
}

pub async fn get_attachment(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    let id = record_id(path)?;
    let attachment = state.service.attachment(id).await.map_err(api_error)?;

    let headers = [
        (header::CONTENT_TYPE, attachment.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", attachment.file_name),
        ),
    ];
    Ok((headers, attachment.bytes).into_response())
}
