//! Image Upload Handler
//!
//! 接收 multipart 图片，交给 [`ImageStore`](crate::services::ImageStore) 处理。

use axum::{
    Extension,
    body::Bytes,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use http::header;

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::StoredImage;
use crate::utils::{AppError, ErrorCode, ok_with_message};

/// Accepted multipart field names
const FILE_FIELDS: &[&str] = &["image", "file"];

/// POST /api/upload/image
pub async fn upload(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> ApiResult<StoredImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if !FILE_FIELDS.contains(&name.as_str()) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::invalid_request(format!("Failed to read upload: {}", e)))?;

        let stored = state.images.put(data.to_vec(), &filename).await?;
        tracing::info!(
            public_id = %stored.public_id,
            original_name = %filename,
            size = stored.size,
            uploaded_by = %current_user.id,
            "Image uploaded"
        );
        return Ok(ok_with_message(stored, "Image uploaded successfully"));
    }

    Err(AppError::validation("No image file in request"))
}

/// GET /api/image/:filename
pub async fn serve(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let not_found = || {
        AppError::with_message(ErrorCode::ImageNotFound, format!("Image {} not found", filename))
    };

    let path = state.images.resolve(&filename).ok_or_else(not_found)?;
    let content = match tokio::fs::read(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(AppError::internal(format!("Failed to read image: {}", e))),
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        Bytes::from(content),
    )
        .into_response())
}
