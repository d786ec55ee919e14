/**
 * Image Handlers
 *
 * - `POST /images` - multipart upload (field `image`), write access required;
 *   JPEG, PNG, GIF and WebP are accepted
 * - `GET /images/{name}` - the stored bytes with the content type of their
 *   format; `w`/`h` query parameters are ignored
 * - `DELETE /images/{name}` - remove, any authenticated session
 */

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::backend::error::BackendError;
use crate::backend::images::store::{ImageFormat, ImageStore};
use crate::backend::middleware::{Requester, SessionContext};

/// Images never change under a name, so clients may cache for a year
const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub async fn upload_image(
    requester: Requester,
    State(images): State<Arc<dyn ImageStore>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), BackendError> {
    requester.ensure_write_access()?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| BackendError::validation("image", err.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let declared = field.content_type().and_then(ImageFormat::from_mime_type);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| BackendError::validation("image", err.body_text()))?;
        if bytes.is_empty() {
            return Err(BackendError::validation("image", "Empty image"));
        }

        let format = ImageFormat::sniff(&bytes)
            .or(declared)
            .ok_or_else(|| BackendError::validation("image", "Unsupported image type"))?;

        let name = images.save(bytes, format).await?;
        return Ok((StatusCode::CREATED, Json(json!({ "name": name }))));
    }

    Err(BackendError::validation("image", "No image"))
}

pub async fn get_image(
    State(images): State<Arc<dyn ImageStore>>,
    Path(name): Path<String>,
) -> Result<Response, BackendError> {
    let bytes = images
        .load(&name)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found"))?;
    let content_type = ImageFormat::from_name(&name)
        .map(ImageFormat::mime_type)
        .unwrap_or("application/octet-stream");

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL),
        ],
        bytes,
    )
        .into_response())
}

pub async fn delete_image(
    _session: SessionContext,
    State(images): State<Arc<dyn ImageStore>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, BackendError> {
    images.remove(&name).await?;
    Ok(Json(json!({})))
}
