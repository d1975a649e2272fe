//! Request extractors that reject with `400 Bad Request` instead of the
//! framework's default rejection statuses.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;

use crate::domain::StagePayload;
use crate::error::AppError;

/// Integer stage id taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for StageId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid stage ID".into()))?;

        raw.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| AppError::BadRequest("Invalid stage ID".into()))
    }
}

/// JSON stage body. The `Content-Type` header is not inspected and a bare
/// `null` body stands for an empty stage.
#[derive(Debug)]
pub struct StageBody(pub StagePayload);

#[async_trait]
impl<S> FromRequest<S> for StageBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::BadRequest("Failed to decode request body".into()))?;

        serde_json::from_slice::<Option<StagePayload>>(&bytes)
            .map(|payload| Self(payload.unwrap_or_default()))
            .map_err(|err| {
                tracing::debug!("Rejected stage body: {}", err);
                AppError::BadRequest("Failed to decode request body".into())
            })
    }
}
