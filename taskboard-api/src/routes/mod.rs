/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, session and user management
/// - `projects`: Project CRUD
/// - `tasks`: Task CRUD
///
/// Successful responses share the envelope `{ "message": ..., "data": ... }`.

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
    Json,
};
use serde::Serialize;

use crate::error::ApiError;

/// JSON body whose rejections use the API error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Numeric `:id` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;

        raw.parse::<i32>()
            .map(ResourceId)
            .map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
    }
}

/// Success envelope with a payload
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub message: &'static str,
    pub data: T,
}

/// Success envelope without a payload
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub(crate) fn data<T: Serialize>(message: &'static str, data: T) -> Json<DataResponse<T>> {
    Json(DataResponse { message, data })
}

pub(crate) fn message(message: &'static str) -> Json<MessageResponse> {
    Json(MessageResponse { message })
}
