use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Все ошибки, которые API возвращает клиенту. Каждый вариант знает свой
// HTTP-статус, хендлеры просто пробрасывают их через `?`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Seat {0} is already booked")]
    SeatTaken(i32),

    #[error("No available seats for this show")]
    ShowFull,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("You can only cancel your own bookings")]
    Forbidden,

    #[error("Booking is already cancelled")]
    AlreadyCancelled,

    #[error("Invalid or missing credentials")]
    Unauthorized,

    #[error("seat counter out of sync for show {0}")]
    InventoryOutOfSync(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::SeatTaken(_)
            | ApiError::ShowFull
            | ApiError::AlreadyCancelled => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InventoryOutOfSync(_)
            | ApiError::Database(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Детали 5xx уходят в лог, клиент видит общий текст
        let message = if status.is_server_error() {
            tracing::error!("internal error: {:?}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
