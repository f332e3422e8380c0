use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::BookingDetails;
use crate::services::reservation;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows/{show_id}/book", post(book_seat))
        .route("/bookings/{booking_id}/cancel", post(cancel_booking))
        .route("/my-bookings", get(my_bookings))
}

/* ---------- BOOK ---------- */

// POST /api/shows/{show_id}/book
#[derive(Debug, Deserialize, Validate)]
struct BookSeatRequest {
    #[validate(range(min = 1, message = "Seat number must be >= 1"))]
    seat_number: i32,
}

async fn book_seat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(show_id): Path<i64>,
    Json(req): Json<BookSeatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let booking =
        reservation::create_booking(&state.db.pool, user.user_id, show_id, req.seat_number)
            .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/* ---------- CANCEL ---------- */

// POST /api/bookings/{booking_id}/cancel
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    reservation::cancel_booking(&state.db.pool, user.user_id, booking_id).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Booking cancelled successfully" })),
    ))
}

/* ---------- HISTORY ---------- */

// GET /api/my-bookings
async fn my_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let bookings = BookingDetails::list_for_user(&state.db.pool, user.user_id).await?;
    Ok(Json(bookings))
}
