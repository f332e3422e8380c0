use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::models::{Movie, ShowWithSeats};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{movie_id}/shows", get(list_shows))
}

// GET /api/movies
async fn list_movies(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let movies = Movie::list_all(&state.db.pool).await?;
    Ok(Json(movies))
}

// GET /api/movies/{movie_id}/shows
// Неизвестный фильм дает пустой список, а не 404
async fn list_shows(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let shows = ShowWithSeats::list_for_movie(&state.db.pool, movie_id).await?;
    Ok(Json(shows))
}
