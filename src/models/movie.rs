use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub duration_minutes: i32,
    pub created_at: NaiveDateTime,
}

impl Movie {
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Movie>, sqlx::Error> {
        sqlx::query_as::<_, Movie>("SELECT id, title, duration_minutes, created_at FROM movies")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_title(pool: &PgPool, title: &str) -> Result<Option<Movie>, sqlx::Error> {
        sqlx::query_as::<_, Movie>(
            "SELECT id, title, duration_minutes, created_at FROM movies WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        title: &str,
        duration_minutes: i32,
    ) -> Result<Movie, sqlx::Error> {
        sqlx::query_as::<_, Movie>(
            "INSERT INTO movies (title, duration_minutes)
             VALUES ($1, $2)
             RETURNING id, title, duration_minutes, created_at",
        )
        .bind(title)
        .bind(duration_minutes)
        .fetch_one(pool)
        .await
    }
}
