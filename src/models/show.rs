use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Show {
    pub id: i64,
    pub movie_id: i64,
    pub screen_name: String,
    pub date_time: NaiveDateTime,
    pub total_seats: i32,
    pub available_seats: i32,
}

// Сеанс для листинга: вместе с названием фильма и занятыми местами
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowWithSeats {
    pub id: i64,
    pub movie_id: i64,
    pub movie_title: String,
    pub screen_name: String,
    pub date_time: NaiveDateTime,
    pub total_seats: i32,
    pub available_seats: i32,
    pub booked_seats: Vec<i32>,
}

impl Show {
    pub async fn create(
        pool: &PgPool,
        movie_id: i64,
        screen_name: &str,
        date_time: NaiveDateTime,
        total_seats: i32,
    ) -> Result<Show, sqlx::Error> {
        sqlx::query_as::<_, Show>(
            "INSERT INTO shows (movie_id, screen_name, date_time, total_seats, available_seats)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING *",
        )
        .bind(movie_id)
        .bind(screen_name)
        .bind(date_time)
        .bind(total_seats)
        .fetch_one(pool)
        .await
    }
}

impl ShowWithSeats {
    // Занятые места собираются тем же запросом, отдельного похода за
    // бронированиями нет
    pub async fn list_for_movie(
        pool: &PgPool,
        movie_id: i64,
    ) -> Result<Vec<ShowWithSeats>, sqlx::Error> {
        sqlx::query_as::<_, ShowWithSeats>(
            r#"
            SELECT sh.id, sh.movie_id, m.title AS movie_title, sh.screen_name,
                   sh.date_time, sh.total_seats, sh.available_seats,
                   COALESCE(
                       array_agg(b.seat_number ORDER BY b.seat_number)
                           FILTER (WHERE b.status = 'booked'),
                       ARRAY[]::INT[]
                   ) AS booked_seats
            FROM shows sh
            JOIN movies m ON m.id = sh.movie_id
            LEFT JOIN bookings b ON b.show_id = sh.id
            WHERE sh.movie_id = $1
            GROUP BY sh.id, m.title
            ORDER BY sh.date_time
            "#,
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
    }
}
