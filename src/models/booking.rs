use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

// Состояния брони: booked <-> cancelled, других переходов нет
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub show_id: i64,
    pub seat_number: i32,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

// Бронь с данными сеанса и фильма для истории пользователя
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingDetails {
    pub id: i64,
    pub show_id: i64,
    pub movie_title: String,
    pub screen_name: String,
    pub show_time: NaiveDateTime,
    pub seat_number: i32,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

impl BookingDetails {
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<BookingDetails>, sqlx::Error> {
        sqlx::query_as::<_, BookingDetails>(
            r#"
            SELECT b.id, b.show_id, m.title AS movie_title, sh.screen_name,
                   sh.date_time AS show_time, b.seat_number, b.status, b.created_at
            FROM bookings b
            JOIN shows sh ON sh.id = b.show_id
            JOIN movies m ON m.id = sh.movie_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
