//! reservation.rs
//!
//! Сервисный слой бронирования мест. Единственная часть системы с
//! настоящими контрактами:
//!
//! 1.  **Инвариант счетчика**: после каждой успешной операции
//!     `available_seats == total_seats - count(активных броней)` для сеанса.
//!     Счетчик меняется только условными одиночными UPDATE в той же
//!     транзакции, что и строка брони - никаких read-modify-write.
//! 2.  **Уникальность места**: не более одной активной брони на
//!     (сеанс, место). Частичный уникальный индекс ловит гонку, которую
//!     пропустила предварительная проверка, и проигравший получает тот же
//!     конфликт, а не общий сбой.
//! 3.  **Владение**: отменить бронь может только ее владелец.

use sqlx::PgPool;
use tracing::info;

use crate::errors::{is_unique_violation, ApiError};
use crate::models::{Booking, BookingStatus};

#[derive(sqlx::FromRow)]
struct ShowRow {
    id: i64,
    total_seats: i32,
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    user_id: i64,
    show_id: i64,
    status: BookingStatus,
}

pub fn validate_seat_number(seat_number: i32, total_seats: i32) -> Result<(), ApiError> {
    if seat_number < 1 || seat_number > total_seats {
        return Err(ApiError::Validation(format!(
            "Seat number must be between 1 and {}",
            total_seats
        )));
    }
    Ok(())
}

pub async fn create_booking(
    pool: &PgPool,
    user_id: i64,
    show_id: i64,
    seat_number: i32,
) -> Result<Booking, ApiError> {
    let mut tx = pool.begin().await?;

    let show: Option<ShowRow> =
        sqlx::query_as("SELECT id, total_seats FROM shows WHERE id = $1")
            .bind(show_id)
            .fetch_optional(&mut *tx)
            .await?;
    let show = show.ok_or(ApiError::NotFound("Show"))?;

    validate_seat_number(seat_number, show.total_seats)?;

    // есть ли уже активная бронь на это место
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(
            SELECT 1 FROM bookings
            WHERE show_id = $1 AND seat_number = $2 AND status = 'booked'
         )",
    )
    .bind(show.id)
    .bind(seat_number)
    .fetch_one(&mut *tx)
    .await?;
    if taken {
        return Err(ApiError::SeatTaken(seat_number));
    }

    // Conditional decrement: zero rows affected means the show is sold out.
    let decremented = sqlx::query(
        "UPDATE shows SET available_seats = available_seats - 1
         WHERE id = $1 AND available_seats > 0",
    )
    .bind(show.id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if decremented == 0 {
        return Err(ApiError::ShowFull);
    }

    // The partial unique index catches a same-seat racer that slipped past
    // the pre-check; classify it as the same conflict, not a server fault.
    let booking = sqlx::query_as::<_, Booking>(
        "INSERT INTO bookings (user_id, show_id, seat_number)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(user_id)
    .bind(show.id)
    .bind(seat_number)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::SeatTaken(seat_number)
        } else {
            e.into()
        }
    })?;

    tx.commit().await?;
    info!(
        "user {} booked seat {} for show {}",
        user_id, seat_number, show_id
    );
    Ok(booking)
}

pub async fn cancel_booking(pool: &PgPool, user_id: i64, booking_id: i64) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    let row: Option<BookingRow> =
        sqlx::query_as("SELECT user_id, show_id, status FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await?;
    let row = row.ok_or(ApiError::NotFound("Booking"))?;

    // проверка владельца
    if row.user_id != user_id {
        return Err(ApiError::Forbidden);
    }
    if row.status == BookingStatus::Cancelled {
        return Err(ApiError::AlreadyCancelled);
    }

    // Conditional flip: a concurrent cancel of the same booking loses here.
    let flipped = sqlx::query(
        "UPDATE bookings SET status = 'cancelled' WHERE id = $1 AND status = 'booked'",
    )
    .bind(booking_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if flipped == 0 {
        return Err(ApiError::AlreadyCancelled);
    }

    // Give the seat back. Zero rows means the counter no longer agrees with
    // the bookings table; abort instead of widening the drift.
    let incremented = sqlx::query(
        "UPDATE shows SET available_seats = available_seats + 1
         WHERE id = $1 AND available_seats < total_seats",
    )
    .bind(row.show_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if incremented == 0 {
        return Err(ApiError::InventoryOutOfSync(row.show_id));
    }

    tx.commit().await?;
    info!("user {} cancelled booking {}", user_id, booking_id);
    Ok(())
}
