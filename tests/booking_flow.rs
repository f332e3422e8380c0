//! End-to-end reservation flow against a real Postgres database.
//!
//! These tests run only when TEST_DATABASE_URL points at a disposable
//! Postgres instance (e.g. in CI); without it each test skips itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::PgPool;

use cinema_booking::errors::ApiError;
use cinema_booking::models::{BookingDetails, BookingStatus, Movie, Show, ShowWithSeats, User};
use cinema_booking::services::reservation;

async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return None;
        }
    };
    let pool = PgPool::connect(&url)
        .await
        .expect("failed to connect to TEST_DATABASE_URL");
    sqlx::migrate!("./src/migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");
    Some(pool)
}

fn unique() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!(
        "{}_{}_{}",
        std::process::id(),
        nanos,
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

async fn seed_show(pool: &PgPool, total_seats: i32) -> Show {
    let movie = Movie::create(pool, &format!("Test Movie {}", unique()), 120)
        .await
        .unwrap();
    Show::create(
        pool,
        movie.id,
        "Screen 1",
        chrono::Utc::now().naive_utc(),
        total_seats,
    )
    .await
    .unwrap()
}

async fn seed_user(pool: &PgPool) -> User {
    let name = format!("user_{}", unique());
    User::create(pool, &name, &format!("{}@example.com", name), "test-hash")
        .await
        .unwrap()
}

async fn available_seats(pool: &PgPool, show_id: i64) -> i32 {
    sqlx::query_scalar("SELECT available_seats FROM shows WHERE id = $1")
        .bind(show_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn active_bookings(pool: &PgPool, show_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE show_id = $1 AND status = 'booked'")
        .bind(show_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn booking_status(pool: &PgPool, booking_id: i64) -> BookingStatus {
    sqlx::query_scalar("SELECT status FROM bookings WHERE id = $1")
        .bind(booking_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// available_seats == total_seats - count(active bookings)
async fn assert_no_drift(pool: &PgPool, show: &Show) {
    let available = available_seats(pool, show.id).await;
    let active = active_bookings(pool, show.id).await;
    assert_eq!(
        available as i64,
        show.total_seats as i64 - active,
        "seat counter drifted away from the bookings table"
    );
}

#[tokio::test]
async fn two_seat_show_scenario() {
    let Some(pool) = test_pool().await else { return };
    let show = seed_show(&pool, 2).await;
    let alice = seed_user(&pool).await;
    let bob = seed_user(&pool).await;

    // seat 1 for alice
    let b1 = reservation::create_booking(&pool, alice.id, show.id, 1)
        .await
        .unwrap();
    assert_eq!(b1.status, BookingStatus::Booked);
    assert_eq!(available_seats(&pool, show.id).await, 1);

    // same seat for bob: conflict, counter untouched
    let err = reservation::create_booking(&pool, bob.id, show.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::SeatTaken(1)));
    assert_eq!(available_seats(&pool, show.id).await, 1);
    assert_eq!(active_bookings(&pool, show.id).await, 1);

    // seat 2 for alice: sold out now
    reservation::create_booking(&pool, alice.id, show.id, 2)
        .await
        .unwrap();
    assert_eq!(available_seats(&pool, show.id).await, 0);

    // seat 1 once more: either rejection is correct for a full show
    let err = reservation::create_booking(&pool, bob.id, show.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::SeatTaken(1) | ApiError::ShowFull));
    assert_eq!(available_seats(&pool, show.id).await, 0);

    // cancel frees the seat again
    reservation::cancel_booking(&pool, alice.id, b1.id)
        .await
        .unwrap();
    assert_eq!(available_seats(&pool, show.id).await, 1);
    assert_eq!(booking_status(&pool, b1.id).await, BookingStatus::Cancelled);

    assert_no_drift(&pool, &show).await;
}

#[tokio::test]
async fn out_of_range_seat_is_rejected_without_a_row() {
    let Some(pool) = test_pool().await else { return };
    let show = seed_show(&pool, 2).await;
    let user = seed_user(&pool).await;

    for seat in [0, -1, 3] {
        let err = reservation::create_booking(&pool, user.id, show.id, seat)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE show_id = $1")
        .bind(show.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
    assert_eq!(available_seats(&pool, show.id).await, 2);
}

#[tokio::test]
async fn unknown_show_and_booking_are_not_found() {
    let Some(pool) = test_pool().await else { return };
    let user = seed_user(&pool).await;

    let err = reservation::create_booking(&pool, user.id, i64::MAX, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound("Show")));

    let err = reservation::cancel_booking(&pool, user.id, i64::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound("Booking")));
}

#[tokio::test]
async fn cancelling_twice_is_rejected_and_leaves_the_counter_alone() {
    let Some(pool) = test_pool().await else { return };
    let show = seed_show(&pool, 5).await;
    let user = seed_user(&pool).await;

    let booking = reservation::create_booking(&pool, user.id, show.id, 3)
        .await
        .unwrap();
    reservation::cancel_booking(&pool, user.id, booking.id)
        .await
        .unwrap();
    assert_eq!(available_seats(&pool, show.id).await, 5);

    let err = reservation::cancel_booking(&pool, user.id, booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::AlreadyCancelled));
    assert_eq!(available_seats(&pool, show.id).await, 5);
    assert_no_drift(&pool, &show).await;
}

#[tokio::test]
async fn cancelling_someone_elses_booking_is_forbidden() {
    let Some(pool) = test_pool().await else { return };
    let show = seed_show(&pool, 5).await;
    let owner = seed_user(&pool).await;
    let intruder = seed_user(&pool).await;

    let booking = reservation::create_booking(&pool, owner.id, show.id, 1)
        .await
        .unwrap();

    let err = reservation::cancel_booking(&pool, intruder.id, booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));

    // nothing mutated
    assert_eq!(booking_status(&pool, booking.id).await, BookingStatus::Booked);
    assert_eq!(available_seats(&pool, show.id).await, 4);
}

#[tokio::test]
async fn sold_out_guard_rejects_a_seat_that_slipped_past_the_precheck() {
    let Some(pool) = test_pool().await else { return };
    let show = seed_show(&pool, 2).await;
    let user = seed_user(&pool).await;

    reservation::create_booking(&pool, user.id, show.id, 1)
        .await
        .unwrap();

    // mimic the state a racer observes: counter at zero, seat 2 still free
    sqlx::query("UPDATE shows SET available_seats = 0 WHERE id = $1")
        .bind(show.id)
        .execute(&pool)
        .await
        .unwrap();

    let err = reservation::create_booking(&pool, user.id, show.id, 2)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ShowFull));

    // the losing attempt must not leave a row behind
    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE show_id = $1 AND seat_number = 2",
    )
    .bind(show.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn cancelled_seat_can_be_rebooked_with_a_fresh_row() {
    let Some(pool) = test_pool().await else { return };
    let show = seed_show(&pool, 3).await;
    let alice = seed_user(&pool).await;
    let bob = seed_user(&pool).await;

    let first = reservation::create_booking(&pool, alice.id, show.id, 2)
        .await
        .unwrap();
    reservation::cancel_booking(&pool, alice.id, first.id)
        .await
        .unwrap();

    // the freed seat goes to bob as a brand-new booking row
    let second = reservation::create_booking(&pool, bob.id, show.id, 2)
        .await
        .unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(second.status, BookingStatus::Booked);

    // cancelled row is kept as history
    assert_eq!(booking_status(&pool, first.id).await, BookingStatus::Cancelled);
    assert_no_drift(&pool, &show).await;
}

#[tokio::test]
async fn counter_drift_on_cancel_is_surfaced_not_widened() {
    let Some(pool) = test_pool().await else { return };
    let show = seed_show(&pool, 2).await;
    let user = seed_user(&pool).await;

    let booking = reservation::create_booking(&pool, user.id, show.id, 1)
        .await
        .unwrap();

    // inject drift: counter already back at total while a booking is active
    sqlx::query("UPDATE shows SET available_seats = total_seats WHERE id = $1")
        .bind(show.id)
        .execute(&pool)
        .await
        .unwrap();

    let err = reservation::cancel_booking(&pool, user.id, booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InventoryOutOfSync(_)));

    // the whole transaction rolled back, the booking is still active
    assert_eq!(booking_status(&pool, booking.id).await, BookingStatus::Booked);
}

#[tokio::test]
async fn booking_history_is_newest_first_and_enriched() {
    let Some(pool) = test_pool().await else { return };
    let show = seed_show(&pool, 5).await;
    let user = seed_user(&pool).await;

    for seat in [4, 1, 3] {
        reservation::create_booking(&pool, user.id, show.id, seat)
            .await
            .unwrap();
    }

    let history = BookingDetails::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(history.len(), 3);
    for pair in history.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
    let mut seats: Vec<i32> = history.iter().map(|b| b.seat_number).collect();
    seats.sort();
    assert_eq!(seats, vec![1, 3, 4]);
    assert!(history.iter().all(|b| b.movie_title.starts_with("Test Movie")));
    assert!(history.iter().all(|b| b.screen_name == "Screen 1"));
}

#[tokio::test]
async fn show_listing_reports_active_seats_only() {
    let Some(pool) = test_pool().await else { return };
    let movie = Movie::create(&pool, &format!("Test Movie {}", unique()), 95)
        .await
        .unwrap();
    let show = Show::create(&pool, movie.id, "Screen 2", chrono::Utc::now().naive_utc(), 10)
        .await
        .unwrap();
    let user = seed_user(&pool).await;

    reservation::create_booking(&pool, user.id, show.id, 7)
        .await
        .unwrap();
    let cancelled = reservation::create_booking(&pool, user.id, show.id, 2)
        .await
        .unwrap();
    reservation::create_booking(&pool, user.id, show.id, 5)
        .await
        .unwrap();
    reservation::cancel_booking(&pool, user.id, cancelled.id)
        .await
        .unwrap();

    let shows = ShowWithSeats::list_for_movie(&pool, movie.id).await.unwrap();
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0].movie_title, movie.title);
    // ascending, cancelled seat 2 not listed
    assert_eq!(shows[0].booked_seats, vec![5, 7]);
    assert_eq!(shows[0].available_seats, 8);
}

#[tokio::test]
async fn listing_shows_for_an_unknown_movie_is_empty() {
    let Some(pool) = test_pool().await else { return };
    let shows = ShowWithSeats::list_for_movie(&pool, i64::MAX).await.unwrap();
    assert!(shows.is_empty());
}
