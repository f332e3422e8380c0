//! Загрузка демонстрационных данных: фильмы, сеансы и тестовый
//! пользователь для локальной разработки. Повторный запуск безопасен -
//! существующие строки пропускаются по естественному ключу.

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;

use cinema_booking::config::Config;
use cinema_booking::database::Database;
use cinema_booking::models::{Movie, Show, User};

const MOVIES: [(&str, i32); 4] = [
    ("Avengers: Endgame", 181),
    ("The Dark Knight", 152),
    ("Inception", 148),
    ("Interstellar", 169),
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .init();

    let db = Database::new(&config.database.url, config.database.pool_size).await?;
    db.run_migrations().await?;

    let now = Utc::now().naive_utc();

    for (i, (title, duration_minutes)) in MOVIES.iter().enumerate() {
        if Movie::find_by_title(&db.pool, title).await?.is_some() {
            info!("movie '{}' already present, skipping", title);
            continue;
        }

        let movie = Movie::create(&db.pool, title, *duration_minutes).await?;

        // три сеанса на фильм, по залу на сеанс
        for j in 0..3i64 {
            Show::create(
                &db.pool,
                movie.id,
                &format!("Screen {}", j + 1),
                now + Duration::days(i as i64) + Duration::hours(j * 3),
                100,
            )
            .await?;
        }
        info!("seeded movie '{}' with 3 shows", title);
    }

    if User::find_by_username(&db.pool, "demo").await?.is_none() {
        let password_hash = User::hash_password("demo-password")?;
        User::create(&db.pool, "demo", "demo@example.com", &password_hash).await?;
        info!("seeded demo user (password: demo-password)");
    }

    info!("Sample data created successfully!");
    Ok(())
}
