use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite, Transaction,
};

use crate::{config::Config, constants::STARTUP_TIME, routes, telemetry, Data};

/// opens the pool and brings the schema up to date.
///
/// connections are never recycled, so a `sqlite::memory:` database with a
/// single connection lives as long as the pool.
pub async fn init_database(db_url: &str, max_connections: u32) -> anyhow::Result<Pool<Sqlite>> {
    tracing::info!("initializing database connection...");
    let opts = SqliteConnectOptions::from_str(db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30));
    let db = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;

    tracing::info!("running migrations...");
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("finished running migrations!");

    Ok(db)
}

/// starts a transaction that holds the write lock from its first statement.
///
/// a deferred transaction that reads and then writes fails with
/// `SQLITE_BUSY` straight away if another connection committed in between,
/// without waiting on the busy timeout.
pub async fn begin_write(db: &Pool<Sqlite>) -> sqlx::Result<Transaction<'static, Sqlite>> {
    db.begin_with("BEGIN IMMEDIATE").await
}

pub async fn init() -> anyhow::Result<(axum::Router, Config)> {
    std::sync::LazyLock::force(&STARTUP_TIME);
    telemetry::init_telemetry()?;

    tracing::info!("initializing... please wait warmly.");

    let config = Config::from_env()?;
    let db = init_database(&config.database_url, config.max_connections).await?;

    let router = routes::router(Data { db });

    tracing::info!("finished initializing!");
    Ok((router, config))
}

#[cfg(test)]
pub(crate) async fn memory_db() -> Pool<Sqlite> {
    init_database("sqlite::memory:", 1)
        .await
        .expect("in-memory database should initialize")
}
