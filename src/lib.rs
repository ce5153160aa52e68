//! A small quote board: serves a weighted-random quote from a curated set of
//! sources, lets visitors like or dislike quotes and shows a popularity
//! ranking, a full listing and a dashboard.

use sqlx::{Pool, Sqlite};

pub mod config;
pub mod constants;
pub mod error;
pub mod flash;
pub mod init;
pub mod models;
pub mod pagination;
pub mod quotes;
pub mod render;
pub mod routes;
pub mod selection;
pub mod sources;
pub mod stats;
pub mod telemetry;
pub mod validation;

/// state shared by every request handler.
#[derive(Clone)]
pub struct Data {
    pub db: Pool<Sqlite>,
}
