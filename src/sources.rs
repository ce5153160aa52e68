use sqlx::{Pool, Sqlite};
use time::OffsetDateTime;

use crate::{
    constants::MAX_QUOTES_PER_SOURCE,
    error::AppResult,
    init::begin_write,
    models::sources::{NewSource, Source},
    validation::{self, ValidationError},
};

#[tracing::instrument(skip(db))]
pub async fn create_source(db: &Pool<Sqlite>, new_source: NewSource) -> AppResult<Source> {
    let mut tx = begin_write(db).await?;

    validation::ensure_title_is_free(&mut tx, &new_source.title).await?;

    let source = sqlx::query_as::<_, Source>(
        r#"
            INSERT INTO
                sources (title, created_at)
            VALUES
                ($1, $2)
            RETURNING
                id,
                title,
                created_at,
                0 AS quote_count;
        "#,
    )
    .bind(&new_source.title)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| validation::map_constraint_error(e, ValidationError::DuplicateTitle, None))
    .inspect_err(|e| {
        tracing::warn!(err = ?e, title = %new_source.title, "an error occurred when adding source");
    })?;

    tx.commit().await?;

    tracing::info!(id = source.id, title = %source.title, "added source");
    Ok(source)
}

/// sources that can still take another quote, by title.
pub async fn list_available(db: &Pool<Sqlite>) -> AppResult<Vec<Source>> {
    let sources = sqlx::query_as::<_, Source>(
        r#"
            SELECT
                s.id,
                s.title,
                s.created_at,
                COUNT(q.id) AS quote_count
            FROM sources s
            LEFT JOIN quotes q ON q.source_id = s.id
            GROUP BY s.id, s.title, s.created_at
            HAVING COUNT(q.id) < $1
            ORDER BY s.title;
        "#,
    )
    .bind(MAX_QUOTES_PER_SOURCE)
    .fetch_all(db)
    .await
    .inspect_err(
        |e| tracing::error!(err = ?e, "an error occurred when fetching available sources"),
    )?;

    Ok(sources)
}
