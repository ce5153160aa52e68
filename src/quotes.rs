use rand::Rng;
use sqlx::{Pool, Sqlite, SqliteConnection};
use time::OffsetDateTime;

use crate::{
    constants::PAGE_SIZE,
    error::{AppError, AppResult},
    init::begin_write,
    models::quotes::{NewQuote, Quote, QuoteWeight, VoteAction, VoteTally},
    pagination::{Page, Paginator},
    selection::pick_weighted,
    validation::{self, ValidationError},
};

macro_rules! select_quotes {
    () => {
        r#"
            SELECT
                q.id,
                q.text,
                q.source_id,
                s.title AS source_title,
                q.weight,
                q.views_count,
                q.likes,
                q.dislikes,
                q.created_at,
                q.updated_at
            FROM quotes q
            JOIN sources s ON s.id = q.source_id
        "#
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteOrder {
    /// highest rating first, newest first among equal ratings.
    Popular,
    Newest,
}

pub async fn fetch_quote(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<Quote>> {
    let quote = sqlx::query_as::<_, Quote>(concat!(select_quotes!(), "WHERE q.id = $1;"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, id, "an error occurred when fetching quote"))?;

    Ok(quote)
}

/// picks a quote with probability proportional to its weight and counts the
/// view. the pick and the increment share one transaction.
#[tracing::instrument(skip_all)]
pub async fn random_quote<R>(db: &Pool<Sqlite>, rng: &mut R) -> AppResult<Option<Quote>>
where
    R: Rng + Send,
{
    let mut tx = begin_write(db).await?;

    let weights = sqlx::query_as::<_, QuoteWeight>(
        r#"
            SELECT
                id,
                weight
            FROM quotes
            ORDER BY id;
        "#,
    )
    .fetch_all(&mut *tx)
    .await
    .inspect_err(
        |e| tracing::error!(err = ?e, "an error occurred when fetching quote weights"),
    )?;

    let picked = pick_weighted(
        &weights,
        |quote| u64::try_from(quote.weight).unwrap_or(0),
        rng,
    )
    .map(|quote| quote.id);

    let Some(id) = picked else {
        tracing::info!("no quotes to pick from");
        return Ok(None);
    };

    sqlx::query(
        r#"
            UPDATE quotes
            SET
                views_count = views_count + 1,
                updated_at = $1
            WHERE id = $2;
        "#,
    )
    .bind(OffsetDateTime::now_utc())
    .bind(id)
    .execute(&mut *tx)
    .await
    .inspect_err(|e| tracing::error!(err = ?e, id, "an error occurred when counting quote view"))?;

    let quote = fetch_quote(&mut tx, id).await?;

    tx.commit().await?;

    if let Some(quote) = &quote {
        tracing::debug!(id, views = quote.views_count, summary = %quote.summary(), "picked quote");
    }

    Ok(quote)
}

/// inserts a validated quote. the source must exist, have room for another
/// quote and not already hold the same text.
#[tracing::instrument(skip(db))]
pub async fn create_quote(db: &Pool<Sqlite>, new_quote: NewQuote) -> AppResult<Quote> {
    let mut tx = begin_write(db).await?;

    let source_title = validation::ensure_source_has_room(&mut tx, new_quote.source_id).await?;
    validation::ensure_quote_is_unique(&mut tx, &new_quote).await?;

    let now = OffsetDateTime::now_utc();

    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO
                quotes (text, source_id, weight, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $4)
            RETURNING id;
        "#,
    )
    .bind(&new_quote.text)
    .bind(new_quote.source_id)
    .bind(new_quote.weight)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        validation::map_constraint_error(e, ValidationError::DuplicateQuote, Some(&source_title))
    })
    .inspect_err(|e| {
        tracing::warn!(err = ?e, source_id = new_quote.source_id, "an error occurred when adding quote");
    })?;

    let quote = fetch_quote(&mut tx, id)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    tx.commit().await?;

    tracing::info!(id, summary = %quote.summary(), "added quote");
    Ok(quote)
}

/// applies a vote in a single statement. `None` leaves the counters alone and
/// just reports them.
#[tracing::instrument(skip(db))]
pub async fn vote(db: &Pool<Sqlite>, id: i64, action: Option<VoteAction>) -> AppResult<VoteTally> {
    let now = OffsetDateTime::now_utc();

    let query = match action {
        Some(VoteAction::Like) => sqlx::query_as::<_, VoteTally>(
            r#"
                UPDATE quotes
                SET
                    likes = likes + 1,
                    updated_at = $1
                WHERE id = $2
                RETURNING
                    likes,
                    dislikes,
                    likes - dislikes AS rating;
            "#,
        )
        .bind(now)
        .bind(id),
        Some(VoteAction::Dislike) => sqlx::query_as::<_, VoteTally>(
            r#"
                UPDATE quotes
                SET
                    dislikes = dislikes + 1,
                    updated_at = $1
                WHERE id = $2
                RETURNING
                    likes,
                    dislikes,
                    likes - dislikes AS rating;
            "#,
        )
        .bind(now)
        .bind(id),
        None => sqlx::query_as::<_, VoteTally>(
            r#"
                SELECT
                    likes,
                    dislikes,
                    likes - dislikes AS rating
                FROM quotes
                WHERE id = $1;
            "#,
        )
        .bind(id),
    };

    let tally = query
        .fetch_optional(db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, id, "an error occurred when voting on quote"))?
        .ok_or(AppError::NotFound)?;

    Ok(tally)
}

pub async fn count_quotes(db: &Pool<Sqlite>) -> AppResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM quotes;")
        .fetch_one(db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when counting quotes"))?;

    Ok(count)
}

/// resolves `raw_page` against the current number of quotes and loads that page.
#[tracing::instrument(skip(db))]
pub async fn list_page(
    db: &Pool<Sqlite>,
    order: QuoteOrder,
    raw_page: Option<&str>,
) -> AppResult<(Page, Vec<Quote>)> {
    let count = count_quotes(db).await?;
    let page = Paginator::new(count, PAGE_SIZE).page(raw_page);

    let sql = match order {
        QuoteOrder::Popular => concat!(
            select_quotes!(),
            r#"
                ORDER BY
                    q.likes - q.dislikes DESC,
                    q.created_at DESC,
                    q.id DESC
                LIMIT $1 OFFSET $2;
            "#
        ),
        QuoteOrder::Newest => concat!(
            select_quotes!(),
            r#"
                ORDER BY
                    q.created_at DESC,
                    q.id DESC
                LIMIT $1 OFFSET $2;
            "#
        ),
    };

    let quotes = sqlx::query_as::<_, Quote>(sql)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(db)
        .await
        .inspect_err(
            |e| tracing::error!(err = ?e, ?order, "an error occurred when fetching quote page"),
        )?;

    Ok((page, quotes))
}
