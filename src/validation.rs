//! Turns raw form input into checked values and enforces the write-time rules
//! that need the database: unique source titles, unique `(text, source)` pairs
//! and the per-source quote cap.
//!
//! The database checks take a `&mut SqliteConnection` so callers run them on the
//! same transaction that performs the insert.

use serde::Deserialize;
use sqlx::SqliteConnection;
use thiserror::Error;

use crate::{
    constants::{MAX_QUOTES_PER_SOURCE, MAX_SOURCE_TITLE_LEN},
    error::{AppError, AppResult},
    models::{quotes::NewQuote, sources::NewSource},
};

/// message raised by the `quotes_source_limit` trigger.
const SOURCE_LIMIT_ABORT: &str = "source quote limit reached";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("source title must not be empty")]
    EmptyTitle,

    #[error("source title must be at most {} characters", MAX_SOURCE_TITLE_LEN)]
    TitleTooLong,

    #[error("a source with this title already exists")]
    DuplicateTitle,

    #[error("quote text must not be empty")]
    EmptyText,

    #[error("the selected source does not exist")]
    UnknownSource,

    #[error("weight must be a positive whole number")]
    InvalidWeight,

    #[error("this quote already exists for the selected source")]
    DuplicateQuote,

    #[error("source \"{0}\" already has the maximum number of quotes ({})", MAX_QUOTES_PER_SOURCE)]
    SourceFull(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SourceForm {
    pub title: String,
}

impl SourceForm {
    pub fn validate(&self) -> Result<NewSource, ValidationError> {
        let title = self.title.trim();

        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        if title.chars().count() > MAX_SOURCE_TITLE_LEN {
            return Err(ValidationError::TitleTooLong);
        }

        Ok(NewSource {
            title: title.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuoteForm {
    pub text: String,
    pub source: String,
    pub weight: String,
}

impl QuoteForm {
    pub fn validate(&self) -> Result<NewQuote, ValidationError> {
        let text = self.text.trim();

        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let source_id = self
            .source
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::UnknownSource)?;

        let weight = match self.weight.trim() {
            "" => 1,
            raw => raw
                .parse::<i64>()
                .ok()
                .filter(|weight| *weight >= 1)
                .ok_or(ValidationError::InvalidWeight)?,
        };

        Ok(NewQuote {
            text: text.to_string(),
            source_id,
            weight,
        })
    }
}

pub async fn ensure_title_is_free(conn: &mut SqliteConnection, title: &str) -> AppResult<()> {
    let taken: bool = sqlx::query_scalar(
        r#"
            SELECT EXISTS (
                SELECT 1 FROM sources WHERE title = $1
            );
        "#,
    )
    .bind(title)
    .fetch_one(&mut *conn)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, title = %title, "an error occurred when checking source title");
    })?;

    if taken {
        return Err(ValidationError::DuplicateTitle.into());
    }

    Ok(())
}

/// returns the source title so callers can word their messages with it.
pub async fn ensure_source_has_room(conn: &mut SqliteConnection, source_id: i64) -> AppResult<String> {
    let row: Option<(String, i64)> = sqlx::query_as(
        r#"
            SELECT
                s.title,
                (SELECT COUNT(*) FROM quotes q WHERE q.source_id = s.id)
            FROM sources s
            WHERE s.id = $1;
        "#,
    )
    .bind(source_id)
    .fetch_optional(&mut *conn)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, source_id, "an error occurred when counting quotes for source");
    })?;

    let Some((title, quote_count)) = row else {
        return Err(ValidationError::UnknownSource.into());
    };

    if quote_count >= MAX_QUOTES_PER_SOURCE {
        return Err(ValidationError::SourceFull(title).into());
    }

    Ok(title)
}

pub async fn ensure_quote_is_unique(conn: &mut SqliteConnection, quote: &NewQuote) -> AppResult<()> {
    let exists: bool = sqlx::query_scalar(
        r#"
            SELECT EXISTS (
                SELECT 1 FROM quotes WHERE text = $1 AND source_id = $2
            );
        "#,
    )
    .bind(&quote.text)
    .bind(quote.source_id)
    .fetch_one(&mut *conn)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, source_id = quote.source_id, "an error occurred when checking for duplicate quote");
    })?;

    if exists {
        return Err(ValidationError::DuplicateQuote.into());
    }

    Ok(())
}

/// maps constraint failures that slipped past the pre-checks (concurrent inserts)
/// onto the same validation errors the pre-checks would have produced.
pub fn map_constraint_error(
    e: sqlx::Error,
    on_unique: ValidationError,
    source_title: Option<&str>,
) -> AppError {
    let Some(db_error) = e.as_database_error() else {
        return AppError::Database(e);
    };

    if db_error.is_unique_violation() {
        return on_unique.into();
    }

    if let Some(title) = source_title {
        if db_error.message().contains(SOURCE_LIMIT_ABORT) {
            return ValidationError::SourceFull(title.to_string()).into();
        }
    }

    AppError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_form(text: &str, source: &str, weight: &str) -> QuoteForm {
        QuoteForm {
            text: text.to_string(),
            source: source.to_string(),
            weight: weight.to_string(),
        }
    }

    #[test]
    fn source_title_is_trimmed() {
        let form = SourceForm {
            title: "  Meditations  ".to_string(),
        };

        assert_eq!(form.validate().unwrap().title, "Meditations");
    }

    #[test]
    fn blank_source_title_is_rejected() {
        let form = SourceForm {
            title: " \t ".to_string(),
        };

        assert_eq!(form.validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn overlong_source_title_is_rejected() {
        let form = SourceForm {
            title: "x".repeat(MAX_SOURCE_TITLE_LEN + 1),
        };

        assert_eq!(form.validate(), Err(ValidationError::TitleTooLong));
    }

    #[test]
    fn quote_weight_defaults_to_one() {
        let quote = quote_form("Know thyself.", "4", "").validate().unwrap();

        assert_eq!(
            quote,
            NewQuote {
                text: "Know thyself.".to_string(),
                source_id: 4,
                weight: 1,
            }
        );
    }

    #[test]
    fn quote_weight_must_be_positive() {
        for weight in ["0", "-2", "1.5", "heavy"] {
            assert_eq!(
                quote_form("Know thyself.", "4", weight).validate(),
                Err(ValidationError::InvalidWeight),
                "weight {weight:?} should be rejected"
            );
        }
    }

    #[test]
    fn quote_needs_text_and_numeric_source() {
        assert_eq!(
            quote_form("   ", "4", "1").validate(),
            Err(ValidationError::EmptyText)
        );
        assert_eq!(
            quote_form("Know thyself.", "", "1").validate(),
            Err(ValidationError::UnknownSource)
        );
        assert_eq!(
            quote_form("Know thyself.", "four", "1").validate(),
            Err(ValidationError::UnknownSource)
        );
    }

    #[test]
    fn non_database_errors_pass_through() {
        let mapped = map_constraint_error(
            sqlx::Error::RowNotFound,
            ValidationError::DuplicateTitle,
            None,
        );

        assert!(matches!(mapped, AppError::Database(sqlx::Error::RowNotFound)));
    }
}
