use serde::Serialize;
use time::OffsetDateTime;

use crate::constants::SUMMARY_LEN;

/// a quote joined with the title of its source.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Quote {
    pub id: i64,
    pub text: String,
    pub source_id: i64,
    pub source_title: String,
    pub weight: i64,
    pub views_count: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Quote {
    pub fn rating(&self) -> i64 {
        self.likes - self.dislikes
    }

    pub fn like_percentage(&self) -> f64 {
        let total = self.likes + self.dislikes;

        if total == 0 {
            return 0.0;
        }

        self.likes as f64 / total as f64 * 100.0
    }

    /// short form used in log lines, e.g. `"the first fifty characters..." - source`.
    pub fn summary(&self) -> String {
        let head: String = self.text.chars().take(SUMMARY_LEN).collect();

        format!("{}... - {}", head, self.source_title)
    }
}

/// the slice of a quote the weighted pick needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct QuoteWeight {
    pub id: i64,
    pub weight: i64,
}

/// validated input for a new quote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewQuote {
    pub text: String,
    pub source_id: i64,
    pub weight: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct VoteTally {
    pub likes: i64,
    pub dislikes: i64,
    pub rating: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteAction {
    Like,
    Dislike,
}

impl VoteAction {
    /// anything other than `like` or `dislike` is not a vote.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "like" => Some(VoteAction::Like),
            "dislike" => Some(VoteAction::Dislike),
            _ => None,
        }
    }
}
