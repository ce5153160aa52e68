use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Source {
    pub id: i64,
    pub title: String,
    pub created_at: OffsetDateTime,
    pub quote_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSource {
    pub title: String,
}
