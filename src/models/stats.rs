#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct SourceStats {
    pub id: i64,
    pub title: String,
    pub total_quotes: i64,
    pub total_likes: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_quotes: i64,
    pub total_sources: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub popular_sources: Vec<SourceStats>,
}
