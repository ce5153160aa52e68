use sqlx::{Pool, Sqlite};

use crate::{
    constants::TOP_SOURCES_LIMIT,
    error::AppResult,
    models::stats::{DashboardStats, SourceStats},
};

/// aggregate counters plus the best-liked sources. all reads share one
/// transaction so the numbers agree with each other.
#[tracing::instrument(skip_all)]
pub async fn dashboard(db: &Pool<Sqlite>) -> AppResult<DashboardStats> {
    let mut tx = db.begin().await?;

    let (total_quotes, total_views, total_likes): (i64, i64, i64) = sqlx::query_as(
        r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(views_count), 0),
                COALESCE(SUM(likes), 0)
            FROM quotes;
        "#,
    )
    .fetch_one(&mut *tx)
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when summing quote counters"))?;

    let total_sources: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sources;")
        .fetch_one(&mut *tx)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when counting sources"))?;

    let popular_sources = sqlx::query_as::<_, SourceStats>(
        r#"
            SELECT
                s.id,
                s.title,
                COUNT(q.id) AS total_quotes,
                COALESCE(SUM(q.likes), 0) AS total_likes
            FROM sources s
            LEFT JOIN quotes q ON q.source_id = s.id
            GROUP BY s.id, s.title
            ORDER BY
                total_likes DESC,
                total_quotes DESC,
                s.title
            LIMIT $1;
        "#,
    )
    .bind(TOP_SOURCES_LIMIT)
    .fetch_all(&mut *tx)
    .await
    .inspect_err(
        |e| tracing::error!(err = ?e, "an error occurred when ranking sources by likes"),
    )?;

    tx.commit().await?;

    Ok(DashboardStats {
        total_quotes,
        total_sources,
        total_views,
        total_likes,
        popular_sources,
    })
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        init::memory_db,
        models::{
            quotes::{NewQuote, Quote, VoteAction},
            sources::NewSource,
        },
        quotes::{create_quote, random_quote, vote},
        sources::create_source,
    };

    async fn source(db: &Pool<Sqlite>, title: &str) -> i64 {
        create_source(
            db,
            NewSource {
                title: title.to_string(),
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn quote(db: &Pool<Sqlite>, source_id: i64, text: &str) -> Quote {
        create_quote(
            db,
            NewQuote {
                text: text.to_string(),
                source_id,
                weight: 1,
            },
        )
        .await
        .unwrap()
    }

    async fn like(db: &Pool<Sqlite>, quote: &Quote, times: usize) {
        for _ in 0..times {
            vote(db, quote.id, Some(VoteAction::Like)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn empty_dashboard_is_all_zeroes() {
        let db = memory_db().await;

        let stats = dashboard(&db).await.unwrap();

        assert_eq!(
            stats,
            DashboardStats {
                total_quotes: 0,
                total_sources: 0,
                total_views: 0,
                total_likes: 0,
                popular_sources: vec![],
            }
        );
    }

    #[tokio::test]
    async fn totals_match_the_records() {
        let db = memory_db().await;
        let a = source(&db, "A").await;
        let b = source(&db, "B").await;
        source(&db, "empty").await;

        let q1 = quote(&db, a, "one").await;
        let q2 = quote(&db, a, "two").await;
        let q3 = quote(&db, b, "three").await;

        like(&db, &q1, 2).await;
        like(&db, &q3, 1).await;
        vote(&db, q2.id, Some(VoteAction::Dislike)).await.unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..7 {
            random_quote(&db, &mut rng).await.unwrap();
        }

        let stats = dashboard(&db).await.unwrap();

        let (views, likes): (i64, i64) =
            sqlx::query_as("SELECT SUM(views_count), SUM(likes) FROM quotes;")
                .fetch_one(&db)
                .await
                .unwrap();

        assert_eq!(stats.total_quotes, 3);
        assert_eq!(stats.total_sources, 3);
        assert_eq!(stats.total_views, 7);
        assert_eq!(stats.total_views, views);
        assert_eq!(stats.total_likes, 3);
        assert_eq!(stats.total_likes, likes);
    }

    #[tokio::test]
    async fn sources_rank_by_likes_with_empty_ones_last() {
        let db = memory_db().await;
        let empty = source(&db, "Aaa empty").await;
        let quiet = source(&db, "Quiet").await;
        let loved = source(&db, "Loved").await;
        let liked = source(&db, "Liked").await;

        quote(&db, quiet, "nobody votes here").await;
        let l1 = quote(&db, loved, "loved one").await;
        let l2 = quote(&db, loved, "loved two").await;
        let k1 = quote(&db, liked, "liked one").await;

        like(&db, &l1, 3).await;
        like(&db, &l2, 2).await;
        like(&db, &k1, 1).await;

        let stats = dashboard(&db).await.unwrap();
        let ranking: Vec<(i64, i64, i64)> = stats
            .popular_sources
            .iter()
            .map(|s| (s.id, s.total_quotes, s.total_likes))
            .collect();

        assert_eq!(
            ranking,
            vec![(loved, 2, 5), (liked, 1, 1), (quiet, 1, 0), (empty, 0, 0)]
        );
    }

    #[tokio::test]
    async fn only_top_five_sources_are_listed() {
        let db = memory_db().await;

        for n in 0..7 {
            let id = source(&db, &format!("source {n}")).await;
            let q = quote(&db, id, "only quote").await;
            like(&db, &q, n).await;
        }

        let stats = dashboard(&db).await.unwrap();
        let titles: Vec<&str> = stats
            .popular_sources
            .iter()
            .map(|s| s.title.as_str())
            .collect();

        assert_eq!(
            titles,
            vec!["source 6", "source 5", "source 4", "source 3", "source 2"]
        );
        assert_eq!(stats.total_sources, 7);
    }
}
