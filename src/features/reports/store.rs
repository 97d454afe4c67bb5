use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    DeEscalation, Escalation, FalseReportToggle, LikeToggle, NewReport, Report, ReportFilter,
    ReportPriority, StatusChange, ViewOutcome,
};

const REPORT_COLUMNS: &str = r#"
    id, owner_id, category, description, lat, lng, photos, after_photos,
    status, status_history, resolved_at,
    is_emergency, priority, escalated_at, escalation_level, escalation_reason,
    likes, dislikes, false_reports, view_count, viewed_by,
    created_at, updated_at
"#;

/// Persistence primitives over reports.
///
/// Every mutation is a single atomic statement against one report; callers never
/// read a value, change it and write it back. Mutations return `None` when the
/// report does not exist.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: NewReport) -> Result<Report>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>>;

    /// Returns one page of matching reports and the total match count.
    async fn list(&self, filter: &ReportFilter) -> Result<(Vec<Report>, i64)>;

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Report>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn apply_status_change(&self, id: Uuid, change: StatusChange) -> Result<Option<Report>>;

    async fn apply_escalation(&self, id: Uuid, escalation: Escalation) -> Result<Option<Report>>;

    async fn apply_de_escalation(&self, id: Uuid, change: DeEscalation)
        -> Result<Option<Report>>;

    /// Removes the user from dislikes and flips their presence in likes.
    async fn toggle_like(&self, id: Uuid, user_id: &str) -> Result<Option<LikeToggle>>;

    /// Removes the user from likes and flips their presence in dislikes.
    async fn toggle_dislike(&self, id: Uuid, user_id: &str) -> Result<Option<LikeToggle>>;

    async fn toggle_false_report(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<FalseReportToggle>>;

    /// Anonymous views always count; an authenticated viewer counts once.
    async fn record_view(&self, id: Uuid, viewer: Option<&str>) -> Result<Option<ViewOutcome>>;
}

/// PostgreSQL-backed report store
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
        qb.push(" WHERE TRUE");

        if let Some(pattern) = filter.search_pattern() {
            qb.push(" AND (description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR category ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(priority) = filter.priority {
            qb.push(" AND priority = ").push_bind(priority);
        }
        if let Some(is_emergency) = filter.is_emergency {
            qb.push(" AND is_emergency = ").push_bind(is_emergency);
        }
        if let Some(bounds) = filter.bounds {
            qb.push(" AND lat BETWEEN ")
                .push_bind(bounds.min_lat)
                .push(" AND ")
                .push_bind(bounds.max_lat)
                .push(" AND lng BETWEEN ")
                .push_bind(bounds.min_lng)
                .push(" AND ")
                .push_bind(bounds.max_lng);
        }
    }

    async fn fetch_report(&self, sql: &str, id: Uuid, what: &str) -> Result<Option<Report>> {
        sqlx::query_as::<_, Report>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to {}: {:?}", what, e);
                AppError::Database(e)
            })
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, report: NewReport) -> Result<Report> {
        let sql = format!(
            r#"
            INSERT INTO reports (
                id, owner_id, category, description, lat, lng, photos,
                is_emergency, priority, status_history
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let created = sqlx::query_as::<_, Report>(&sql)
            .bind(Uuid::now_v7())
            .bind(&report.owner_id)
            .bind(&report.category)
            .bind(&report.description)
            .bind(report.lat)
            .bind(report.lng)
            .bind(&report.photos)
            .bind(report.is_emergency)
            .bind(report.priority)
            .bind(Json(vec![report.initial_entry]))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create report: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let sql = format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS);
        self.fetch_report(&sql, id, "get report").await
    }

    async fn list(&self, filter: &ReportFilter) -> Result<(Vec<Report>, i64)> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reports");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reports: {:?}", e);
                AppError::Database(e)
            })?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM reports", REPORT_COLUMNS));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY ")
            .push(filter.sort_by.column())
            .push(" ")
            .push(filter.sort_order.as_sql())
            .push(", id DESC LIMIT ")
            .push_bind(filter.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filter.pagination.offset());

        let reports = qb
            .build_query_as::<Report>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((reports, total))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reports WHERE owner_id = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        );
        sqlx::query_as::<_, Report>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports by owner: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete report: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_status_change(&self, id: Uuid, change: StatusChange) -> Result<Option<Report>> {
        let sql = format!(
            r#"
            UPDATE reports
            SET
                status = $2,
                status_history = status_history || $3,
                resolved_at = COALESCE(resolved_at, $4),
                after_photos = COALESCE($5, after_photos),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(change.status)
            .bind(Json(vec![change.entry]))
            .bind(change.resolved_at)
            .bind(change.after_photos)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update report status: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn apply_escalation(&self, id: Uuid, escalation: Escalation) -> Result<Option<Report>> {
        let sql = format!(
            r#"
            UPDATE reports
            SET
                is_emergency = TRUE,
                priority = $2,
                escalated_at = $3,
                escalation_level = $4,
                escalation_reason = $5,
                status_history = status_history || $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(ReportPriority::Critical)
            .bind(escalation.escalated_at)
            .bind(escalation.level)
            .bind(escalation.reason)
            .bind(Json(vec![escalation.entry]))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to escalate report: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn apply_de_escalation(
        &self,
        id: Uuid,
        change: DeEscalation,
    ) -> Result<Option<Report>> {
        let sql = format!(
            r#"
            UPDATE reports
            SET
                is_emergency = FALSE,
                priority = $2,
                escalation_level = 0,
                escalation_reason = NULL,
                status_history = status_history || $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(ReportPriority::Medium)
            .bind(Json(vec![change.entry]))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to de-escalate report: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn toggle_like(&self, id: Uuid, user_id: &str) -> Result<Option<LikeToggle>> {
        sqlx::query_as::<_, LikeToggle>(
            r#"
            WITH prev AS (
                SELECT id, ($2 = ANY(likes)) AS was_liked
                FROM reports
                WHERE id = $1
                FOR UPDATE
            )
            UPDATE reports r
            SET
                dislikes = array_remove(r.dislikes, $2),
                likes = CASE
                    WHEN prev.was_liked THEN array_remove(r.likes, $2)
                    ELSE array_append(r.likes, $2)
                END,
                updated_at = NOW()
            FROM prev
            WHERE r.id = prev.id
            RETURNING
                r.owner_id,
                cardinality(r.likes)::BIGINT AS likes,
                cardinality(r.dislikes)::BIGINT AS dislikes,
                ($2 = ANY(r.likes)) AS liked,
                ($2 = ANY(r.dislikes)) AS disliked,
                prev.was_liked
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to toggle like: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn toggle_dislike(&self, id: Uuid, user_id: &str) -> Result<Option<LikeToggle>> {
        sqlx::query_as::<_, LikeToggle>(
            r#"
            WITH prev AS (
                SELECT id, ($2 = ANY(likes)) AS was_liked, ($2 = ANY(dislikes)) AS was_disliked
                FROM reports
                WHERE id = $1
                FOR UPDATE
            )
            UPDATE reports r
            SET
                likes = array_remove(r.likes, $2),
                dislikes = CASE
                    WHEN prev.was_disliked THEN array_remove(r.dislikes, $2)
                    ELSE array_append(r.dislikes, $2)
                END,
                updated_at = NOW()
            FROM prev
            WHERE r.id = prev.id
            RETURNING
                r.owner_id,
                cardinality(r.likes)::BIGINT AS likes,
                cardinality(r.dislikes)::BIGINT AS dislikes,
                ($2 = ANY(r.likes)) AS liked,
                ($2 = ANY(r.dislikes)) AS disliked,
                prev.was_liked
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to toggle dislike: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn toggle_false_report(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<FalseReportToggle>> {
        sqlx::query_as::<_, FalseReportToggle>(
            r#"
            UPDATE reports
            SET
                false_reports = CASE
                    WHEN $2 = ANY(false_reports) THEN array_remove(false_reports, $2)
                    ELSE array_append(false_reports, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                cardinality(false_reports)::BIGINT AS false_reports,
                ($2 = ANY(false_reports)) AS active
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to toggle false report: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn record_view(&self, id: Uuid, viewer: Option<&str>) -> Result<Option<ViewOutcome>> {
        let Some(viewer) = viewer else {
            let count: Option<i64> = sqlx::query_scalar(
                "UPDATE reports SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record anonymous view: {:?}", e);
                AppError::Database(e)
            })?;

            return Ok(count.map(|view_count| ViewOutcome {
                view_count,
                is_new_view: true,
            }));
        };

        // The guard is re-checked after the row lock, so concurrent views by the
        // same user cannot both pass it
        let counted: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE reports
            SET
                viewed_by = array_append(viewed_by, $2),
                view_count = view_count + 1
            WHERE id = $1 AND NOT ($2 = ANY(viewed_by))
            RETURNING view_count
            "#,
        )
        .bind(id)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record view: {:?}", e);
            AppError::Database(e)
        })?;

        if let Some(view_count) = counted {
            return Ok(Some(ViewOutcome {
                view_count,
                is_new_view: true,
            }));
        }

        let current: Option<i64> = sqlx::query_scalar("SELECT view_count FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to read view count: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(current.map(|view_count| ViewOutcome {
            view_count,
            is_new_view: false,
        }))
    }
}
