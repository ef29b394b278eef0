//! Activity handlers - paged listing and CRUD over the activities table.

use crate::db::{self, PgActivitySource, StoredActivity};
use crate::error::{AppError, Result};
use gather_engine::{Activity, PageRequest, PageSlice, Paginator};
use sqlx::PgPool;

/// Serve one page of activities ordered by date.
pub async fn list_activities(pool: &PgPool, request: PageRequest) -> Result<PageSlice<Activity>> {
    let source = PgActivitySource::new(pool.clone());
    let page = Paginator::new().fetch_page(&source, &request).await?;

    tracing::debug!(
        page = page.current_page(),
        returned = page.len(),
        total = page.total_count(),
        "listed activities"
    );
    Ok(page)
}

/// Fetch a single activity.
pub async fn get_activity(pool: &PgPool, id: &str) -> Result<Activity> {
    db::get_activity(pool, id)
        .await?
        .map(StoredActivity::into_activity)
        .ok_or_else(|| AppError::NotFound(format!("activity {}", id)))
}

/// Create an activity with a client-chosen id.
pub async fn create_activity(pool: &PgPool, activity: Activity) -> Result<()> {
    let row = validate(activity)?;

    if !db::insert_activity(pool, &row).await? {
        return Err(AppError::BadRequest(format!(
            "activity {} already exists",
            row.id
        )));
    }

    tracing::info!(id = %row.id, "created activity");
    Ok(())
}

/// Replace the activity at `id`. The path id wins over the body id.
pub async fn update_activity(pool: &PgPool, id: &str, mut activity: Activity) -> Result<()> {
    activity.id = id.to_string();
    let row = validate(activity)?;

    if !db::update_activity(pool, &row).await? {
        return Err(AppError::NotFound(format!("activity {}", id)));
    }

    tracing::info!(id, "updated activity");
    Ok(())
}

/// Delete the activity at `id`.
pub async fn delete_activity(pool: &PgPool, id: &str) -> Result<()> {
    if !db::delete_activity(pool, id).await? {
        return Err(AppError::NotFound(format!("activity {}", id)));
    }

    tracing::info!(id, "deleted activity");
    Ok(())
}

/// Check the fields the table requires and convert to a row.
fn validate(activity: Activity) -> Result<StoredActivity> {
    if activity.id.trim().is_empty() {
        return Err(AppError::BadRequest("id is required".into()));
    }
    if activity.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }

    let date = activity.date.clone();
    StoredActivity::from_activity(activity)
        .ok_or_else(|| AppError::BadRequest(format!("invalid date: {:?}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_requires_id_and_title() {
        let missing_id = Activity::new(" ", "Walk", "2024-01-01");
        assert!(matches!(validate(missing_id), Err(AppError::BadRequest(_))));

        let missing_title = Activity::new("a", "", "2024-01-01");
        assert!(matches!(
            validate(missing_title),
            Err(AppError::BadRequest(msg)) if msg == "title is required"
        ));
    }

    #[test]
    fn validate_rejects_bad_date() {
        let bad = Activity::new("a", "Walk", "next week");
        assert!(matches!(
            validate(bad),
            Err(AppError::BadRequest(msg)) if msg.contains("next week")
        ));
    }

    #[test]
    fn validate_accepts_day_only() {
        let row = validate(Activity::new("a", "Walk", "2024-01-01")).unwrap();
        assert_eq!(row.into_activity().date, "2024-01-01T00:00:00");
    }
}
