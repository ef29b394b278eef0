//! Database operations for the activities table.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use gather_engine::{parse_date, Activity, QuerySource, SourceError};
use sqlx::{PgPool, Row};

/// Wire format of activity timestamps.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A stored activity row from the database.
#[derive(Debug)]
pub struct StoredActivity {
    pub id: String,
    pub title: String,
    pub date: NaiveDateTime,
    pub description: String,
    pub category: String,
    pub city: String,
    pub venue: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredActivity {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredActivity {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            date: row.try_get("date")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            city: row.try_get("city")?,
            venue: row.try_get("venue")?,
        })
    }
}

impl StoredActivity {
    /// Build a row from a wire activity. Fails if the date does not parse.
    pub fn from_activity(activity: Activity) -> Option<Self> {
        let date = parse_timestamp(&activity.date)?;
        Some(Self {
            id: activity.id,
            title: activity.title,
            date,
            description: activity.description,
            category: activity.category,
            city: activity.city,
            venue: activity.venue,
        })
    }

    /// Convert database row to the wire activity.
    pub fn into_activity(self) -> Activity {
        Activity {
            id: self.id,
            title: self.title,
            date: self.date.format(TIMESTAMP_FORMAT).to_string(),
            description: self.description,
            category: self.category,
            city: self.city,
            venue: self.venue,
        }
    }
}

/// Parse an activity date as sent by clients.
///
/// Accepts RFC 3339 (converted to UTC), a naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// timestamp, or a bare `YYYY-MM-DD` day at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if raw.contains('T') {
        return None;
    }
    parse_date(raw).and_then(|day| day.and_hms_opt(0, 0, 0))
}

/// Postgres bind values are signed.
fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Activities ordered by date, as a countable, sliceable source.
#[derive(Debug, Clone)]
pub struct PgActivitySource {
    pool: PgPool,
}

impl PgActivitySource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuerySource for PgActivitySource {
    type Item = Activity;

    async fn count(&self) -> Result<u64, SourceError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn slice(&self, skip: u64, take: u64) -> Result<Vec<Activity>, SourceError> {
        let rows = sqlx::query_as::<_, StoredActivity>(
            r#"
            SELECT id, title, date, description, category, city, venue
            FROM activities
            ORDER BY date, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(to_i64(take))
        .bind(to_i64(skip))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredActivity::into_activity).collect())
    }
}

/// Get an activity by ID.
pub async fn get_activity(pool: &PgPool, id: &str) -> Result<Option<StoredActivity>, sqlx::Error> {
    sqlx::query_as::<_, StoredActivity>(
        r#"
        SELECT id, title, date, description, category, city, venue
        FROM activities
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert an activity. Returns false if the id is taken.
pub async fn insert_activity(pool: &PgPool, activity: &StoredActivity) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO activities (id, title, date, description, category, city, venue)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&activity.id)
    .bind(&activity.title)
    .bind(activity.date)
    .bind(&activity.description)
    .bind(&activity.category)
    .bind(&activity.city)
    .bind(&activity.venue)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Replace an activity. Returns false if it does not exist.
pub async fn update_activity(pool: &PgPool, activity: &StoredActivity) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE activities SET
            title = $2,
            date = $3,
            description = $4,
            category = $5,
            city = $6,
            venue = $7
        WHERE id = $1
        "#,
    )
    .bind(&activity.id)
    .bind(&activity.title)
    .bind(activity.date)
    .bind(&activity.description)
    .bind(&activity.category)
    .bind(&activity.city)
    .bind(&activity.venue)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Delete an activity. Returns false if it does not exist.
pub async fn delete_activity(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM activities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_client_dates() {
        assert_eq!(
            parse_timestamp("2024-01-02T18:30:00"),
            Some(at(2024, 1, 2, 18, 30))
        );
        assert_eq!(
            parse_timestamp("2024-01-02T18:30:00.250"),
            Some(at(2024, 1, 2, 18, 30) + chrono::Duration::milliseconds(250))
        );
        assert_eq!(
            parse_timestamp("2024-01-02T18:30:00+02:00"),
            Some(at(2024, 1, 2, 16, 30))
        );
        assert_eq!(parse_timestamp("2024-01-02"), Some(at(2024, 1, 2, 0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("tomorrow"), None);
        assert_eq!(parse_timestamp("2024-13-01"), None);
        assert_eq!(parse_timestamp("2024-01-02Tnoon"), None);
    }

    #[test]
    fn row_round_trip_keeps_fields() {
        let activity = Activity::new("a-1", "Pub quiz", "2024-03-04T19:00:00")
            .with_category("drinks")
            .with_location("London", "The Crown");

        let row = StoredActivity::from_activity(activity.clone()).unwrap();
        assert_eq!(row.date, at(2024, 3, 4, 19, 0));
        assert_eq!(row.into_activity(), activity);
    }

    #[test]
    fn bind_values_saturate() {
        assert_eq!(to_i64(5), 5);
        assert_eq!(to_i64(u64::MAX), i64::MAX);
    }
}
