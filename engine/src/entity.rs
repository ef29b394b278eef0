//! Entity types mirrored from the server.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Format of a normalized entity date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A server-owned record that can live in an [`EntityCache`](crate::EntityCache).
///
/// The cache owns copies; the remote side owns the canonical version.
pub trait Entity: Clone {
    /// Unique identifier.
    fn id(&self) -> &str;

    /// The entity's date as stored.
    fn date(&self) -> &str;

    /// Replace the entity's date.
    fn set_date(&mut self, date: String);
}

/// Strip any time-of-day component from a date string.
///
/// `"2024-01-02T18:30:00Z"` becomes `"2024-01-02"`. Strings without a `T`
/// are returned unchanged.
pub fn normalize_date(raw: &str) -> &str {
    raw.split('T').next().unwrap_or(raw)
}

/// Parse a date string, with or without a time-of-day component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(normalize_date(raw.trim()), DATE_FORMAT).ok()
}

/// An activity - the entity the application manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    /// Day of the activity, `YYYY-MM-DD` once normalized
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub venue: String,
}

impl Activity {
    /// Create an activity with empty descriptive fields.
    pub fn new(id: impl Into<String>, title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date: date.into(),
            description: String::new(),
            category: String::new(),
            city: String::new(),
            venue: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_location(mut self, city: impl Into<String>, venue: impl Into<String>) -> Self {
        self.city = city.into();
        self.venue = venue.into();
        self
    }

    /// The parsed day, if the date is well-formed.
    pub fn day(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

impl Entity for Activity {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn set_date(&mut self, date: String) {
        self.date = date;
    }
}
