use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use vacation_core::date::{self, YYYY_MM_DD_DATE_FORMAT};
use vacation_core::{Entity, ItemId};

/// A planned trip: what, where and when.
///
/// Dates are kept as text. Records built from calendar days use the
/// canonical `yyyy-MM-dd` form; text typed by a user is stored as given.
/// Nothing orders `start_date` before `end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationItem {
    #[serde(default)]
    pub id: ItemId,
    pub title: String,
    pub place: String,
    pub start_date: String,
    pub end_date: String,
}

impl VacationItem {
    /// Create a record that has not been stored yet.
    pub fn new(
        title: impl Into<String>,
        place: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self::with_id(ItemId::UNSAVED, title, place, start_date, end_date)
    }

    /// Create a full replacement for the stored record `id`.
    pub fn with_id(
        id: ItemId,
        title: impl Into<String>,
        place: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            place: place.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Create an unsaved record from calendar days, stored in canonical form.
    pub fn from_days(
        title: impl Into<String>,
        place: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self::new(title, place, canonical(start), canonical(end))
    }

    /// Start date, when it is stored in canonical form.
    pub fn start_day(&self) -> Option<NaiveDate> {
        date::parse_day(YYYY_MM_DD_DATE_FORMAT, &self.start_date)
    }

    /// End date, when it is stored in canonical form.
    pub fn end_day(&self) -> Option<NaiveDate> {
        date::parse_day(YYYY_MM_DD_DATE_FORMAT, &self.end_date)
    }
}

fn canonical(day: NaiveDate) -> String {
    // The canonical pattern has no era, so years before 1 keep chrono's
    // signed ISO form instead of reading back as AD.
    if day.year() < 1 {
        return day.to_string();
    }
    date::format_day(YYYY_MM_DD_DATE_FORMAT, Some(day)).unwrap_or_else(|| day.to_string())
}

impl Entity for VacationItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
