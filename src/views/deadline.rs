use std::str::FromStr;

use chrono::{Days, NaiveDate};

use crate::error::ViewError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filing deadlines, each a fixed number of calendar days from the start
/// date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineKind {
    Appeal,
    Reply,
    Rejoinder,
    CivilRevision,
    CriminalRevision,
    /// Contract and tort limitation period.
    Limitation,
}

impl DeadlineKind {
    pub const ALL: [DeadlineKind; 6] = [
        DeadlineKind::Appeal,
        DeadlineKind::Reply,
        DeadlineKind::Rejoinder,
        DeadlineKind::CivilRevision,
        DeadlineKind::CriminalRevision,
        DeadlineKind::Limitation,
    ];

    pub fn days(&self) -> u64 {
        match self {
            DeadlineKind::Appeal => 30,
            DeadlineKind::Reply => 15,
            DeadlineKind::Rejoinder => 7,
            DeadlineKind::CivilRevision => 90,
            DeadlineKind::CriminalRevision => 60,
            DeadlineKind::Limitation => 1095,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeadlineKind::Appeal => "appeal",
            DeadlineKind::Reply => "reply",
            DeadlineKind::Rejoinder => "rejoinder",
            DeadlineKind::CivilRevision => "civil_revision",
            DeadlineKind::CriminalRevision => "criminal_revision",
            DeadlineKind::Limitation => "limitation",
        }
    }
}

impl FromStr for DeadlineKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "appeal" => Ok(DeadlineKind::Appeal),
            "reply" => Ok(DeadlineKind::Reply),
            "rejoinder" => Ok(DeadlineKind::Rejoinder),
            "civil_revision" => Ok(DeadlineKind::CivilRevision),
            "criminal_revision" => Ok(DeadlineKind::CriminalRevision),
            "limitation" | "contract" | "tort" => Ok(DeadlineKind::Limitation),
            _ => Err(ViewError::UnknownDeadline {
                value: s.to_string(),
            }),
        }
    }
}

/// Start date plus the deadline's calendar-day offset. Returns `None` only
/// if the result is past the end of the calendar.
pub fn calculate_deadline(start: NaiveDate, kind: DeadlineKind) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(kind.days()))
}

/// [`calculate_deadline`] over `YYYY-MM-DD` strings.
pub fn deadline_for(start: &str, kind: &str) -> Result<String, ViewError> {
    let invalid = || ViewError::InvalidDate {
        value: start.to_string(),
    };

    let date = NaiveDate::parse_from_str(start.trim(), DATE_FORMAT).map_err(|_| invalid())?;
    let kind: DeadlineKind = kind.parse()?;

    calculate_deadline(date, kind)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .ok_or_else(invalid)
}
