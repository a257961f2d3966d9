use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A stored tour departure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub days: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_city: String,
    pub end_city: String,
    pub seats_available: i32,
    pub seats_booked: i32,
    pub seats_maximum: i32,
    pub status: TourStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tour {
    pub fn availability(&self) -> Availability {
        Availability::from_seats(self.seats_available)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TourStatus {
    #[default]
    Active,
    Inactive,
}

impl TourStatus {
    /// Integer code persisted in the `status` column.
    pub fn code(self) -> i32 {
        match self {
            TourStatus::Active => 0,
            TourStatus::Inactive => 1,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TourStatus::Active),
            1 => Some(TourStatus::Inactive),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TourStatus::Active => "Active",
            TourStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for TourStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seat availability bucket derived from `seats_available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Limited,
    #[serde(rename = "Sold Out")]
    SoldOut,
}

impl Availability {
    pub const ALL: [Availability; 3] = [
        Availability::Available,
        Availability::Limited,
        Availability::SoldOut,
    ];

    pub fn from_seats(seats_available: i32) -> Self {
        match seats_available {
            6.. => Availability::Available,
            1..=5 => Availability::Limited,
            _ => Availability::SoldOut,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::Limited => "Limited",
            Availability::SoldOut => "Sold Out",
        }
    }

    /// Bucket boundaries as `(exclusive lower, inclusive upper)` on `seats_available`.
    pub fn seat_bounds(self) -> (Option<i32>, Option<i32>) {
        match self {
            Availability::Available => (Some(5), None),
            Availability::Limited => (Some(0), Some(5)),
            Availability::SoldOut => (None, Some(0)),
        }
    }

    pub fn contains(self, seats_available: i32) -> bool {
        let (above, at_most) = self.seat_bounds();
        above.map_or(true, |lower| seats_available > lower)
            && at_most.map_or(true, |upper| seats_available <= upper)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown availability label: {0}")]
pub struct UnknownAvailability(pub String);

impl FromStr for Availability {
    type Err = UnknownAvailability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Availability::ALL
            .into_iter()
            .find(|a| a.label() == s)
            .ok_or_else(|| UnknownAvailability(s.to_string()))
    }
}
