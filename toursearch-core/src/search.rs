use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::pagination::PageRequest;
use crate::tour::{Availability, Tour, TourStatus};

/// Raw search parameters as they arrive on the query string or form body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TourSearchParams {
    pub name: Option<String>,
    pub days: Option<String>,
    pub start_date: Option<String>,
    pub availability: Option<String>,
    pub page: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()
}

impl TourSearchParams {
    /// Collects decoded key/value pairs. A repeated key keeps its last value and
    /// unknown keys are ignored, so no combination of parameters is rejected.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = TourSearchParams::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "name" => &mut params.name,
                "days" => &mut params.days,
                "start_date" => &mut params.start_date,
                "availability" => &mut params.availability,
                "page" => &mut params.page,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        params
    }

    /// Blank and malformed values are dropped rather than rejected. The name is
    /// matched exactly as given.
    pub fn filter(&self) -> TourFilter {
        TourFilter {
            name: self.name.clone().filter(|n| !n.trim().is_empty()),
            days: non_blank(&self.days).and_then(|d| d.parse().ok()),
            start_date: non_blank(&self.start_date).and_then(parse_date),
            availability: non_blank(&self.availability).and_then(|a| a.parse().ok()),
            status: None,
        }
    }

    pub fn page_request(&self, per_page: u32) -> PageRequest {
        let page = non_blank(&self.page).and_then(|p| p.parse().ok()).unwrap_or(1);
        PageRequest::new(page, per_page)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourFilter {
    pub name: Option<String>,
    pub days: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub availability: Option<Availability>,
    pub status: Option<TourStatus>,
}

impl TourFilter {
    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// The conjunctive predicates this filter applies, in a fixed order.
    pub fn predicates(&self) -> Vec<Predicate> {
        [
            self.days.map(Predicate::Days),
            self.name.clone().map(Predicate::Name),
            self.start_date.map(Predicate::StartDate),
            self.availability.map(Predicate::Availability),
            self.status.map(Predicate::Status),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn matches(&self, tour: &Tour) -> bool {
        self.predicates().iter().all(|p| p.matches(tour))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Days(i32),
    Name(String),
    StartDate(NaiveDate),
    Availability(Availability),
    Status(TourStatus),
}

impl Predicate {
    pub fn matches(&self, tour: &Tour) -> bool {
        match self {
            Predicate::Days(days) => tour.days == *days,
            Predicate::Name(name) => tour.name == *name,
            Predicate::StartDate(date) => tour.start_date == *date,
            Predicate::Availability(bucket) => bucket.contains(tour.seats_available),
            Predicate::Status(status) => tour.status == *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tour(name: &str, days: i32, start: &str, seats_available: i32) -> Tour {
        let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        Tour {
            id: 1,
            external_id: format!("ext-{}", name),
            name: name.to_string(),
            days,
            start_date,
            end_date: start_date + chrono::Duration::days(days as i64),
            start_city: "Lisbon".to_string(),
            end_city: "Porto".to_string(),
            seats_available,
            seats_booked: 0,
            seats_maximum: 25,
            status: TourStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn params(pairs: &[(&str, &str)]) -> TourSearchParams {
        TourSearchParams::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_empty_params_yield_empty_filter() {
        let filter = TourSearchParams::default().filter();
        assert!(filter.is_empty());
        assert!(filter.matches(&tour("Tour A", 7, "2025-10-25", 10)));
    }

    #[test]
    fn test_blank_and_malformed_params_are_ignored() {
        let filter = params(&[
            ("name", "  "),
            ("days", "seven"),
            ("start_date", "next week"),
            ("availability", "Plenty"),
        ])
        .filter();
        assert_eq!(filter, TourFilter::default());
    }

    #[test]
    fn test_params_are_parsed() {
        let filter = params(&[
            ("name", "Tour A"),
            ("days", "7"),
            ("start_date", "2025-10-25"),
            ("availability", "Sold Out"),
        ])
        .filter();
        assert_eq!(filter.name.as_deref(), Some("Tour A"));
        assert_eq!(filter.days, Some(7));
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2025, 10, 25));
        assert_eq!(filter.availability, Some(Availability::SoldOut));
        assert_eq!(filter.predicates().len(), 4);
    }

    #[test]
    fn test_repeated_keys_keep_the_last_value() {
        let filter = params(&[("days", "7"), ("days", "8"), ("sort", "name"), ("days", "5")]).filter();
        assert_eq!(filter.days, Some(5));
        assert_eq!(filter.predicates(), vec![Predicate::Days(5)]);
    }

    #[test]
    fn test_name_is_matched_verbatim() {
        let filter = params(&[("name", " Tour A")]).filter();
        assert_eq!(filter.name.as_deref(), Some(" Tour A"));
        assert!(!filter.matches(&tour("Tour A", 7, "2025-10-25", 10)));
        assert!(filter.matches(&tour(" Tour A", 7, "2025-10-25", 10)));
    }

    #[test]
    fn test_display_formatted_date_is_accepted() {
        let filter = params(&[("start_date", "10/25/2025")]).filter();
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2025, 10, 25));
    }

    #[test]
    fn test_predicates_compose_conjunctively() {
        let filter = TourFilter {
            days: Some(7),
            start_date: NaiveDate::from_ymd_opt(2025, 10, 25),
            ..Default::default()
        };
        assert!(filter.matches(&tour("Tour A", 7, "2025-10-25", 10)));
        assert!(!filter.matches(&tour("Tour B", 5, "2025-10-25", 10)));
        assert!(!filter.matches(&tour("Tour C", 7, "2025-11-01", 0)));
    }

    #[test]
    fn test_availability_predicate() {
        let limited = Predicate::Availability(Availability::Limited);
        assert!(limited.matches(&tour("Tour B", 5, "2025-11-01", 3)));
        assert!(!limited.matches(&tour("Tour A", 7, "2025-10-25", 10)));
        assert!(!limited.matches(&tour("Tour C", 7, "2025-10-25", 0)));
    }

    #[test]
    fn test_page_request_from_params() {
        assert_eq!(params(&[("page", "3")]).page_request(10).page, 3);
        assert_eq!(params(&[("page", "0")]).page_request(10).page, 1);
        assert_eq!(params(&[("page", "abc")]).page_request(10).page, 1);
        assert_eq!(TourSearchParams::default().page_request(10).page, 1);
    }
}
