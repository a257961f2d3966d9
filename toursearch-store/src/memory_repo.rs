use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use toursearch_core::{Page, PageRequest, Tour, TourFilter, TourRepository, TourResult, ValidTour};

#[derive(Default)]
struct Tours {
    next_id: i64,
    by_external_id: BTreeMap<String, Tour>,
}

/// Tour store held in process memory, keyed by external id.
#[derive(Default)]
pub struct InMemoryTourRepository {
    tours: RwLock<Tours>,
}

impl InMemoryTourRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tours.read().await.by_external_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TourRepository for InMemoryTourRepository {
    async fn search(&self, filter: &TourFilter, page: PageRequest) -> TourResult<Page<Tour>> {
        let tours = self.tours.read().await;
        let mut matching: Vec<Tour> = tours
            .by_external_id
            .values()
            .filter(|tour| filter.matches(tour))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (a.start_date, &a.name, a.id).cmp(&(b.start_date, &b.name, b.id)));
        Ok(Page::from_vec(matching, page))
    }

    async fn upsert(&self, tour: &ValidTour) -> TourResult<Tour> {
        let mut guard = self.tours.write().await;
        let tours = &mut *guard;
        let now = Utc::now();

        let (id, created_at) = match tours.by_external_id.get(tour.external_id()) {
            Some(existing) => (existing.id, existing.created_at),
            None => {
                tours.next_id += 1;
                (tours.next_id, now)
            }
        };

        let stored = Tour {
            id,
            external_id: tour.external_id().to_string(),
            name: tour.name().to_string(),
            days: tour.days(),
            start_date: tour.start_date(),
            end_date: tour.end_date(),
            start_city: tour.start_city().to_string(),
            end_city: tour.end_city().to_string(),
            seats_available: tour.seats_available(),
            seats_booked: tour.seats_booked(),
            seats_maximum: tour.seats_maximum(),
            status: tour.status(),
            created_at,
            updated_at: now,
        };
        tours.by_external_id.insert(stored.external_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn find_by_external_id(&self, external_id: &str) -> TourResult<Option<Tour>> {
        Ok(self.tours.read().await.by_external_id.get(external_id).cloned())
    }

    async fn destination_names(&self) -> TourResult<Vec<String>> {
        let tours = self.tours.read().await;
        let names: BTreeSet<&String> = tours.by_external_id.values().map(|t| &t.name).collect();
        Ok(names.into_iter().cloned().collect())
    }

    async fn day_counts(&self) -> TourResult<Vec<i32>> {
        let tours = self.tours.read().await;
        let days: BTreeSet<i32> = tours.by_external_id.values().map(|t| t.days).collect();
        Ok(days.into_iter().collect())
    }

    async fn start_dates(&self) -> TourResult<Vec<NaiveDate>> {
        let tours = self.tours.read().await;
        let dates: BTreeSet<NaiveDate> = tours.by_external_id.values().map(|t| t.start_date).collect();
        Ok(dates.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Number;
    use toursearch_core::{Availability, NewTour, TourError, TourStatus};

    fn new_tour(name: &str, days: i64, start: &str, seats_available: i64) -> ValidTour {
        attributes(name, days, start, seats_available).into_valid().unwrap()
    }

    fn attributes(name: &str, days: i64, start: &str, seats_available: i64) -> NewTour {
        let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        NewTour {
            external_id: Some(format!("{}-{}-{}", name, days, start)),
            name: Some(name.to_string()),
            days: Some(Number::from(days)),
            start_date: Some(start_date),
            end_date: Some(start_date + chrono::Duration::days(days)),
            start_city: Some("Rome".to_string()),
            end_city: Some("Venice".to_string()),
            seats_available: Some(Number::from(seats_available)),
            seats_booked: Some(Number::from(0)),
            seats_maximum: Some(Number::from(25)),
            status: Some(TourStatus::Active),
        }
    }

    async fn seeded() -> InMemoryTourRepository {
        let repo = InMemoryTourRepository::new();
        repo.upsert(&new_tour("Tour A", 7, "2025-10-25", 10)).await.unwrap();
        repo.upsert(&new_tour("Tour B", 5, "2025-11-01", 3)).await.unwrap();
        repo.upsert(&new_tour("Tour C", 7, "2025-10-25", 0)).await.unwrap();
        repo
    }

    async fn names(repo: &InMemoryTourRepository, filter: TourFilter) -> Vec<String> {
        let page = repo.search(&filter, PageRequest::default()).await.unwrap();
        let mut names: Vec<String> = page.items.into_iter().map(|t| t.name).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_search_without_filters_returns_all() {
        let repo = seeded().await;
        assert_eq!(names(&repo, TourFilter::default()).await, vec!["Tour A", "Tour B", "Tour C"]);
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let repo = seeded().await;
        let filter = TourFilter { name: Some("Tour A".to_string()), ..Default::default() };
        assert_eq!(names(&repo, filter).await, vec!["Tour A"]);
    }

    #[tokio::test]
    async fn test_search_by_days() {
        let repo = seeded().await;
        let filter = TourFilter { days: Some(5), ..Default::default() };
        assert_eq!(names(&repo, filter).await, vec!["Tour B"]);
    }

    #[tokio::test]
    async fn test_search_by_availability() {
        let repo = seeded().await;
        for (bucket, expected) in [
            (Availability::Available, "Tour A"),
            (Availability::Limited, "Tour B"),
            (Availability::SoldOut, "Tour C"),
        ] {
            let filter = TourFilter { availability: Some(bucket), ..Default::default() };
            assert_eq!(names(&repo, filter).await, vec![expected]);
        }
    }

    #[tokio::test]
    async fn test_search_by_multiple_parameters() {
        let repo = seeded().await;
        let filter = TourFilter {
            days: Some(7),
            start_date: NaiveDate::from_ymd_opt(2025, 10, 25),
            ..Default::default()
        };
        assert_eq!(names(&repo, filter).await, vec!["Tour A", "Tour C"]);
    }

    #[tokio::test]
    async fn test_search_by_status() {
        let repo = seeded().await;
        let inactive = NewTour {
            status: Some(TourStatus::Inactive),
            ..attributes("Tour D", 7, "2025-12-01", 0)
        };
        repo.save(inactive).await.unwrap();

        let active = TourFilter { status: Some(TourStatus::Active), ..Default::default() };
        assert_eq!(names(&repo, active).await, vec!["Tour A", "Tour B", "Tour C"]);
        let inactive = TourFilter { status: Some(TourStatus::Inactive), ..Default::default() };
        assert_eq!(names(&repo, inactive).await, vec!["Tour D"]);
    }

    #[tokio::test]
    async fn test_results_are_ordered_and_paginated() {
        let repo = InMemoryTourRepository::new();
        for day in 1..=12 {
            let start = format!("2025-03-{:02}", day);
            repo.upsert(&new_tour("Tour", 7, &start, 10)).await.unwrap();
        }

        let first = repo.search(&TourFilter::default(), PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total, 12);
        assert_eq!(first.items[0].start_date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        let second = repo.search(&TourFilter::default(), PageRequest::new(2, 10)).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[1].start_date, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_by_external_id() {
        let repo = InMemoryTourRepository::new();
        let tour = new_tour("Tour A", 7, "2025-10-25", 10);
        let first = repo.upsert(&tour).await.unwrap();

        let changed = attributes("Tour A", 7, "2025-10-25", 4);
        let second = repo.save(changed).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(first.id, second.id);
        assert_eq!(second.availability(), Availability::Limited);
        assert_eq!(
            repo.find_by_external_id(tour.external_id()).await.unwrap().map(|t| t.seats_available),
            Some(4)
        );
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_tour_without_writing() {
        let repo = InMemoryTourRepository::new();
        let tour = NewTour {
            external_id: Some("BAD000001".to_string()),
            name: Some("Tour X".to_string()),
            days: Some(Number::from(3)),
            start_date: NaiveDate::from_ymd_opt(2025, 5, 10),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 9),
            start_city: Some("Oslo".to_string()),
            end_city: Some("Bergen".to_string()),
            seats_available: Some(Number::from(30)),
            seats_booked: Some(Number::from(0)),
            seats_maximum: Some(Number::from(20)),
            status: None,
        };

        match repo.save(tour).await {
            Err(TourError::Validation(errors)) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("end_date"));
                assert!(fields.contains_key("seats_available"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_option_lists_are_distinct_and_sorted() {
        let repo = InMemoryTourRepository::new();
        repo.upsert(&new_tour("Destination C", 10, "2025-10-25", 1)).await.unwrap();
        repo.upsert(&new_tour("Destination A", 5, "2025-11-01", 1)).await.unwrap();
        repo.upsert(&new_tour("Destination B", 10, "2025-10-25", 1)).await.unwrap();
        repo.upsert(&new_tour("Destination A", 10, "2025-10-25", 1)).await.unwrap();

        assert_eq!(
            repo.destination_names().await.unwrap(),
            vec!["Destination A", "Destination B", "Destination C"]
        );
        assert_eq!(repo.day_counts().await.unwrap(), vec![5, 10]);
        assert_eq!(
            repo.start_dates().await.unwrap(),
            vec![
                NaiveDate::from_ymd_opt(2025, 10, 25).unwrap(),
                NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            ]
        );
    }
}
