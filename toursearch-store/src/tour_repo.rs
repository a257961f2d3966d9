use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use toursearch_core::search::{Predicate, TourFilter};
use toursearch_core::{
    Availability, Page, PageRequest, Tour, TourError, TourRepository, TourResult, TourStatus, ValidTour,
};
use tracing::debug;

const TOUR_COLUMNS: &str = "id, external_id, name, days, start_date, end_date, start_city, end_city, \
     seats_available, seats_booked, seats_maximum, status, created_at, updated_at";

pub struct PostgresTourRepository {
    pool: PgPool,
}

impl PostgresTourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Seat and status columns are nullable in the table
#[derive(sqlx::FromRow)]
struct TourRow {
    id: i64,
    external_id: String,
    name: String,
    days: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_city: String,
    end_city: String,
    seats_available: Option<i32>,
    seats_booked: Option<i32>,
    seats_maximum: Option<i32>,
    status: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TourRow> for Tour {
    fn from(row: TourRow) -> Self {
        Tour {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            days: row.days,
            start_date: row.start_date,
            end_date: row.end_date,
            start_city: row.start_city,
            end_city: row.end_city,
            seats_available: row.seats_available.unwrap_or(0),
            seats_booked: row.seats_booked.unwrap_or(0),
            seats_maximum: row.seats_maximum.unwrap_or(0),
            status: row.status.and_then(TourStatus::from_code).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// NULL columns read back as 0 / Active, so predicates compare the same values.
const SEATS_AVAILABLE: &str = "COALESCE(seats_available, 0)";
const STATUS: &str = "COALESCE(status, 0)";

fn push_seat_bounds(builder: &mut QueryBuilder<'_, Postgres>, bucket: Availability) {
    match bucket.seat_bounds() {
        (Some(lower), Some(upper)) => {
            builder
                .push(format!("({} > ", SEATS_AVAILABLE))
                .push_bind(lower)
                .push(format!(" AND {} <= ", SEATS_AVAILABLE))
                .push_bind(upper)
                .push(")");
        }
        (Some(lower), None) => {
            builder.push(format!("{} > ", SEATS_AVAILABLE)).push_bind(lower);
        }
        (None, Some(upper)) => {
            builder.push(format!("{} <= ", SEATS_AVAILABLE)).push_bind(upper);
        }
        (None, None) => {
            builder.push("TRUE");
        }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TourFilter) {
    for (i, predicate) in filter.predicates().into_iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::Days(days) => {
                builder.push("days = ").push_bind(days);
            }
            Predicate::Name(name) => {
                builder.push("name = ").push_bind(name);
            }
            Predicate::StartDate(date) => {
                builder.push("start_date = ").push_bind(date);
            }
            Predicate::Availability(bucket) => push_seat_bounds(builder, bucket),
            Predicate::Status(status) => {
                builder.push(format!("{} = ", STATUS)).push_bind(status.code());
            }
        }
    }
}

fn select_query(filter: &TourFilter, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM tours", TOUR_COLUMNS));
    push_filter(&mut builder, filter);
    builder
        .push(" ORDER BY start_date, name, id LIMIT ")
        .push_bind(page.limit() as i64)
        .push(" OFFSET ")
        .push_bind(page.offset() as i64);
    builder
}

fn count_query(filter: &TourFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM tours");
    push_filter(&mut builder, filter);
    builder
}

#[async_trait]
impl TourRepository for PostgresTourRepository {
    async fn search(&self, filter: &TourFilter, page: PageRequest) -> TourResult<Page<Tour>> {
        debug!(?filter, page = page.page, "Searching tours");

        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(TourError::storage)?;

        let rows: Vec<TourRow> = select_query(filter, page)
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(TourError::storage)?;

        let items = rows.into_iter().map(Tour::from).collect();
        Ok(Page::new(items, page, total.max(0) as u64))
    }

    async fn upsert(&self, tour: &ValidTour) -> TourResult<Tour> {
        let sql = format!(
            r#"
            INSERT INTO tours (external_id, name, days, start_date, end_date, start_city, end_city,
                               seats_available, seats_booked, seats_maximum, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (external_id) DO UPDATE SET
                name = EXCLUDED.name,
                days = EXCLUDED.days,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                start_city = EXCLUDED.start_city,
                end_city = EXCLUDED.end_city,
                seats_available = EXCLUDED.seats_available,
                seats_booked = EXCLUDED.seats_booked,
                seats_maximum = EXCLUDED.seats_maximum,
                status = EXCLUDED.status,
                updated_at = NOW()
            RETURNING {}
            "#,
            TOUR_COLUMNS
        );

        let row: TourRow = sqlx::query_as(&sql)
            .bind(tour.external_id())
            .bind(tour.name())
            .bind(tour.days())
            .bind(tour.start_date())
            .bind(tour.end_date())
            .bind(tour.start_city())
            .bind(tour.end_city())
            .bind(tour.seats_available())
            .bind(tour.seats_booked())
            .bind(tour.seats_maximum())
            .bind(tour.status().code())
            .fetch_one(&self.pool)
            .await
            .map_err(TourError::storage)?;

        Ok(row.into())
    }

    async fn find_by_external_id(&self, external_id: &str) -> TourResult<Option<Tour>> {
        let sql = format!("SELECT {} FROM tours WHERE external_id = $1", TOUR_COLUMNS);
        let row: Option<TourRow> = sqlx::query_as(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(TourError::storage)?;

        Ok(row.map(Tour::from))
    }

    async fn destination_names(&self) -> TourResult<Vec<String>> {
        sqlx::query_scalar("SELECT DISTINCT name FROM tours ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(TourError::storage)
    }

    async fn day_counts(&self) -> TourResult<Vec<i32>> {
        sqlx::query_scalar("SELECT DISTINCT days FROM tours ORDER BY days")
            .fetch_all(&self.pool)
            .await
            .map_err(TourError::storage)
    }

    async fn start_dates(&self) -> TourResult<Vec<NaiveDate>> {
        sqlx::query_scalar("SELECT DISTINCT start_date FROM tours ORDER BY start_date")
            .fetch_all(&self.pool)
            .await
            .map_err(TourError::storage)
    }
}
