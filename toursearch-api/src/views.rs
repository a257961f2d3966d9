use chrono::NaiveDate;
use serde::Serialize;
use tera::{Context, Tera};
use toursearch_core::{format_date, Availability, Page, Tour, TourSearchParams};

const TEMPLATES: [(&str, &str); 2] = [
    ("layout.html", include_str!("../templates/layout.html")),
    ("tours/index.html", include_str!("../templates/tours/index.html")),
];

/// Template engine with the page templates compiled into the binary.
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    pub fn tour_index(&self, view: &TourIndexView) -> Result<String, tera::Error> {
        let context = Context::from_serialize(view)?;
        self.tera.render("tours/index.html", &context)
    }
}

#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

fn options<I>(values: I, current: Option<&str>) -> Vec<SelectOption>
where
    I: IntoIterator<Item = (String, String)>,
{
    values
        .into_iter()
        .map(|(label, value)| SelectOption {
            selected: current == Some(value.as_str()),
            label,
            value,
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct TourListing {
    pub name: String,
    pub days: i32,
    pub start_date: String,
    pub end_date: String,
    pub start_city: String,
    pub end_city: String,
    pub seats_available: i32,
    pub availability: Availability,
    pub status: String,
}

impl From<Tour> for TourListing {
    fn from(tour: Tour) -> Self {
        TourListing {
            availability: tour.availability(),
            start_date: format_date(Some(tour.start_date)),
            end_date: format_date(Some(tour.end_date)),
            status: tour.status.to_string(),
            name: tour.name,
            days: tour.days,
            start_city: tour.start_city,
            end_city: tour.end_city,
            seats_available: tour.seats_available,
        }
    }
}

/// Distinct values offered by the search form's select boxes.
#[derive(Debug, Default)]
pub struct SearchChoices {
    pub names: Vec<String>,
    pub day_counts: Vec<i32>,
    pub start_dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct TourIndexView {
    pub title: &'static str,
    pub names: Vec<SelectOption>,
    pub day_counts: Vec<SelectOption>,
    pub start_dates: Vec<SelectOption>,
    pub availabilities: Vec<SelectOption>,
    pub tours: Vec<TourListing>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

fn page_url(params: &TourSearchParams, page: u32) -> String {
    let params = TourSearchParams {
        page: Some(page.to_string()),
        ..params.clone()
    };
    match serde_urlencoded::to_string(&params) {
        Ok(query) => format!("/tours?{}", query),
        Err(_) => format!("/tours?page={}", page),
    }
}

impl TourIndexView {
    pub fn new(params: &TourSearchParams, page: Page<Tour>, choices: SearchChoices) -> Self {
        let filter = params.filter();
        let selected_date = filter.start_date.map(|d| d.to_string());
        let selected_days = filter.days.map(|d| d.to_string());

        TourIndexView {
            title: "Find a Tour",
            names: options(
                choices.names.into_iter().map(|n| (n.clone(), n)),
                filter.name.as_deref(),
            ),
            day_counts: options(
                choices.day_counts.into_iter().map(|d| (d.to_string(), d.to_string())),
                selected_days.as_deref(),
            ),
            start_dates: options(
                choices.start_dates.into_iter().map(|d| (format_date(Some(d)), d.to_string())),
                selected_date.as_deref(),
            ),
            availabilities: options(
                Availability::ALL.into_iter().map(|a| (a.label().to_string(), a.label().to_string())),
                filter.availability.map(Availability::label),
            ),
            page: page.page,
            total_pages: page.total_pages(),
            total: page.total,
            previous_url: page.previous_page().map(|p| page_url(params, p)),
            next_url: page.next_page().map(|p| page_url(params, p)),
            tours: page.items.into_iter().map(TourListing::from).collect(),
        }
    }
}
