use axum::{
    extract::{Query, State},
    response::Html,
    routing::{get, post},
    Form, Router,
};
use toursearch_core::TourSearchParams;
use tracing::info;

use crate::{
    error::AppError,
    state::AppState,
    views::{SearchChoices, TourIndexView},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/tours", get(index))
        .route("/tours/search", post(search))
}

// Parameters are taken as raw pairs so repeated or unknown keys never fail extraction.
type Pairs = Vec<(String, String)>;

/// GET / and GET /tours
async fn index(
    State(state): State<AppState>,
    Query(pairs): Query<Pairs>,
) -> Result<Html<String>, AppError> {
    render_listing(&state, &TourSearchParams::from_pairs(pairs)).await
}

/// POST /tours/search
async fn search(
    State(state): State<AppState>,
    Form(pairs): Form<Pairs>,
) -> Result<Html<String>, AppError> {
    render_listing(&state, &TourSearchParams::from_pairs(pairs)).await
}

async fn render_listing(state: &AppState, params: &TourSearchParams) -> Result<Html<String>, AppError> {
    let filter = params.filter();
    let request = params.page_request(state.per_page);

    let page = state.tours.search(&filter, request).await?;
    info!(?filter, page = page.page, total = page.total, "Tour search");

    let choices = SearchChoices {
        names: state.tours.destination_names().await?,
        day_counts: state.tours.day_counts().await?,
        start_dates: state.tours.start_dates().await?,
    };

    let html = state.views.tour_index(&TourIndexView::new(params, page, choices))?;
    Ok(Html(html))
}
