use anyhow::Result;
use axum::{extract::{Path, Query, State}, routing::get, Json, Router};
use bookrec_core::config::{DEFAULT_TOP_N, DEFAULT_TOP_RATED_LIMIT, MAX_TOP_N, MAX_TOP_RATED_LIMIT};
use bookrec_core::{CsvSource, FilterOutcome, ItemId, ItemRecord, Recommendation, RecommendationService, TextFilter, TokenizerOptions, TopRatedQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

mod errors;
pub use errors::ApiError;

#[derive(Deserialize)]
pub struct RecommendParams {
    #[serde(default = "default_top_n")]
    pub top_n: i64,
}

#[derive(Deserialize)]
pub struct TextRecommendParams {
    pub q: String,
    #[serde(default = "default_top_n")]
    pub top_n: i64,
}

fn default_top_n() -> i64 { DEFAULT_TOP_N as i64 }

#[derive(Deserialize, Default)]
pub struct BookFilterParams {
    pub title: Option<String>,
    pub author: Option<String>,
}

#[derive(Deserialize)]
pub struct TopBooksParams {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 { DEFAULT_TOP_RATED_LIMIT as i64 }

#[derive(Serialize)]
pub struct BookSummary {
    pub book_id: ItemId,
    pub title: String,
    pub authors: String,
}

#[derive(Serialize)]
pub struct BookDetail {
    pub book_id: ItemId,
    pub title: String,
    pub authors: String,
    pub average_rating: Option<f32>,
    pub original_publication_year: Option<i32>,
    pub best_book_id: Option<ItemId>,
}

#[derive(Serialize)]
pub struct BooksResponse {
    pub count: usize,
    pub too_many: bool,
    pub books: Vec<BookSummary>,
}

#[derive(Serialize)]
pub struct TopBooksResponse {
    pub count: usize,
    pub books: Vec<BookDetail>,
}

impl From<&ItemRecord> for BookSummary {
    fn from(r: &ItemRecord) -> Self {
        Self { book_id: r.id, title: r.title_or_empty().to_string(), authors: r.authors_or_empty().to_string() }
    }
}

impl From<&ItemRecord> for BookDetail {
    fn from(r: &ItemRecord) -> Self {
        Self {
            book_id: r.id,
            title: r.title_or_empty().to_string(),
            authors: r.authors_or_empty().to_string(),
            average_rating: r.rating,
            original_publication_year: r.year,
            best_book_id: r.display_id,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
}

/// Loads the CSV tables from `data_dir` and builds the service before returning the router.
pub fn build_app(data_dir: String, options: TokenizerOptions) -> Result<Router> {
    let service = RecommendationService::from_source(&CsvSource::new(&data_dir), options)?;
    Ok(router(Arc::new(service)))
}

pub fn router(service: Arc<RecommendationService>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/books", get(books_handler))
        .route("/books/:book_id", get(book_handler))
        .route("/recommend", get(text_recommend_handler))
        .route("/recommend/:book_id", get(recommend_handler))
        .route("/top_books", get(top_books_handler))
        .with_state(AppState { service })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Non-positive counts mean "nothing"; large ones are capped.
fn clamp_count(requested: i64, max: usize) -> usize {
    if requested <= 0 { 0 } else { (requested as u64).min(max as u64) as usize }
}

/// Ids outside the catalog's id range cannot name a book.
fn catalog_id(raw: i64) -> Option<ItemId> { ItemId::try_from(raw).ok() }

pub async fn recommend_handler(State(state): State<AppState>, Path(book_id): Path<i64>, Query(params): Query<RecommendParams>) -> Json<Vec<Recommendation>> {
    let start = std::time::Instant::now();
    let recs = match catalog_id(book_id) {
        Some(id) => state.service.recommend(id, clamp_count(params.top_n, MAX_TOP_N)),
        None => Vec::new(),
    };
    tracing::debug!(book_id, results = recs.len(), took_s = start.elapsed().as_secs_f64(), "recommend");
    Json(recs)
}

pub async fn text_recommend_handler(State(state): State<AppState>, Query(params): Query<TextRecommendParams>) -> Json<Vec<Recommendation>> {
    let start = std::time::Instant::now();
    let recs = state.service.recommend_text(&params.q, clamp_count(params.top_n, MAX_TOP_N));
    tracing::debug!(query = %params.q, results = recs.len(), took_s = start.elapsed().as_secs_f64(), "recommend by text");
    Json(recs)
}

pub async fn books_handler(State(state): State<AppState>, Query(params): Query<BookFilterParams>) -> Json<BooksResponse> {
    let filter = TextFilter::new(params.title, params.author);
    let response = match state.service.filter(&filter) {
        FilterOutcome::Matches(books) => BooksResponse {
            count: books.len(),
            too_many: false,
            books: books.into_iter().map(BookSummary::from).collect(),
        },
        FilterOutcome::TooMany { count } => BooksResponse { count, too_many: true, books: vec![] },
    };
    Json(response)
}

pub async fn book_handler(State(state): State<AppState>, Path(book_id): Path<i64>) -> Result<Json<BookDetail>, ApiError> {
    catalog_id(book_id)
        .and_then(|id| state.service.record(id))
        .map(|r| Json(BookDetail::from(r)))
        .ok_or_else(|| ApiError::NotFound(format!("book {book_id} not found")))
}

pub async fn top_books_handler(State(state): State<AppState>, Query(params): Query<TopBooksParams>) -> Result<Json<TopBooksResponse>, ApiError> {
    if params.limit <= 0 {
        return Err(ApiError::BadRequest("limit must be positive".into()));
    }
    let query = TopRatedQuery {
        start_year: params.start_year,
        end_year: params.end_year,
        limit: clamp_count(params.limit, MAX_TOP_RATED_LIMIT),
        ..TopRatedQuery::default()
    };
    let books: Vec<BookDetail> = state.service.top_rated(&query).into_iter().map(BookDetail::from).collect();
    Ok(Json(TopBooksResponse { count: books.len(), books }))
}
