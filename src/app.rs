use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    middleware,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use handlebars::{Handlebars, TemplateError};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::dashboard::{Dashboard, LoadStatus, Snapshot};
use crate::downloader;
use crate::error::AppError;
use crate::ingest::CsvSource;
use crate::login::{self, SessionGate};
use crate::record::Record;
use crate::table::TableView;
use crate::templates::{self, DASHBOARD, DashboardPage, LOADING, TableQuery};

pub struct AppState {
    pub session: SessionGate,
    pub dashboard: Arc<Dashboard>,
    pub source: Arc<dyn CsvSource>,
    pub templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(source: Arc<dyn CsvSource>) -> Result<Self, TemplateError> {
        Ok(AppState {
            session: SessionGate::new(),
            dashboard: Arc::new(Dashboard::new()),
            source,
            templates: templates::registry()?,
        })
    }
}

#[derive(Serialize)]
struct RecordsResponse<'a> {
    status: LoadStatus,
    total: usize,
    visible: usize,
    loaded_at: Option<String>,
    records: Vec<&'a Record>,
}

/// All routes of the application
///
/// `/` is the login form; everything under `/dashboard` and `/api` sits
/// behind the session gate.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(serve_dashboard))
        .route("/dashboard/reload", post(reload_dashboard))
        .route("/dashboard/export.csv", get(export_csv))
        .route("/dashboard/export.xlsx", get(export_xlsx))
        .route("/api/records", get(get_records))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login::require_auth,
        ));

    Router::new()
        .route("/", get(login::serve_login_page).post(login::handle_login))
        .route("/logout", get(login::handle_logout).post(login::handle_logout))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let source = config.source()?;
    info!(source = %source.describe(), "data source configured");

    let state = Arc::new(AppState::new(source)?);
    let app = router(state);

    let listener = TcpListener::bind(config.listen).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn format_loaded_at(snapshot: &Snapshot) -> Option<String> {
    snapshot
        .loaded_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

async fn serve_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> Result<Html<String>, AppError> {
    let snapshot = state.dashboard.ensure_loaded(state.source.clone());

    if snapshot.status != LoadStatus::Ready {
        let page = state.templates.render(LOADING, &())?;
        return Ok(Html(page));
    }

    let rows = TableView::rows(&snapshot.records, &query.q, query.sort_state());
    let page = DashboardPage::build(
        &query,
        &rows,
        snapshot.records.len(),
        format_loaded_at(&snapshot),
    );

    Ok(Html(state.templates.render(DASHBOARD, &page)?))
}

/// Throw away the current records and fetch them again
async fn reload_dashboard(State(state): State<Arc<AppState>>) -> Redirect {
    state.dashboard.reset();
    state.dashboard.ensure_loaded(state.source.clone());
    info!("reload requested");
    Redirect::to("/dashboard")
}

async fn get_records(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> impl IntoResponse {
    let snapshot = state.dashboard.ensure_loaded(state.source.clone());
    let rows = TableView::rows(&snapshot.records, &query.q, query.sort_state());

    Json(RecordsResponse {
        status: snapshot.status,
        total: snapshot.records.len(),
        visible: rows.len(),
        loaded_at: snapshot.loaded_at.map(|t| t.to_rfc3339()),
        records: rows,
    })
    .into_response()
}

async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> impl IntoResponse {
    let snapshot = state.dashboard.snapshot();
    let rows = TableView::rows(&snapshot.records, &query.q, query.sort_state());

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"domains.csv\"",
            ),
        ],
        downloader::to_csv(&rows),
    )
}

async fn export_xlsx(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.dashboard.snapshot();
    let rows = TableView::rows(&snapshot.records, &query.q, query.sort_state());
    let buffer = downloader::to_xlsx(&rows)?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"domains.xlsx\"",
            ),
        ],
        buffer,
    ))
}
