use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::db::models::NewPortfolio;
use crate::db::Database;
use crate::error::EngineError;
use crate::scheduler::{Job, RunOutcome, Scheduler};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub scheduler: Scheduler,
}

type ApiError = (StatusCode, String);

/// Build the Axum router for the portfolio API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/portfolios", get(list_portfolios_handler).post(create_portfolio_handler))
        .route("/api/portfolios/:id", delete(delete_portfolio_handler))
        .route("/api/portfolios/:id/active", post(set_active_handler))
        .route("/api/portfolios/:id/wagers", get(wagers_handler))
        .route("/api/portfolios/:id/stats", get(stats_handler))
        .route("/api/jobs", get(jobs_handler))
        .route("/api/jobs/simulation", post(run_simulation_handler))
        .route("/api/jobs/settlement", post(run_settlement_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Map engine failures onto HTTP status codes; anything unrecognised is a 500.
fn api_error(e: anyhow::Error) -> ApiError {
    let status = match e.downcast_ref::<EngineError>() {
        Some(EngineError::PortfolioNotFound(_)) => StatusCode::NOT_FOUND,
        Some(EngineError::ModelNotFound(_)) | Some(EngineError::InvalidPortfolio(_)) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("API request failed: {:#}", e);
    }
    (status, e.to_string())
}

/// GET /api/portfolios
async fn list_portfolios_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.list_portfolios().map(Json).map_err(api_error)
}

/// POST /api/portfolios
async fn create_portfolio_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPortfolio>,
) -> Result<impl IntoResponse, ApiError> {
    let portfolio = state.db.create_portfolio(&new).map_err(api_error)?;
    info!(
        "Portfolio {} '{}' created with {:.2} on model {}",
        portfolio.id, portfolio.name, portfolio.starting_balance, portfolio.model_id
    );
    Ok((StatusCode::CREATED, Json(portfolio)))
}

#[derive(Debug, Deserialize)]
struct ActiveBody {
    active: bool,
}

/// POST /api/portfolios/:id/active  {"active": false}
async fn set_active_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ActiveBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .set_portfolio_active(id, body.active)
        .map_err(api_error)?;
    info!("Portfolio {} active={}", id, body.active);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/portfolios/:id
async fn delete_portfolio_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_portfolio(id).map_err(api_error)?;
    info!("Portfolio {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct WagersQuery {
    limit: Option<i64>,
}

/// GET /api/portfolios/:id/wagers?limit=50
async fn wagers_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(q): Query<WagersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_portfolio(&state.db, id)?;
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    state.db.list_wagers(id, limit).map(Json).map_err(api_error)
}

/// GET /api/portfolios/:id/stats
async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    require_portfolio(&state.db, id)?;
    state.db.portfolio_stats(id).map(Json).map_err(api_error)
}

fn require_portfolio(db: &Database, id: i64) -> Result<(), ApiError> {
    match db.get_portfolio(id) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(api_error(EngineError::PortfolioNotFound(id).into())),
        Err(e) => Err(api_error(e)),
    }
}

/// GET /api/jobs
async fn jobs_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let locks = state.scheduler.locks();
    Json(
        Job::ALL
            .into_iter()
            .map(|job| (job.name(), locks.is_running(job)))
            .collect::<std::collections::BTreeMap<_, _>>(),
    )
}

/// POST /api/jobs/simulation
async fn run_simulation_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    trigger(&state.scheduler, Job::Simulation).await
}

/// POST /api/jobs/settlement
async fn run_settlement_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    trigger(&state.scheduler, Job::Settlement).await
}

async fn trigger(scheduler: &Scheduler, job: Job) -> Result<impl IntoResponse, ApiError> {
    info!("Manual {} run requested", job.name());
    match scheduler.run(job).await.map_err(api_error)? {
        RunOutcome::Completed(report) => Ok(Json(report)),
        RunOutcome::AlreadyRunning => Err((
            StatusCode::CONFLICT,
            format!("{} job already running", job.name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::fake::InMemorySource;
    use crate::db::models::AnalysisModel;
    use crate::engine::staking::StakingPolicy;
    use crate::engine::value::QuoteSelection;
    use crate::engine::{Settler, Simulator};
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        db.upsert_model(&AnalysisModel {
            id: 1,
            name: "poisson-v1".into(),
            description: None,
        })
        .unwrap();
        let source = Arc::new(InMemorySource::default());
        let scheduler = Scheduler::new(
            Simulator::new(
                db.clone(),
                source.clone(),
                StakingPolicy::default(),
                QuoteSelection::First,
            ),
            Settler::new(db.clone(), source),
        );
        AppState { db, scheduler }
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn create_then_list_portfolio() {
        let app = router(test_state());
        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/portfolios",
                r#"{"name":"Main","model_id":1,"starting_balance":1000.0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = json(resp).await;
        assert_eq!(created["current_balance"], 1000.0);

        let list = json(app.oneshot(get_req("/api/portfolios")).await.unwrap()).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["name"], "Main");
        assert_eq!(list[0]["model"]["name"], "poisson-v1");
    }

    #[tokio::test]
    async fn unknown_model_is_bad_request() {
        let app = router(test_state());
        let resp = app
            .oneshot(post_json(
                "/api/portfolios",
                r#"{"name":"Main","model_id":42,"starting_balance":1000.0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_portfolio_is_not_found() {
        let app = router(test_state());
        let resp = app.clone().oneshot(get_req("/api/portfolios/9/stats")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/portfolios/9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn toggle_active_and_read_stats() {
        let state = test_state();
        let id = state
            .db
            .create_portfolio(&NewPortfolio {
                name: "Main".into(),
                model_id: 1,
                starting_balance: 500.0,
                notify_url: None,
            })
            .unwrap()
            .id;
        let app = router(state.clone());

        let resp = app
            .clone()
            .oneshot(post_json(&format!("/api/portfolios/{id}/active"), r#"{"active":false}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(!state.db.get_portfolio(id).unwrap().unwrap().active);

        let stats = json(app.oneshot(get_req(&format!("/api/portfolios/{id}/stats"))).await.unwrap()).await;
        assert_eq!(stats["pending"], 0);
    }

    #[tokio::test]
    async fn job_trigger_reports_or_conflicts() {
        let state = test_state();
        let app = router(state.clone());

        let resp = app.clone().oneshot(post_json("/api/jobs/settlement", "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json(resp).await["job"], "settlement");

        let _held = state.scheduler.locks().try_acquire(Job::Simulation).unwrap();
        let resp = app.clone().oneshot(post_json("/api/jobs/simulation", "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let running = json(app.oneshot(get_req("/api/jobs")).await.unwrap()).await;
        assert_eq!(running["simulation"], true);
        assert_eq!(running["settlement"], false);
    }
}
