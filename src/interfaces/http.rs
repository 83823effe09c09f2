//! HTTP surface: run a simulation and poll its audit.

use crate::application::simulator::LoanSimulator;
use crate::domain::loan::{AmortizationResult, LoanRequest};
use crate::domain::simulation::{AuditStatus, SimulationId, SimulationRecord};
use crate::error::{LoanError, Result};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

pub type SharedSimulator = Arc<LoanSimulator>;

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub ok: bool,
    pub simulation_id: SimulationId,
    pub audit_status: AuditStatus,
    pub data: AmortizationResult,
}

#[derive(Debug, Serialize)]
pub struct SimulationStatusResponse {
    pub ok: bool,
    pub simulation_id: SimulationId,
    pub audit_status: AuditStatus,
    pub audit_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub amount: f64,
    pub rate: f64,
    pub months: u32,
    pub data: AmortizationResult,
}

impl SimulationStatusResponse {
    fn from_record(record: SimulationRecord) -> Result<Self> {
        let schedule = record.schedule()?;
        Ok(Self {
            ok: true,
            simulation_id: record.id,
            audit_status: record.audit_status,
            audit_error: record.audit_error,
            created_at: record.created_at,
            amount: record.amount,
            rate: record.rate,
            months: record.months,
            data: AmortizationResult {
                monthly_payment: record.monthly_payment,
                total_paid: record.total_paid,
                total_interest: record.total_interest,
                schedule,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    ok: bool,
    detail: String,
}

/// Error reply carrying a status code and a human-readable detail.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl From<LoanError> for ApiError {
    fn from(err: LoanError) -> Self {
        let status = match &err {
            LoanError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LoanError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self {
            status,
            detail: err.detail(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            ok: false,
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn router(simulator: SharedSimulator) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/simulate", post(simulate))
        .route("/simulations/:id", get(simulation_status))
        .with_state(simulator)
}

/// Binds `addr` and serves the router until the process is interrupted.
pub async fn serve(addr: SocketAddr, simulator: SharedSimulator) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(simulator))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn simulate(
    State(simulator): State<SharedSimulator>,
    payload: std::result::Result<Json<LoanRequest>, JsonRejection>,
) -> std::result::Result<Json<SimulateResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        detail: rejection.body_text(),
    })?;

    let receipt = simulator.simulate(request).await?;
    Ok(Json(SimulateResponse {
        ok: true,
        simulation_id: receipt.simulation_id,
        audit_status: receipt.audit_status,
        data: receipt.result,
    }))
}

pub async fn simulation_status(
    State(simulator): State<SharedSimulator>,
    Path(id): Path<SimulationId>,
) -> std::result::Result<Json<SimulationStatusResponse>, ApiError> {
    let record = simulator
        .simulation(id)
        .await?
        .ok_or(LoanError::RecordNotFound(id))?;
    Ok(Json(SimulationStatusResponse::from_record(record)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{AuditJob, ScoringProvider, SimulationStoreBox};
    use crate::infrastructure::in_memory::InMemorySimulationStore;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    struct Approve;

    #[async_trait]
    impl ScoringProvider for Approve {
        async fn score(&self, _job: &AuditJob) -> Result<()> {
            Ok(())
        }
    }

    fn shared() -> SharedSimulator {
        let store = InMemorySimulationStore::new();
        Arc::new(LoanSimulator::new(
            Arc::new(move || Box::new(store.clone()) as SimulationStoreBox),
            Arc::new(Approve),
        ))
    }

    #[tokio::test]
    async fn test_simulate_handler() {
        let simulator = shared();
        let Json(response) = simulate(
            State(simulator),
            Ok(Json(LoanRequest::new(1000.0, 12.0, 12.0))),
        )
        .await
        .unwrap();

        assert!(response.ok);
        assert_eq!(response.simulation_id, 1);
        assert_eq!(response.audit_status, AuditStatus::Pending);
        assert_eq!(response.data.monthly_payment, dec!(88.85));

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["audit_status"], "PENDING");
        assert_eq!(body["data"]["total_paid"].as_f64(), Some(1066.19));
        assert_eq!(body["data"]["schedule"].as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_simulate_rejects_invalid_input() {
        let simulator = shared();
        let err = simulate(
            State(simulator.clone()),
            Ok(Json(LoanRequest::new(1000.0, 12.0, 0.0))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.detail,
            "Payment periods must be an integer greater than 0"
        );
        assert!(simulator.simulation(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_handler_polls_audit() {
        let simulator = shared();
        simulate(
            State(simulator.clone()),
            Ok(Json(LoanRequest::new(1200.0, 0.0, 12.0))),
        )
        .await
        .unwrap();

        let mut status = AuditStatus::Pending;
        for _ in 0..100 {
            let Json(response) = simulation_status(State(simulator.clone()), Path(1))
                .await
                .unwrap();
            assert_eq!(response.data.schedule.len(), 12);
            status = response.audit_status;
            if status.is_terminal() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(status, AuditStatus::Success);
    }

    #[tokio::test]
    async fn test_status_handler_unknown_id() {
        let err = simulation_status(State(shared()), Path(404))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_simulate_rejects_unrepresentable_amount() {
        let simulator = shared();
        let err = simulate(
            State(simulator.clone()),
            Ok(Json(LoanRequest::new(1e29, 12.0, 12.0))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.detail, "Amount must not exceed 1000000000000");
        assert!(simulator.simulation(1).await.unwrap().is_none());
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router(shared()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_simulate(body: &'static str) -> Request<Body> {
        Request::post("/simulate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_router_simulate() {
        let (status, body) = send(post_simulate(
            r#"{"amount": 1000, "rate": 12, "months": 12}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["simulation_id"], 1);
        assert_eq!(body["audit_status"], "PENDING");
        assert_eq!(body["data"]["monthly_payment"].as_f64(), Some(88.85));
    }

    #[tokio::test]
    async fn test_router_rejects_bad_bodies() {
        for payload in [
            r#"{"amount": 1000, "rate": 12}"#,
            r#"{"amount": "lots", "rate": 12, "months": 12}"#,
            r#"{"amount": 1000,"#,
        ] {
            let (status, body) = send(post_simulate(payload)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{payload}");
            assert_eq!(body["ok"], false);
            assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
        }
    }

    #[tokio::test]
    async fn test_router_rejects_huge_term() {
        let (status, body) = send(post_simulate(
            r#"{"amount": 1000, "rate": 12, "months": 4000000000}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["ok"], false);
        assert_eq!(body["detail"], "Payment periods must not exceed 1200");
    }

    #[tokio::test]
    async fn test_router_unknown_simulation() {
        let request = Request::get("/simulations/42").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ok"], false);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_router_healthz() {
        let request = Request::get("/healthz").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
