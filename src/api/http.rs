//! HTTP surface: a single `POST /predict` route over the loaded predictor.
//!
//! Successful predictions answer `200 {"prediction": n}`. Rejections answer
//! `{"error": msg}` with 400 for bad input and 500 for anything else.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::common::error::{ChurnError, ChurnResult, ErrorCode};
use crate::inference::domain::{ChurnPredictor, PredictOutcome};

/// Build the router with the predictor injected as shared state.
pub fn router(predictor: ChurnPredictor) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .with_state(predictor)
}

/// Status code an outcome is reported with.
pub fn status_for(outcome: &PredictOutcome) -> StatusCode {
    match outcome {
        PredictOutcome::Label(_) => StatusCode::OK,
        PredictOutcome::Rejected {
            code: ErrorCode::InvalidInput,
            ..
        } => StatusCode::BAD_REQUEST,
        PredictOutcome::Rejected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn predict(
    State(predictor): State<ChurnPredictor>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let outcome = match payload {
        Ok(Json(body)) => predictor.predict(&body),
        Err(rejection) => PredictOutcome::Rejected {
            code: ErrorCode::InvalidInput,
            reason: rejection.body_text(),
        },
    };

    let status = status_for(&outcome);
    let body = match outcome {
        PredictOutcome::Label(label) => json!({ "prediction": label }),
        PredictOutcome::Rejected { reason, .. } => json!({ "error": reason }),
    };
    (status, Json(body)).into_response()
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, predictor: ChurnPredictor) -> ChurnResult<()> {
    let serve_err = |source| ChurnError::Serve {
        addr: addr.to_string(),
        source,
    };
    let run_id = predictor.run_id().clone();
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(serve_err)?;
    tracing::info!(ev = "http.listen", addr = %addr, run_id = %run_id);

    axum::serve(listener, router(predictor))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(serve_err)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(ev = "http.signal", error = %err, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!(ev = "http.shutdown");
}
