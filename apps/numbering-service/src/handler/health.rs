//! # ヘルスチェックハンドラ
//!
//! 採番サービスの稼働状態を確認するためのエンドポイント。
//!
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（データベースへの疎通を確認）
//!
//! レスポンス型は [`penomoran_shared::HealthResponse`] / [`penomoran_shared::ReadinessResponse`] を参照。

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use penomoran_infra::db;
use penomoran_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
use sqlx::PgPool;

/// DB 疎通確認のタイムアウト
const DATABASE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub pool: PgPool,
}

/// Readiness Check エンドポイント
///
/// データベースに `SELECT 1` が通れば 200、失敗またはタイムアウトなら 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let checks = HashMap::from([("database".to_string(), check_database(&state.pool).await)]);
    let response = ReadinessResponse::from_checks(checks);

    let http_status = match response.status {
        ReadinessStatus::Ready => StatusCode::OK,
        ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    };

    (http_status, Json(response))
}

async fn check_database(pool: &PgPool) -> CheckStatus {
    match tokio::time::timeout(DATABASE_CHECK_TIMEOUT, db::ping(pool)).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: database ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: database check timed out");
            CheckStatus::Error
        }
    }
}
