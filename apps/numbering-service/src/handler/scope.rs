//! # 採番スコープハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/scopes/usage?department_name=&document_type_name=&location_name=&year=&month=`
//!   - スコープのカウンター最終値と保存済み文書件数を返す

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use penomoran_domain::scope::ScopeKind;
use penomoran_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{
    error::ServiceError,
    usecase::{ScopeUsage, ScopeUsageQuery, ScopeUsageUseCase},
};

/// スコープ API の共有状態
pub struct ScopeState {
    pub usecase: ScopeUsageUseCase,
}

/// 利用状況クエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ScopeUsageParams {
    pub department_name:    String,
    pub document_type_name: String,
    pub location_name:      String,
    pub year:               i32,
    pub month:              u32,
}

/// 利用状況 DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct ScopeUsageDto {
    pub scope_key:    String,
    pub scope_kind:   ScopeKind,
    pub issued_count: i64,
    pub last_number:  i64,
    pub burned:       i64,
}

impl From<ScopeUsage> for ScopeUsageDto {
    fn from(usage: ScopeUsage) -> Self {
        Self {
            scope_key:    usage.scope.key().as_str().to_string(),
            scope_kind:   usage.scope.kind(),
            issued_count: usage.issued_count,
            last_number:  usage.last_number,
            burned:       usage.burned(),
        }
    }
}

/// GET /api/scopes/usage
#[tracing::instrument(skip_all)]
pub async fn get_scope_usage(
    State(state): State<Arc<ScopeState>>,
    params: Result<Query<ScopeUsageParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(params) = params?;

    let usage = state
        .usecase
        .usage(ScopeUsageQuery {
            department_name:    params.department_name,
            document_type_name: params.document_type_name,
            location_name:      params.location_name,
            year:               params.year,
            month:              params.month,
        })
        .await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(ScopeUsageDto::from(usage)))))
}
