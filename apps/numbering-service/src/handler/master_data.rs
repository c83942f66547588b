//! # マスタデータハンドラ
//!
//! 採番フォームの選択肢に使うマスタの一覧を返す。
//!
//! ## エンドポイント
//!
//! - `GET /api/master-data/{kind}` - `kind` は `locations` / `departments` / `document-types`

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use penomoran_domain::master_data::{MasterDataKind, MasterRecord};
use penomoran_shared::ApiResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ServiceError, usecase::MasterDataResolver};

/// マスタデータ API の共有状態
pub struct MasterDataState {
    pub resolver: MasterDataResolver,
}

/// マスタレコード DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct MasterRecordDto {
    pub id:           Uuid,
    pub display_name: String,
    pub short_code:   String,
}

impl From<MasterRecord> for MasterRecordDto {
    fn from(record: MasterRecord) -> Self {
        Self {
            id:           *record.id.as_uuid(),
            display_name: record.display_name,
            short_code:   record.short_code.into_string(),
        }
    }
}

/// GET /api/master-data/{kind}
#[tracing::instrument(skip_all)]
pub async fn list_master_data(
    State(state): State<Arc<MasterDataState>>,
    kind: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Path(kind) = kind?;
    let kind: MasterDataKind = kind.parse()?;

    let items: Vec<MasterRecordDto> = state
        .resolver
        .list(kind)
        .await?
        .into_iter()
        .map(MasterRecordDto::from)
        .collect();

    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}
