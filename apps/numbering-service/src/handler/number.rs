//! # 採番ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/numbers` - 文書番号を採番する
//!
//! ## リクエスト例
//!
//! ```json
//! {
//!   "requester_reference": "user-42",
//!   "display_name": "Budi Santoso",
//!   "location_name": "Balikpapan",
//!   "department_name": "Operations",
//!   "document_type_name": "Surat Keluar",
//!   "description": "Surat pengantar"
//! }
//! ```
//!
//! ## レスポンス例
//!
//! ```json
//! { "number": "001/PI-BPN/OPS/L/I/2025" }
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use penomoran_domain::document::NewIssuanceRequest;
use serde::{Deserialize, Serialize};

use crate::{error::ServiceError, usecase::NumberAllocator};

/// 採番 API の共有状態
pub struct NumberState {
    pub allocator: NumberAllocator,
}

// --- リクエスト/レスポンス型 ---

/// 採番リクエスト
#[derive(Debug, Deserialize)]
pub struct IssueNumberRequest {
    #[serde(default)]
    pub requester_reference: Option<String>,
    pub display_name:        String,
    pub location_name:       String,
    pub department_name:     String,
    pub document_type_name:  String,
    pub description:         String,
}

impl From<IssueNumberRequest> for NewIssuanceRequest {
    fn from(req: IssueNumberRequest) -> Self {
        Self {
            requester_reference: req.requester_reference,
            display_name:        req.display_name,
            location_name:       req.location_name,
            department_name:     req.department_name,
            document_type_name:  req.document_type_name,
            description:         req.description,
        }
    }
}

/// 採番レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct IssueNumberResponse {
    pub number: String,
}

// --- ハンドラ ---

/// POST /api/numbers
///
/// 番号は保存がコミットされた後にだけ返す。
#[tracing::instrument(skip_all)]
pub async fn issue_number(
    State(state): State<Arc<NumberState>>,
    payload: Result<Json<IssueNumberRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(req) = payload?;

    let document = state.allocator.allocate(req.into()).await?;

    Ok((
        StatusCode::OK,
        Json(IssueNumberResponse {
            number: document.issued_number().to_string(),
        }),
    ))
}
