//! # 発行済み文書ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/documents?requester_reference=&limit=` - 依頼者の発行済み文書一覧（新しい順）

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use penomoran_domain::document::IssuedDocument;
use penomoran_shared::ApiResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ServiceError, usecase::DocumentUseCase};

/// 文書 API の共有状態
pub struct DocumentState {
    pub usecase: DocumentUseCase,
}

// --- リクエスト/レスポンス型 ---

/// 一覧取得クエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub requester_reference: String,
    pub limit:               Option<i64>,
}

/// 発行済み文書 DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct IssuedDocumentDto {
    pub id: Uuid,
    pub requester_reference: Option<String>,
    pub display_name: String,
    pub issued_number: String,
    pub document_type_name: String,
    pub description: String,
    pub location_name: String,
    pub department_name: String,
    pub created_at: String,
}

impl From<&IssuedDocument> for IssuedDocumentDto {
    fn from(document: &IssuedDocument) -> Self {
        Self {
            id: *document.id().as_uuid(),
            requester_reference: document
                .requester_reference()
                .map(|r| r.as_str().to_string()),
            display_name: document.display_name().as_str().to_string(),
            issued_number: document.issued_number().to_string(),
            document_type_name: document.document_type_name().as_str().to_string(),
            description: document.description().as_str().to_string(),
            location_name: document.location_name().as_str().to_string(),
            department_name: document.department_name().as_str().to_string(),
            created_at: document.created_at().to_rfc3339(),
        }
    }
}

// --- ハンドラ ---

/// GET /api/documents
#[tracing::instrument(skip_all)]
pub async fn list_documents(
    State(state): State<Arc<DocumentState>>,
    query: Result<Query<ListDocumentsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(query) = query?;

    let documents = state
        .usecase
        .list_by_requester(&query.requester_reference, query.limit)
        .await?;

    let items: Vec<IssuedDocumentDto> = documents.iter().map(IssuedDocumentDto::from).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}
