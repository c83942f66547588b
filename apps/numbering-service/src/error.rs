//! # Numbering Service エラー定義
//!
//! 採番サービス固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | エラー | HTTP ステータス |
//! |--------|----------------|
//! | `Validation` | 400 Bad Request |
//! | `MasterDataNotFound` / `UnknownMasterDataKind` | 404 Not Found |
//! | `AllocationConflict` | 409 Conflict |
//! | `Timeout` | 503 Service Unavailable |
//! | `Persistence` / `Internal` | 500 Internal Server Error |
//!
//! 500 系の本文は固定文言にし、詳細はログにだけ出力する。

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use penomoran_domain::{DomainError, master_data::MasterDataKind};
use penomoran_infra::InfraError;
use penomoran_shared::ErrorResponse;
use thiserror::Error;

/// Numbering Service で発生するエラー
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 入力値の検証エラー
    #[error("{0}")]
    Validation(String),

    /// マスタに存在しない名称が指定された
    #[error("{}が見つかりません: {name}", .kind.label())]
    MasterDataNotFound { kind: MasterDataKind, name: String },

    /// 未知のマスタ種別
    #[error("マスタ種別が不正です: {0}")]
    UnknownMasterDataKind(String),

    /// 再試行しても採番の競合が解消しなかった
    #[error("採番が競合しました。再度お試しください（試行回数: {attempts}）")]
    AllocationConflict { attempts: u32 },

    /// 採番処理が時間内に終わらなかった
    #[error("採番がタイムアウトしました。再度お試しください")]
    Timeout,

    /// 永続化エラー
    #[error("永続化エラー: {0}")]
    Persistence(#[from] InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl ServiceError {
    /// 対応する HTTP ステータス
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MasterDataNotFound { .. } | Self::UnknownMasterDataKind(_) => {
                StatusCode::NOT_FOUND
            }
            Self::AllocationConflict { .. } => StatusCode::CONFLICT,
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::UnknownMasterDataKind(kind) => Self::UnknownMasterDataKind(kind),
        }
    }
}

// axum の抽出エラーは 400 の `{ "error": ... }` として返す

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::Persistence(e) => {
                tracing::error!(
                    error.category = "infrastructure",
                    error.kind = "database",
                    span_trace = %e.span_trace(),
                    "永続化エラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
            Self::Internal(msg) => {
                tracing::error!(
                    error.category = "infrastructure",
                    error.kind = "internal",
                    "内部エラー: {}",
                    msg
                );
                ErrorResponse::internal_error()
            }
            Self::AllocationConflict { .. } | Self::Timeout => {
                tracing::warn!(status = status.as_u16(), "{}", self);
                ErrorResponse::new(self.to_string())
            }
            _ => ErrorResponse::new(self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
