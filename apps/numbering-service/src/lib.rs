//! # Numbering Service
//!
//! 文書番号（例: `001/PI-BPN/OPS/L/I/2025`）を採番する HTTP サービス。
//!
//! ## 構成
//!
//! ```text
//! handler（axum）→ usecase → infra（PostgreSQL）
//!                        ↘ domain
//! ```
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - サービスエラーと HTTP レスポンスへの変換
//! - [`handler`] - HTTP ハンドラ
//! - [`usecase`] - 採番・参照のユースケース

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

pub mod config;
pub mod error;
pub mod handler;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod usecase;

use handler::{
    DocumentState,
    MasterDataState,
    NumberState,
    ScopeState,
    get_scope_usage,
    issue_number,
    list_documents,
    list_master_data,
};

/// API ルートごとの共有状態
pub struct ApiStates {
    pub number:      Arc<NumberState>,
    pub document:    Arc<DocumentState>,
    pub master_data: Arc<MasterDataState>,
    pub scope:       Arc<ScopeState>,
}

/// `/api` 配下のルーターを構築する
///
/// ヘルスチェックとミドルウェアレイヤーは `main` で追加する。
pub fn api_router(states: ApiStates) -> Router {
    Router::new()
        .route("/api/numbers", post(issue_number))
        .with_state(states.number)
        .merge(
            Router::new()
                .route("/api/documents", get(list_documents))
                .with_state(states.document),
        )
        .merge(
            Router::new()
                .route("/api/master-data/{kind}", get(list_master_data))
                .with_state(states.master_data),
        )
        .merge(
            Router::new()
                .route("/api/scopes/usage", get(get_scope_usage))
                .with_state(states.scope),
        )
}
