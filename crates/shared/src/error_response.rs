//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス `{ "error": "..." }` を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - HTTP ステータスはレスポンスヘッダーでのみ表現し、本文には含めない
//! - 内部エラーの詳細はログにだけ残し、本文は固定文言にする

use serde::{Deserialize, Serialize};

/// 内部エラー時の固定文言
pub const INTERNAL_ERROR_MESSAGE: &str = "内部エラーが発生しました";

/// エラーレスポンス
///
/// ## 使用例
///
/// ```
/// use penomoran_shared::ErrorResponse;
///
/// let response = ErrorResponse::new("所在地が見つかりません: Bandung");
/// assert_eq!(response.error, "所在地が見つかりません: Bandung");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// 500 Internal Server Error 用
    ///
    /// 本文は固定値（内部情報を漏らさないため）。
    pub fn internal_error() -> Self {
        Self::new(INTERNAL_ERROR_MESSAGE)
    }
}
