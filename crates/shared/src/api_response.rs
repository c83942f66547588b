//! # API レスポンスエンベロープ
//!
//! 参照系エンドポイントの統一レスポンス形式 `{ "data": T }` を提供する。
//! 採番エンドポイントは `{ "number": ... }` をそのまま返すため、この型を使わない。

use serde::{Deserialize, Serialize};

/// 参照系 API の統一レスポンス型
///
/// ## 使用例
///
/// ```
/// use penomoran_shared::ApiResponse;
///
/// let response = ApiResponse::new(vec!["Balikpapan"]);
/// assert_eq!(response.data, vec!["Balikpapan"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
