//! # Penomoran 共有ユーティリティ
//!
//! サービス層から使われるレスポンス型とトレーシング初期化を提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum には依存しない（`IntoResponse` 変換はサービス側の責務）

pub mod api_response;
pub mod error_response;
pub mod health;
pub mod observability;

pub use api_response::ApiResponse;
pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
