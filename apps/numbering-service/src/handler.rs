//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは DTO の変換だけを行い、ビジネスロジックはユースケースに委譲
//! - 失敗はすべて [`ServiceError`](crate::error::ServiceError) 経由で `{ "error": ... }` を返す

pub mod document;
pub mod health;
pub mod master_data;
pub mod number;
pub mod scope;

pub use document::{DocumentState, list_documents};
pub use health::{ReadinessState, health_check, readiness_check};
pub use master_data::{MasterDataState, list_master_data};
pub use number::{NumberState, issue_number};
pub use scope::{ScopeState, get_scope_usage};
