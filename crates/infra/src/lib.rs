//! # Penomoran インフラ層
//!
//! PostgreSQL との接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: 接続プールの作成、マイグレーション、疎通確認
//! - **トランザクション管理**: [`db::TxContext`] と [`db::TransactionManager`]
//! - **リポジトリ実装**: マスタデータ・採番カウンター・発行済み文書
//!
//! ## 依存関係
//!
//! ```text
//! numbering-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - `mock` - インメモリモック（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use penomoran_infra::{db, repository::PostgresScopeCounterRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/penomoran").await?;
//!     db::run_migrations(&pool).await?;
//!     let counters = PostgresScopeCounterRepository::new(pool.clone());
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
