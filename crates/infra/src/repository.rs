//! # リポジトリ実装
//!
//! マスタデータ・採番カウンター・発行済み文書の永続化を担当する。
//!
//! ## 設計方針
//!
//! - **trait + Postgres 実装**: ユースケース層は trait にのみ依存し、
//!   テストでは `mock` モジュールのインメモリ実装に差し替える
//! - **書き込みは TxContext 必須**: カウンターの更新と文書の挿入は
//!   同じトランザクションでしか実行できない

pub mod issued_document_repository;
pub mod master_data_repository;
pub mod scope_counter_repository;

pub use issued_document_repository::{IssuedDocumentRepository, PostgresIssuedDocumentRepository};
pub use master_data_repository::{MasterDataRepository, PostgresMasterDataRepository};
pub use scope_counter_repository::{PostgresScopeCounterRepository, ScopeCounterRepository};
