//! # ユースケース層
//!
//! 採番サービスのビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリ・トランザクション管理・時刻を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは DTO の変換だけを行い、ロジックはユースケースに集約
//! - **再試行は採番だけ**: マスタ解決や参照系は失敗したらそのまま返す
//!
//! ## モジュール構成
//!
//! - `allocation`: 採番（検証 → マスタ解決 → スコープ決定 → 採番と保存）
//! - `document`: 依頼者ごとの発行済み文書一覧
//! - `master_data`: マスタデータの名称解決と一覧
//! - `retry`: 競合時の再試行ポリシー
//! - `scope_usage`: 採番スコープの利用状況

pub mod allocation;
pub mod document;
pub mod master_data;
pub mod retry;
pub mod scope_usage;

pub use allocation::{AllocationSettings, NumberAllocator};
pub use document::DocumentUseCase;
pub use master_data::MasterDataResolver;
pub use retry::RetryPolicy;
pub use scope_usage::{ScopeUsage, ScopeUsageQuery, ScopeUsageUseCase};
