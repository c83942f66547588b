//! # Penomoran ドメイン層
//!
//! 文書番号の採番に関わるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: 名称・短縮コード・連番などを Newtype で表現し、
//!   生成時に検証する
//! - **採番スコープ**: 集約部署とそれ以外の部署の違いを
//!   [`scope::CountingScope`] の 2 バリアントで表現する
//! - **純粋性**: DB や HTTP には依存しない。時刻も [`clock::Clock`] 経由で受け取る
//!
//! ## 依存関係の方向
//!
//! ```text
//! numbering-service → infra → domain
//!          ↘
//!            shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダ
//! - [`document`] - 発行済み文書レコードと採番リクエスト
//! - [`error`] - ドメインエラー
//! - [`master_data`] - 所在地・部署・文書種別のマスタモデル
//! - [`number`] - 連番・ローマ数字の月・発行番号の書式化
//! - [`scope`] - 採番スコープと集計期間
//!
//! ## 使用例
//!
//! ```rust
//! use penomoran_domain::{
//!     master_data::{ResolvedCodes, ShortCode},
//!     number::{IssuedNumber, SequenceNumber},
//!     scope::Period,
//! };
//!
//! let codes = ResolvedCodes {
//!     location:      ShortCode::parse("BPN").unwrap(),
//!     department:    ShortCode::parse("OPS").unwrap(),
//!     document_type: ShortCode::parse("L").unwrap(),
//! };
//! let period = Period::new(2025, 1).unwrap();
//! let number = IssuedNumber::format(SequenceNumber::new(1).unwrap(), &codes, period);
//!
//! assert_eq!(number.as_str(), "001/PI-BPN/OPS/L/I/2025");
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod document;
pub mod error;
pub mod master_data;
pub mod number;
pub mod scope;

pub use error::DomainError;
