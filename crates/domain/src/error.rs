//! # ドメイン層エラー定義
//!
//! 入力値の検証失敗など、ドメインルール違反を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 必須項目の欠落、文字数超過、範囲外の値 |
//! | `UnknownMasterDataKind` | 404 Not Found | 存在しないマスタ種別の指定 |
//!
//! ## 使用例
//!
//! ```rust
//! use penomoran_domain::DomainError;
//!
//! fn validate_month(month: u32) -> Result<(), DomainError> {
//!     if !(1..=12).contains(&month) {
//!         return Err(DomainError::Validation(format!("月が不正です: {month}")));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_month(13).is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// API 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がドメインルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - 文字数制限の超過
    /// - 連番が 0 以下、月が 1〜12 の範囲外
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 未知のマスタ種別
    ///
    /// `locations` / `departments` / `document-types` 以外が指定された場合。
    #[error("マスタ種別が不正です: {0}")]
    UnknownMasterDataKind(String),
}
