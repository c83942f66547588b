//! # 発行番号
//!
//! 採番された連番を `001/PI-BPN/OPS/L/I/2025` 形式の文字列に書式化する。
//!
//! ## 書式
//!
//! ```text
//! {連番:3 桁ゼロ埋め}/PI-{所在地コード}/{部署コード}/{文書種別コード}/{ローマ数字の月}/{西暦年}
//! ```
//!
//! 連番が 999 を超えた場合は切り詰めずに桁を広げる（`1000/PI-...`）。

use serde::{Deserialize, Serialize};

use crate::{DomainError, master_data::ResolvedCodes, scope::Period};

/// 月（1〜12）に対応するローマ数字
pub(crate) const ROMAN_MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// 月をローマ数字に変換する
///
/// 1〜12 以外は `None`。
pub fn roman_month(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    ROMAN_MONTHS.get(index).copied()
}

// =========================================================================
// SequenceNumber（スコープ内連番）
// =========================================================================

/// 採番スコープ内の連番（値オブジェクト）
///
/// # 不変条件
///
/// - 1 以上の正整数
///
/// # 使用例
///
/// ```rust
/// use penomoran_domain::number::SequenceNumber;
///
/// let seq = SequenceNumber::new(7).unwrap();
/// assert_eq!(seq.to_string(), "007");
/// assert!(SequenceNumber::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNumber(i64);

impl SequenceNumber {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::Validation(format!(
                "連番は 1 以上である必要があります: {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for SequenceNumber {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// 最低 3 桁のゼロ埋め表記
impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

// =========================================================================
// IssuedNumber（発行番号）
// =========================================================================

/// 書式化済みの発行番号
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssuedNumber(String);

impl IssuedNumber {
    /// 連番・短縮コード・期間から発行番号を組み立てる
    pub fn format(sequence: SequenceNumber, codes: &ResolvedCodes, period: Period) -> Self {
        Self(format!(
            "{}/PI-{}/{}/{}/{}/{}",
            sequence,
            codes.location.as_str(),
            codes.department.as_str(),
            codes.document_type.as_str(),
            period.roman_month(),
            period.year(),
        ))
    }

    /// DB に保存済みの値から復元する
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for IssuedNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
