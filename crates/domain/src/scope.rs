//! # 採番スコープ
//!
//! 連番が一意かつ欠番なしで振られる単位（スコープ）を定義する。
//!
//! ## スコープの種類
//!
//! | 種類 | キー | 対象 |
//! |------|------|------|
//! | `Aggregate` | 部署 + 年月 | 集約部署。文書種別・所在地をまたいで 1 本の連番 |
//! | `Narrow` | 部署 + 文書種別 + 所在地 + 年月 | それ以外の部署 |
//!
//! どちらになるかは [`ScopeRule`] が部署の短縮コードだけで決める。
//! 集約部署は起動時の設定で 1 つだけ指定する固定の業務ルールであり、
//! リクエストごとに部署名から推測することはしない。
//!
//! ## 集計期間
//!
//! [`Period`] は 1 か月を表し、`[当月 1 日 00:00, 翌月 1 日 00:00)` の
//! 半開区間を [`MonthWindow`] として返す。区間の境界は設定されたオフセット
//! （業務上のローカル時刻）で計算し、UTC に変換して保持する。

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{
    DomainError,
    master_data::{DepartmentName, DocumentTypeName, LocationName, ShortCode},
    number::ROMAN_MONTHS,
};

// =========================================================================
// Period（集計期間）
// =========================================================================

/// 集計期間（年月）
///
/// # 不変条件
///
/// - 月は 1〜12
/// - 年は 1〜9998（翌月の初日が常に表現できる範囲）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    year:      i32,
    month:     u32,
    first_day: NaiveDate,
    next_day:  NaiveDate,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if !(1..=9998).contains(&year) {
            return Err(DomainError::Validation(format!(
                "年は 1〜9998 の範囲で指定してください: {year}"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(DomainError::Validation(format!(
                "月は 1〜12 の範囲で指定してください: {month}"
            )));
        }

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let invalid = || DomainError::Validation(format!("不正な年月です: {year}-{month:02}"));
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_day = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;

        Ok(Self {
            year,
            month,
            first_day,
            next_day,
        })
    }

    /// 指定時刻を含む集計期間
    ///
    /// 月の判定は `offset` におけるローカル時刻で行う。
    pub fn containing(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = instant.with_timezone(&offset).date_naive();
        let (year, month) = (local.year(), local.month());
        let next_day = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };

        Self {
            year,
            month,
            first_day: local.with_day(1).unwrap_or(local),
            // chrono の表現範囲の上限付近以外では常に Some
            next_day: next_day.unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 月のローマ数字表記（I〜XII）
    pub fn roman_month(&self) -> &'static str {
        ROMAN_MONTHS[self.month as usize - 1]
    }

    /// 翌月の集計期間
    pub fn next(&self) -> Result<Self, DomainError> {
        Self::new(self.next_day.year(), self.next_day.month())
    }

    /// 集計期間の半開区間を UTC で返す
    pub fn window(&self, offset: FixedOffset) -> MonthWindow {
        MonthWindow {
            start: local_midnight_to_utc(self.first_day, offset),
            end:   local_midnight_to_utc(self.next_day, offset),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

fn local_midnight_to_utc(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, Utc)
}

/// 集計期間の半開区間 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end:   DateTime<Utc>,
}

impl MonthWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

// =========================================================================
// CountingScope（採番スコープ）
// =========================================================================

/// スコープの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScopeKind {
    /// 部署全体で 1 本の連番
    Aggregate,
    /// 部署 + 文書種別 + 所在地ごとの連番
    Narrow,
}

/// 採番スコープ
///
/// 1 リクエストにつき 1 回だけ [`ScopeRule::compute`] で生成し、
/// 連番の採番・件数の集計・カウンターキーの導出はすべてこの値から行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountingScope {
    Aggregate {
        department: DepartmentName,
        period:     Period,
    },
    Narrow {
        department:    DepartmentName,
        document_type: DocumentTypeName,
        location:      LocationName,
        period:        Period,
    },
}

impl CountingScope {
    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::Aggregate { .. } => ScopeKind::Aggregate,
            Self::Narrow { .. } => ScopeKind::Narrow,
        }
    }

    pub fn department(&self) -> &DepartmentName {
        match self {
            Self::Aggregate { department, .. } | Self::Narrow { department, .. } => department,
        }
    }

    /// 件数集計の条件に使う文書種別（集約スコープでは `None`）
    pub fn document_type(&self) -> Option<&DocumentTypeName> {
        match self {
            Self::Aggregate { .. } => None,
            Self::Narrow { document_type, .. } => Some(document_type),
        }
    }

    /// 件数集計の条件に使う所在地（集約スコープでは `None`）
    pub fn location(&self) -> Option<&LocationName> {
        match self {
            Self::Aggregate { .. } => None,
            Self::Narrow { location, .. } => Some(location),
        }
    }

    pub fn period(&self) -> Period {
        match self {
            Self::Aggregate { period, .. } | Self::Narrow { period, .. } => *period,
        }
    }

    /// カウンターテーブルの主キー
    pub fn key(&self) -> ScopeKey {
        let key = match self {
            Self::Aggregate { department, period } => {
                format!("aggregate|{}|{}", escape(department.as_str()), period)
            }
            Self::Narrow {
                department,
                document_type,
                location,
                period,
            } => format!(
                "narrow|{}|{}|{}|{}",
                escape(department.as_str()),
                escape(document_type.as_str()),
                escape(location.as_str()),
                period
            ),
        };
        ScopeKey(key)
    }
}

/// 区切り文字 `|` とエスケープ文字 `\` をエスケープする
fn escape(component: &str) -> String {
    component.replace('\\', "\\\\").replace('|', "\\|")
}

/// スコープの正規化文字列
///
/// 異なるスコープが同じキーになることはない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeKey(String);

impl ScopeKey {
    /// DB に保存されたキーを復元する
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =========================================================================
// ScopeRule（スコープ判定ルール）
// =========================================================================

/// スコープ判定ルール
///
/// 集約部署の短縮コードを 1 つだけ保持する不変の設定値。
/// 起動時に生成し、リクエスト処理からは参照のみ行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRule {
    aggregate_department_code: ShortCode,
}

impl ScopeRule {
    pub fn new(aggregate_department_code: ShortCode) -> Self {
        Self {
            aggregate_department_code,
        }
    }

    pub fn aggregate_department_code(&self) -> &ShortCode {
        &self.aggregate_department_code
    }

    /// 部署の短縮コードからスコープを決定する
    ///
    /// 短縮コードの比較は大文字小文字を区別する完全一致。
    pub fn compute(
        &self,
        department_code: &ShortCode,
        department: DepartmentName,
        document_type: DocumentTypeName,
        location: LocationName,
        period: Period,
    ) -> CountingScope {
        if department_code == &self.aggregate_department_code {
            CountingScope::Aggregate { department, period }
        } else {
            CountingScope::Narrow {
                department,
                document_type,
                location,
                period,
            }
        }
    }
}
