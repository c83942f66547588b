//! # Numbering Service 設定
//!
//! 環境変数から採番サービスの設定を読み込む。
//!
//! 起動時に 1 回だけ読み込み、以降は不変の値として共有する。
//! 値が不正な場合は起動エラーにする（黙ってデフォルト値に戻さない）。

use std::{env, time::Duration};

use chrono::{FixedOffset, Offset, Utc};
use penomoran_domain::{master_data::ShortCode, scope::ScopeRule};
use thiserror::Error;

const DEFAULT_AGGREGATE_DEPARTMENT_CODE: &str = "BDS";
const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BACKOFF_BASE_MS: u64 = 20;
const DEFAULT_BACKOFF_MAX_MS: u64 = 500;
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値を解釈できない
    #[error("{name} の値が不正です: {value:?}（{reason}）")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },
}

/// Numbering Service サーバーの設定
#[derive(Debug, Clone)]
pub struct NumberingConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 起動時にマイグレーションを適用するか
    pub run_migrations: bool,
    /// 採番設定
    pub allocation: AllocationConfig,
}

/// 採番の設定
#[derive(Debug, Clone)]
pub struct AllocationConfig {
    /// 集約部署の短縮コード
    pub aggregate_department_code: ShortCode,
    /// 月の区切りに使う UTC オフセット
    pub utc_offset:   FixedOffset,
    /// 競合時の最大試行回数（初回を含む）
    pub max_attempts: u32,
    /// バックオフの基準時間
    pub backoff_base: Duration,
    /// バックオフの上限
    pub backoff_max:  Duration,
    /// 採番と保存をまとめた処理のタイムアウト
    pub timeout:      Duration,
}

impl AllocationConfig {
    /// 集約部署コードからスコープルールを作る
    pub fn scope_rule(&self) -> ScopeRule {
        ScopeRule::new(self.aggregate_department_code.clone())
    }
}

impl NumberingConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストでは `HashMap` を引く関数を渡す。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let code = lookup("AGGREGATE_DEPARTMENT_CODE")
            .unwrap_or_else(|| DEFAULT_AGGREGATE_DEPARTMENT_CODE.to_string());
        let aggregate_department_code =
            ShortCode::parse(code.clone()).map_err(|e| ConfigError::Invalid {
                name:   "AGGREGATE_DEPARTMENT_CODE",
                value:  code,
                reason: e.to_string(),
            })?;

        let utc_offset = parse_or(&lookup, "NUMBERING_UTC_OFFSET", Utc.fix())?;

        let max_attempts = parse_or(&lookup, "ALLOCATION_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name:   "ALLOCATION_MAX_ATTEMPTS",
                value:  "0".to_string(),
                reason: "1 以上を指定してください".to_string(),
            });
        }

        let backoff_base = millis_or(&lookup, "ALLOCATION_BACKOFF_BASE_MS", DEFAULT_BACKOFF_BASE_MS)?;
        let backoff_max = millis_or(&lookup, "ALLOCATION_BACKOFF_MAX_MS", DEFAULT_BACKOFF_MAX_MS)?;
        if backoff_max < backoff_base {
            return Err(ConfigError::Invalid {
                name:   "ALLOCATION_BACKOFF_MAX_MS",
                value:  backoff_max.as_millis().to_string(),
                reason: "ALLOCATION_BACKOFF_BASE_MS 以上を指定してください".to_string(),
            });
        }

        let timeout = millis_or(&lookup, "ALLOCATION_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        if timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name:   "ALLOCATION_TIMEOUT_MS",
                value:  "0".to_string(),
                reason: "1 以上を指定してください".to_string(),
            });
        }

        let port = lookup("NUMBERING_PORT").ok_or(ConfigError::Missing("NUMBERING_PORT"))?;

        Ok(Self {
            host: lookup("NUMBERING_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_value("NUMBERING_PORT", port)?,
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            allocation: AllocationConfig {
                aggregate_department_code,
                utc_offset,
                max_attempts,
                backoff_base,
                backoff_max,
                timeout,
            },
        })
    }
}

fn parse_value<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => parse_value(name, value),
        None => Ok(default),
    }
}

fn millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default_ms: u64,
) -> Result<Duration, ConfigError> {
    parse_or(lookup, name, default_ms).map(Duration::from_millis)
}
