//! # インフラ層エラー定義
//!
//! データベースとの通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: `sqlx::Error` をラップし、再試行すべき競合を分類する
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Database, Conflict 等）
//!
//! ## 競合の分類
//!
//! 以下は「再試行すれば成功しうる」エラーとして [`InfraErrorKind::Conflict`] に変換する。
//!
//! | 発生源 | 判定 |
//! |--------|------|
//! | シリアライズ失敗 | SQLSTATE `40001` |
//! | デッドロック検出 | SQLSTATE `40P01` |
//!
//! 連番の一意制約違反（[`ISSUED_SEQUENCE_CONSTRAINT`]）は競合ではない。
//! カウンターのインクリメントと文書の挿入は同じトランザクションで行うため、
//! この違反はカウンターが保存済み文書より遅れているときにしか起きず、
//! 再試行しても同じ連番が払い出される。[`InfraErrorKind::InvalidData`] に変換する。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// `issued_documents (scope_key, sequence_number)` の一意制約名
pub const ISSUED_SEQUENCE_CONSTRAINT: &str = "issued_documents_scope_sequence_key";

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// データベースエラー
    ///
    /// SQL クエリの実行失敗、接続エラー、競合以外の制約違反など。
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    /// 採番の競合
    ///
    /// 同じスコープへの同時採番で発生する。
    /// 採番ユースケースが処理全体を再試行する。
    #[error("採番が競合しました: {0}")]
    Conflict(String),

    /// 保存済みデータの不整合
    ///
    /// DB 上の値がドメインの不変条件を満たさない場合（空の短縮コード等）。
    #[error("保存データが不正です: {0}")]
    InvalidData(String),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 再試行すべき競合かどうか
    pub fn is_conflict(&self) -> bool {
        matches!(self.kind, InfraErrorKind::Conflict(_))
    }

    /// InfraError を分解して InfraErrorKind と SpanTrace を取り出す
    pub fn into_parts(self) -> (InfraErrorKind, SpanTrace) {
        (self.kind, self.span_trace)
    }

    // ===== Convenience constructors =====

    /// 採番の競合エラーを生成する
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Conflict(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }

    /// 保存データの不整合エラーを生成する
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::InvalidData(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }

    /// 連番の重複エラーを生成する
    ///
    /// カウンターが保存済み文書より遅れている状態を表す。再試行の対象にしない。
    pub fn sequence_collision(detail: impl std::fmt::Display) -> Self {
        Self::invalid_data(format!(
            "連番が保存済みの文書と重複しています ({ISSUED_SEQUENCE_CONSTRAINT}): {detail}"
        ))
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Unexpected(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

/// sqlx のエラーが採番の競合に当たるかを判定する
fn conflict_reason(error: &sqlx::Error) -> Option<String> {
    let db_error = error.as_database_error()?;
    let code = db_error.code();

    match code.as_deref() {
        Some(SERIALIZATION_FAILURE) => Some("シリアライズ失敗 (40001)".to_string()),
        Some(DEADLOCK_DETECTED) => Some("デッドロック検出 (40P01)".to_string()),
        _ => None,
    }
}

/// sqlx のエラーが連番の一意制約違反かを判定する
fn is_sequence_collision(error: &sqlx::Error) -> bool {
    error.as_database_error().is_some_and(|db_error| {
        db_error.is_unique_violation() && db_error.constraint() == Some(ISSUED_SEQUENCE_CONSTRAINT)
    })
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        if let Some(reason) = conflict_reason(&source) {
            return Self::conflict(reason);
        }
        if is_sequence_collision(&source) {
            return Self::sequence_collision(source.to_string());
        }
        Self {
            kind:       InfraErrorKind::Database(source),
            span_trace: SpanTrace::capture(),
        }
    }
}
