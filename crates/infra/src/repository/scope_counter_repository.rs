//! # ScopeCounterRepository
//!
//! 採番スコープごとの連番カウンターを管理するリポジトリ。
//!
//! ## 設計方針
//!
//! - **単一文でのインクリメント**: `UPDATE ... SET last_number = last_number + 1
//!   RETURNING` で読み取りと更新を 1 文にまとめ、行ロックで並行採番を直列化する
//! - **呼び出し側のトランザクションで実行**: 文書の挿入と同じ [`TxContext`] で実行し、
//!   挿入に失敗したらインクリメントもロールバックされる（欠番を作らない）
//! - **初回の種まき**: カウンター行がないスコープでは、既存の発行済み文書の件数 + 1 から始める
//!
//! ## 初回採番の並行性
//!
//! カウンター行がない状態で 2 つのリクエストが同時に採番すると、
//! 両者が `INSERT ... ON CONFLICT` に到達する。後から来た方は主キーの
//! 一意インデックスで先行トランザクションの終了を待ち、`DO UPDATE` 側で
//! インクリメントされた値を受け取る。

use async_trait::async_trait;
use penomoran_domain::{
    number::SequenceNumber,
    scope::{CountingScope, MonthWindow},
};
use sqlx::PgPool;

use super::issued_document_repository::{SCOPE_PREDICATE, ScopeParams};
use crate::{db::TxContext, error::InfraError};

/// 採番カウンターリポジトリトレイト
#[async_trait]
pub trait ScopeCounterRepository: Send + Sync {
    /// スコープの次の連番を取得する
    ///
    /// カウンターをインクリメントし、新しい値を返す。
    /// ロックはトランザクションの終了まで保持される。
    ///
    /// # 引数
    ///
    /// - `tx`: 文書の挿入と共有するトランザクション
    /// - `scope`: 採番スコープ
    /// - `window`: スコープの集計期間（初回の種まきで件数を数える範囲）
    async fn next_sequence(
        &self,
        tx: &mut TxContext,
        scope: &CountingScope,
        window: &MonthWindow,
    ) -> Result<SequenceNumber, InfraError>;

    /// スコープの最後に採番された連番を取得する
    ///
    /// 一度も採番されていないスコープでは `Ok(None)`。
    async fn current(&self, scope: &CountingScope) -> Result<Option<SequenceNumber>, InfraError>;
}

/// PostgreSQL 実装の採番カウンターリポジトリ
///
/// `scope_counters` テーブルを使用する。
#[derive(Debug, Clone)]
pub struct PostgresScopeCounterRepository {
    pool: PgPool,
}

impl PostgresScopeCounterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_sequence(value: i64) -> Result<SequenceNumber, InfraError> {
    SequenceNumber::new(value).map_err(|e| InfraError::invalid_data(e.to_string()))
}

#[async_trait]
impl ScopeCounterRepository for PostgresScopeCounterRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(scope_key = %scope.key()))]
    async fn next_sequence(
        &self,
        tx: &mut TxContext,
        scope: &CountingScope,
        window: &MonthWindow,
    ) -> Result<SequenceNumber, InfraError> {
        let key = scope.key();

        let incremented: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE scope_counters
            SET last_number = last_number + 1, updated_at = now()
            WHERE scope_key = $1
            RETURNING last_number
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&mut *tx.conn()?)
        .await?;

        if let Some(value) = incremented {
            return to_sequence(value);
        }

        // カウンター行がないスコープは既存の文書件数から始める
        let sql = format!(
            r#"
            INSERT INTO scope_counters (scope_key, last_number, updated_at)
            SELECT $6, COUNT(*) + 1, now()
            FROM issued_documents
            WHERE {SCOPE_PREDICATE}
            ON CONFLICT (scope_key) DO UPDATE
            SET last_number = scope_counters.last_number + 1, updated_at = now()
            RETURNING last_number
            "#
        );

        let params = ScopeParams::new(scope, window);
        let seeded: i64 = sqlx::query_scalar(&sql)
            .bind(params.department)
            .bind(params.document_type)
            .bind(params.location)
            .bind(params.start)
            .bind(params.end)
            .bind(key.as_str())
            .fetch_one(&mut *tx.conn()?)
            .await?;

        tracing::debug!(scope_key = %key, last_number = seeded, "カウンターを作成しました");

        to_sequence(seeded)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(scope_key = %scope.key()))]
    async fn current(&self, scope: &CountingScope) -> Result<Option<SequenceNumber>, InfraError> {
        let last: Option<i64> =
            sqlx::query_scalar("SELECT last_number FROM scope_counters WHERE scope_key = $1")
                .bind(scope.key().as_str())
                .fetch_optional(&self.pool)
                .await?;

        last.map(to_sequence).transpose()
    }
}
