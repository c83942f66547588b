//! # IssuedDocumentRepository
//!
//! 発行済み文書を永続化するリポジトリ。
//!
//! ## 設計方針
//!
//! - **追記のみ**: 文書は挿入だけを行い、更新・削除はしない
//! - **一意制約**: `(scope_key, sequence_number)` の一意制約がスコープ内の重複を最終的に防ぐ。
//!   違反は [`InfraErrorKind::Conflict`](crate::error::InfraErrorKind::Conflict) として返る
//! - **スコープ条件の共有**: 件数集計とカウンターの種まきは同じ [`SCOPE_PREDICATE`] を使う

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use penomoran_domain::{
    document::{
        Description,
        IssuedDocument,
        IssuedDocumentId,
        NewIssuedDocument,
        RequesterName,
        RequesterReference,
    },
    master_data::{DepartmentName, DocumentTypeName, LocationName},
    number::{IssuedNumber, SequenceNumber},
    scope::{CountingScope, MonthWindow, ScopeKey},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{db::TxContext, error::InfraError};

/// スコープに属する文書を絞り込む条件
///
/// パラメータ: `$1` 部署名, `$2` 文書種別名（集約スコープでは NULL）,
/// `$3` 所在地名（集約スコープでは NULL）, `$4` 期間開始, `$5` 期間終了
pub(crate) const SCOPE_PREDICATE: &str = "department_name = $1 \
     AND ($2::text IS NULL OR document_type_name = $2) \
     AND ($3::text IS NULL OR location_name = $3) \
     AND created_at >= $4 AND created_at < $5";

/// [`SCOPE_PREDICATE`] にバインドする値
pub(crate) struct ScopeParams<'a> {
    pub department:    &'a str,
    pub document_type: Option<&'a str>,
    pub location:      Option<&'a str>,
    pub start:         DateTime<Utc>,
    pub end:           DateTime<Utc>,
}

impl<'a> ScopeParams<'a> {
    pub fn new(scope: &'a CountingScope, window: &MonthWindow) -> Self {
        Self {
            department:    scope.department().as_str(),
            document_type: scope.document_type().map(|t| t.as_str()),
            location:      scope.location().map(|l| l.as_str()),
            start:         window.start,
            end:           window.end,
        }
    }
}

/// 発行済み文書リポジトリトレイト
#[async_trait]
pub trait IssuedDocumentRepository: Send + Sync {
    /// 文書を挿入する
    ///
    /// カウンターのインクリメントと同じトランザクションで呼び出す。
    async fn insert(&self, tx: &mut TxContext, document: &IssuedDocument)
    -> Result<(), InfraError>;

    /// スコープに属する発行済み文書の件数を数える
    async fn count_in_scope(
        &self,
        scope: &CountingScope,
        window: &MonthWindow,
    ) -> Result<i64, InfraError>;

    /// 依頼者の発行済み文書を新しい順に取得する
    async fn list_by_requester(
        &self,
        requester: &RequesterReference,
        limit: i64,
    ) -> Result<Vec<IssuedDocument>, InfraError>;
}

/// `issued_documents` テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct IssuedDocumentRow {
    id: Uuid,
    requester_reference: Option<String>,
    display_name: String,
    issued_number: String,
    scope_key: String,
    sequence_number: i64,
    document_type_name: String,
    description: String,
    location_name: String,
    department_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<IssuedDocumentRow> for IssuedDocument {
    type Error = InfraError;

    fn try_from(row: IssuedDocumentRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |e: penomoran_domain::DomainError| {
            InfraError::invalid_data(format!("発行済み文書 {id}: {e}"))
        };

        Ok(IssuedDocument::new(NewIssuedDocument {
            id: IssuedDocumentId::from_uuid(id),
            requester_reference: row
                .requester_reference
                .map(RequesterReference::new)
                .transpose()
                .map_err(invalid)?,
            display_name: RequesterName::new(row.display_name).map_err(invalid)?,
            issued_number: IssuedNumber::from_db(row.issued_number),
            scope_key: ScopeKey::from_db(row.scope_key),
            sequence: SequenceNumber::new(row.sequence_number).map_err(invalid)?,
            document_type_name: DocumentTypeName::new(row.document_type_name).map_err(invalid)?,
            description: Description::new(row.description).map_err(invalid)?,
            location_name: LocationName::new(row.location_name).map_err(invalid)?,
            department_name: DepartmentName::new(row.department_name).map_err(invalid)?,
            created_at: row.created_at,
        }))
    }
}

/// PostgreSQL 実装の発行済み文書リポジトリ
#[derive(Debug, Clone)]
pub struct PostgresIssuedDocumentRepository {
    pool: PgPool,
}

impl PostgresIssuedDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IssuedDocumentRepository for PostgresIssuedDocumentRepository {
    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(issued_number = %document.issued_number(), scope_key = %document.scope_key())
    )]
    async fn insert(
        &self,
        tx: &mut TxContext,
        document: &IssuedDocument,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO issued_documents (
                id, requester_reference, display_name, issued_number,
                scope_key, sequence_number, document_type_name, description,
                location_name, department_name, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(document.id().as_uuid())
        .bind(document.requester_reference().map(|r| r.as_str()))
        .bind(document.display_name().as_str())
        .bind(document.issued_number().as_str())
        .bind(document.scope_key().as_str())
        .bind(document.sequence().as_i64())
        .bind(document.document_type_name().as_str())
        .bind(document.description().as_str())
        .bind(document.location_name().as_str())
        .bind(document.department_name().as_str())
        .bind(document.created_at())
        .execute(&mut *tx.conn()?)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(scope_key = %scope.key()))]
    async fn count_in_scope(
        &self,
        scope: &CountingScope,
        window: &MonthWindow,
    ) -> Result<i64, InfraError> {
        let sql = format!("SELECT COUNT(*) FROM issued_documents WHERE {SCOPE_PREDICATE}");
        let params = ScopeParams::new(scope, window);

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(params.department)
            .bind(params.document_type)
            .bind(params.location)
            .bind(params.start)
            .bind(params.end)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn list_by_requester(
        &self,
        requester: &RequesterReference,
        limit: i64,
    ) -> Result<Vec<IssuedDocument>, InfraError> {
        let rows = sqlx::query_as::<_, IssuedDocumentRow>(
            r#"
            SELECT
                id, requester_reference, display_name, issued_number,
                scope_key, sequence_number, document_type_name, description,
                location_name, department_name, created_at
            FROM issued_documents
            WHERE requester_reference = $1
            ORDER BY created_at DESC, sequence_number DESC
            LIMIT $2
            "#,
        )
        .bind(requester.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(IssuedDocument::try_from).collect()
    }
}
