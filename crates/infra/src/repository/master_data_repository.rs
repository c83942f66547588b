//! # MasterDataRepository
//!
//! 所在地・部署・文書種別のマスタテーブルを読み取るリポジトリ。
//!
//! 3 つのテーブルは同じ列構成 `(id, nama, singkatan)` を持つため、
//! [`MasterDataKind`] でテーブルを切り替えて同じクエリを使う。
//! マスタへの書き込みは行わない。

use async_trait::async_trait;
use penomoran_domain::master_data::{MasterDataKind, MasterRecord, MasterRecordId, ShortCode};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// マスタデータリポジトリトレイト
#[async_trait]
pub trait MasterDataRepository: Send + Sync {
    /// 表示名の完全一致でマスタレコードを検索する
    ///
    /// 見つからない場合は `Ok(None)`。
    async fn find_by_name(
        &self,
        kind: MasterDataKind,
        name: &str,
    ) -> Result<Option<MasterRecord>, InfraError>;

    /// マスタの全レコードを表示名順で取得する
    async fn list(&self, kind: MasterDataKind) -> Result<Vec<MasterRecord>, InfraError>;
}

/// マスタテーブルの行
#[derive(Debug, sqlx::FromRow)]
struct MasterRecordRow {
    id:        Uuid,
    nama:      String,
    singkatan: String,
}

impl TryFrom<MasterRecordRow> for MasterRecord {
    type Error = InfraError;

    fn try_from(row: MasterRecordRow) -> Result<Self, Self::Error> {
        let short_code = ShortCode::parse(row.singkatan).map_err(|e| {
            InfraError::invalid_data(format!("マスタ {} の短縮コード: {e}", row.nama))
        })?;

        Ok(Self {
            id: MasterRecordId::from_uuid(row.id),
            display_name: row.nama,
            short_code,
        })
    }
}

/// マスタ種別に対応するテーブル名
fn table_name(kind: MasterDataKind) -> &'static str {
    match kind {
        MasterDataKind::Locations => "locations",
        MasterDataKind::Departments => "departments",
        MasterDataKind::DocumentTypes => "document_types",
    }
}

/// PostgreSQL 実装のマスタデータリポジトリ
#[derive(Debug, Clone)]
pub struct PostgresMasterDataRepository {
    pool: PgPool,
}

impl PostgresMasterDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MasterDataRepository for PostgresMasterDataRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%kind, %name))]
    async fn find_by_name(
        &self,
        kind: MasterDataKind,
        name: &str,
    ) -> Result<Option<MasterRecord>, InfraError> {
        // テーブル名は MasterDataKind から決まる固定値のみ
        let sql = format!(
            "SELECT id, nama, singkatan FROM {} WHERE nama = $1",
            table_name(kind)
        );

        let row = sqlx::query_as::<_, MasterRecordRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MasterRecord::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%kind))]
    async fn list(&self, kind: MasterDataKind) -> Result<Vec<MasterRecord>, InfraError> {
        let sql = format!(
            "SELECT id, nama, singkatan FROM {} ORDER BY nama ASC",
            table_name(kind)
        );

        let rows = sqlx::query_as::<_, MasterRecordRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(MasterRecord::try_from).collect()
    }
}
