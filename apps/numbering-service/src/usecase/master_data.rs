//! マスタデータ解決ユースケース
//!
//! 表示名から短縮コードを引く。読み取り専用で、再試行はしない。

use std::sync::Arc;

use penomoran_domain::master_data::{
    DepartmentName,
    DocumentTypeName,
    LocationName,
    MasterDataKind,
    MasterRecord,
    ResolvedCodes,
    ShortCode,
};
use penomoran_infra::repository::MasterDataRepository;

use crate::error::ServiceError;

/// マスタデータ解決ユースケース
#[derive(Clone)]
pub struct MasterDataResolver {
    repository: Arc<dyn MasterDataRepository>,
}

impl MasterDataResolver {
    pub fn new(repository: Arc<dyn MasterDataRepository>) -> Self {
        Self { repository }
    }

    /// 所在地・部署・文書種別の短縮コードを解決する
    ///
    /// 所在地 → 部署 → 文書種別の順に引き、最初に見つからなかったものを
    /// [`ServiceError::MasterDataNotFound`] として返す。
    #[tracing::instrument(skip_all, level = "debug")]
    pub async fn resolve(
        &self,
        location: &LocationName,
        department: &DepartmentName,
        document_type: &DocumentTypeName,
    ) -> Result<ResolvedCodes, ServiceError> {
        Ok(ResolvedCodes {
            location:      self
                .short_code(MasterDataKind::Locations, location.as_str())
                .await?,
            department:    self
                .short_code(MasterDataKind::Departments, department.as_str())
                .await?,
            document_type: self
                .short_code(MasterDataKind::DocumentTypes, document_type.as_str())
                .await?,
        })
    }

    /// 1 種類のマスタから短縮コードを引く
    pub async fn short_code(
        &self,
        kind: MasterDataKind,
        name: &str,
    ) -> Result<ShortCode, ServiceError> {
        self.repository
            .find_by_name(kind, name)
            .await?
            .map(|record| record.short_code)
            .ok_or_else(|| ServiceError::MasterDataNotFound {
                kind,
                name: name.to_string(),
            })
    }

    /// マスタの全レコードを表示名順で返す
    pub async fn list(&self, kind: MasterDataKind) -> Result<Vec<MasterRecord>, ServiceError> {
        Ok(self.repository.list(kind).await?)
    }
}
