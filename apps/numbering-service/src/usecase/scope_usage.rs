//! 採番スコープの利用状況
//!
//! カウンターの最終値と、同じスコープに実際に保存されている文書の件数を並べて返す。
//! 通常は一致し、件数が最終値より少なければ欠番（burned number）がある。

use std::sync::Arc;

use chrono::FixedOffset;
use penomoran_domain::{
    master_data::{DepartmentName, DocumentTypeName, LocationName},
    scope::{CountingScope, Period, ScopeRule},
};
use penomoran_infra::repository::{IssuedDocumentRepository, ScopeCounterRepository};

use super::master_data::MasterDataResolver;
use crate::error::ServiceError;

/// 利用状況の問い合わせ条件
#[derive(Debug, Clone)]
pub struct ScopeUsageQuery {
    pub department_name:    String,
    pub document_type_name: String,
    pub location_name:      String,
    pub year:               i32,
    pub month:              u32,
}

/// スコープの利用状況
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeUsage {
    pub scope:        CountingScope,
    /// スコープに保存されている文書の件数
    pub issued_count: i64,
    /// カウンターの最終値（未採番なら 0）
    pub last_number:  i64,
}

impl ScopeUsage {
    /// 欠番の数
    pub fn burned(&self) -> i64 {
        (self.last_number - self.issued_count).max(0)
    }
}

/// スコープ利用状況ユースケース
pub struct ScopeUsageUseCase {
    resolver:   MasterDataResolver,
    counters:   Arc<dyn ScopeCounterRepository>,
    documents:  Arc<dyn IssuedDocumentRepository>,
    scope_rule: ScopeRule,
    utc_offset: FixedOffset,
}

impl ScopeUsageUseCase {
    pub fn new(
        resolver: MasterDataResolver,
        counters: Arc<dyn ScopeCounterRepository>,
        documents: Arc<dyn IssuedDocumentRepository>,
        scope_rule: ScopeRule,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            resolver,
            counters,
            documents,
            scope_rule,
            utc_offset,
        }
    }

    /// 指定した年月・部署（・種別・所在地）のスコープの利用状況を返す
    ///
    /// 3 種類の名称はすべてマスタに登録されている必要がある。
    /// スコープの決定には採番と同じ [`ScopeRule`] を使う。
    #[tracing::instrument(skip_all, level = "debug")]
    pub async fn usage(&self, query: ScopeUsageQuery) -> Result<ScopeUsage, ServiceError> {
        let department = DepartmentName::new(query.department_name)?;
        let document_type = DocumentTypeName::new(query.document_type_name)?;
        let location = LocationName::new(query.location_name)?;
        let period = Period::new(query.year, query.month)?;

        let codes = self
            .resolver
            .resolve(&location, &department, &document_type)
            .await?;

        let scope = self
            .scope_rule
            .compute(&codes.department, department, document_type, location, period);
        let window = period.window(self.utc_offset);

        let issued_count = self.documents.count_in_scope(&scope, &window).await?;
        let last_number = self
            .counters
            .current(&scope)
            .await?
            .map_or(0, |seq| seq.as_i64());

        Ok(ScopeUsage {
            scope,
            issued_count,
            last_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use penomoran_domain::{master_data::MasterDataKind, scope::ScopeKind};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::{TestContext, request};

    fn query(department: &str, document_type: &str, location: &str) -> ScopeUsageQuery {
        ScopeUsageQuery {
            department_name:    department.to_string(),
            document_type_name: document_type.to_string(),
            location_name:      location.to_string(),
            year:               2025,
            month:              1,
        }
    }

    #[tokio::test]
    async fn test_採番後は件数と最終値が一致する() {
        let ctx = TestContext::new();
        let allocator = ctx.allocator();
        for _ in 0..2 {
            allocator
                .allocate(request("Balikpapan", "Operations", "Memo"))
                .await
                .unwrap();
        }
        let sut = ctx.scope_usage();

        let usage = sut
            .usage(query("Operations", "Memo", "Balikpapan"))
            .await
            .unwrap();

        assert_eq!(usage.scope.kind(), ScopeKind::Narrow);
        assert_eq!(usage.issued_count, 2);
        assert_eq!(usage.last_number, 2);
        assert_eq!(usage.burned(), 0);
    }

    #[tokio::test]
    async fn test_集約部署は種別と所在地をまとめて数える() {
        let ctx = TestContext::new();
        let allocator = ctx.allocator();
        allocator
            .allocate(request("Balikpapan", "Business Development", "Memo"))
            .await
            .unwrap();
        allocator
            .allocate(request("Jakarta", "Business Development", "Surat Keluar"))
            .await
            .unwrap();
        let sut = ctx.scope_usage();

        let usage = sut
            .usage(query("Business Development", "Memo", "Balikpapan"))
            .await
            .unwrap();

        assert_eq!(usage.scope.kind(), ScopeKind::Aggregate);
        assert_eq!(usage.issued_count, 2);
        assert_eq!(usage.last_number, 2);
    }

    #[tokio::test]
    async fn test_カウンターが先行していれば欠番として数える() {
        let ctx = TestContext::new();
        let document = ctx
            .allocator()
            .allocate(request("Balikpapan", "Operations", "Memo"))
            .await
            .unwrap();
        ctx.counters.set_last(document.scope_key(), 3);
        let sut = ctx.scope_usage();

        let usage = sut
            .usage(query("Operations", "Memo", "Balikpapan"))
            .await
            .unwrap();

        assert_eq!(usage.issued_count, 1);
        assert_eq!(usage.last_number, 3);
        assert_eq!(usage.burned(), 2);
    }

    #[tokio::test]
    async fn test_未採番のスコープは0件() {
        let ctx = TestContext::new();
        let sut = ctx.scope_usage();

        let usage = sut
            .usage(query("Operations", "Memo", "Balikpapan"))
            .await
            .unwrap();

        assert_eq!(usage.issued_count, 0);
        assert_eq!(usage.last_number, 0);
    }

    #[rstest]
    #[case("Finance", "Memo", "Balikpapan", MasterDataKind::Departments)]
    #[case("Operations", "Nota Dinas", "Balikpapan", MasterDataKind::DocumentTypes)]
    #[case("Business Development", "Memo", "Bandung", MasterDataKind::Locations)]
    #[tokio::test]
    async fn test_未登録の名称があれば404相当のエラー(
        #[case] department: &str,
        #[case] document_type: &str,
        #[case] location: &str,
        #[case] expected_kind: MasterDataKind,
    ) {
        let ctx = TestContext::new();
        let sut = ctx.scope_usage();

        let result = sut.usage(query(department, document_type, location)).await;

        match result {
            Err(ServiceError::MasterDataNotFound { kind, .. }) => assert_eq!(kind, expected_kind),
            other => panic!("MasterDataNotFound を期待: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_月が範囲外ならバリデーションエラー() {
        let ctx = TestContext::new();
        let sut = ctx.scope_usage();
        let mut query = query("Operations", "Memo", "Balikpapan");
        query.month = 13;

        let result = sut.usage(query).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
