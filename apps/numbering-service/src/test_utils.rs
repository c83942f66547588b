//! テストコンテキスト
//!
//! ユースケース・ハンドラのテストで共通のモックリポジトリとマスタデータを用意する。
//!
//! 登録済みマスタ:
//!
//! | 種別 | 表示名 | 短縮コード |
//! |------|--------|-----------|
//! | 所在地 | Balikpapan / Jakarta | BPN / JKT |
//! | 部署 | Operations / Business Development | OPS / BDS |
//! | 文書種別 | Surat Keluar / Memo | L / M |
//!
//! 時刻は 2025-01-15 09:00 UTC に固定し、集約部署コードは `BDS`。

use std::{sync::Arc, time::Duration};

use axum::{Router, body::Body, http::Response};
use chrono::{FixedOffset, TimeZone, Utc};
use penomoran_domain::{
    clock::FixedClock,
    document::NewIssuanceRequest,
    master_data::{MasterDataKind, ShortCode},
    scope::ScopeRule,
};
use penomoran_infra::mock::{
    MockIssuedDocumentRepository,
    MockMasterDataRepository,
    MockScopeCounterRepository,
    MockTransactionManager,
};

use crate::{
    ApiStates,
    api_router,
    handler::{DocumentState, MasterDataState, NumberState, ScopeState},
    usecase::{
        AllocationSettings,
        DocumentUseCase,
        MasterDataResolver,
        NumberAllocator,
        RetryPolicy,
        ScopeUsageUseCase,
    },
};

/// モック一式と固定時刻
pub struct TestContext {
    pub masters:    MockMasterDataRepository,
    pub counters:   MockScopeCounterRepository,
    pub documents:  MockIssuedDocumentRepository,
    pub tx_manager: MockTransactionManager,
    pub clock:      Arc<FixedClock>,
}

impl TestContext {
    pub fn new() -> Self {
        let masters = MockMasterDataRepository::new();
        masters.add(MasterDataKind::Locations, "Balikpapan", "BPN");
        masters.add(MasterDataKind::Locations, "Jakarta", "JKT");
        masters.add(MasterDataKind::Departments, "Operations", "OPS");
        masters.add(MasterDataKind::Departments, "Business Development", "BDS");
        masters.add(MasterDataKind::DocumentTypes, "Surat Keluar", "L");
        masters.add(MasterDataKind::DocumentTypes, "Memo", "M");

        Self {
            masters,
            counters: MockScopeCounterRepository::new(),
            documents: MockIssuedDocumentRepository::new(),
            tx_manager: MockTransactionManager::new(),
            clock: Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap(),
            )),
        }
    }

    /// テスト用の採番設定（待機時間を短くしたもの）
    pub fn settings() -> AllocationSettings {
        AllocationSettings {
            scope_rule: Self::scope_rule(),
            utc_offset: FixedOffset::east_opt(0).unwrap(),
            retry:      RetryPolicy::new(5, Duration::from_millis(1), Duration::from_millis(4)),
            timeout:    Duration::from_secs(5),
        }
    }

    pub fn scope_rule() -> ScopeRule {
        ScopeRule::new(ShortCode::parse("BDS").unwrap())
    }

    pub fn resolver(&self) -> MasterDataResolver {
        MasterDataResolver::new(Arc::new(self.masters.clone()))
    }

    pub fn allocator(&self) -> NumberAllocator {
        self.allocator_with(Self::settings())
    }

    pub fn allocator_with(&self, settings: AllocationSettings) -> NumberAllocator {
        NumberAllocator::new(
            self.resolver(),
            Arc::new(self.counters.clone()),
            Arc::new(self.documents.clone()),
            Arc::new(self.tx_manager.clone()),
            self.clock.clone(),
            settings,
        )
    }

    pub fn document_usecase(&self) -> DocumentUseCase {
        DocumentUseCase::new(Arc::new(self.documents.clone()))
    }

    pub fn scope_usage(&self) -> ScopeUsageUseCase {
        ScopeUsageUseCase::new(
            self.resolver(),
            Arc::new(self.counters.clone()),
            Arc::new(self.documents.clone()),
            Self::scope_rule(),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    /// モックを共有する `/api` ルーター
    pub fn router(&self) -> Router {
        api_router(ApiStates {
            number:      Arc::new(NumberState {
                allocator: self.allocator(),
            }),
            document:    Arc::new(DocumentState {
                usecase: self.document_usecase(),
            }),
            master_data: Arc::new(MasterDataState {
                resolver: self.resolver(),
            }),
            scope:       Arc::new(ScopeState {
                usecase: self.scope_usage(),
            }),
        })
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 採番リクエストを作成する
pub fn request(location: &str, department: &str, document_type: &str) -> NewIssuanceRequest {
    NewIssuanceRequest {
        requester_reference: None,
        display_name:        "Budi Santoso".to_string(),
        location_name:       location.to_string(),
        department_name:     department.to_string(),
        document_type_name:  document_type.to_string(),
        description:         "Surat pengantar".to_string(),
    }
}

/// レスポンス本文を JSON としてデシリアライズする
pub async fn response_body<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
