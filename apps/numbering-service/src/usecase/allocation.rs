//! # 採番ユースケース
//!
//! 1 件の採番リクエストを処理し、発行番号を確定させる。
//!
//! ## 処理の流れ
//!
//! 1. 入力値の検証（ストアには触れない）
//! 2. マスタデータから短縮コードを解決
//! 3. 時刻を 1 回だけ読み、採番スコープと集計期間を決定
//! 4. 1 トランザクション内でカウンターのインクリメントと文書の挿入を行い、コミット
//! 5. 競合した場合は 4 を丸ごと再試行
//!
//! 4〜5 全体にタイムアウトをかける。タイムアウトで future がドロップされると
//! 開いていたトランザクションもドロップされ、ロールバックされる。
//!
//! 番号はコミットが成功した後にだけ返すため、呼び出し元が受け取った番号は
//! 必ず保存済みである。

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, FixedOffset, Utc};
use penomoran_domain::{
    clock::Clock,
    document::{IssuanceRequest, IssuedDocument, IssuedDocumentId, NewIssuanceRequest, NewIssuedDocument},
    master_data::ResolvedCodes,
    number::IssuedNumber,
    scope::{CountingScope, MonthWindow, Period, ScopeRule},
};
use penomoran_infra::{
    InfraError,
    db::TransactionManager,
    repository::{IssuedDocumentRepository, ScopeCounterRepository},
};

use super::{master_data::MasterDataResolver, retry::RetryPolicy};
use crate::{config::AllocationConfig, error::ServiceError};

/// 採番ユースケースの設定
#[derive(Debug, Clone)]
pub struct AllocationSettings {
    pub scope_rule: ScopeRule,
    pub utc_offset: FixedOffset,
    pub retry:      RetryPolicy,
    pub timeout:    Duration,
}

impl From<&AllocationConfig> for AllocationSettings {
    fn from(config: &AllocationConfig) -> Self {
        Self {
            scope_rule: config.scope_rule(),
            utc_offset: config.utc_offset,
            retry:      RetryPolicy::from(config),
            timeout:    config.timeout,
        }
    }
}

/// 採番ユースケース
pub struct NumberAllocator {
    resolver:   MasterDataResolver,
    counters:   Arc<dyn ScopeCounterRepository>,
    documents:  Arc<dyn IssuedDocumentRepository>,
    tx_manager: Arc<dyn TransactionManager>,
    clock:      Arc<dyn Clock>,
    settings:   AllocationSettings,
}

/// 1 リクエスト内で固定される採番の文脈
struct AllocationContext<'a> {
    request: &'a IssuanceRequest,
    codes:   &'a ResolvedCodes,
    scope:   &'a CountingScope,
    window:  &'a MonthWindow,
    now:     DateTime<Utc>,
}

impl NumberAllocator {
    pub fn new(
        resolver: MasterDataResolver,
        counters: Arc<dyn ScopeCounterRepository>,
        documents: Arc<dyn IssuedDocumentRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
        settings: AllocationSettings,
    ) -> Self {
        Self {
            resolver,
            counters,
            documents,
            tx_manager,
            clock,
            settings,
        }
    }

    /// 発行番号を採番し、文書を保存する
    ///
    /// 戻り値の文書はコミット済み。
    #[tracing::instrument(skip_all)]
    pub async fn allocate(&self, input: NewIssuanceRequest) -> Result<IssuedDocument, ServiceError> {
        let request = IssuanceRequest::new(input)?;

        let codes = self
            .resolver
            .resolve(
                request.location_name(),
                request.department_name(),
                request.document_type_name(),
            )
            .await?;

        let now = self.clock.now();
        let offset = self.settings.utc_offset;
        let period = Period::containing(now, offset);
        let scope = self.settings.scope_rule.compute(
            &codes.department,
            request.department_name().clone(),
            request.document_type_name().clone(),
            request.location_name().clone(),
            period,
        );
        let window = period.window(offset);

        let context = AllocationContext {
            request: &request,
            codes: &codes,
            scope: &scope,
            window: &window,
            now,
        };

        let document = tokio::time::timeout(self.settings.timeout, self.allocate_with_retry(&context))
            .await
            .map_err(|_| {
                tracing::warn!(
                    scope_key = %scope.key(),
                    timeout_ms = duration_ms(self.settings.timeout),
                    "採番がタイムアウトしました"
                );
                ServiceError::Timeout
            })??;

        tracing::info!(
            issued_number = %document.issued_number(),
            scope_key = %document.scope_key(),
            scope_kind = ?scope.kind(),
            "文書番号を発行しました"
        );

        Ok(document)
    }

    /// 競合が解消するまで採番と保存を繰り返す
    async fn allocate_with_retry(
        &self,
        context: &AllocationContext<'_>,
    ) -> Result<IssuedDocument, ServiceError> {
        let max_attempts = self.settings.retry.max_attempts();

        for attempt in 1..=max_attempts {
            match self.allocate_once(context).await {
                Ok(document) => return Ok(document),
                Err(e) if e.is_conflict() && attempt < max_attempts => {
                    let backoff = self.settings.retry.backoff_with_jitter(attempt - 1);
                    tracing::warn!(
                        scope_key = %context.scope.key(),
                        attempt,
                        backoff_ms = duration_ms(backoff),
                        "採番が競合したため再試行します: {}",
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) if e.is_conflict() => {
                    tracing::warn!(
                        scope_key = %context.scope.key(),
                        attempts = max_attempts,
                        "再試行回数の上限に達しました: {}",
                        e
                    );
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::AllocationConflict {
            attempts: max_attempts,
        })
    }

    /// 1 トランザクションでカウンターを進めて文書を挿入する
    ///
    /// コミット前に失敗した場合、`tx` のドロップでインクリメントも取り消される。
    async fn allocate_once(
        &self,
        context: &AllocationContext<'_>,
    ) -> Result<IssuedDocument, InfraError> {
        let mut tx = self.tx_manager.begin().await?;

        let sequence = self
            .counters
            .next_sequence(&mut tx, context.scope, context.window)
            .await?;

        let request = context.request;
        let document = IssuedDocument::new(NewIssuedDocument {
            id: IssuedDocumentId::new(),
            requester_reference: request.requester_reference().cloned(),
            display_name: request.display_name().clone(),
            issued_number: IssuedNumber::format(sequence, context.codes, context.scope.period()),
            scope_key: context.scope.key(),
            sequence,
            document_type_name: request.document_type_name().clone(),
            description: request.description().clone(),
            location_name: request.location_name().clone(),
            department_name: request.department_name().clone(),
            created_at: context.now,
        });

        self.documents.insert(&mut tx, &document).await?;
        tx.commit().await?;

        Ok(document)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
