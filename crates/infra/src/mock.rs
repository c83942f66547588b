//! # テスト用モックリポジトリ
//!
//! ユースケーステストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! penomoran-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! 書き込み系のモックは [`TxContext::on_rollback`] に取り消し処理を登録するため、
//! コミットされずにドロップされたトランザクションの変更は残らない。

use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use penomoran_domain::{
    document::{IssuedDocument, RequesterReference},
    master_data::{MasterDataKind, MasterRecord, MasterRecordId, ShortCode},
    number::SequenceNumber,
    scope::{CountingScope, MonthWindow, ScopeKey},
};

use crate::{
    db::{TransactionManager, TxContext},
    error::InfraError,
    repository::{IssuedDocumentRepository, MasterDataRepository, ScopeCounterRepository},
};

// ===== MockTransactionManager =====

#[derive(Clone, Default)]
pub struct MockTransactionManager {
    begun: Arc<AtomicUsize>,
}

impl MockTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 開始されたトランザクションの数
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        self.begun.fetch_add(1, Ordering::SeqCst);
        Ok(TxContext::mock())
    }
}

// ===== MockMasterDataRepository =====

#[derive(Clone, Default)]
pub struct MockMasterDataRepository {
    records: Arc<Mutex<HashMap<MasterDataKind, Vec<MasterRecord>>>>,
    lookups: Arc<AtomicUsize>,
}

impl MockMasterDataRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// マスタレコードを追加する
    pub fn add(&self, kind: MasterDataKind, display_name: &str, short_code: &str) {
        let record = MasterRecord {
            id:           MasterRecordId::new(),
            display_name: display_name.to_string(),
            short_code:   ShortCode::parse(short_code).unwrap(),
        };
        self.records
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(record);
    }

    /// `find_by_name` が呼ばれた回数
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MasterDataRepository for MockMasterDataRepository {
    async fn find_by_name(
        &self,
        kind: MasterDataKind,
        name: &str,
    ) -> Result<Option<MasterRecord>, InfraError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&kind)
            .and_then(|records| records.iter().find(|r| r.display_name == name))
            .cloned())
    }

    async fn list(&self, kind: MasterDataKind) -> Result<Vec<MasterRecord>, InfraError> {
        let mut records = self
            .records
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        records.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(records)
    }
}

// ===== MockScopeCounterRepository =====

/// スコープキーごとのカウンター
///
/// Postgres の行ロックと同じく、`next_sequence` を呼んだトランザクションが
/// コミットまたはロールバックされるまで、同じスコープの次の採番は待たされる。
/// ロールバック時はインクリメント前の値に戻す。
#[derive(Clone, Default)]
pub struct MockScopeCounterRepository {
    counters:  Arc<Mutex<HashMap<String, i64>>>,
    row_locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
    conflicts: Arc<Mutex<u32>>,
    calls:     Arc<AtomicUsize>,
}

impl MockScopeCounterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の `n` 回の採番を競合エラーにする
    pub fn fail_next_with_conflict(&self, n: u32) {
        *self.conflicts.lock().unwrap() = n;
    }

    /// カウンターの値を直接設定する
    pub fn set_last(&self, scope_key: &ScopeKey, last_number: i64) {
        self.counters
            .lock()
            .unwrap()
            .insert(scope_key.as_str().to_string(), last_number);
    }

    /// スコープキーごとのカウンター値
    pub fn snapshot(&self) -> HashMap<String, i64> {
        self.counters.lock().unwrap().clone()
    }

    /// `next_sequence` が呼ばれた回数（競合で失敗した呼び出しを含む）
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn row_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.row_locks
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl ScopeCounterRepository for MockScopeCounterRepository {
    async fn next_sequence(
        &self,
        tx: &mut TxContext,
        scope: &CountingScope,
        _window: &MonthWindow,
    ) -> Result<SequenceNumber, InfraError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        {
            let mut conflicts = self.conflicts.lock().unwrap();
            if *conflicts > 0 {
                *conflicts -= 1;
                return Err(InfraError::conflict(scope.key().as_str()));
            }
        }

        let key = scope.key().as_str().to_string();
        let guard = self.row_lock(&key).lock_owned().await;
        tx.hold(guard);

        let (previous, next) = {
            let mut counters = self.counters.lock().unwrap();
            let previous = counters.get(&key).copied();
            let next = previous.unwrap_or(0) + 1;
            counters.insert(key.clone(), next);
            (previous, next)
        };

        let counters = self.counters.clone();
        tx.on_rollback(move || {
            let mut counters = counters.lock().unwrap();
            match previous {
                Some(last) => counters.insert(key, last),
                None => counters.remove(&key),
            };
        });

        SequenceNumber::new(next).map_err(|e| InfraError::invalid_data(e.to_string()))
    }

    async fn current(&self, scope: &CountingScope) -> Result<Option<SequenceNumber>, InfraError> {
        self.counters
            .lock()
            .unwrap()
            .get(scope.key().as_str())
            .map(|last| {
                SequenceNumber::new(*last).map_err(|e| InfraError::invalid_data(e.to_string()))
            })
            .transpose()
    }
}

// ===== MockIssuedDocumentRepository =====

#[derive(Clone, Default)]
pub struct MockIssuedDocumentRepository {
    documents:     Arc<Mutex<Vec<IssuedDocument>>>,
    insert_errors: Arc<Mutex<u32>>,
}

impl MockIssuedDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の `n` 回の挿入を失敗させる
    pub fn fail_next_insert(&self, n: u32) {
        *self.insert_errors.lock().unwrap() = n;
    }

    /// 保存されている文書
    pub fn documents(&self) -> Vec<IssuedDocument> {
        self.documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssuedDocumentRepository for MockIssuedDocumentRepository {
    async fn insert(
        &self,
        tx: &mut TxContext,
        document: &IssuedDocument,
    ) -> Result<(), InfraError> {
        {
            let mut errors = self.insert_errors.lock().unwrap();
            if *errors > 0 {
                *errors -= 1;
                return Err(InfraError::unexpected("挿入に失敗しました（モック）"));
            }
        }

        // 他の採番に実行を譲り、並行時の割り込みを再現する
        tokio::task::yield_now().await;

        {
            let mut documents = self.documents.lock().unwrap();
            if documents
                .iter()
                .any(|d| d.scope_key() == document.scope_key() && d.sequence() == document.sequence())
            {
                return Err(InfraError::sequence_collision(format!(
                    "{} #{}",
                    document.scope_key(),
                    document.sequence()
                )));
            }
            documents.push(document.clone());
        }

        let documents = self.documents.clone();
        let id = document.id().clone();
        tx.on_rollback(move || {
            documents.lock().unwrap().retain(|d| d.id() != &id);
        });

        Ok(())
    }

    async fn count_in_scope(
        &self,
        scope: &CountingScope,
        window: &MonthWindow,
    ) -> Result<i64, InfraError> {
        let key = scope.key();
        let count = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.scope_key() == &key && window.contains(d.created_at()))
            .count();
        Ok(count as i64)
    }

    async fn list_by_requester(
        &self,
        requester: &RequesterReference,
        limit: i64,
    ) -> Result<Vec<IssuedDocument>, InfraError> {
        let mut documents: Vec<IssuedDocument> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.requester_reference() == Some(requester))
            .cloned()
            .collect();
        documents.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then(b.sequence().cmp(&a.sequence()))
        });
        documents.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(documents)
    }
}
