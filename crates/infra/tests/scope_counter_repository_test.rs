//! ScopeCounterRepository 統合テスト
//!
//! データベースを使用したテスト。sqlx::test マクロがテストごとに
//! 使い捨てのデータベースを作成し、マイグレーションを適用する。
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://... cargo test -p penomoran-infra --test scope_counter_repository_test
//! ```

mod common;

use std::collections::BTreeSet;

use common::{aggregate_scope, create_test_document, narrow_scope, window};
use penomoran_domain::number::SequenceNumber;
use penomoran_infra::{
    InfraErrorKind,
    db::{PgTransactionManager, TransactionManager},
    repository::{
        IssuedDocumentRepository,
        PostgresIssuedDocumentRepository,
        PostgresScopeCounterRepository,
        ScopeCounterRepository,
    },
};
use pretty_assertions::assert_eq;
use sqlx::PgPool;

/// 採番して文書を挿入し、コミットする
async fn allocate_and_commit(pool: &PgPool, scope: &penomoran_domain::scope::CountingScope) -> i64 {
    let tx_manager = PgTransactionManager::new(pool.clone());
    let counters = PostgresScopeCounterRepository::new(pool.clone());
    let documents = PostgresIssuedDocumentRepository::new(pool.clone());

    let mut tx = tx_manager.begin().await.unwrap();
    let seq = counters
        .next_sequence(&mut tx, scope, &window(scope))
        .await
        .unwrap();
    let document = create_test_document(scope, seq.as_i64(), "Memo", "Jakarta", None);
    documents.insert(&mut tx, &document).await.unwrap();
    tx.commit().await.unwrap();

    seq.as_i64()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_初回採番で1を返す(pool: PgPool) {
    let scope = narrow_scope("Memo");

    let seq = allocate_and_commit(&pool, &scope).await;

    assert_eq!(seq, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_連続採番で連番を返す(pool: PgPool) {
    let scope = narrow_scope("Memo");

    let mut sequences = Vec::new();
    for _ in 0..3 {
        sequences.push(allocate_and_commit(&pool, &scope).await);
    }

    assert_eq!(sequences, vec![1, 2, 3]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_スコープごとに独立した連番を返す(pool: PgPool) {
    let memo = narrow_scope("Memo");
    let letter = narrow_scope("Surat Keluar");

    assert_eq!(allocate_and_commit(&pool, &memo).await, 1);
    assert_eq!(allocate_and_commit(&pool, &memo).await, 2);
    assert_eq!(allocate_and_commit(&pool, &letter).await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_集約スコープは種別と所在地をまたいで連番を共有する(pool: PgPool) {
    let memo_jakarta = aggregate_scope("Memo", "Jakarta");
    let letter_balikpapan = aggregate_scope("Surat Keluar", "Balikpapan");

    assert_eq!(allocate_and_commit(&pool, &memo_jakarta).await, 1);
    assert_eq!(allocate_and_commit(&pool, &letter_balikpapan).await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_カウンター行がなければ既存文書の件数から始める(pool: PgPool) {
    let scope = narrow_scope("Memo");
    let tx_manager = PgTransactionManager::new(pool.clone());
    let documents = PostgresIssuedDocumentRepository::new(pool.clone());

    // カウンターを経由せずに 3 件登録しておく
    let mut tx = tx_manager.begin().await.unwrap();
    for seq in 1..=3 {
        let document = create_test_document(&scope, seq, "Memo", "Jakarta", None);
        documents.insert(&mut tx, &document).await.unwrap();
    }
    tx.commit().await.unwrap();

    let seq = allocate_and_commit(&pool, &scope).await;

    assert_eq!(seq, 4);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_コミットしなければインクリメントはロールバックされる(pool: PgPool) {
    let scope = narrow_scope("Memo");
    let tx_manager = PgTransactionManager::new(pool.clone());
    let counters = PostgresScopeCounterRepository::new(pool.clone());

    allocate_and_commit(&pool, &scope).await;

    let mut tx = tx_manager.begin().await.unwrap();
    let burned = counters
        .next_sequence(&mut tx, &scope, &window(&scope))
        .await
        .unwrap();
    assert_eq!(burned, SequenceNumber::new(2).unwrap());
    drop(tx);

    // 同じ値が再び払い出される（欠番にならない）
    assert_eq!(allocate_and_commit(&pool, &scope).await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_文書の挿入に失敗するとインクリメントも取り消される(pool: PgPool) {
    let scope = narrow_scope("Memo");
    let tx_manager = PgTransactionManager::new(pool.clone());
    let counters = PostgresScopeCounterRepository::new(pool.clone());
    let documents = PostgresIssuedDocumentRepository::new(pool.clone());

    let first = create_test_document(&scope, 1, "Memo", "Jakarta", None);
    let mut tx = tx_manager.begin().await.unwrap();
    counters
        .next_sequence(&mut tx, &scope, &window(&scope))
        .await
        .unwrap();
    documents.insert(&mut tx, &first).await.unwrap();
    tx.commit().await.unwrap();

    // 同じ ID の文書を挿入して主キー違反を起こす
    let mut tx = tx_manager.begin().await.unwrap();
    counters
        .next_sequence(&mut tx, &scope, &window(&scope))
        .await
        .unwrap();
    let result = documents.insert(&mut tx, &first).await;
    assert!(result.is_err());
    drop(tx);

    assert_eq!(
        counters.current(&scope).await.unwrap(),
        Some(SequenceNumber::new(1).unwrap())
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_カウンターが文書より遅れていると再試行できないエラーになる(pool: PgPool) {
    let scope = narrow_scope("Memo");
    let tx_manager = PgTransactionManager::new(pool.clone());
    let counters = PostgresScopeCounterRepository::new(pool.clone());
    let documents = PostgresIssuedDocumentRepository::new(pool.clone());

    allocate_and_commit(&pool, &scope).await;
    allocate_and_commit(&pool, &scope).await;
    sqlx::query("UPDATE scope_counters SET last_number = 1 WHERE scope_key = $1")
        .bind(scope.key().as_str())
        .execute(&pool)
        .await
        .unwrap();

    let mut tx = tx_manager.begin().await.unwrap();
    let seq = counters
        .next_sequence(&mut tx, &scope, &window(&scope))
        .await
        .unwrap();
    assert_eq!(seq, SequenceNumber::new(2).unwrap());
    let document = create_test_document(&scope, seq.as_i64(), "Memo", "Jakarta", None);
    let err = documents.insert(&mut tx, &document).await.unwrap_err();
    drop(tx);

    assert!(!err.is_conflict(), "連番の重複は競合として扱わないこと: {err}");
    assert!(matches!(err.kind(), InfraErrorKind::InvalidData(_)));
    assert_eq!(
        counters.current(&scope).await.unwrap(),
        Some(SequenceNumber::new(1).unwrap())
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_currentは未採番のスコープでnoneを返す(pool: PgPool) {
    let counters = PostgresScopeCounterRepository::new(pool.clone());

    let current = counters.current(&narrow_scope("Memo")).await.unwrap();

    assert_eq!(current, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_並行採番でも重複も欠番も生じない(pool: PgPool) {
    let scope = narrow_scope("Memo");

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let pool = pool.clone();
            let scope = scope.clone();
            tokio::spawn(async move { allocate_and_commit(&pool, &scope).await })
        })
        .collect();

    let mut sequences = BTreeSet::new();
    for handle in handles {
        sequences.insert(handle.await.unwrap());
    }

    assert_eq!(sequences, (1..=20).collect::<BTreeSet<i64>>());
}
