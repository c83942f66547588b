//! IssuedDocumentRepository 統合テスト
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://... cargo test -p penomoran-infra --test issued_document_repository_test
//! ```

mod common;

use common::{aggregate_scope, create_test_document, narrow_scope, window};
use penomoran_domain::document::RequesterReference;
use penomoran_infra::{
    InfraErrorKind,
    db::{PgTransactionManager, TransactionManager},
    repository::{IssuedDocumentRepository, PostgresIssuedDocumentRepository},
};
use pretty_assertions::assert_eq;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_挿入した文書を依頼者ごとに取得できる(pool: PgPool) {
    let repo = PostgresIssuedDocumentRepository::new(pool.clone());
    let tx_manager = PgTransactionManager::new(pool.clone());
    let scope = narrow_scope("Memo");

    let mine = create_test_document(&scope, 1, "Memo", "Jakarta", Some("user-1"));
    let others = create_test_document(&scope, 2, "Memo", "Jakarta", Some("user-2"));
    let anonymous = create_test_document(&scope, 3, "Memo", "Jakarta", None);

    let mut tx = tx_manager.begin().await.unwrap();
    for document in [&mine, &others, &anonymous] {
        repo.insert(&mut tx, document).await.unwrap();
    }
    tx.commit().await.unwrap();

    let result = repo
        .list_by_requester(&RequesterReference::new("user-1").unwrap(), 50)
        .await
        .unwrap();

    assert_eq!(result, vec![mine]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_依頼者の文書は新しい順に上限件数まで返す(pool: PgPool) {
    let repo = PostgresIssuedDocumentRepository::new(pool.clone());
    let tx_manager = PgTransactionManager::new(pool.clone());
    let scope = narrow_scope("Memo");

    let mut tx = tx_manager.begin().await.unwrap();
    for seq in 1..=3 {
        let document = create_test_document(&scope, seq, "Memo", "Jakarta", Some("user-1"));
        repo.insert(&mut tx, &document).await.unwrap();
    }
    tx.commit().await.unwrap();

    let result = repo
        .list_by_requester(&RequesterReference::new("user-1").unwrap(), 2)
        .await
        .unwrap();

    let sequences: Vec<i64> = result.iter().map(|d| d.sequence().as_i64()).collect();
    assert_eq!(sequences, vec![3, 2]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_スコープ内の件数を数える(pool: PgPool) {
    let repo = PostgresIssuedDocumentRepository::new(pool.clone());
    let tx_manager = PgTransactionManager::new(pool.clone());
    let memo = narrow_scope("Memo");
    let letter = narrow_scope("Surat Keluar");

    let mut tx = tx_manager.begin().await.unwrap();
    repo.insert(&mut tx, &create_test_document(&memo, 1, "Memo", "Jakarta", None))
        .await
        .unwrap();
    repo.insert(&mut tx, &create_test_document(&memo, 2, "Memo", "Jakarta", None))
        .await
        .unwrap();
    repo.insert(&mut tx, &create_test_document(&letter, 1, "Surat Keluar", "Jakarta", None))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(repo.count_in_scope(&memo, &window(&memo)).await.unwrap(), 2);
    assert_eq!(repo.count_in_scope(&letter, &window(&letter)).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_集約スコープの件数は種別と所在地を問わない(pool: PgPool) {
    let repo = PostgresIssuedDocumentRepository::new(pool.clone());
    let tx_manager = PgTransactionManager::new(pool.clone());
    let scope = aggregate_scope("Memo", "Jakarta");

    let mut tx = tx_manager.begin().await.unwrap();
    repo.insert(&mut tx, &create_test_document(&scope, 1, "Memo", "Jakarta", None))
        .await
        .unwrap();
    repo.insert(
        &mut tx,
        &create_test_document(&scope, 2, "Surat Keluar", "Balikpapan", None),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(repo.count_in_scope(&scope, &window(&scope)).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_同じスコープで同じ連番を挿入すると不整合エラーになる(pool: PgPool) {
    let repo = PostgresIssuedDocumentRepository::new(pool.clone());
    let tx_manager = PgTransactionManager::new(pool.clone());
    let scope = narrow_scope("Memo");

    let mut tx = tx_manager.begin().await.unwrap();
    repo.insert(&mut tx, &create_test_document(&scope, 1, "Memo", "Jakarta", None))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = tx_manager.begin().await.unwrap();
    let result = repo
        .insert(&mut tx, &create_test_document(&scope, 1, "Memo", "Jakarta", None))
        .await;

    let err = result.unwrap_err();
    assert!(!err.is_conflict(), "連番の重複は再試行の対象にしないこと: {err}");
    assert!(matches!(err.kind(), InfraErrorKind::InvalidData(_)));
}
