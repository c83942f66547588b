//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するスコープ・文書生成ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use penomoran_domain::{
    document::{
        Description,
        IssuedDocument,
        IssuedDocumentId,
        NewIssuedDocument,
        RequesterName,
        RequesterReference,
    },
    master_data::{DepartmentName, DocumentTypeName, LocationName, ResolvedCodes, ShortCode},
    number::{IssuedNumber, SequenceNumber},
    scope::{CountingScope, MonthWindow, Period, ScopeRule},
};
use sqlx::PgPool;
use uuid::Uuid;

/// テスト用の固定日時（2025-01-15 09:00 UTC）
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

/// 集約部署コード BDS のスコープルール
pub fn rule() -> ScopeRule {
    ScopeRule::new(ShortCode::parse("BDS").unwrap())
}

/// 個別スコープ（Operations / Memo / Jakarta / 2025-01）
pub fn narrow_scope(document_type: &str) -> CountingScope {
    rule().compute(
        &ShortCode::parse("OPS").unwrap(),
        DepartmentName::new("Operations").unwrap(),
        DocumentTypeName::new(document_type).unwrap(),
        LocationName::new("Jakarta").unwrap(),
        Period::new(2025, 1).unwrap(),
    )
}

/// 集約スコープ（Business Development / 2025-01）
pub fn aggregate_scope(document_type: &str, location: &str) -> CountingScope {
    rule().compute(
        &ShortCode::parse("BDS").unwrap(),
        DepartmentName::new("Business Development").unwrap(),
        DocumentTypeName::new(document_type).unwrap(),
        LocationName::new(location).unwrap(),
        Period::new(2025, 1).unwrap(),
    )
}

pub fn window(scope: &CountingScope) -> MonthWindow {
    scope.period().window(utc())
}

/// スコープと連番から文書を作成する
///
/// 種別・所在地は個別スコープならスコープの値、集約スコープなら引数の値を使う。
pub fn create_test_document(
    scope: &CountingScope,
    sequence: i64,
    document_type: &str,
    location: &str,
    requester: Option<&str>,
) -> IssuedDocument {
    let sequence = SequenceNumber::new(sequence).unwrap();
    let codes = ResolvedCodes {
        location:      ShortCode::parse("JKT").unwrap(),
        department:    ShortCode::parse("OPS").unwrap(),
        document_type: ShortCode::parse("M").unwrap(),
    };

    IssuedDocument::new(NewIssuedDocument {
        id: IssuedDocumentId::new(),
        requester_reference: requester.map(|r| RequesterReference::new(r).unwrap()),
        display_name: RequesterName::new("Budi Santoso").unwrap(),
        issued_number: IssuedNumber::format(sequence, &codes, scope.period()),
        scope_key: scope.key(),
        sequence,
        document_type_name: scope
            .document_type()
            .cloned()
            .unwrap_or_else(|| DocumentTypeName::new(document_type).unwrap()),
        description: Description::new("テスト文書").unwrap(),
        location_name: scope
            .location()
            .cloned()
            .unwrap_or_else(|| LocationName::new(location).unwrap()),
        department_name: scope.department().clone(),
        created_at: test_now(),
    })
}

/// マスタレコードを直接挿入する
pub async fn insert_master(pool: &PgPool, table: &str, nama: &str, singkatan: &str) {
    let sql = format!("INSERT INTO {table} (id, nama, singkatan) VALUES ($1, $2, $3)");
    sqlx::query(&sql)
        .bind(Uuid::now_v7())
        .bind(nama)
        .bind(singkatan)
        .execute(pool)
        .await
        .unwrap();
}
