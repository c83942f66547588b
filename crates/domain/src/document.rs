//! # 発行済み文書
//!
//! 採番リクエストの入力値と、採番結果として永続化される文書レコードを定義する。
//!
//! ## 設計判断
//!
//! - 入力値は [`IssuanceRequest::new`] でまとめて検証し、
//!   ストアへアクセスする前に不正な入力を弾く
//! - 依頼者の参照（ユーザー ID など）は任意。空白のみの場合は匿名として扱う
//! - 文書レコードには番号の生成に使った名称（表示名）をそのまま保存する。
//!   短縮コードは番号文字列の中にだけ残る

use chrono::{DateTime, Utc};

use crate::{
    DomainError,
    master_data::{DepartmentName, DocumentTypeName, LocationName},
    number::{IssuedNumber, SequenceNumber},
    scope::ScopeKey,
};

// ============================================================================
// IssuedDocumentId
// ============================================================================

define_uuid_id! {
    /// 発行済み文書の一意識別子
    pub struct IssuedDocumentId;
}

// ============================================================================
// 入力値
// ============================================================================

define_validated_string! {
    /// 依頼者の参照（外部の認証基盤が発行したユーザー ID など）
    pub struct RequesterReference {
        label: "requester_reference",
        max_length: 255,
    }
}

define_validated_string! {
    /// 文書上の依頼者名
    pub struct RequesterName {
        label: "display_name",
        max_length: 200,
        pii: true,
    }
}

define_validated_string! {
    /// 文書の説明
    pub struct Description {
        label: "description",
        max_length: 2000,
    }
}

/// 採番リクエストの生の入力値
#[derive(Debug, Clone, Default)]
pub struct NewIssuanceRequest {
    pub requester_reference: Option<String>,
    pub display_name:        String,
    pub location_name:       String,
    pub department_name:     String,
    pub document_type_name:  String,
    pub description:         String,
}

/// 検証済みの採番リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceRequest {
    requester_reference: Option<RequesterReference>,
    display_name:        RequesterName,
    location_name:       LocationName,
    department_name:     DepartmentName,
    document_type_name:  DocumentTypeName,
    description:         Description,
}

impl IssuanceRequest {
    /// 入力値を検証して採番リクエストを作成する
    ///
    /// 必須項目が空、または最大長を超える場合は `DomainError::Validation` を返す。
    pub fn new(input: NewIssuanceRequest) -> Result<Self, DomainError> {
        let requester_reference = match input.requester_reference {
            Some(value) if !value.trim().is_empty() => Some(RequesterReference::new(value)?),
            _ => None,
        };

        Ok(Self {
            requester_reference,
            display_name: RequesterName::new(input.display_name)?,
            location_name: LocationName::new(input.location_name)?,
            department_name: DepartmentName::new(input.department_name)?,
            document_type_name: DocumentTypeName::new(input.document_type_name)?,
            description: Description::new(input.description)?,
        })
    }

    pub fn requester_reference(&self) -> Option<&RequesterReference> {
        self.requester_reference.as_ref()
    }

    pub fn display_name(&self) -> &RequesterName {
        &self.display_name
    }

    pub fn location_name(&self) -> &LocationName {
        &self.location_name
    }

    pub fn department_name(&self) -> &DepartmentName {
        &self.department_name
    }

    pub fn document_type_name(&self) -> &DocumentTypeName {
        &self.document_type_name
    }

    pub fn description(&self) -> &Description {
        &self.description
    }
}

// ============================================================================
// IssuedDocument
// ============================================================================

/// 文書レコードの作成パラメータ
#[derive(Debug, Clone)]
pub struct NewIssuedDocument {
    pub id: IssuedDocumentId,
    pub requester_reference: Option<RequesterReference>,
    pub display_name: RequesterName,
    pub issued_number: IssuedNumber,
    pub scope_key: ScopeKey,
    pub sequence: SequenceNumber,
    pub document_type_name: DocumentTypeName,
    pub description: Description,
    pub location_name: LocationName,
    pub department_name: DepartmentName,
    pub created_at: DateTime<Utc>,
}

/// 発行済み文書エンティティ
///
/// 一度作成されたら変更されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedDocument {
    id: IssuedDocumentId,
    requester_reference: Option<RequesterReference>,
    display_name: RequesterName,
    issued_number: IssuedNumber,
    scope_key: ScopeKey,
    sequence: SequenceNumber,
    document_type_name: DocumentTypeName,
    description: Description,
    location_name: LocationName,
    department_name: DepartmentName,
    created_at: DateTime<Utc>,
}

impl IssuedDocument {
    pub fn new(params: NewIssuedDocument) -> Self {
        Self {
            id: params.id,
            requester_reference: params.requester_reference,
            display_name: params.display_name,
            issued_number: params.issued_number,
            scope_key: params.scope_key,
            sequence: params.sequence,
            document_type_name: params.document_type_name,
            description: params.description,
            location_name: params.location_name,
            department_name: params.department_name,
            created_at: params.created_at,
        }
    }

    // --- Getters ---

    pub fn id(&self) -> &IssuedDocumentId {
        &self.id
    }

    pub fn requester_reference(&self) -> Option<&RequesterReference> {
        self.requester_reference.as_ref()
    }

    pub fn display_name(&self) -> &RequesterName {
        &self.display_name
    }

    pub fn issued_number(&self) -> &IssuedNumber {
        &self.issued_number
    }

    pub fn scope_key(&self) -> &ScopeKey {
        &self.scope_key
    }

    pub fn sequence(&self) -> SequenceNumber {
        self.sequence
    }

    pub fn document_type_name(&self) -> &DocumentTypeName {
        &self.document_type_name
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn location_name(&self) -> &LocationName {
        &self.location_name
    }

    pub fn department_name(&self) -> &DepartmentName {
        &self.department_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
