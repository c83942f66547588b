//! # マスタデータ
//!
//! 所在地・部署・文書種別の 3 種類のマスタを表現する。
//! いずれも `{ id, 表示名, 短縮コード }` の同じ形をしており、
//! 発行番号には表示名ではなく短縮コードが埋め込まれる。
//!
//! マスタの登録・編集は外部の管理機能の責務であり、このクレートは読み取り専用で扱う。
//! 短縮コードが後から変更されても、発行済みの番号は書き換わらない。

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

define_uuid_id! {
    /// マスタレコードの一意識別子
    pub struct MasterRecordId;
}

/// マスタの種別
///
/// URL パス上の表記（`locations` など）と相互変換できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MasterDataKind {
    Locations,
    Departments,
    DocumentTypes,
}

impl MasterDataKind {
    /// エラーメッセージ用のラベル
    pub fn label(&self) -> &'static str {
        match self {
            Self::Locations => "所在地",
            Self::Departments => "部署",
            Self::DocumentTypes => "文書種別",
        }
    }

    /// URL パス上の表記
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for MasterDataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MasterDataKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locations" => Ok(Self::Locations),
            "departments" => Ok(Self::Departments),
            "document-types" => Ok(Self::DocumentTypes),
            other => Err(DomainError::UnknownMasterDataKind(other.to_string())),
        }
    }
}

define_validated_string! {
    /// 短縮コード（値オブジェクト）
    ///
    /// 発行番号に埋め込まれる略称（例: `BPN`, `OPS`, `L`）。
    /// `/` を含むと番号の区切りと区別できなくなるため拒否する。
    pub struct ShortCode {
        label: "短縮コード",
        max_length: 20,
    }
}

impl ShortCode {
    /// 番号の区切り文字を含まない短縮コードを作成する
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let code = Self::new(value)?;
        if code.as_str().contains('/') {
            return Err(DomainError::Validation(format!(
                "短縮コードに '/' は使用できません: {}",
                code.as_str()
            )));
        }
        Ok(code)
    }
}

define_validated_string! {
    /// 所在地名（マスタの表示名）
    pub struct LocationName {
        label: "location_name",
        max_length: 200,
        exact: true,
    }
}

define_validated_string! {
    /// 部署名（マスタの表示名）
    pub struct DepartmentName {
        label: "department_name",
        max_length: 200,
        exact: true,
    }
}

define_validated_string! {
    /// 文書種別名（マスタの表示名）
    pub struct DocumentTypeName {
        label: "document_type_name",
        max_length: 200,
        exact: true,
    }
}

/// マスタレコード
///
/// DB 上の `nama` / `singkatan` 列はそれぞれ
/// `display_name` / `short_code` として扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRecord {
    pub id:           MasterRecordId,
    pub display_name: String,
    pub short_code:   ShortCode,
}

/// 名称解決の結果（3 種類の短縮コード）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCodes {
    pub location:      ShortCode,
    pub department:    ShortCode,
    pub document_type: ShortCode,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("locations", MasterDataKind::Locations)]
    #[case("departments", MasterDataKind::Departments)]
    #[case("document-types", MasterDataKind::DocumentTypes)]
    fn test_パス表記からマスタ種別をパースできる(
        #[case] input: &str,
        #[case] expected: MasterDataKind,
    ) {
        let kind: MasterDataKind = input.parse().unwrap();
        assert_eq!(kind, expected);
        assert_eq!(kind.as_str(), input);
    }

    #[test]
    fn test_未知のマスタ種別はエラーになる() {
        let result = "document_types".parse::<MasterDataKind>();
        assert_eq!(
            result,
            Err(DomainError::UnknownMasterDataKind("document_types".to_string()))
        );
    }

    #[test]
    fn test_マスタ種別のserdeはケバブケース() {
        let json = serde_json::to_value(MasterDataKind::DocumentTypes).unwrap();
        assert_eq!(json, serde_json::json!("document-types"));
    }

    #[test]
    fn test_短縮コードは前後の空白を除去する() {
        let code = ShortCode::parse(" BPN ").unwrap();
        assert_eq!(code.as_str(), "BPN");
    }

    #[test]
    fn test_短縮コードにスラッシュは使えない() {
        assert!(ShortCode::parse("A/B").is_err());
    }

    #[test]
    fn test_空の短縮コードはエラーになる() {
        assert!(ShortCode::parse("   ").is_err());
    }

    #[test]
    fn test_マスタの表示名は空白を含めてそのまま保持する() {
        let location = LocationName::new("Balikpapan ").unwrap();
        let department = DepartmentName::new(" Operations").unwrap();

        assert_eq!(location.as_str(), "Balikpapan ");
        assert_eq!(department.as_str(), " Operations");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_空白だけの表示名はエラーになる(#[case] input: &str) {
        assert!(matches!(
            DocumentTypeName::new(input),
            Err(DomainError::Validation(msg)) if msg == "document_type_name は必須です"
        ));
    }
}
