/// 発行済み文書・マスタレコードの ID 型を定義する
///
/// `Uuid` を包む Newtype に、v7 での生成（作成時刻順に並ぶ）と
/// DB から読んだ値の復元を付ける。
///
/// ```rust
/// use penomoran_domain::document::IssuedDocumentId;
///
/// let id = IssuedDocumentId::new();
/// assert_eq!(IssuedDocumentId::from_uuid(*id.as_uuid()), id);
/// ```
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// 入力文字列の正規化
///
/// - `trim`: 前後の空白を除去する
/// - `exact`: そのまま保持する（マスタの表示名との完全一致に使う）
macro_rules! _normalize_input {
    (trim, $value:expr) => {
        $value.trim().to_string()
    };
    (exact, $value:expr) => {
        $value
    };
}

/// 採番リクエストの文字列項目に共通する `new()` / `as_str()` / `into_string()`
///
/// 空白だけの値は正規化の方式にかかわらず必須エラーにする。
macro_rules! _validated_string_common {
    ($Name:ident, $label:expr, $max_length:expr, $normalize:ident) => {
        impl $Name {
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                let value: String = _normalize_input!($normalize, value.into());

                if value.trim().is_empty() {
                    return Err($crate::DomainError::Validation(format!(
                        "{} は必須です",
                        $label
                    )));
                }
                if value.chars().count() > $max_length {
                    return Err($crate::DomainError::Validation(format!(
                        "{} は {} 文字以内である必要があります",
                        $label, $max_length
                    )));
                }

                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }
    };
}

/// 採番リクエストの文字列項目を表す Newtype を定義する
///
/// `label` はエラーメッセージに出す JSON のフィールド名。
/// 既定では前後の空白を除去してから検証する。
///
/// - `exact: true`: 入力をそのまま保持する。所在地名・部署名・文書種別名は
///   マスタの `nama` と完全一致で照合するため、空白も値の一部として扱う
/// - `pii: true`: `Debug` を `[REDACTED]` にし、`Display` を持たない。
///   文書上の依頼者名に使う
///
/// ```rust
/// use penomoran_domain::{document::RequesterName, master_data::LocationName};
///
/// let name = RequesterName::new("  Budi Santoso ").unwrap();
/// assert_eq!(name.as_str(), "Budi Santoso");
/// assert!(format!("{:?}", name).contains("[REDACTED]"));
///
/// let location = LocationName::new("Balikpapan ").unwrap();
/// assert_eq!(location.as_str(), "Balikpapan ");
/// ```
macro_rules! define_validated_string {
    (@plain $(#[$meta:meta])* $vis:vis $Name:ident, $label:expr, $max_length:expr, $normalize:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        $vis struct $Name(String);

        _validated_string_common!($Name, $label, $max_length, $normalize);

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr,
            max_length: $max_length:expr,
            pii: true $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, PartialEq, Eq,
            serde::Serialize, serde::Deserialize,
        )]
        $vis struct $Name(String);

        impl std::fmt::Debug for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($Name)).field(&"[REDACTED]").finish()
            }
        }

        _validated_string_common!($Name, $label, $max_length, trim);
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr,
            max_length: $max_length:expr,
            exact: true $(,)?
        }
    ) => {
        define_validated_string!(@plain $(#[$meta])* $vis $Name, $label, $max_length, exact);
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr,
            max_length: $max_length:expr $(,)?
        }
    ) => {
        define_validated_string!(@plain $(#[$meta])* $vis $Name, $label, $max_length, trim);
    };
}
