//! 発行済み文書の参照ユースケース

use std::sync::Arc;

use penomoran_domain::document::{IssuedDocument, RequesterReference};
use penomoran_infra::repository::IssuedDocumentRepository;

use crate::error::ServiceError;

/// 件数指定がない場合の取得件数
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// 取得件数の上限
pub const MAX_LIST_LIMIT: i64 = 200;

/// 発行済み文書の参照ユースケース
pub struct DocumentUseCase {
    documents: Arc<dyn IssuedDocumentRepository>,
}

impl DocumentUseCase {
    pub fn new(documents: Arc<dyn IssuedDocumentRepository>) -> Self {
        Self { documents }
    }

    /// 依頼者の発行済み文書を新しい順に返す
    ///
    /// `limit` は 1〜[`MAX_LIST_LIMIT`] に丸める。
    pub async fn list_by_requester(
        &self,
        requester_reference: &str,
        limit: Option<i64>,
    ) -> Result<Vec<IssuedDocument>, ServiceError> {
        let requester = RequesterReference::new(requester_reference)?;
        let limit = limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);

        Ok(self.documents.list_by_requester(&requester, limit).await?)
    }
}
