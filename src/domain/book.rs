use serde::{Deserialize, Serialize};

use super::{BookId, UserId};

/// 書籍エンティティ
///
/// 不変条件：`reserved_by`は`is_available == false`の間のみ設定される。
/// 書籍が貸出可能に戻るときに必ずクリアされる。
/// この不変条件の維持はカタログ集約が責任を持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub is_available: bool,
    pub reserved_by: Option<UserId>,
}

impl Book {
    /// 新規書籍（貸出可能・予約なし）
    pub fn new(book_id: BookId, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            book_id,
            title: title.into(),
            author: author.into(),
            is_available: true,
            reserved_by: None,
        }
    }

    /// 貸出状態にする
    pub fn check_out(&mut self) {
        self.is_available = false;
    }

    /// 貸出可能に戻す（予約も同時にクリア）
    pub fn check_in(&mut self) {
        self.is_available = true;
        self.reserved_by = None;
    }

    /// 予約者を設定する（貸出中の書籍に対してのみ呼ばれる）
    pub fn reserve(&mut self, user_id: UserId) {
        self.reserved_by = Some(user_id);
    }
}
