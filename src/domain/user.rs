use serde::{Deserialize, Serialize};

use super::{BookId, UserId};

/// 利用者エンティティ
///
/// `borrowed_books`は現在借りている書籍IDの順序付き列（重複なし）。
/// 各要素は貸出台帳上の未返却の貸出と、貸出中の書籍に対応していなければ
/// ならない。この整合性の維持はカタログ集約が責任を持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub borrowed_books: Vec<BookId>,
}

impl User {
    /// 新規利用者（借りている書籍なし）
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            borrowed_books: Vec::new(),
        }
    }

    /// 貸出を記録する（既に記録済みなら何もしない）
    pub fn record_borrow(&mut self, book_id: BookId) {
        if !self.borrowed_books.contains(&book_id) {
            self.borrowed_books.push(book_id);
        }
    }

    /// 返却を記録する（冪等 - 存在しなくてもエラーにしない）
    pub fn record_return(&mut self, book_id: BookId) {
        self.borrowed_books.retain(|id| *id != book_id);
    }

    /// 現在借りている冊数
    pub fn borrowed_count(&self) -> usize {
        self.borrowed_books.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_has_no_borrowed_books() {
        let user = User::new(UserId::new(), "Alice");
        assert_eq!(user.name, "Alice");
        assert!(user.borrowed_books.is_empty());
        assert_eq!(user.borrowed_count(), 0);
    }

    #[test]
    fn test_record_borrow_and_return() {
        let mut user = User::new(UserId::new(), "Alice");
        let book_id = BookId::new();

        user.record_borrow(book_id);
        assert_eq!(user.borrowed_books, vec![book_id]);

        user.record_return(book_id);
        assert!(user.borrowed_books.is_empty());
    }

    #[test]
    fn test_record_borrow_is_duplicate_free() {
        let mut user = User::new(UserId::new(), "Alice");
        let book_id = BookId::new();

        user.record_borrow(book_id);
        user.record_borrow(book_id);
        assert_eq!(user.borrowed_count(), 1);
    }

    #[test]
    fn test_record_return_is_idempotent() {
        let mut user = User::new(UserId::new(), "Alice");
        let book_id = BookId::new();

        user.record_borrow(book_id);
        user.record_return(book_id);
        // 2回目の返却記録もエラーにならない
        user.record_return(book_id);
        assert!(user.borrowed_books.is_empty());
    }

    #[test]
    fn test_record_return_keeps_other_books() {
        let mut user = User::new(UserId::new(), "Alice");
        let first = BookId::new();
        let second = BookId::new();

        user.record_borrow(first);
        user.record_borrow(second);
        user.record_return(first);
        assert_eq!(user.borrowed_books, vec![second]);
    }
}
