use std::fmt;

use chrono::NaiveDate;

use crate::domain::{BookId, UserId};

use super::catalog::Catalog;

/// 参照先が削除されていた場合の代替表示
///
/// 削除方針が守られている限り発生しないが、発生してもクラッシュ
/// させないための防御的な代替値。
const UNKNOWN: &str = "Unknown";

/// 書籍の表示ステータス
///
/// 予約が設定されている場合は単なる「Borrowed」より予約表示を優先する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    Available,
    Borrowed,
    Reserved(UserId),
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookStatus::Available => write!(f, "Available"),
            BookStatus::Borrowed => write!(f, "Borrowed"),
            BookStatus::Reserved(user_id) => write!(f, "Reserved by {user_id}"),
        }
    }
}

/// 全書籍レポートの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookStatusRow {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub status: BookStatus,
    /// 現在の借り手（未返却の貸出から解決。貸出中でなければNone）
    pub borrowed_by: Option<UserId>,
}

/// 利用者と借りている書籍レポートの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBooksRow {
    pub user_id: UserId,
    pub name: String,
    pub borrowed_books: Vec<BookId>,
}

/// 延滞レポートの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueRow {
    pub book_id: BookId,
    pub book_title: String,
    pub user_id: UserId,
    pub user_name: String,
    pub days_overdue: i64,
}

/// 多読者ランキングの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopReaderRow {
    pub user_id: UserId,
    pub name: String,
    pub books_count: usize,
}

impl Catalog {
    /// 全書籍とそのステータスのレポート
    ///
    /// 昇順の書籍ID順。ステータスは Available / Borrowed /
    /// Reserved by <利用者ID> のいずれか。
    pub fn all_books_report(&self) -> Vec<BookStatusRow> {
        self.books()
            .values()
            .map(|book| {
                let status = if book.is_available {
                    BookStatus::Available
                } else {
                    match book.reserved_by {
                        Some(holder) => BookStatus::Reserved(holder),
                        None => BookStatus::Borrowed,
                    }
                };
                let borrowed_by = self
                    .loans()
                    .iter()
                    .find(|loan| loan.book_id == book.book_id)
                    .map(|loan| loan.user_id);

                BookStatusRow {
                    book_id: book.book_id,
                    title: book.title.clone(),
                    author: book.author.clone(),
                    status,
                    borrowed_by,
                }
            })
            .collect()
    }

    /// 利用者と借りている書籍の一覧
    ///
    /// 昇順の利用者ID順の直接の射影。
    pub fn users_and_books(&self) -> Vec<UserBooksRow> {
        self.users()
            .values()
            .map(|user| UserBooksRow {
                user_id: user.user_id,
                name: user.name.clone(),
                borrowed_books: user.borrowed_books.clone(),
            })
            .collect()
    }

    /// 延滞中の貸出のレポート
    ///
    /// 台帳の全貸出を基準日で判定し、延滞しているものだけを台帳順で
    /// 返す。参照先の書籍・利用者が存在しない場合はタイトル・名前を
    /// "Unknown"で代替する（クラッシュさせない）。
    pub fn overdue_books(&self, reference_date: NaiveDate) -> Vec<OverdueRow> {
        self.loans()
            .iter()
            .filter(|loan| loan.is_overdue(reference_date))
            .map(|loan| {
                let book_title = self
                    .find_book(loan.book_id)
                    .map(|book| book.title.clone())
                    .unwrap_or_else(|| UNKNOWN.to_string());
                let user_name = self
                    .find_user(loan.user_id)
                    .map(|user| user.name.clone())
                    .unwrap_or_else(|| UNKNOWN.to_string());

                OverdueRow {
                    book_id: loan.book_id,
                    book_title,
                    user_id: loan.user_id,
                    user_name,
                    days_overdue: loan.days_overdue(reference_date),
                }
            })
            .collect()
    }

    /// 多読者ランキング
    ///
    /// 借りている冊数の降順。`sort_by`は安定ソートなので、同数の
    /// 利用者は昇順の利用者ID順（元の反復順序）を保つ。
    pub fn top_readers(&self) -> Vec<TopReaderRow> {
        let mut rows: Vec<TopReaderRow> = self
            .users()
            .values()
            .map(|user| TopReaderRow {
                user_id: user.user_id,
                name: user.name.clone(),
                books_count: user.borrowed_count(),
            })
            .collect();

        rows.sort_by(|a, b| b.books_count.cmp(&a.books_count));
        rows
    }
}
