use thiserror::Error;

use crate::domain::{BookId, UserId};

/// カタログ操作のエラー
///
/// NotFound系（書籍・利用者が存在しない）とConflict系（状態の前提条件
/// 違反）に大別される。呼び出し側はエラーを表示してメニューに戻るだけで
/// よく、どのエラーもプロセスを停止させない。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// 書籍が存在しない
    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    /// 利用者が存在しない
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// 書籍が貸出中のため貸出不可
    #[error("Book is not available for loan")]
    BookNotAvailable,

    /// 対象の(利用者, 書籍)の組に未返却の貸出がない
    #[error("No open loan for this user and book")]
    LoanNotFound,

    /// 貸出可能な書籍は予約できない（予約は貸出中の書籍のみ）
    #[error("Book is available, reservation is only for borrowed books")]
    BookNotOnLoan,

    /// 既に別の利用者が予約している
    #[error("Book is already reserved by another user")]
    AlreadyReserved,
}

/// カタログ操作の Result型
pub type Result<T> = std::result::Result<T, CatalogError>;
