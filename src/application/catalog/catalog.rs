use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Book, BookId, Loan, LoanPeriod, User, UserId, open_loan};

use super::errors::{CatalogError, Result};

/// 既定のライブラリ名（永続化ファイルに`name`キーがない場合にも使われる）
pub const DEFAULT_LIBRARY_NAME: &str = "My Library";

/// 読み込んだデータの整合性エラー
///
/// 永続化ファイルから復元したコレクション間の相互整合性が破れている
/// 場合に返される。メモリ上で構築されたカタログでは発生しない。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// 貸出が存在しない書籍を参照している
    #[error("Loan references unknown book: {0}")]
    UnknownLoanBook(BookId),

    /// 貸出が存在しない利用者を参照している
    #[error("Loan references unknown user: {0}")]
    UnknownLoanUser(UserId),

    /// 貸出中の書籍が貸出可能と記録されている
    #[error("Book {0} has an open loan but is marked available")]
    LoanedBookAvailable(BookId),

    /// 1冊の書籍に複数の未返却の貸出がある
    #[error("Book {0} has more than one open loan")]
    DuplicateLoan(BookId),

    /// 利用者の借用リストに対応する貸出がない
    #[error("User {user_id} lists book {book_id} without a matching open loan")]
    BorrowedWithoutLoan { user_id: UserId, book_id: BookId },

    /// 貸出が利用者の借用リストに記録されていない
    #[error("Loan for book {book_id} is missing from user {user_id}'s borrowed list")]
    LoanNotRecorded { book_id: BookId, user_id: UserId },

    /// 貸出可能な書籍に予約が設定されている
    #[error("Book {0} is reserved while available")]
    ReservedWhileAvailable(BookId),

    /// 貸出中と記録された書籍に対応する貸出がない
    #[error("Book {0} is marked unavailable but has no open loan")]
    UnavailableWithoutLoan(BookId),

    /// 書籍マップのキーとレコード内のIDが一致しない
    #[error("Book map key does not match record id: {0}")]
    BookKeyMismatch(BookId),

    /// 利用者マップのキーとレコード内のIDが一致しない
    #[error("User map key does not match record id: {0}")]
    UserKeyMismatch(UserId),
}

/// カタログ集約 - 書籍・利用者・貸出台帳を排他的に所有する
///
/// 3つのコレクションの相互整合性に責任を持つ：
/// - 書籍の`is_available == false` ⇔ その書籍の未返却の貸出が存在する
/// - 利用者の`borrowed_books`の各要素 ⇔ 対応する未返却の貸出が存在する
/// - `reserved_by`は貸出中の書籍にのみ設定される
///
/// 変更系の操作はすべて、前提条件の検証を終えてから初めて状態を変更する。
/// 失敗した操作は状態を一切変更しない（部分更新が観測されることはない）。
///
/// 反復順序は昇順のID順で決定的（報告系の出力順もこれに従う）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    name: String,
    books: BTreeMap<BookId, Book>,
    users: BTreeMap<UserId, User>,
    loans: Vec<Loan>,
}

impl Catalog {
    /// 空のカタログを作成する
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            books: BTreeMap::new(),
            users: BTreeMap::new(),
            loans: Vec::new(),
        }
    }

    /// 永続化データからカタログを復元する
    ///
    /// コレクション間の整合性を検証し、破れている場合は
    /// `IntegrityError`を返す。
    pub fn from_parts(
        name: impl Into<String>,
        books: BTreeMap<BookId, Book>,
        users: BTreeMap<UserId, User>,
        loans: Vec<Loan>,
    ) -> std::result::Result<Self, IntegrityError> {
        // 1. マップのキーとレコード内のIDの一致
        for (book_id, book) in &books {
            if *book_id != book.book_id {
                return Err(IntegrityError::BookKeyMismatch(*book_id));
            }
        }
        for (user_id, user) in &users {
            if *user_id != user.user_id {
                return Err(IntegrityError::UserKeyMismatch(*user_id));
            }
        }

        // 2. 各貸出の参照整合性と書籍の状態
        for loan in &loans {
            let book = books
                .get(&loan.book_id)
                .ok_or(IntegrityError::UnknownLoanBook(loan.book_id))?;
            if book.is_available {
                return Err(IntegrityError::LoanedBookAvailable(loan.book_id));
            }

            let user = users
                .get(&loan.user_id)
                .ok_or(IntegrityError::UnknownLoanUser(loan.user_id))?;
            if !user.borrowed_books.contains(&loan.book_id) {
                return Err(IntegrityError::LoanNotRecorded {
                    book_id: loan.book_id,
                    user_id: loan.user_id,
                });
            }

            // 1冊につき未返却の貸出は高々1件
            if loans.iter().filter(|l| l.book_id == loan.book_id).count() > 1 {
                return Err(IntegrityError::DuplicateLoan(loan.book_id));
            }
        }

        // 3. 利用者の借用リストの裏付け
        for user in users.values() {
            for book_id in &user.borrowed_books {
                if !loans.iter().any(|l| l.matches(user.user_id, *book_id)) {
                    return Err(IntegrityError::BorrowedWithoutLoan {
                        user_id: user.user_id,
                        book_id: *book_id,
                    });
                }
            }
        }

        // 4. 書籍の状態の裏付け：
        //    貸出可能な書籍に予約はなく、貸出中の書籍には貸出がある
        for book in books.values() {
            if book.is_available && book.reserved_by.is_some() {
                return Err(IntegrityError::ReservedWhileAvailable(book.book_id));
            }
            if !book.is_available && !loans.iter().any(|l| l.book_id == book.book_id) {
                return Err(IntegrityError::UnavailableWithoutLoan(book.book_id));
            }
        }

        Ok(Self {
            name: name.into(),
            books,
            users,
            loans,
        })
    }

    /// ライブラリ名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 書籍マップ（昇順のID順）
    pub fn books(&self) -> &BTreeMap<BookId, Book> {
        &self.books
    }

    /// 利用者マップ（昇順のID順）
    pub fn users(&self) -> &BTreeMap<UserId, User> {
        &self.users
    }

    /// 未返却の貸出台帳
    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    /// 書籍を追加する
    ///
    /// 新しいIDを採番し、貸出可能・予約なしの状態で登録する。
    /// タイトル・著者の検証は呼び出し側（CLI）の責務。
    pub fn add_book(&mut self, title: impl Into<String>, author: impl Into<String>) -> BookId {
        let book_id = BookId::new();
        let book = Book::new(book_id, title, author);
        tracing::info!(%book_id, title = %book.title, "book added");
        self.books.insert(book_id, book);
        book_id
    }

    /// 書籍を削除する
    ///
    /// 方針：貸出中の書籍は削除を拒否してfalseを返す。
    /// 貸出台帳が削除済みの書籍を参照することは決してない。
    pub fn remove_book(&mut self, book_id: BookId) -> bool {
        match self.books.get(&book_id) {
            Some(book) if book.is_available => {
                self.books.remove(&book_id);
                tracing::info!(%book_id, "book removed");
                true
            }
            _ => false,
        }
    }

    /// 利用者を追加する
    pub fn add_user(&mut self, name: impl Into<String>) -> UserId {
        let user_id = UserId::new();
        let user = User::new(user_id, name);
        tracing::info!(%user_id, name = %user.name, "user added");
        self.users.insert(user_id, user);
        user_id
    }

    /// 利用者を削除する
    ///
    /// 借りている書籍が残っている利用者は削除を拒否してfalseを返す
    /// （未返却の貸出を孤児にしないため）。
    pub fn remove_user(&mut self, user_id: UserId) -> bool {
        match self.users.get(&user_id) {
            Some(user) if user.borrowed_books.is_empty() => {
                self.users.remove(&user_id);
                tracing::info!(%user_id, "user removed");
                true
            }
            _ => false,
        }
    }

    /// 書籍を検索する（副作用なし）
    pub fn find_book(&self, book_id: BookId) -> Option<&Book> {
        self.books.get(&book_id)
    }

    /// 利用者を検索する（副作用なし）
    pub fn find_user(&self, user_id: UserId) -> Option<&User> {
        self.users.get(&user_id)
    }

    /// 書籍を貸し出す
    ///
    /// ビジネスルール：
    /// - 利用者と書籍が存在すること
    /// - 書籍が貸出可能であること
    /// - 返却期限は貸出日 + 貸出期間
    ///
    /// 成功時は書籍・利用者・台帳の3点を更新し、作成した貸出を返す。
    ///
    /// # エラー
    /// - `UserNotFound` / `BookNotFound`: 参照先が存在しない
    /// - `BookNotAvailable`: 書籍が貸出中
    pub fn borrow_book(
        &mut self,
        user_id: UserId,
        book_id: BookId,
        borrow_date: NaiveDate,
        period: LoanPeriod,
    ) -> Result<Loan> {
        // 1. 前提条件をすべて検証する
        let user = self
            .users
            .get_mut(&user_id)
            .ok_or(CatalogError::UserNotFound(user_id))?;
        let book = self
            .books
            .get_mut(&book_id)
            .ok_or(CatalogError::BookNotFound(book_id))?;
        if !book.is_available {
            return Err(CatalogError::BookNotAvailable);
        }

        // 2. ここから先は失敗しない（部分更新は観測されない）
        book.check_out();
        user.record_borrow(book_id);
        let loan = open_loan(book_id, user_id, borrow_date, period);
        self.loans.push(loan.clone());

        tracing::info!(%book_id, %user_id, due_date = %loan.due_date, "book borrowed");
        Ok(loan)
    }

    /// 書籍を返却する
    ///
    /// 対象の(利用者, 書籍)の組に一致する貸出を台帳から削除し、
    /// 書籍を貸出可能に戻して予約をクリアし、利用者の借用リストから
    /// 書籍IDを取り除く。閉じた貸出レコードを返す（延滞していたかの
    /// 表示などに使える）。
    ///
    /// # エラー
    /// - `UserNotFound` / `BookNotFound`: 参照先が存在しない
    /// - `LoanNotFound`: 一致する未返却の貸出がない
    pub fn return_book(&mut self, user_id: UserId, book_id: BookId) -> Result<Loan> {
        // 1. 存在確認
        if !self.users.contains_key(&user_id) {
            return Err(CatalogError::UserNotFound(user_id));
        }
        if !self.books.contains_key(&book_id) {
            return Err(CatalogError::BookNotFound(book_id));
        }

        // 2. 対応する未返却の貸出を検索
        let position = self
            .loans
            .iter()
            .position(|loan| loan.matches(user_id, book_id))
            .ok_or(CatalogError::LoanNotFound)?;

        // 3. ここから先は失敗しない
        let loan = self.loans.remove(position);
        if let Some(book) = self.books.get_mut(&book_id) {
            book.check_in();
        }
        if let Some(user) = self.users.get_mut(&user_id) {
            user.record_return(book_id);
        }

        tracing::info!(%book_id, %user_id, "book returned");
        Ok(loan)
    }

    /// 書籍を予約する
    ///
    /// 予約は貸出中の書籍への単独の請求権であり、返却時にのみ
    /// 自動的にクリアされる。同一利用者による再予約は冪等。
    ///
    /// # エラー
    /// - `UserNotFound` / `BookNotFound`: 参照先が存在しない
    /// - `BookNotOnLoan`: 書籍が貸出可能（予約は不要）
    /// - `AlreadyReserved`: 別の利用者が予約済み
    pub fn reserve_book(&mut self, user_id: UserId, book_id: BookId) -> Result<()> {
        if !self.users.contains_key(&user_id) {
            return Err(CatalogError::UserNotFound(user_id));
        }
        let book = self
            .books
            .get_mut(&book_id)
            .ok_or(CatalogError::BookNotFound(book_id))?;
        if book.is_available {
            return Err(CatalogError::BookNotOnLoan);
        }

        match book.reserved_by {
            Some(holder) if holder != user_id => Err(CatalogError::AlreadyReserved),
            _ => {
                book.reserve(user_id);
                tracing::info!(%book_id, %user_id, "book reserved");
                Ok(())
            }
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY_NAME)
    }
}
