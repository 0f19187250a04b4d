use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanPeriod, UserId};

/// 貸出レコード - 1人の利用者への1冊の未返却の貸出
///
/// 台帳には未返却の貸出のみを保持する（履歴ではない）。
/// 返却時にレコードごと台帳から削除される。
/// 日付は暦日（時刻なし）で扱う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub book_id: BookId,
    pub user_id: UserId,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl Loan {
    /// 純粋関数：延滞判定
    ///
    /// 基準日が返却期限より後（厳密に）なら延滞。
    pub fn is_overdue(&self, reference_date: NaiveDate) -> bool {
        reference_date > self.due_date
    }

    /// 純粋関数：延滞日数（暦日単位）
    ///
    /// 延滞していない場合は0以下になる。呼び出し側は`is_overdue`で
    /// 先に判定すること。
    pub fn days_overdue(&self, reference_date: NaiveDate) -> i64 {
        (reference_date - self.due_date).num_days()
    }

    /// 対象の(利用者, 書籍)の組に対する貸出か
    pub fn matches(&self, user_id: UserId, book_id: BookId) -> bool {
        self.user_id == user_id && self.book_id == book_id
    }
}

/// 純粋関数：貸出レコードを作成する
///
/// ビジネスルール：
/// - 返却期限は貸出日 + 貸出期間（既定14日間）
///
/// 副作用なし。新しいLoanを返す。
pub fn open_loan(
    book_id: BookId,
    user_id: UserId,
    borrow_date: NaiveDate,
    period: LoanPeriod,
) -> Loan {
    let due_date = borrow_date + Duration::days(i64::from(period.days()));

    Loan {
        book_id,
        user_id,
        borrow_date,
        due_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // TDD: open_loan() のテスト
    #[test]
    fn test_open_loan_computes_due_date_from_default_period() {
        let loan = open_loan(
            BookId::new(),
            UserId::new(),
            date(2024, 1, 1),
            LoanPeriod::default(),
        );

        // 貸出期間は14日間
        assert_eq!(loan.borrow_date, date(2024, 1, 1));
        assert_eq!(loan.due_date, date(2024, 1, 15));
    }

    #[test]
    fn test_open_loan_honors_custom_period() {
        let period = LoanPeriod::try_from(7).unwrap();
        let loan = open_loan(BookId::new(), UserId::new(), date(2024, 3, 1), period);
        assert_eq!(loan.due_date, date(2024, 3, 8));
    }

    // TDD: is_overdue() のテスト
    #[test]
    fn test_is_overdue_false_before_due_date() {
        let loan = open_loan(
            BookId::new(),
            UserId::new(),
            date(2024, 1, 1),
            LoanPeriod::default(),
        );
        assert!(!loan.is_overdue(date(2024, 1, 10)));
    }

    #[test]
    fn test_is_overdue_false_on_due_date() {
        let loan = open_loan(
            BookId::new(),
            UserId::new(),
            date(2024, 1, 1),
            LoanPeriod::default(),
        );
        // 期限当日は延滞ではない（厳密に「期限より後」のみ）
        assert!(!loan.is_overdue(date(2024, 1, 15)));
    }

    #[test]
    fn test_is_overdue_true_after_due_date() {
        let loan = open_loan(
            BookId::new(),
            UserId::new(),
            date(2024, 1, 1),
            LoanPeriod::default(),
        );
        assert!(loan.is_overdue(date(2024, 1, 16)));
    }

    // TDD: days_overdue() のテスト
    #[test]
    fn test_days_overdue_one_day_after_due_date() {
        let loan = open_loan(
            BookId::new(),
            UserId::new(),
            date(2024, 1, 1),
            LoanPeriod::default(),
        );
        assert_eq!(loan.days_overdue(date(2024, 1, 16)), 1);
    }

    #[test]
    fn test_days_overdue_five_days() {
        let loan = open_loan(
            BookId::new(),
            UserId::new(),
            date(2024, 1, 1),
            LoanPeriod::default(),
        );
        assert_eq!(loan.days_overdue(date(2024, 1, 20)), 5);
    }

    #[test]
    fn test_matches_exact_pair_only() {
        let book_id = BookId::new();
        let user_id = UserId::new();
        let loan = open_loan(book_id, user_id, date(2024, 1, 1), LoanPeriod::default());

        assert!(loan.matches(user_id, book_id));
        assert!(!loan.matches(UserId::new(), book_id));
        assert!(!loan.matches(user_id, BookId::new()));
    }
}
