use chrono::NaiveDate;
use rusty_catalog::application::catalog::{BookStatus, Catalog, CatalogError};
use rusty_catalog::domain::LoanPeriod;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// エンドツーエンドのシナリオテスト
// ============================================================================

/// 貸出→延滞検出→返却の基本シナリオ
#[test]
fn test_borrow_overdue_return_scenario() {
    let mut catalog = Catalog::new("Test Library");

    // 書籍と利用者の登録
    let book_id = catalog.add_book("Dune", "Herbert");
    let user_id = catalog.add_user("Alice");
    assert!(catalog.find_book(book_id).unwrap().is_available);

    // 2024-01-01に14日間で貸出 → 返却期限は2024-01-15
    let loan = catalog
        .borrow_book(user_id, book_id, date(2024, 1, 1), LoanPeriod::default())
        .unwrap();
    assert_eq!(loan.due_date, date(2024, 1, 15));
    assert!(!catalog.find_book(book_id).unwrap().is_available);

    // 2024-01-20時点の延滞レポートには5日延滞として現れる
    let overdue = catalog.overdue_books(date(2024, 1, 20));
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].book_id, book_id);
    assert_eq!(overdue[0].book_title, "Dune");
    assert_eq!(overdue[0].user_name, "Alice");
    assert_eq!(overdue[0].days_overdue, 5);

    // 返却で貸出前の状態に戻る
    catalog.return_book(user_id, book_id).unwrap();
    assert!(catalog.find_book(book_id).unwrap().is_available);
    assert!(catalog.find_user(user_id).unwrap().borrowed_books.is_empty());
    assert!(catalog.loans().is_empty());
}

/// 予約の全生存期間：貸出中にのみ設定でき、返却でクリアされる
#[test]
fn test_reservation_lifecycle() {
    let mut catalog = Catalog::new("Test Library");
    let book_id = catalog.add_book("Dune", "Herbert");
    let alice = catalog.add_user("Alice");
    let bob = catalog.add_user("Bob");

    // 貸出可能な書籍は予約できない
    assert_eq!(
        catalog.reserve_book(bob, book_id).unwrap_err(),
        CatalogError::BookNotOnLoan
    );

    // Aliceが借りた後、Bobが予約できる
    catalog
        .borrow_book(alice, book_id, date(2024, 1, 1), LoanPeriod::default())
        .unwrap();
    catalog.reserve_book(bob, book_id).unwrap();

    // レポートでは予約表示がBorrowedより優先される
    let report = catalog.all_books_report();
    assert_eq!(report[0].status, BookStatus::Reserved(bob));

    // 第三者による予約は拒否、Bob自身の再予約は冪等
    let carol = catalog.add_user("Carol");
    assert_eq!(
        catalog.reserve_book(carol, book_id).unwrap_err(),
        CatalogError::AlreadyReserved
    );
    catalog.reserve_book(bob, book_id).unwrap();

    // 返却で予約もクリアされ、タイムアウトでは決してクリアされない
    catalog.return_book(alice, book_id).unwrap();
    assert_eq!(catalog.find_book(book_id).unwrap().reserved_by, None);
    assert!(catalog.find_book(book_id).unwrap().is_available);
}

/// 削除方針：貸出中の書籍・本を借りている利用者は削除できない
#[test]
fn test_removal_policies_preserve_loan_integrity() {
    let mut catalog = Catalog::new("Test Library");
    let book_id = catalog.add_book("Dune", "Herbert");
    let user_id = catalog.add_user("Alice");

    catalog
        .borrow_book(user_id, book_id, date(2024, 1, 1), LoanPeriod::default())
        .unwrap();

    assert!(!catalog.remove_book(book_id));
    assert!(!catalog.remove_user(user_id));

    // 返却後は両方とも削除できる
    catalog.return_book(user_id, book_id).unwrap();
    assert!(catalog.remove_book(book_id));
    assert!(catalog.remove_user(user_id));
    assert!(catalog.books().is_empty());
    assert!(catalog.users().is_empty());
}

/// 貸出の失敗は状態を一切変更しない
#[test]
fn test_failed_borrow_has_no_partial_effects() {
    let mut catalog = Catalog::new("Test Library");
    let book_id = catalog.add_book("Dune", "Herbert");
    let alice = catalog.add_user("Alice");
    let bob = catalog.add_user("Bob");

    catalog
        .borrow_book(alice, book_id, date(2024, 1, 1), LoanPeriod::default())
        .unwrap();
    let before = catalog.clone();

    // 貸出中の書籍への貸出は常にBookNotAvailable
    assert_eq!(
        catalog
            .borrow_book(bob, book_id, date(2024, 1, 5), LoanPeriod::default())
            .unwrap_err(),
        CatalogError::BookNotAvailable
    );
    assert_eq!(catalog, before);
    assert!(catalog.find_user(bob).unwrap().borrowed_books.is_empty());
}

/// 複数の利用者・書籍にまたがる整合性の不変条件
#[test]
fn test_cross_collection_invariants_hold_after_mixed_operations() {
    let mut catalog = Catalog::new("Test Library");
    let dune = catalog.add_book("Dune", "Herbert");
    let solaris = catalog.add_book("Solaris", "Lem");
    let neuromancer = catalog.add_book("Neuromancer", "Gibson");
    let alice = catalog.add_user("Alice");
    let bob = catalog.add_user("Bob");

    catalog
        .borrow_book(alice, dune, date(2024, 1, 1), LoanPeriod::default())
        .unwrap();
    catalog
        .borrow_book(alice, solaris, date(2024, 1, 2), LoanPeriod::default())
        .unwrap();
    catalog
        .borrow_book(bob, neuromancer, date(2024, 1, 3), LoanPeriod::default())
        .unwrap();
    catalog.return_book(alice, dune).unwrap();

    // 書籍ごと：is_available == false ⇔ 未返却の貸出が存在する
    for (book_id, book) in catalog.books() {
        let has_open_loan = catalog.loans().iter().any(|l| l.book_id == *book_id);
        assert_eq!(!book.is_available, has_open_loan);
    }

    // 利用者ごと：borrowed_booksの各要素に対応する貸出が存在する
    for user in catalog.users().values() {
        for book_id in &user.borrowed_books {
            assert!(
                catalog
                    .loans()
                    .iter()
                    .any(|l| l.matches(user.user_id, *book_id))
            );
        }
    }

    // 多読者ランキングは非増加
    let readers = catalog.top_readers();
    for pair in readers.windows(2) {
        assert!(pair[0].books_count >= pair[1].books_count);
    }
    assert_eq!(readers[0].user_id, alice);
    assert_eq!(readers[0].books_count, 1);
}

/// 延滞レポートは基準日がどの返却期限よりも前なら空
#[test]
fn test_overdue_report_empty_before_any_due_date() {
    let mut catalog = Catalog::new("Test Library");
    let dune = catalog.add_book("Dune", "Herbert");
    let solaris = catalog.add_book("Solaris", "Lem");
    let alice = catalog.add_user("Alice");

    catalog
        .borrow_book(alice, dune, date(2024, 1, 1), LoanPeriod::default())
        .unwrap();
    catalog
        .borrow_book(alice, solaris, date(2024, 1, 5), LoanPeriod::default())
        .unwrap();

    assert!(catalog.overdue_books(date(2024, 1, 14)).is_empty());

    // 期限+1日でちょうど1日延滞
    let overdue = catalog.overdue_books(date(2024, 1, 16));
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].book_id, dune);
    assert_eq!(overdue[0].days_overdue, 1);
}

/// カスタム貸出期間
#[test]
fn test_borrow_with_custom_loan_period() {
    let mut catalog = Catalog::new("Test Library");
    let book_id = catalog.add_book("Dune", "Herbert");
    let user_id = catalog.add_user("Alice");

    let week = LoanPeriod::try_from(7).unwrap();
    let loan = catalog
        .borrow_book(user_id, book_id, date(2024, 6, 1), week)
        .unwrap();
    assert_eq!(loan.due_date, date(2024, 6, 8));
}
