use std::io::{self, Write};
use std::str::FromStr;

use chrono::Local;

use crate::adapters::json_store;
use crate::application::catalog::Catalog;
use crate::domain::{BookId, LoanPeriod, UserId};

/// 既定のデータファイル名（起動時の読み込みと保存・読み込みメニューの既定値）
pub const DEFAULT_DATA_FILE: &str = "library_data.json";

/// メインメニューのループ
///
/// 1回に1つのカタログ操作を実行して結果を表示する。カタログのエラーは
/// メッセージを表示してメニューに戻るだけで、プロセスを停止させない。
/// 終了コードは常に0。
pub fn run(catalog: &mut Catalog) {
    loop {
        print_menu(catalog.name());
        let Some(choice) = prompt("\nSelect an option: ") else {
            // 標準入力が閉じられた場合は終了
            println!("Goodbye!");
            return;
        };

        match choice.as_str() {
            "1" => add_book_menu(catalog),
            "2" => remove_book_menu(catalog),
            "3" => add_user_menu(catalog),
            "4" => remove_user_menu(catalog),
            "5" => borrow_book_menu(catalog),
            "6" => return_book_menu(catalog),
            "7" => reserve_book_menu(catalog),
            "8" => reports_menu(catalog),
            "9" => save_menu(catalog),
            "10" => load_menu(catalog),
            "0" => {
                // 終了前に保存を提案する
                if let Some(answer) = prompt("\nSave data before exiting? (y/n): ")
                    && answer.eq_ignore_ascii_case("y")
                {
                    match json_store::save_to_file(catalog, DEFAULT_DATA_FILE) {
                        Ok(()) => println!("Data saved to '{DEFAULT_DATA_FILE}'"),
                        Err(err) => println!("Error: failed to save data: {err}"),
                    }
                }
                println!("Goodbye!");
                return;
            }
            _ => println!("Invalid choice, try again."),
        }
    }
}

fn print_menu(library_name: &str) {
    println!("\n{}", "=".repeat(50));
    println!("LIBRARY CATALOG MANAGER - {library_name}");
    println!("{}", "=".repeat(50));
    println!("1  - Add a book");
    println!("2  - Remove a book");
    println!("3  - Add a user");
    println!("4  - Remove a user");
    println!("5  - Borrow a book");
    println!("6  - Return a book");
    println!("7  - Reserve a book");
    println!("8  - Reports");
    println!("9  - Save data");
    println!("10 - Load data");
    println!("0  - Exit");
    println!("{}", "=".repeat(50));
}

/// プロンプトを表示して1行読む
///
/// 標準入力が閉じられた・読めない場合はNoneを返す。
/// 前後の空白は取り除く。
fn prompt(label: &str) -> Option<String> {
    print!("{label}");
    io::stdout().flush().ok()?;

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// 空でない入力を要求する。空なら指定のエラーメッセージを表示してNone。
fn prompt_non_empty(label: &str, empty_message: &str) -> Option<String> {
    let value = prompt(label)?;
    if value.is_empty() {
        println!("{empty_message}");
        return None;
    }
    Some(value)
}

/// IDとして解釈できる入力を要求する
fn prompt_id<T>(label: &str) -> Option<T>
where
    T: FromStr,
{
    let value = prompt_non_empty(label, "Error: id must not be empty")?;
    match value.parse::<T>() {
        Ok(id) => Some(id),
        Err(_) => {
            println!("Error: '{value}' is not a valid id");
            None
        }
    }
}

fn add_book_menu(catalog: &mut Catalog) {
    println!("\n--- Add a book ---");
    let Some(title) = prompt_non_empty("Book title: ", "Error: title must not be empty") else {
        return;
    };
    let Some(author) = prompt_non_empty("Book author: ", "Error: author must not be empty") else {
        return;
    };

    let book_id = catalog.add_book(&title, &author);
    println!("Book '{title}' added (ID: {book_id})");
}

fn remove_book_menu(catalog: &mut Catalog) {
    println!("\n--- Remove a book ---");
    let Some(book_id) = prompt_id::<BookId>("Book ID: ") else {
        return;
    };

    if catalog.remove_book(book_id) {
        println!("Book {book_id} removed");
    } else {
        println!("Error: book not found or currently on loan");
    }
}

fn add_user_menu(catalog: &mut Catalog) {
    println!("\n--- Add a user ---");
    let Some(name) = prompt_non_empty("User name: ", "Error: name must not be empty") else {
        return;
    };

    let user_id = catalog.add_user(&name);
    println!("User '{name}' added (ID: {user_id})");
}

fn remove_user_menu(catalog: &mut Catalog) {
    println!("\n--- Remove a user ---");
    let Some(user_id) = prompt_id::<UserId>("User ID: ") else {
        return;
    };

    if catalog.remove_user(user_id) {
        println!("User {user_id} removed");
    } else {
        println!("Error: user not found or still has borrowed books");
    }
}

fn borrow_book_menu(catalog: &mut Catalog) {
    println!("\n--- Borrow a book ---");
    let Some(user_id) = prompt_id::<UserId>("User ID: ") else {
        return;
    };
    let Some(book_id) = prompt_id::<BookId>("Book ID: ") else {
        return;
    };

    let today = Local::now().date_naive();
    match catalog.borrow_book(user_id, book_id, today, LoanPeriod::default()) {
        Ok(loan) => println!("Book borrowed, due back on {}", loan.due_date),
        Err(err) => println!("Error: {err}"),
    }
}

fn return_book_menu(catalog: &mut Catalog) {
    println!("\n--- Return a book ---");
    let Some(user_id) = prompt_id::<UserId>("User ID: ") else {
        return;
    };
    let Some(book_id) = prompt_id::<BookId>("Book ID: ") else {
        return;
    };

    let today = Local::now().date_naive();
    match catalog.return_book(user_id, book_id) {
        Ok(loan) if loan.is_overdue(today) => println!(
            "Book returned {} day(s) overdue",
            loan.days_overdue(today)
        ),
        Ok(_) => println!("Book returned on time"),
        Err(err) => println!("Error: {err}"),
    }
}

fn reserve_book_menu(catalog: &mut Catalog) {
    println!("\n--- Reserve a book ---");
    let Some(user_id) = prompt_id::<UserId>("User ID: ") else {
        return;
    };
    let Some(book_id) = prompt_id::<BookId>("Book ID: ") else {
        return;
    };

    match catalog.reserve_book(user_id, book_id) {
        Ok(()) => println!("Book reserved"),
        Err(err) => println!("Error: {err}"),
    }
}

/// レポートのサブメニュー
fn reports_menu(catalog: &Catalog) {
    println!("\n--- LIBRARY REPORTS ---");

    loop {
        println!("\n1 - All books and their status");
        println!("2 - Users and their books");
        println!("3 - Overdue books");
        println!("4 - Top readers");
        println!("0 - Back to main menu");

        let Some(choice) = prompt("\nSelect a report: ") else {
            return;
        };

        match choice.as_str() {
            "1" => print_all_books(catalog),
            "2" => print_users_and_books(catalog),
            "3" => print_overdue_books(catalog),
            "4" => print_top_readers(catalog),
            "0" => return,
            _ => println!("Invalid choice"),
        }
    }
}

fn print_all_books(catalog: &Catalog) {
    println!("\n--- All books ---");
    let report = catalog.all_books_report();
    if report.is_empty() {
        println!("The library has no books");
        return;
    }

    for row in report {
        println!("\nID: {}", row.book_id);
        println!("  Title: {}", row.title);
        println!("  Author: {}", row.author);
        println!("  Status: {}", row.status);
        if let Some(borrower) = row.borrowed_by {
            println!("  Borrowed by: {borrower}");
        }
    }
}

fn print_users_and_books(catalog: &Catalog) {
    println!("\n--- Users and their books ---");
    let report = catalog.users_and_books();
    if report.is_empty() {
        println!("The library has no users");
        return;
    }

    for row in report {
        println!("\nUser: {} (ID: {})", row.name, row.user_id);
        if row.borrowed_books.is_empty() {
            println!("  No borrowed books");
        } else {
            println!("  Borrowed books ({}):", row.borrowed_books.len());
            for book_id in &row.borrowed_books {
                match catalog.find_book(*book_id) {
                    Some(book) => println!("    - {} ({book_id})", book.title),
                    None => println!("    - {book_id}"),
                }
            }
        }
    }
}

fn print_overdue_books(catalog: &Catalog) {
    println!("\n--- Overdue books ---");
    let report = catalog.overdue_books(Local::now().date_naive());
    if report.is_empty() {
        println!("No overdue books");
        return;
    }

    for row in report {
        println!("\nBook: {} ({})", row.book_title, row.book_id);
        println!("  User: {} ({})", row.user_name, row.user_id);
        println!("  Overdue by: {} day(s)", row.days_overdue);
    }
}

/// 多読者ランキングは上位10名まで表示する
const TOP_READERS_SHOWN: usize = 10;

fn print_top_readers(catalog: &Catalog) {
    println!("\n--- Top readers ---");
    let report = catalog.top_readers();
    if report.is_empty() {
        println!("The library has no users");
        return;
    }

    for (rank, row) in report.iter().take(TOP_READERS_SHOWN).enumerate() {
        println!(
            "{}. {} - {} book(s)",
            rank + 1,
            row.name,
            row.books_count
        );
    }
}

fn save_menu(catalog: &Catalog) {
    println!("\n--- Save data ---");
    let filename = prompt_with_default(DEFAULT_DATA_FILE);

    match json_store::save_to_file(catalog, &filename) {
        Ok(()) => println!("Data saved to '{filename}'"),
        Err(err) => println!("Error: failed to save data: {err}"),
    }
}

fn load_menu(catalog: &mut Catalog) {
    println!("\n--- Load data ---");
    let filename = prompt_with_default(DEFAULT_DATA_FILE);

    // 読み込みに失敗した場合はメモリ上のカタログを変更しない
    match json_store::load_from_file(&filename) {
        Ok(loaded) => {
            *catalog = loaded;
            println!("Data loaded from '{filename}'");
        }
        Err(err) => println!("Error: failed to load data: {err}"),
    }
}

fn prompt_with_default(default: &str) -> String {
    match prompt(&format!("File name (default: {default}): ")) {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}
