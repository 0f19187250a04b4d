use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::catalog::{Catalog, DEFAULT_LIBRARY_NAME, IntegrityError};
use crate::domain::{Book, BookId, Loan, User, UserId};

/// 永続化のエラー
///
/// 読み込みの失敗は呼び出し元のメモリ上の状態に影響しない：
/// `load_from_file`は新しいカタログ値を返すだけで、呼び出し元は
/// `Ok`のときにのみ既存のカタログを置き換える。
#[derive(Debug, Error)]
pub enum StoreError {
    /// ファイルI/Oの失敗（存在しない・読めない・書けない）
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSONの構文エラー、またはコレクション間の整合性違反
    #[error("Malformed catalog data: {0}")]
    MalformedData(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::MalformedData(err.to_string())
    }
}

impl From<IntegrityError> for StoreError {
    fn from(err: IntegrityError) -> Self {
        StoreError::MalformedData(err.to_string())
    }
}

/// 永続化のResult型
pub type Result<T> = std::result::Result<T, StoreError>;

/// 保存用のファイルスキーマ（借用側）
///
/// 日付はISO-8601の暦日（YYYY-MM-DD）で直列化される。
/// 貸出は書籍・利用者をIDのみで参照する（オブジェクトグラフの
/// 埋め込みはしない）。
#[derive(Serialize)]
struct CatalogFileRef<'a> {
    name: &'a str,
    books: &'a BTreeMap<BookId, Book>,
    users: &'a BTreeMap<UserId, User>,
    loans: &'a [Loan],
}

/// 読み込み用のファイルスキーマ
///
/// 省略されたキーは空のコレクション、名前は既定値で補う。
#[derive(Deserialize)]
#[serde(default)]
struct CatalogFile {
    name: String,
    books: BTreeMap<BookId, Book>,
    users: BTreeMap<UserId, User>,
    loans: Vec<Loan>,
}

impl Default for CatalogFile {
    fn default() -> Self {
        Self {
            name: DEFAULT_LIBRARY_NAME.to_string(),
            books: BTreeMap::new(),
            users: BTreeMap::new(),
            loans: Vec::new(),
        }
    }
}

/// カタログをJSONファイルに保存する
///
/// 同じディレクトリの一時ファイルに書き込んでからリネームする
/// （ファイル全体のアトミックな置き換え）。書き込み途中のクラッシュで
/// 既存のファイルが壊れることはない。
pub fn save_to_file(catalog: &Catalog, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = CatalogFileRef {
        name: catalog.name(),
        books: catalog.books(),
        users: catalog.users(),
        loans: catalog.loans(),
    };
    let json = serde_json::to_string_pretty(&file)?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "catalog saved");
    Ok(())
}

/// JSONファイルからカタログを読み込む
///
/// # エラー
/// - `Io`: ファイルが存在しない・読めない
/// - `MalformedData`: JSONの構文エラー、またはコレクション間の
///   整合性違反（未知のIDを参照する貸出など）
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let file: CatalogFile = serde_json::from_str(&json)?;

    let catalog = Catalog::from_parts(file.name, file.books, file.users, file.loans)?;

    tracing::info!(
        path = %path.display(),
        books = catalog.books().len(),
        users = catalog.users().len(),
        loans = catalog.loans().len(),
        "catalog loaded"
    );
    Ok(catalog)
}
