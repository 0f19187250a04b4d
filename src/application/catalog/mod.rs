mod catalog;
mod errors;
mod reports;

pub use catalog::{Catalog, DEFAULT_LIBRARY_NAME, IntegrityError};
pub use errors::{CatalogError, Result};
pub use reports::{BookStatus, BookStatusRow, OverdueRow, TopReaderRow, UserBooksRow};
