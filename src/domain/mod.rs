pub mod book;
pub mod loan;
pub mod user;
pub mod value_objects;

pub use book::Book;
pub use loan::{Loan, open_loan};
pub use user::User;
pub use value_objects::*;
