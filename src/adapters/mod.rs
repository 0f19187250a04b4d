pub mod json_store;

pub use json_store::{StoreError, load_from_file, save_to_file};
