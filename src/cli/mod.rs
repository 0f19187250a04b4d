pub mod menu;

pub use menu::{DEFAULT_DATA_FILE, run};
