pub mod file_loader;

pub use file_loader::{load_records, write_record};
