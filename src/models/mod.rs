pub mod file_record;
pub mod loaders;
pub mod session;

pub use file_record::{FileKind, FileRecord};
pub use loaders::{load_records, write_record};
pub use session::{InjectionMarkup, Session};
