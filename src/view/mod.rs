mod clipboard;
mod csv;
mod table;

pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use csv::to_csv;
pub use table::{ResultView, SortDirection};
