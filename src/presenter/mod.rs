//! Pure view-model layer: ordering, cell formatting and copy indicators.
//! Nothing here performs I/O except through the [`copy::Clipboard`] seam.

pub mod copy;
pub mod format;
pub mod sort;
pub mod table;

pub use copy::{copy_to_clipboard, Clipboard, ClipboardError, CopyTracker, MemoryClipboard};
pub use sort::{sort_masters, SortDirection, SortKey, SortState};
pub use table::{master_rows, recent_activity, trade_rows, ActivityEntry, MasterRow, MasterStats, TradeRow};
