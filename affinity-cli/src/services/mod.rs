// Business logic services layer
//
// Pure deal-review logic shared by the interactive queue and the batch
// commands. Nothing here knows about the terminal; remote access goes
// through `CrmGateway`.

pub mod deal;
pub mod enrich;
pub mod extract;
pub mod filter;
pub mod format;
pub mod summary;
pub mod tracking;

pub use deal::Deal;
pub use enrich::{Enricher, EntryLoader};
pub use filter::DealFilter;
pub use summary::{ReviewCounts, StatusSummary, summarize};
pub use tracking::{ActionOutcome, FieldUpdater};
