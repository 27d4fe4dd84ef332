//! zd-results: extracts per-block time series from a recorded simulation and
//! writes them out as CSV or JSON, with an optional mean-last-cycle summary
//! mode (§6).

pub mod error;
pub mod extract;
pub mod summary;
pub mod types;
pub mod writer_csv;
pub mod writer_json;

pub use error::{ResultsError, ResultsResult};
pub use extract::{extract_rows, is_vessel_block};
pub use summary::mean_last_cycle;
pub use types::{ResultRow, SummaryRow};
pub use writer_csv::{write_csv, write_summary_csv};
pub use writer_json::{JsonByVariable, group_by_variable, write_json};
