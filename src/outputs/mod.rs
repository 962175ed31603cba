//! Sinks for classified rows.
//!
//! # Submodules
//!
//! - [`images`]: Downloads row thumbnails and swaps in the stored paths
//! - [`spreadsheet`]: Writes the rows as a SpreadsheetML workbook
//! - [`json`]: Writes a JSON report of the run
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── news_data.xml          # Workbook, sheet "News Articles"
//! ├── images/
//! │   ├── img-0.jpg
//! │   └── img-1.png
//! └── 2024-01-15/
//!     └── climate-change.json
//! ```

pub mod images;
pub mod json;
pub mod spreadsheet;
