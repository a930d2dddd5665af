//! Tabular interaction datasets for recommender-system benchmarks.
//!
//! Pipeline:
//! ```text
//!  .tsv / .txt / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ io::read  │  parse file → RawTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ data::format  │  bind role columns → Interactions
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ filters   │  binarize / holdout → derived Interactions
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ io::write │  export train/val/test as delimited text
//!   └──────────┘
//! ```

pub mod data;
pub mod error;
pub mod filters;
pub mod io;
pub mod stats;

pub use data::dataset::{ColumnSelector, Interactions, Role};
pub use data::frame::Frame;
pub use data::value::Value;
pub use error::{Error, Result};
