use std::path::PathBuf;

use thiserror::Error;

use crate::data::dataset::{ColumnSelector, Role};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong inside the library.
///
/// All errors surface synchronously at the offending call; non-fatal
/// conditions (a skipped export column, a non-injective remap) are reported
/// through `log::warn!` instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("column selector {0} does not resolve")]
    ColumnNotFound(ColumnSelector),

    #[error("{0} column is not set")]
    RoleColumnMissing(Role),

    #[error(
        "column '{column}' holds {} value(s) with no mapping entry: {}",
        .values.len(),
        .values.join(", ")
    )]
    UnmappedValue { column: String, values: Vec<String> },

    #[error("identifier maps have not been built; call map_users_and_items first")]
    MappingNotBuilt,

    #[error("ratio {0} is outside [0, 1]")]
    RatioOutOfRange(f64),

    #[error("threshold bound {0} is not a finite number")]
    NonFiniteBound(f64),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("metric requires a non-empty table")]
    EmptyTable,

    #[error("directory '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("row has {found} field(s), table has {expected} column(s)")]
    ArityMismatch { expected: usize, found: usize },

    #[error("filter input '{0}' is missing or has the wrong shape")]
    FilterInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unsupported JSON shape: {0}")]
    JsonShape(String),
}
