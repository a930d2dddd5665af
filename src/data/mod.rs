/// Data layer: cell values, the rectangular table, and the dataset entity.
///
/// `Value` is a single dynamically-typed cell, `Frame` the owned table of
/// named columns, `Interactions` the dataset entity binding role columns
/// (user / item / rating / timestamp) to the table and carrying the
/// identifier remapping and statistics cache. `format` adapts raw reader
/// output into `Interactions`.
pub mod dataset;
pub mod format;
pub mod frame;
pub mod value;
