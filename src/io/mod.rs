/// I/O adapters around the core: raw delimited/JSON readers producing
/// [`read::RawTable`] values, and delimited export of datasets.
pub mod read;
pub mod write;
