use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::data::dataset::{Interactions, Role, RATING_LABEL};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Export options
// ---------------------------------------------------------------------------

/// What to do with one role column on export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnChoice {
    /// Leave the column out.
    Skip,
    /// Write it under its stored name.
    Keep,
    /// Write it under a custom header label.
    Renamed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    pub user: ColumnChoice,
    pub item: ColumnChoice,
    pub rating: ColumnChoice,
    pub timestamp: ColumnChoice,
    pub delimiter: u8,
    pub header: bool,
    /// Create the parent directory instead of failing when it is missing.
    pub force_create: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            user: ColumnChoice::Keep,
            item: ColumnChoice::Keep,
            rating: ColumnChoice::Skip,
            timestamp: ColumnChoice::Skip,
            delimiter: b'\t',
            header: true,
            force_create: false,
        }
    }
}

impl ExportOptions {
    /// Tab-separated user/item export (the default).
    pub fn tsv() -> Self {
        ExportOptions::default()
    }

    /// Comma-separated user/item export.
    pub fn csv() -> Self {
        ExportOptions {
            delimiter: b',',
            ..ExportOptions::default()
        }
    }

    pub fn with_rating(mut self, choice: ColumnChoice) -> Self {
        self.rating = choice;
        self
    }

    pub fn with_timestamp(mut self, choice: ColumnChoice) -> Self {
        self.timestamp = choice;
        self
    }

    pub fn force_create(mut self, yes: bool) -> Self {
        self.force_create = yes;
        self
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

enum Source {
    Column(usize),
    /// Implicit-feedback datasets materialize a constant rating of 1.
    ImplicitRating,
}

/// Write the selected role columns as delimited text. The parent
/// directory must exist unless `force_create` is set; requested roles
/// that are absent are skipped with a warning.
pub fn export(dataset: &Interactions, path: &Path, options: &ExportOptions) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if options.force_create {
                std::fs::create_dir_all(parent)?;
            } else {
                return Err(Error::DirectoryNotFound(parent.to_path_buf()));
            }
        }
    }

    let choices = [
        (Role::User, &options.user),
        (Role::Item, &options.item),
        (Role::Rating, &options.rating),
        (Role::Timestamp, &options.timestamp),
    ];
    let mut selected: Vec<(Source, String)> = Vec::new();
    for (role, choice) in choices {
        if *choice == ColumnChoice::Skip {
            continue;
        }
        match dataset.role_index(role) {
            Ok(index) => {
                let label = match choice {
                    ColumnChoice::Renamed(label) => label.clone(),
                    _ => dataset.data().column_names()[index].clone(),
                };
                let source = if role == Role::Rating && dataset.is_implicit() {
                    Source::ImplicitRating
                } else {
                    Source::Column(index)
                };
                selected.push((source, label));
            }
            Err(_) if role == Role::Rating && dataset.is_implicit() => {
                let label = match choice {
                    ColumnChoice::Renamed(label) => label.clone(),
                    _ => RATING_LABEL.to_string(),
                };
                selected.push((Source::ImplicitRating, label));
            }
            Err(_) => {
                warn!("{role} column requested but not present; skipping it in export");
            }
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_path(path)?;
    if options.header {
        writer.write_record(selected.iter().map(|(_, label)| label.as_str()))?;
    }
    for row in dataset.data().rows() {
        writer.write_record(selected.iter().map(|(source, _)| match source {
            Source::Column(index) => row[*index].to_string(),
            Source::ImplicitRating => "1".to_string(),
        }))?;
    }
    writer.flush()?;
    info!("dataset exported to '{}'", path.display());
    Ok(())
}

impl Interactions {
    /// Write this dataset as delimited text. See [`export`].
    pub fn export(&self, path: &Path, options: &ExportOptions) -> Result<()> {
        export(self, path, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::Frame;
    use crate::data::value::Value;

    fn sample() -> Interactions {
        let frame = Frame::from_rows(
            vec!["user_id".into(), "item_id".into(), "rating".into()],
            vec![
                vec![Value::Int(1), Value::Int(10), Value::Int(5)],
                vec![Value::Int(2), Value::Int(11), Value::Int(3)],
            ],
        )
        .unwrap();
        Interactions::new(frame)
    }

    #[test]
    fn missing_directory_without_force_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.tsv");
        let err = sample()
            .export(&path, &ExportOptions::tsv())
            .unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(_)));
    }

    #[test]
    fn force_create_builds_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.tsv");
        sample()
            .export(&path, &ExportOptions::tsv().force_create(true))
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "user_id\titem_id\n1\t10\n2\t11\n");
    }

    #[test]
    fn rating_column_and_custom_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let options = ExportOptions::tsv()
            .with_rating(ColumnChoice::Renamed("score".to_string()));
        sample().export(&path, &options).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "user_id\titem_id\tscore\n1\t10\t5\n2\t11\t3\n");
    }

    #[test]
    fn absent_role_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let options = ExportOptions::tsv().with_timestamp(ColumnChoice::Keep);
        sample().export(&path, &options).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        // no timestamp column anywhere in the output
        assert_eq!(written.lines().next(), Some("user_id\titem_id"));
    }

    #[test]
    fn implicit_dataset_synthesizes_ratings() {
        let frame = Frame::from_rows(
            vec!["user_id".into(), "item_id".into()],
            vec![vec![Value::Int(1), Value::Int(10)]],
        )
        .unwrap();
        let mut dataset = Interactions::new(frame);
        dataset.set_implicit(true);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let options = ExportOptions::tsv().with_rating(ColumnChoice::Keep);
        dataset.export(&path, &options).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "user_id\titem_id\trating\n1\t10\t1\n");
    }

    #[test]
    fn headerless_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut options = ExportOptions::csv();
        options.header = false;
        sample().export(&path, &options).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "1,10\n2,11\n");
    }
}
