use crate::data::dataset::{
    ColumnSelector, Interactions, Role, ITEM_LABEL, USER_LABEL,
};
use crate::data::frame::Frame;
use crate::data::value::Value;
use crate::error::Result;
use crate::io::read::RawTable;

// ---------------------------------------------------------------------------
// Role binding for raw tabular input
// ---------------------------------------------------------------------------

/// Which raw column plays which role, plus the implicit-feedback flag.
/// Roles left unset stay unbound on the resulting dataset.
#[derive(Debug, Clone, Default)]
pub struct RoleSpec {
    columns: Option<Vec<String>>,
    user: Option<ColumnSelector>,
    item: Option<ColumnSelector>,
    rating: Option<ColumnSelector>,
    timestamp: Option<ColumnSelector>,
    implicit: bool,
}

impl RoleSpec {
    pub fn new() -> Self {
        RoleSpec::default()
    }

    /// Override the column names taken from the raw header.
    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn user(mut self, selector: impl Into<ColumnSelector>) -> Self {
        self.user = Some(selector.into());
        self
    }

    pub fn item(mut self, selector: impl Into<ColumnSelector>) -> Self {
        self.item = Some(selector.into());
        self
    }

    pub fn rating(mut self, selector: impl Into<ColumnSelector>) -> Self {
        self.rating = Some(selector.into());
        self
    }

    pub fn timestamp(mut self, selector: impl Into<ColumnSelector>) -> Self {
        self.timestamp = Some(selector.into());
        self
    }

    /// Mark the dataset as implicit feedback: exports synthesize a
    /// constant rating of 1.
    pub fn implicit(mut self, yes: bool) -> Self {
        self.implicit = yes;
        self
    }
}

/// Build a dataset from one-record-per-row raw input, canonicalizing the
/// selected role columns.
pub fn from_tabular(raw: &RawTable, spec: &RoleSpec) -> Result<Interactions> {
    let columns = match &spec.columns {
        Some(columns) => columns.clone(),
        None => raw.header_or_indices(),
    };
    let mut frame = Frame::new(columns);
    for row in raw.rows() {
        frame.push_row(row.iter().map(|field| Value::parse(field)).collect())?;
    }

    let mut dataset = Interactions::new(frame);
    let roles = [
        (Role::User, &spec.user),
        (Role::Item, &spec.item),
        (Role::Rating, &spec.rating),
        (Role::Timestamp, &spec.timestamp),
    ];
    for (role, selector) in roles {
        if let Some(selector) = selector {
            dataset.set_role_column(role, selector.clone(), true)?;
        }
    }
    dataset.set_implicit(spec.implicit);
    Ok(dataset)
}

/// Build a dataset from one-row-per-user adjacency input: the leading
/// field is the user, the remaining fields its item list. The result is
/// an implicit-feedback dataset with canonical user/item columns.
pub fn from_inline(raw: &RawTable) -> Result<Interactions> {
    let mut frame = Frame::new(vec![USER_LABEL.to_string(), ITEM_LABEL.to_string()]);
    for row in raw.rows() {
        let Some((user, items)) = row.split_first() else {
            continue;
        };
        let user = Value::parse(user);
        for item in items {
            // trailing separators leave empty fields behind
            if item.is_empty() {
                continue;
            }
            frame.push_row(vec![user.clone(), Value::parse(item)])?;
        }
    }
    let mut dataset = Interactions::new(frame);
    dataset.set_implicit(true);
    Ok(dataset)
}
