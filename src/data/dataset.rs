use std::collections::HashMap;
use std::fmt;

use log::warn;

use crate::data::frame::Frame;
use crate::data::value::Value;
use crate::error::{Error, Result};
use crate::stats::StatsCache;

/// Canonical labels for the four role columns.
pub const USER_LABEL: &str = "user_id";
pub const ITEM_LABEL: &str = "item_id";
pub const RATING_LABEL: &str = "rating";
pub const TIMESTAMP_LABEL: &str = "timestamp";

// ---------------------------------------------------------------------------
// Roles and column selectors
// ---------------------------------------------------------------------------

/// One of the four canonical column roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Item,
    Rating,
    Timestamp,
}

impl Role {
    /// The canonical column label for this role.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => USER_LABEL,
            Role::Item => ITEM_LABEL,
            Role::Rating => RATING_LABEL,
            Role::Timestamp => TIMESTAMP_LABEL,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::User => "user",
            Role::Item => "item",
            Role::Rating => "rating",
            Role::Timestamp => "timestamp",
        };
        write!(f, "{name}")
    }
}

/// A column reference: by name or by 0-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    Name(String),
    Index(usize),
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Name(name) => write!(f, "'{name}'"),
            ColumnSelector::Index(index) => write!(f, "index {index}"),
        }
    }
}

impl From<&str> for ColumnSelector {
    fn from(name: &str) -> Self {
        ColumnSelector::Name(name.to_string())
    }
}

impl From<String> for ColumnSelector {
    fn from(name: String) -> Self {
        ColumnSelector::Name(name)
    }
}

impl From<usize> for ColumnSelector {
    fn from(index: usize) -> Self {
        ColumnSelector::Index(index)
    }
}

// ---------------------------------------------------------------------------
// Identifier remapping
// ---------------------------------------------------------------------------

/// A bijection from public identifier values to dense private integers.
///
/// The inverse is derived together with the forward map; a length mismatch
/// between the two means the source values were not distinct and is
/// reported as a warning, never silently dropped.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    forward: HashMap<Value, i64>,
    inverse: HashMap<i64, Value>,
}

impl IdMap {
    /// Assign each value consecutive private ids starting at `offset`,
    /// in the order given.
    pub fn build(values: &[Value], offset: i64) -> IdMap {
        let forward: HashMap<Value, i64> = values
            .iter()
            .cloned()
            .zip(offset..offset + values.len() as i64)
            .collect();
        let inverse: HashMap<i64, Value> =
            forward.iter().map(|(v, &id)| (id, v.clone())).collect();
        if inverse.len() != forward.len() {
            warn!(
                "identifier map is not injective ({} forward, {} inverse entries); \
                 the source data likely holds duplicate identifiers",
                forward.len(),
                inverse.len()
            );
        }
        IdMap { forward, inverse }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Private id for a public value.
    pub fn to_private(&self, value: &Value) -> Option<i64> {
        self.forward.get(value).copied()
    }

    /// Public value for a private id.
    pub fn to_public(&self, id: i64) -> Option<&Value> {
        self.inverse.get(&id)
    }
}

// ---------------------------------------------------------------------------
// Interactions – the dataset entity
// ---------------------------------------------------------------------------

/// A user–item interaction dataset: the record table plus role-column
/// bindings, the public/private identifier maps, and the lazily-filled
/// statistics cache.
///
/// Cloning is the documented copy operation: the table is deep-copied and
/// all scalar role metadata duplicated.
#[derive(Debug, Clone)]
pub struct Interactions {
    data: Frame,
    user_col: Option<String>,
    item_col: Option<String>,
    rating_col: Option<String>,
    timestamp_col: Option<String>,
    implicit: bool,
    is_private: bool,
    user_map: Option<IdMap>,
    item_map: Option<IdMap>,
    pub(crate) version: u64,
    pub(crate) cache: StatsCache,
}

impl Default for Interactions {
    fn default() -> Self {
        Interactions::new(Frame::default())
    }
}

impl Interactions {
    /// Wrap a table. Role columns are sniffed by canonical name; the
    /// dataset starts in the public identifier space.
    pub fn new(data: Frame) -> Self {
        let mut dataset = Interactions {
            data,
            user_col: None,
            item_col: None,
            rating_col: None,
            timestamp_col: None,
            implicit: false,
            is_private: false,
            user_map: None,
            item_map: None,
            version: 0,
            cache: StatsCache::default(),
        };
        dataset.sniff_roles();
        dataset
    }

    pub fn data(&self) -> &Frame {
        &self.data
    }

    /// Replace the whole table: roles are re-derived by canonical-name
    /// sniffing and every cached statistic is invalidated atomically.
    pub fn set_data(&mut self, data: Frame) {
        self.data = data;
        self.sniff_roles();
        self.version += 1;
    }

    /// Mutable table access for filter application. Bumps the table
    /// version, so cached statistics recompute on next read.
    pub(crate) fn frame_mut(&mut self) -> &mut Frame {
        self.version += 1;
        &mut self.data
    }

    fn sniff_roles(&mut self) {
        let present = |label: &str| {
            self.data
                .column_index(label)
                .map(|_| label.to_string())
        };
        self.user_col = present(USER_LABEL);
        self.item_col = present(ITEM_LABEL);
        self.rating_col = present(RATING_LABEL);
        self.timestamp_col = present(TIMESTAMP_LABEL);
    }

    // -- Role columns --

    pub fn user_col(&self) -> Option<&str> {
        self.user_col.as_deref()
    }

    pub fn item_col(&self) -> Option<&str> {
        self.item_col.as_deref()
    }

    pub fn rating_col(&self) -> Option<&str> {
        self.rating_col.as_deref()
    }

    pub fn timestamp_col(&self) -> Option<&str> {
        self.timestamp_col.as_deref()
    }

    /// Whether ratings are implicit (exports synthesize a constant 1).
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn set_implicit(&mut self, implicit: bool) {
        self.implicit = implicit;
    }

    /// Whether user/item columns currently hold private identifiers.
    pub fn is_private(&self) -> bool {
        self.is_private
    }

    fn resolve_selector(&self, selector: &ColumnSelector) -> Result<usize> {
        match selector {
            ColumnSelector::Name(name) => self
                .data
                .column_index(name)
                .ok_or_else(|| Error::ColumnNotFound(selector.clone())),
            ColumnSelector::Index(index) => {
                if *index < self.data.width() {
                    Ok(*index)
                } else {
                    Err(Error::ColumnNotFound(selector.clone()))
                }
            }
        }
    }

    /// Bind `role` to the column picked by `selector`. With `rename` the
    /// column is renamed to the role's canonical label and that label is
    /// stored; otherwise the existing name is stored and the table is left
    /// untouched.
    pub fn set_role_column(
        &mut self,
        role: Role,
        selector: impl Into<ColumnSelector>,
        rename: bool,
    ) -> Result<()> {
        let selector = selector.into();
        let index = self.resolve_selector(&selector)?;
        let stored = if rename {
            self.data.rename_column(index, role.label());
            role.label().to_string()
        } else {
            self.data.column_names()[index].clone()
        };
        match role {
            Role::User => self.user_col = Some(stored),
            Role::Item => self.item_col = Some(stored),
            Role::Rating => self.rating_col = Some(stored),
            Role::Timestamp => self.timestamp_col = Some(stored),
        }
        Ok(())
    }

    /// Bind and canonicalize the user column.
    pub fn set_user_col(&mut self, selector: impl Into<ColumnSelector>) -> Result<()> {
        self.set_role_column(Role::User, selector, true)
    }

    /// Bind and canonicalize the item column.
    pub fn set_item_col(&mut self, selector: impl Into<ColumnSelector>) -> Result<()> {
        self.set_role_column(Role::Item, selector, true)
    }

    /// Bind and canonicalize the rating column.
    pub fn set_rating_col(&mut self, selector: impl Into<ColumnSelector>) -> Result<()> {
        self.set_role_column(Role::Rating, selector, true)
    }

    /// Bind and canonicalize the timestamp column.
    pub fn set_timestamp_col(&mut self, selector: impl Into<ColumnSelector>) -> Result<()> {
        self.set_role_column(Role::Timestamp, selector, true)
    }

    pub(crate) fn role_index(&self, role: Role) -> Result<usize> {
        let name = match role {
            Role::User => &self.user_col,
            Role::Item => &self.item_col,
            Role::Rating => &self.rating_col,
            Role::Timestamp => &self.timestamp_col,
        };
        name.as_deref()
            .and_then(|n| self.data.column_index(n))
            .ok_or(Error::RoleColumnMissing(role))
    }

    // -- Derived views --

    /// Distinct users in first-seen order.
    pub fn users(&self) -> Result<Vec<Value>> {
        Ok(self.data.distinct(self.role_index(Role::User)?))
    }

    /// Distinct items in first-seen order.
    pub fn items(&self) -> Result<Vec<Value>> {
        Ok(self.data.distinct(self.role_index(Role::Item)?))
    }

    pub fn n_users(&self) -> Result<usize> {
        Ok(self.users()?.len())
    }

    pub fn n_items(&self) -> Result<usize> {
        Ok(self.items()?.len())
    }

    // -- Identifier remapping --

    pub fn user_map(&self) -> Option<&IdMap> {
        self.user_map.as_ref()
    }

    pub fn item_map(&self) -> Option<&IdMap> {
        self.item_map.as_ref()
    }

    /// Build the public→private maps for users and items. User ids start
    /// at `offset`; with `items_shift` item ids start after the user range
    /// (`offset + n_users`) so the two occupy disjoint integer ranges,
    /// otherwise they also start at `offset`.
    pub fn map_users_and_items(&mut self, offset: i64, items_shift: bool) -> Result<()> {
        let users = self.users()?;
        let items = self.items()?;
        let items_offset = if items_shift {
            offset + users.len() as i64
        } else {
            offset
        };
        self.user_map = Some(IdMap::build(&users, offset));
        self.item_map = Some(IdMap::build(&items, items_offset));
        Ok(())
    }

    /// Replace the user and item columns with private identifiers.
    /// A no-op when already private.
    pub fn to_private(&mut self) -> Result<()> {
        if self.is_private {
            return Ok(());
        }
        let (user_map, item_map) = self.maps()?;
        let user_index = self.role_index(Role::User)?;
        let item_index = self.role_index(Role::Item)?;
        // Map both columns before writing either, so a failure on the
        // second column cannot leave the first already rewritten.
        let users = map_column(&self.data, user_index, |v| {
            user_map.to_private(v).map(Value::Int)
        })?;
        let items = map_column(&self.data, item_index, |v| {
            item_map.to_private(v).map(Value::Int)
        })?;
        write_column(&mut self.data, user_index, users);
        write_column(&mut self.data, item_index, items);
        self.is_private = true;
        Ok(())
    }

    /// Restore the public user and item identifiers.
    /// A no-op when already public.
    pub fn to_public(&mut self) -> Result<()> {
        if !self.is_private {
            return Ok(());
        }
        let (user_map, item_map) = self.maps()?;
        let user_index = self.role_index(Role::User)?;
        let item_index = self.role_index(Role::Item)?;
        let users = map_column(&self.data, user_index, |v| match v {
            Value::Int(id) => user_map.to_public(*id).cloned(),
            _ => None,
        })?;
        let items = map_column(&self.data, item_index, |v| match v {
            Value::Int(id) => item_map.to_public(*id).cloned(),
            _ => None,
        })?;
        write_column(&mut self.data, user_index, users);
        write_column(&mut self.data, item_index, items);
        self.is_private = false;
        Ok(())
    }

    fn maps(&self) -> Result<(&IdMap, &IdMap)> {
        match (&self.user_map, &self.item_map) {
            (Some(u), Some(i)) => Ok((u, i)),
            _ => Err(Error::MappingNotBuilt),
        }
    }

    /// A new entity around `data` inheriting this one's role bindings,
    /// identifier maps, and flags. Used by splitters for the partitions
    /// they produce.
    pub fn derive(&self, data: Frame) -> Interactions {
        Interactions {
            data,
            user_col: self.user_col.clone(),
            item_col: self.item_col.clone(),
            rating_col: self.rating_col.clone(),
            timestamp_col: self.timestamp_col.clone(),
            implicit: self.implicit,
            is_private: self.is_private,
            user_map: self.user_map.clone(),
            item_map: self.item_map.clone(),
            version: 0,
            cache: StatsCache::default(),
        }
    }
}

/// Apply `map` to every cell of one column, collecting the result.
/// Cells without a mapping entry abort with `UnmappedValue` naming every
/// distinct offender.
fn map_column(
    frame: &Frame,
    index: usize,
    map: impl Fn(&Value) -> Option<Value>,
) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(frame.len());
    let mut missing: Vec<String> = Vec::new();
    for cell in frame.column(index) {
        match map(cell) {
            Some(mapped) => out.push(mapped),
            None => {
                let text = cell.to_string();
                if !missing.contains(&text) {
                    missing.push(text);
                }
            }
        }
    }
    if missing.is_empty() {
        Ok(out)
    } else {
        Err(Error::UnmappedValue {
            column: frame.column_names()[index].clone(),
            values: missing,
        })
    }
}

fn write_column(frame: &mut Frame, index: usize, values: Vec<Value>) {
    for (cell, value) in frame.column_mut(index).zip(values) {
        *cell = value;
    }
}
