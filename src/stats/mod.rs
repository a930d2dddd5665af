//! Lazily-cached structural statistics over the interaction table.
//!
//! Every metric is a pure function of the table, memoized per table
//! version: `Interactions::set_data` bumps the version, and the whole
//! cache — scalars, sorted-degree helpers, graph statistics — is discarded
//! as a unit the next time any metric is read.

pub mod graph;

use std::collections::HashMap;

use crate::data::dataset::{Interactions, Role};
use crate::data::value::Value;
use crate::error::{Error, Result};

/// The fixed allow-list accepted by [`Interactions::get_metric`].
pub const METRICS: &[&str] = &[
    "transactions",
    "space_size",
    "space_size_log",
    "shape",
    "shape_log",
    "density",
    "density_log",
    "gini_item",
    "gini_user",
    "ratings_per_user",
    "ratings_per_item",
    "average_degree",
    "average_degree_users",
    "average_degree_items",
    "average_degree_log",
    "average_degree_users_log",
    "average_degree_items_log",
    "average_clustering_coefficient_dot",
    "average_clustering_coefficient_min",
    "average_clustering_coefficient_max",
    "average_clustering_coefficient_dot_log",
    "average_clustering_coefficient_min_log",
    "average_clustering_coefficient_max_log",
    "average_clustering_coefficient_dot_users",
    "average_clustering_coefficient_dot_items",
    "average_clustering_coefficient_min_users",
    "average_clustering_coefficient_min_items",
    "average_clustering_coefficient_max_users",
    "average_clustering_coefficient_max_items",
    "average_clustering_coefficient_dot_users_log",
    "average_clustering_coefficient_dot_items_log",
    "average_clustering_coefficient_min_users_log",
    "average_clustering_coefficient_min_items_log",
    "average_clustering_coefficient_max_users_log",
    "average_clustering_coefficient_max_items_log",
    "degree_assortativity_users",
    "degree_assortativity_items",
];

/// Memoized metric state, valid for exactly one table version.
#[derive(Debug, Clone, Default)]
pub struct StatsCache {
    version: u64,
    scalars: HashMap<String, f64>,
    sorted_users: Option<Vec<(Value, usize)>>,
    sorted_items: Option<Vec<(Value, usize)>>,
    graph: Option<HashMap<&'static str, f64>>,
}

impl StatsCache {
    /// Discard everything if the table moved past this cache's version.
    fn sync(&mut self, version: u64) {
        if self.version != version {
            *self = StatsCache {
                version,
                ..StatsCache::default()
            };
        }
    }
}

impl Interactions {
    fn sync_cache(&mut self) {
        let version = self.version;
        self.cache.sync(version);
    }

    /// Compute (or fetch) a named metric from the fixed allow-list.
    pub fn get_metric(&mut self, name: &str) -> Result<f64> {
        if !METRICS.contains(&name) {
            return Err(Error::UnknownMetric(name.to_string()));
        }
        self.sync_cache();
        if let Some(value) = self.cache.scalars.get(name) {
            return Ok(*value);
        }
        let value = self.compute_metric(name)?;
        self.cache.scalars.insert(name.to_string(), value);
        Ok(value)
    }

    fn compute_metric(&mut self, name: &str) -> Result<f64> {
        // Every *_log metric is log10 of its base metric.
        if let Some(base) = name.strip_suffix("_log") {
            return Ok(self.get_metric(base)?.log10());
        }
        let value = match name {
            "transactions" => self.data().len() as f64,
            "space_size" => {
                let (n_users, n_items) = self.dims()?;
                (n_users * n_items).sqrt() / 1000.0
            }
            "shape" => {
                let (n_users, n_items) = self.dims()?;
                n_users / n_items
            }
            "density" => {
                let (n_users, n_items) = self.dims()?;
                self.data().len() as f64 / (n_users * n_items)
            }
            "ratings_per_user" => {
                let (n_users, _) = self.dims()?;
                self.data().len() as f64 / n_users
            }
            "ratings_per_item" => {
                let (_, n_items) = self.dims()?;
                self.data().len() as f64 / n_items
            }
            "gini_user" => {
                let degrees: Vec<f64> =
                    self.sorted_users()?.iter().map(|(_, d)| *d as f64).collect();
                gini(&degrees)?
            }
            "gini_item" => {
                let degrees: Vec<f64> =
                    self.sorted_items()?.iter().map(|(_, d)| *d as f64).collect();
                gini(&degrees)?
            }
            other => self.graph_metric(other)?,
        };
        Ok(value)
    }

    fn dims(&self) -> Result<(f64, f64)> {
        let n_users = self.n_users()?;
        let n_items = self.n_items()?;
        if n_users == 0 || n_items == 0 {
            return Err(Error::EmptyTable);
        }
        Ok((n_users as f64, n_items as f64))
    }

    /// Per-user interaction degree, ascending by degree.
    pub fn sorted_users(&mut self) -> Result<Vec<(Value, usize)>> {
        self.sync_cache();
        if self.cache.sorted_users.is_none() {
            let index = self.role_index(Role::User)?;
            let pairs = degree_counts(self.data(), index);
            self.cache.sorted_users = Some(pairs);
        }
        Ok(self.cache.sorted_users.clone().unwrap_or_default())
    }

    /// Per-item interaction degree, ascending by degree.
    pub fn sorted_items(&mut self) -> Result<Vec<(Value, usize)>> {
        self.sync_cache();
        if self.cache.sorted_items.is_none() {
            let index = self.role_index(Role::Item)?;
            let pairs = degree_counts(self.data(), index);
            self.cache.sorted_items = Some(pairs);
        }
        Ok(self.cache.sorted_items.clone().unwrap_or_default())
    }

    fn graph_metric(&mut self, name: &str) -> Result<f64> {
        self.ensure_graph()?;
        self.cache
            .graph
            .as_ref()
            .and_then(|metrics| metrics.get(name).copied())
            .ok_or_else(|| Error::UnknownMetric(name.to_string()))
    }

    fn ensure_graph(&mut self) -> Result<()> {
        if self.cache.graph.is_some() {
            return Ok(());
        }
        if self.data().is_empty() {
            return Err(Error::EmptyTable);
        }
        let user_index = self.role_index(Role::User)?;
        let item_index = self.role_index(Role::Item)?;
        let bipartite = graph::BipartiteGraph::from_frame(self.data(), user_index, item_index);
        self.cache.graph = Some(bipartite.metrics());
        Ok(())
    }
}

fn degree_counts(frame: &crate::data::frame::Frame, index: usize) -> Vec<(Value, usize)> {
    let mut counts: HashMap<Value, usize> = HashMap::new();
    for value in frame.column(index) {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    let mut pairs: Vec<(Value, usize)> = counts.into_iter().collect();
    // ascending by degree; ties broken by value so the order is stable
    pairs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

/// Normalized mean absolute pairwise difference of a non-negative
/// sequence: `(Σ_{i<j} |x_i − x_j|) / (n² × μ)`. A uniform sequence
/// yields 0.
pub fn gini(x: &[f64]) -> Result<f64> {
    if x.is_empty() {
        return Err(Error::EmptyTable);
    }
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for (i, xi) in x.iter().enumerate() {
        for xj in &x[i + 1..] {
            total += (xi - xj).abs();
        }
    }
    Ok(total / (n * n * mean))
}
