//! Bipartite user–item graph statistics.
//!
//! Degrees count distinct neighbors (parallel interactions collapse to one
//! edge). Clustering follows the bipartite pairwise-overlap definition:
//! for two same-side nodes `u`, `v`,
//! `cc_dot = |N(u) ∩ N(v)| / |N(u) ∪ N(v)|`,
//! `cc_min = |N(u) ∩ N(v)| / min(|N(u)|, |N(v)|)`,
//! `cc_max = |N(u) ∩ N(v)| / max(|N(u)|, |N(v)|)`;
//! a node's coefficient is the mean over its distance-2 neighborhood, and
//! the reported metric averages nodes over one side or both.
//! Degree assortativity per side is the Pearson correlation between a
//! node's degree and the mean degree of its neighbors.

use std::collections::{HashMap, HashSet};

use crate::data::frame::Frame;
use crate::data::value::Value;

/// Deduplicated adjacency of the interaction graph, users on one side,
/// items on the other.
#[derive(Debug)]
pub struct BipartiteGraph {
    user_adj: Vec<Vec<usize>>,
    item_adj: Vec<Vec<usize>>,
}

#[derive(Clone, Copy)]
enum Mode {
    Dot,
    Min,
    Max,
}

impl BipartiteGraph {
    /// Build the graph from the user and item columns of a table.
    pub fn from_frame(frame: &Frame, user_index: usize, item_index: usize) -> Self {
        let mut user_ids: HashMap<Value, usize> = HashMap::new();
        let mut item_ids: HashMap<Value, usize> = HashMap::new();
        let mut edges: HashSet<(usize, usize)> = HashSet::new();

        for row in frame.rows() {
            let next_user = user_ids.len();
            let u = *user_ids.entry(row[user_index].clone()).or_insert(next_user);
            let next_item = item_ids.len();
            let i = *item_ids.entry(row[item_index].clone()).or_insert(next_item);
            edges.insert((u, i));
        }

        let mut user_adj = vec![Vec::new(); user_ids.len()];
        let mut item_adj = vec![Vec::new(); item_ids.len()];
        for (u, i) in edges {
            user_adj[u].push(i);
            item_adj[i].push(u);
        }
        for neighbors in user_adj.iter_mut().chain(item_adj.iter_mut()) {
            neighbors.sort_unstable();
        }
        BipartiteGraph { user_adj, item_adj }
    }

    /// All graph metrics, keyed by their allow-list names.
    pub fn metrics(&self) -> HashMap<&'static str, f64> {
        let n_users = self.user_adj.len() as f64;
        let n_items = self.item_adj.len() as f64;
        let n_edges: usize = self.user_adj.iter().map(Vec::len).sum();

        let mut out = HashMap::new();
        out.insert("average_degree", 2.0 * n_edges as f64 / (n_users + n_items));
        out.insert("average_degree_users", n_edges as f64 / n_users);
        out.insert("average_degree_items", n_edges as f64 / n_items);

        for (mode, name_all, name_users, name_items) in [
            (
                Mode::Dot,
                "average_clustering_coefficient_dot",
                "average_clustering_coefficient_dot_users",
                "average_clustering_coefficient_dot_items",
            ),
            (
                Mode::Min,
                "average_clustering_coefficient_min",
                "average_clustering_coefficient_min_users",
                "average_clustering_coefficient_min_items",
            ),
            (
                Mode::Max,
                "average_clustering_coefficient_max",
                "average_clustering_coefficient_max_users",
                "average_clustering_coefficient_max_items",
            ),
        ] {
            let users = side_clustering(&self.user_adj, &self.item_adj, mode);
            let items = side_clustering(&self.item_adj, &self.user_adj, mode);
            let both = (users.iter().sum::<f64>() + items.iter().sum::<f64>())
                / (n_users + n_items);
            out.insert(name_users, mean(&users));
            out.insert(name_items, mean(&items));
            out.insert(name_all, both);
        }

        out.insert(
            "degree_assortativity_users",
            side_assortativity(&self.user_adj, &self.item_adj),
        );
        out.insert(
            "degree_assortativity_items",
            side_assortativity(&self.item_adj, &self.user_adj),
        );
        out
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

/// Size of the intersection of two sorted index lists.
fn intersection_size(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

fn pair_coefficient(a: &[usize], b: &[usize], mode: Mode) -> f64 {
    let shared = intersection_size(a, b) as f64;
    let denominator = match mode {
        Mode::Dot => (a.len() + b.len()) as f64 - shared,
        Mode::Min => a.len().min(b.len()) as f64,
        Mode::Max => a.len().max(b.len()) as f64,
    };
    if denominator == 0.0 {
        0.0
    } else {
        shared / denominator
    }
}

/// Per-node clustering coefficients for one side: each node is averaged
/// over its distance-2 neighborhood (same-side nodes sharing at least one
/// neighbor). Nodes with no such neighborhood score 0.
fn side_clustering(side: &[Vec<usize>], other: &[Vec<usize>], mode: Mode) -> Vec<f64> {
    side.iter()
        .enumerate()
        .map(|(node, neighbors)| {
            let mut peers: HashSet<usize> = HashSet::new();
            for &mid in neighbors {
                for &peer in &other[mid] {
                    if peer != node {
                        peers.insert(peer);
                    }
                }
            }
            if peers.is_empty() {
                return 0.0;
            }
            let total: f64 = peers
                .iter()
                .map(|&peer| pair_coefficient(neighbors, &side[peer], mode))
                .sum();
            total / peers.len() as f64
        })
        .collect()
}

/// Pearson correlation between a node's degree and the mean degree of its
/// neighbors, over one side. Zero when either sequence has no variance.
fn side_assortativity(side: &[Vec<usize>], other: &[Vec<usize>]) -> f64 {
    let pairs: Vec<(f64, f64)> = side
        .iter()
        .filter(|neighbors| !neighbors.is_empty())
        .map(|neighbors| {
            let degree = neighbors.len() as f64;
            let neighbor_mean = neighbors
                .iter()
                .map(|&mid| other[mid].len() as f64)
                .sum::<f64>()
                / degree;
            (degree, neighbor_mean)
        })
        .collect();
    pearson(&pairs)
}

fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len() as f64;
    if pairs.is_empty() {
        return 0.0;
    }
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}
