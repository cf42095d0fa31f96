//! Word Mover's Distance as an exact transportation problem.
//!
//! Each document becomes a normalised bag of words over its in-vocabulary
//! tokens. Moving one unit of mass from word `i` to word `j` costs the
//! Euclidean distance between their vectors, and the distance is the minimum
//! total cost of turning one bag into the other.

use indexmap::IndexMap;
use ndarray::Array2;

use crate::nlp::embeddings::{euclidean, EmbeddingProvider};

const EPSILON: f64 = 1e-12;

/// Distance between two token sequences, `None` if either has no known word.
pub fn word_movers_distance<S: AsRef<str>>(
    provider: &dyn EmbeddingProvider,
    first: &[S],
    second: &[S],
) -> Option<f64> {
    let first = normalized_bag(provider, first)?;
    let second = normalized_bag(provider, second)?;

    let mut cost = Array2::<f64>::zeros((first.len(), second.len()));
    for (i, (_, (vec_a, _))) in first.iter().enumerate() {
        for (j, (_, (vec_b, _))) in second.iter().enumerate() {
            cost[[i, j]] = euclidean(vec_a, vec_b);
        }
    }

    let supply: Vec<f64> = first.values().map(|(_, w)| *w).collect();
    let demand: Vec<f64> = second.values().map(|(_, w)| *w).collect();
    Some(transport_cost(&supply, &demand, &cost))
}

/// Unique known words with their vectors and relative frequencies.
fn normalized_bag<'a, S: AsRef<str>>(
    provider: &'a dyn EmbeddingProvider,
    tokens: &'a [S],
) -> Option<IndexMap<&'a str, (&'a [f32], f64)>> {
    let mut bag: IndexMap<&str, (&[f32], f64)> = IndexMap::new();
    let mut total = 0.0;
    for token in tokens {
        let token = token.as_ref();
        if let Some(vector) = provider.embed(token) {
            bag.entry(token).or_insert((vector, 0.0)).1 += 1.0;
            total += 1.0;
        }
    }
    if bag.is_empty() {
        return None;
    }
    for (_, weight) in bag.values_mut() {
        *weight /= total;
    }
    Some(bag)
}

/// Minimum cost of shipping `supply` to `demand` (both summing to one) over `cost`.
pub fn transport_cost(supply: &[f64], demand: &[f64], cost: &Array2<f64>) -> f64 {
    let (m, n) = cost.dim();
    debug_assert_eq!(m, supply.len());
    debug_assert_eq!(n, demand.len());

    // source, m supply nodes, n demand nodes, sink
    let source = 0;
    let sink = m + n + 1;
    let mut network = FlowNetwork::new(m + n + 2);
    for (i, &mass) in supply.iter().enumerate() {
        network.add_edge(source, 1 + i, mass, 0.0);
    }
    for (j, &mass) in demand.iter().enumerate() {
        network.add_edge(1 + m + j, sink, mass, 0.0);
    }
    for i in 0..m {
        for j in 0..n {
            network.add_edge(1 + i, 1 + m + j, f64::INFINITY, cost[[i, j]]);
        }
    }

    let required = supply.iter().sum::<f64>().min(demand.iter().sum::<f64>());
    network.min_cost_flow(source, sink, required)
}

#[derive(Debug, Clone)]
struct Edge {
    to: usize,
    rev: usize,
    capacity: f64,
    cost: f64,
}

/// Residual network solved by successive shortest augmenting paths.
struct FlowNetwork {
    graph: Vec<Vec<Edge>>,
}

impl FlowNetwork {
    fn new(nodes: usize) -> Self {
        Self {
            graph: vec![Vec::new(); nodes],
        }
    }

    fn add_edge(&mut self, from: usize, to: usize, capacity: f64, cost: f64) {
        let forward_rev = self.graph[to].len();
        let backward_rev = self.graph[from].len();
        self.graph[from].push(Edge {
            to,
            rev: forward_rev,
            capacity,
            cost,
        });
        self.graph[to].push(Edge {
            to: from,
            rev: backward_rev,
            capacity: 0.0,
            cost: -cost,
        });
    }

    fn min_cost_flow(&mut self, source: usize, sink: usize, required: f64) -> f64 {
        let mut remaining = required;
        let mut total = 0.0;
        while remaining > EPSILON {
            let Some(path) = self.shortest_path(source, sink) else {
                break;
            };
            let push = path
                .iter()
                .map(|&(from, edge)| self.graph[from][edge].capacity)
                .fold(remaining, f64::min);

            for &(from, edge) in &path {
                let (to, rev, cost) = {
                    let e = &mut self.graph[from][edge];
                    e.capacity -= push;
                    (e.to, e.rev, e.cost)
                };
                self.graph[to][rev].capacity += push;
                total += push * cost;
            }
            remaining -= push;
        }
        total.max(0.0)
    }

    /// Cheapest residual path as `(node, edge index)` hops from `source` to `sink`.
    ///
    /// Bellman-Ford, since reverse edges carry negative costs.
    fn shortest_path(&self, source: usize, sink: usize) -> Option<Vec<(usize, usize)>> {
        let nodes = self.graph.len();
        let mut dist = vec![f64::INFINITY; nodes];
        let mut parents: Vec<Option<(usize, usize)>> = vec![None; nodes];
        dist[source] = 0.0;

        for _ in 0..nodes {
            let mut changed = false;
            for from in 0..nodes {
                if dist[from].is_infinite() {
                    continue;
                }
                for (index, edge) in self.graph[from].iter().enumerate() {
                    if edge.capacity <= EPSILON {
                        continue;
                    }
                    let candidate = dist[from] + edge.cost;
                    if candidate + EPSILON < dist[edge.to] {
                        dist[edge.to] = candidate;
                        parents[edge.to] = Some((from, index));
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        let mut path = Vec::new();
        let mut node = sink;
        while node != source {
            let hop = parents[node]?;
            path.push(hop);
            node = hop.0;
            if path.len() > nodes {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }
}
