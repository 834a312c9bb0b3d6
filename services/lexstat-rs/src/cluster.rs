//! Flat clustering of a concept's distance matrix.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::graph::CognateGraph;
use crate::types::Linkage;

/// Partition `0..n` so that linked words share a group.
///
/// Groups come back with ascending members, ordered by their first member.
pub fn flat_cluster(distances: &Array2<f64>, threshold: f64, linkage: Linkage) -> Vec<Vec<usize>> {
    match linkage {
        Linkage::Single => CognateGraph::from_distances(distances, threshold).components(),
        Linkage::Upgma => agglomerate(distances, threshold, average_distance),
        Linkage::Complete => agglomerate(distances, threshold, maximum_distance),
    }
}

fn average_distance(distances: &Array2<f64>, a: &[usize], b: &[usize]) -> f64 {
    let sum: f64 = a
        .iter()
        .flat_map(|&i| b.iter().map(move |&j| (i, j)))
        .map(|(i, j)| distances[[i, j]])
        .sum();
    sum / (a.len() * b.len()) as f64
}

fn maximum_distance(distances: &Array2<f64>, a: &[usize], b: &[usize]) -> f64 {
    a.iter()
        .flat_map(|&i| b.iter().map(move |&j| distances[[i, j]]))
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Merge the closest pair of groups while their linkage distance stays
/// within `threshold`. Ties go to the earliest pair.
fn agglomerate(
    distances: &Array2<f64>,
    threshold: f64,
    linkage: fn(&Array2<f64>, &[usize], &[usize]) -> f64,
) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = (0..distances.nrows()).map(|i| vec![i]).collect();

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for p in 0..groups.len() {
            for q in p + 1..groups.len() {
                let distance = linkage(distances, &groups[p], &groups[q]);
                if distance <= threshold && best.map_or(true, |(_, _, d)| distance < d) {
                    best = Some((p, q, distance));
                }
            }
        }

        let Some((p, q, _)) = best else {
            break;
        };
        let merged = groups.remove(q);
        groups[p].extend(merged);
        groups[p].sort_unstable();
    }

    groups.sort_by_key(|group| group[0]);
    groups
}

/// Cluster id of every group member: one plus the global index of the
/// group's earliest member.
///
/// `members` maps local positions of the distance matrix to global
/// entry indices in ascending order.
pub fn assign_ids(groups: &[Vec<usize>], members: &[usize]) -> Vec<(usize, usize)> {
    groups
        .iter()
        .flat_map(|group| {
            let id = group.iter().map(|&local| members[local]).min().map_or(0, |g| g + 1);
            group.iter().map(move |&local| (members[local], id))
        })
        .collect()
}

/// Outcome of clustering at one candidate threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdProbe {
    pub threshold: f64,
    /// Total number of clusters over all concepts
    pub clusters: usize,
}

/// Picks the cutoff to commit among probed thresholds
pub trait ThresholdDecider {
    /// `None` cancels the run without touching stored assignments
    fn decide(&mut self, probes: &[ThresholdProbe]) -> Option<f64>;
}

impl<F> ThresholdDecider for F
where
    F: FnMut(&[ThresholdProbe]) -> Option<f64>,
{
    fn decide(&mut self, probes: &[ThresholdProbe]) -> Option<f64> {
        self(probes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn chain() -> Array2<f64> {
        // 0-1 and 1-2 close, 0-2 far
        array![
            [0.0, 0.2, 0.7, 1.0],
            [0.2, 0.0, 0.3, 1.0],
            [0.7, 0.3, 0.0, 1.0],
            [1.0, 1.0, 1.0, 0.0],
        ]
    }

    #[test]
    fn test_single_linkage_chains() {
        let groups = flat_cluster(&chain(), 0.3, Linkage::Single);
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn test_complete_linkage_requires_cohesion() {
        let groups = flat_cluster(&chain(), 0.3, Linkage::Complete);
        assert_eq!(groups, vec![vec![0, 1], vec![2], vec![3]]);
    }

    #[test]
    fn test_average_linkage() {
        // {0,1} to 2 averages 0.5
        assert_eq!(flat_cluster(&chain(), 0.4, Linkage::Upgma).len(), 3);
        assert_eq!(
            flat_cluster(&chain(), 0.5, Linkage::Upgma),
            vec![vec![0, 1, 2], vec![3]]
        );
    }

    #[test]
    fn test_assign_ids() {
        let groups = vec![vec![0, 1], vec![2]];
        let ids = assign_ids(&groups, &[4, 7, 9]);
        assert_eq!(ids, vec![(4, 5), (7, 5), (9, 10)]);
    }

    #[test]
    fn test_closure_decider() {
        let probes = [
            ThresholdProbe {
                threshold: 0.3,
                clusters: 5,
            },
            ThresholdProbe {
                threshold: 0.6,
                clusters: 3,
            },
        ];
        let mut pick_fewest = |probes: &[ThresholdProbe]| {
            probes.iter().min_by_key(|p| p.clusters).map(|p| p.threshold)
        };
        assert_eq!(pick_fewest.decide(&probes), Some(0.6));
    }
}
