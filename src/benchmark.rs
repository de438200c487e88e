// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

//! Benchmark aggregation: collapses N peer metric sets into one
//! industry-average scalar per metric. Unavailable peer values are excluded
//! from the mean, not counted as zero; a metric no peer can supply gets an
//! unavailable benchmark, which downstream comparison skips.

use crate::metrics::{MetricSet, CATALOG};

/// Industry-average value for one metric.
#[derive(Debug, Clone)]
pub struct BenchmarkValue {
    pub metric: &'static str,
    /// Mean over every available peer value, `None` when no peer contributed.
    pub value: Option<f64>,
    /// Number of (peer, period) observations behind the mean.
    pub sample_size: usize,
}

/// Aggregate peer metric sets into one benchmark per catalog metric.
///
/// Peers routinely expose different metric subsets; each metric averages over
/// whatever observations exist across all peers and all periods.
pub fn aggregate(peers: &[MetricSet]) -> Vec<BenchmarkValue> {
    CATALOG
        .iter()
        .map(|def| {
            let observations: Vec<f64> = peers
                .iter()
                .filter_map(|peer| peer.get(def.name))
                .flat_map(|series| series.values.iter().flatten().copied())
                .collect();

            let value = if observations.is_empty() {
                None
            } else {
                let mean = observations.iter().sum::<f64>() / observations.len() as f64;
                Some((mean * 100.0).round() / 100.0)
            };

            BenchmarkValue {
                metric: def.name,
                value,
                sample_size: observations.len(),
            }
        })
        .collect()
}

/// Lookup helper used by the comparator and the web routes.
pub fn benchmark_value<'a>(
    benchmarks: &'a [BenchmarkValue],
    metric: &str,
) -> Option<&'a BenchmarkValue> {
    benchmarks.iter().find(|b| b.metric == metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_metrics;
    use crate::statement::Statement;

    fn peer(csv: &str) -> MetricSet {
        compute_metrics(&Statement::from_reader(csv.as_bytes()).unwrap())
    }

    #[test]
    fn test_mean_over_available_values_only() {
        // Three peers; only one carries the rows for Gross Margin.
        let p1 = peer("Name,Q1,Q2\nTotal Income,100,100\nGross Profit,40,30\n");
        let p2 = peer("Name,Q1,Q2\nNet Revenue,100,100\nNet Profit,10,10\n");
        let p3 = peer("Name,Q1\nSomething Else,5\n");

        let benchmarks = aggregate(&[p1, p2, p3]);
        let gm = benchmark_value(&benchmarks, "Gross Margin").unwrap();

        // (40 + 30) / 2 from the single contributing peer, not divided by 3.
        assert_eq!(gm.value, Some(35.0));
        assert_eq!(gm.sample_size, 2);
    }

    #[test]
    fn test_metric_unavailable_in_all_peers() {
        let p1 = peer("Name,Q1\nTotal Income,100\nGross Profit,40\n");
        let p2 = peer("Name,Q1\nTotal Income,200\nGross Profit,50\n");

        let benchmarks = aggregate(&[p1, p2]);
        let ccc = benchmark_value(&benchmarks, "CCC").unwrap();

        assert_eq!(ccc.value, None);
        assert_eq!(ccc.sample_size, 0);
    }

    #[test]
    fn test_heterogeneous_peers_contribute_different_subsets() {
        // One peer has liquidity rows, the other profitability rows; both
        // metrics still get benchmarks.
        let p1 = peer("Name,Q1\nCurrent Assets,50\nCurrent Liabilities,25\n");
        let p2 = peer("Name,Q1\nTotal Income,100\nGross Profit,40\n");

        let benchmarks = aggregate(&[p1, p2]);
        assert_eq!(
            benchmark_value(&benchmarks, "Current Ratio").unwrap().value,
            Some(2.0)
        );
        assert_eq!(
            benchmark_value(&benchmarks, "Gross Margin").unwrap().value,
            Some(40.0)
        );
    }

    #[test]
    fn test_missing_row_in_one_peer_does_not_block_its_other_metrics() {
        // A peer with no Net Profit row still contributes Gross Margin.
        let p1 = peer("Name,Q1\nTotal Income,100\nGross Profit,40\n");
        let benchmarks = aggregate(&[p1]);

        assert_eq!(
            benchmark_value(&benchmarks, "Gross Margin").unwrap().value,
            Some(40.0)
        );
        assert_eq!(
            benchmark_value(&benchmarks, "Net Profit Margin")
                .unwrap()
                .value,
            None
        );
    }

    #[test]
    fn test_no_peers_yields_all_unavailable() {
        let benchmarks = aggregate(&[]);
        assert_eq!(benchmarks.len(), CATALOG.len());
        assert!(benchmarks.iter().all(|b| b.value.is_none()));
    }
}
