// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

//! Subject-vs-benchmark comparison. Joins the subject's per-period metric
//! values against the single industry-average scalar per metric, producing
//! signed differences and an Above/Below/On-Par standing.

use serde::Serialize;

use crate::benchmark::{benchmark_value, BenchmarkValue};
use crate::metrics::MetricSet;

/// Where a subject value sits relative to the industry average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Standing {
    Above,
    Below,
    OnPar,
}

impl Standing {
    pub fn label(&self) -> &'static str {
        match self {
            Standing::Above => "Above Average",
            Standing::Below => "Below Average",
            Standing::OnPar => "On Par",
        }
    }
}

/// One (metric, period) comparison. The standing is always derivable from
/// `subject`, `benchmark` and the tolerance used; it is stored alongside them
/// for convenience only.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRecord {
    pub metric: String,
    pub period: String,
    pub subject: f64,
    pub benchmark: f64,
    pub difference: f64,
    pub standing: Standing,
}

/// Classify a signed difference. `tolerance` is the absolute band around the
/// benchmark that counts as on-par; at the default of 0.0 only an exact tie
/// does.
pub fn classify(difference: f64, tolerance: f64) -> Standing {
    if difference.abs() <= tolerance {
        Standing::OnPar
    } else if difference > 0.0 {
        Standing::Above
    } else {
        Standing::Below
    }
}

/// Compare a subject metric set against benchmarks.
///
/// Metrics without an available benchmark, and periods where the subject
/// value is unavailable, produce no record; neither fails the batch. Output
/// order is catalog order then period order, which downstream formatting
/// relies on.
pub fn compare(
    subject: &MetricSet,
    benchmarks: &[BenchmarkValue],
    tolerance: f64,
) -> Vec<ComparisonRecord> {
    let mut records = Vec::new();

    for series in &subject.series {
        let benchmark = match benchmark_value(benchmarks, series.name).and_then(|b| b.value) {
            Some(v) => v,
            None => continue,
        };

        for (period_idx, value) in series.values.iter().enumerate() {
            let subject_value = match value {
                Some(v) => *v,
                None => continue,
            };
            let difference = subject_value - benchmark;
            records.push(ComparisonRecord {
                metric: series.name.to_string(),
                period: subject.periods[period_idx].clone(),
                subject: subject_value,
                benchmark,
                difference,
                standing: classify(difference, tolerance),
            });
        }
    }

    records
}
