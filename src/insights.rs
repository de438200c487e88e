// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

//! Template-driven insight sentences, one per comparison record, in input
//! order. Deterministic: the same records always produce the same strings.

use crate::compare::{ComparisonRecord, Standing};

/// Render one sentence per comparison record.
pub fn format_insights(records: &[ComparisonRecord]) -> Vec<String> {
    records.iter().map(format_insight).collect()
}

fn format_insight(record: &ComparisonRecord) -> String {
    match record.standing {
        Standing::Below => format!(
            "In {}, {} is below the industry average by {:.2}. \
             Consider strategies to improve this metric.",
            record.period,
            record.metric,
            record.difference.abs()
        ),
        Standing::Above => format!(
            "In {}, {} is above the industry average by {:.2}. \
             Maintain the strong performance in this area.",
            record.period,
            record.metric,
            record.difference.abs()
        ),
        Standing::OnPar => format!(
            "In {}, {} is on par with the industry average.",
            record.period, record.metric
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(standing: Standing, difference: f64) -> ComparisonRecord {
        ComparisonRecord {
            metric: "Gross Margin".to_string(),
            period: "2024-Q1".to_string(),
            subject: 35.0 + difference,
            benchmark: 35.0,
            difference,
            standing,
        }
    }

    #[test]
    fn test_below_sentence_prompts_improvement() {
        let out = format_insights(&[record(Standing::Below, -4.25)]);
        assert_eq!(
            out[0],
            "In 2024-Q1, Gross Margin is below the industry average by 4.25. \
             Consider strategies to improve this metric."
        );
    }

    #[test]
    fn test_above_sentence_reinforces() {
        let out = format_insights(&[record(Standing::Above, 6.7)]);
        assert_eq!(
            out[0],
            "In 2024-Q1, Gross Margin is above the industry average by 6.70. \
             Maintain the strong performance in this area."
        );
    }

    #[test]
    fn test_on_par_sentence() {
        let out = format_insights(&[record(Standing::OnPar, 0.0)]);
        assert_eq!(
            out[0],
            "In 2024-Q1, Gross Margin is on par with the industry average."
        );
    }

    #[test]
    fn test_order_follows_input_order() {
        let records = vec![record(Standing::Above, 1.0), record(Standing::Below, -1.0)];
        let out = format_insights(&records);
        assert_eq!(out.len(), 2);
        assert!(out[0].contains("above"));
        assert!(out[1].contains("below"));
    }
}
