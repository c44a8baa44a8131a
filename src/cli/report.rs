//! Match result tables.

use spectrometer::matching::MatchOutcome;

/// Format the best `top` scores, followed by items that could not be scored.
pub fn format_matches(outcomes: &[MatchOutcome], top: usize) -> String {
    let mut scored: Vec<(&MatchOutcome, f64)> = outcomes
        .iter()
        .filter_map(|o| o.percent.as_ref().ok().map(|&p| (o, p)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut output = String::new();
    output.push_str(&format!("{:<24} {:>10}\n", "Match", "Score"));
    for (outcome, percent) in scored.iter().take(top) {
        let label = outcome.target.label();
        output.push_str(&format_row(label, *percent));
    }

    for outcome in outcomes {
        if let Err(e) = &outcome.percent {
            output.push_str(&format!("{:<24} {}\n", outcome.target.label(), e));
        }
    }
    output
}

#[cfg(feature = "colorized_output")]
fn format_row(label: &str, percent: f64) -> String {
    use console::style;

    let value = format!("{:>9.2}%", percent);
    let value = if percent >= 90.0 {
        style(value).green().bold()
    } else if percent >= 50.0 {
        style(value).yellow()
    } else {
        style(value).dim()
    };
    format!("{:<24} {}\n", label, value)
}

#[cfg(not(feature = "colorized_output"))]
fn format_row(label: &str, percent: f64) -> String {
    format!("{:<24} {:>9.2}%\n", label, percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectrometer::matching::{MatchError, MatchTarget};

    fn outcome(line: &str, percent: Result<f64, MatchError>) -> MatchOutcome {
        MatchOutcome {
            run: 1,
            target: MatchTarget::Reference {
                element: "Fe".to_string(),
                line: line.to_string(),
            },
            percent,
        }
    }

    #[test]
    fn test_best_scores_first() {
        let outcomes = vec![
            outcome("Fe I", Ok(40.0)),
            outcome("Fe II", Ok(95.0)),
            outcome("Fe III", Err(MatchError::LengthMismatch { sample: 3, reference: 2 })),
        ];
        let table = format_matches(&outcomes, 1);
        assert!(table.contains("Fe II"));
        assert!(!table.contains("Fe I "));
        assert!(table.contains("Length mismatch"));
    }
}
