use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::RiskAssessment;
use crate::orchestrator::Analysis;
use crate::summary::{self, ColumnSummary};

pub fn build_report(
    source: &str,
    generated_at: DateTime<Utc>,
    summaries: &[ColumnSummary],
    analysis: &Analysis,
    narrative: Option<&str>,
) -> String {
    let mut output = String::new();
    let observation = &analysis.observation;

    let _ = writeln!(output, "# Sales Analysis Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        source,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Observation");
    let _ = writeln!(output, "- Total revenue: {:.2}", observation.total_revenue);
    let _ = writeln!(output, "- Total quantity: {:.2}", observation.total_quantity);
    let _ = writeln!(output, "- Rows: {}", observation.row_count);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Underperformance Risk");
    match analysis.assessment {
        RiskAssessment::Scored { .. } => {
            let _ = writeln!(
                output,
                "- {} (model trained on {} labeled observations)",
                analysis.assessment, analysis.history_rows
            );
        }
        RiskAssessment::InsufficientHistory => {
            let _ = writeln!(output, "- Not enough history to score this dataset yet.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Column Summary");
    if summaries.is_empty() {
        let _ = writeln!(output, "No columns in this dataset.");
    } else {
        for line in summary::render(summaries).lines() {
            let _ = writeln!(output, "- {line}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## AI Summary");
    match narrative {
        Some(text) => {
            let _ = writeln!(output, "{}", text.trim_end());
        }
        None => {
            let _ = writeln!(output, "No model narrative for this run.");
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::dataset::Dataset;
    use crate::history::HistoryStore;
    use crate::orchestrator::Orchestrator;
    use chrono::TimeZone;

    fn analysis() -> (Dataset, Analysis) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        let settings = Settings::default();
        let dataset = Dataset::from_reader("ca,quantite\n100,5\n200,10\n".as_bytes()).unwrap();
        let analysis = Orchestrator::new(&store, &settings).assess(&dataset).unwrap();
        (dataset, analysis)
    }

    #[test]
    fn report_covers_every_section() {
        let (dataset, analysis) = analysis();
        let generated_at = Utc.with_ymd_and_hms(2026, 2, 2, 9, 30, 0).unwrap();
        let report = build_report(
            "ventes.csv",
            generated_at,
            &summary::describe(&dataset),
            &analysis,
            Some("Les ventes progressent."),
        );

        assert!(report.starts_with("# Sales Analysis Report\nGenerated for ventes.csv on 2026-02-02 09:30 UTC"));
        assert!(report.contains("- Total revenue: 300.00"));
        assert!(report.contains("- Rows: 2"));
        assert!(report.contains("Not enough history"));
        assert!(report.contains("- ca: count 2"));
        assert!(report.ends_with("Les ventes progressent.\n"));
    }

    #[test]
    fn missing_narrative_is_noted() {
        let (dataset, analysis) = analysis();
        let report = build_report("ventes.csv", Utc::now(), &summary::describe(&dataset), &analysis, None);
        assert!(report.contains("No model narrative for this run."));
    }
}
