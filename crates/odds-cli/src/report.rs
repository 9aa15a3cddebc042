use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use thiserror::Error;

use odds_core::model::starting::StartingCard;
use odds_core::odds::OddsTables;
use odds_core::odds::serialization::OddsSnapshot;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize odds snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Write the conditional-outcome and expected-value tables as markdown,
/// starting-card groups in presentation order 2-10 then Ace.
pub fn write_summary_markdown(
    tables: &OddsTables,
    path: impl AsRef<Path>,
) -> Result<(), ReportError> {
    let outcomes = tables.outcome_keys();

    let mut rows = String::new();
    rows.push_str(&format!(
        "# Dealer outcome odds (stand at {})\n\n",
        tables.stand_at()
    ));

    rows.push_str("| Up card |");
    for outcome in &outcomes {
        rows.push_str(&format!(" {outcome} |"));
    }
    rows.push('\n');
    rows.push_str("|---------|");
    for _ in &outcomes {
        rows.push_str("------|");
    }
    rows.push('\n');

    for &start in &StartingCard::ORDERED {
        rows.push_str(&format!("| {start} |"));
        for &outcome in &outcomes {
            let p = tables
                .distribution(start)
                .map(|distribution| distribution.probability(outcome))
                .unwrap_or(0.0);
            rows.push_str(&format!(" {p:.4} |"));
        }
        rows.push('\n');
    }

    rows.push_str("\n## Expected non-bust total\n\n");
    rows.push_str("| Up card | Expected total |\n");
    rows.push_str("|---------|----------------|\n");
    for &start in &StartingCard::ORDERED {
        rows.push_str(&format!(
            "| {start} | {:.3} |\n",
            tables.expected_value(start)
        ));
    }

    fs::write(path.as_ref(), rows).map_err(|e| ReportError::Io {
        context: "writing summary markdown",
        source: e,
    })?;
    Ok(())
}

/// Persist the core snapshot as pretty-printed JSON.
pub fn write_snapshot_json(tables: &OddsTables, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let json = OddsSnapshot::to_json(tables)?;
    fs::write(path.as_ref(), json).map_err(|e| ReportError::Io {
        context: "writing odds snapshot",
        source: e,
    })?;
    Ok(())
}

/// Render a bar chart of the expected-value table into `dir`.
pub fn render_expected_value_chart(
    tables: &OddsTables,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, ReportError> {
    let dir = dir.as_ref();
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).map_err(|e| ReportError::Io {
            context: "creating plots directory",
            source: e,
        })?;
    }

    let output_path = dir.join("expected_values.png");
    let stand_at = tables.stand_at();
    let values: Vec<(StartingCard, f64)> = StartingCard::ORDERED
        .iter()
        .map(|&start| (start, tables.expected_value(start)))
        .collect();

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));

    let plot_attempt = std::panic::catch_unwind(move || {
        let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        let y_max = values
            .iter()
            .map(|&(_, ev)| ev)
            .fold(0.0f64, |acc, v| acc.max(v));
        let margin = (y_max * 0.1).max(0.5);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                format!("Expected dealer total by up card (stand at {stand_at})"),
                ("sans-serif", 22),
            )
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 60)
            .build_cartesian_2d(0..values.len(), 0.0..(y_max + margin))
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_mesh()
            .y_desc("Expected non-bust total")
            .x_desc("Up card")
            .x_label_formatter(&|idx| {
                values
                    .get(*idx)
                    .map(|(start, _)| start.to_string())
                    .unwrap_or_default()
            })
            .draw()
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        chart
            .draw_series(values.iter().enumerate().map(|(idx, &(_, ev))| {
                Rectangle::new([(idx, 0.0), (idx + 1, ev)], BLUE.filled())
            }))
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        drop(chart);

        root.present()
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        drop(root);

        Ok(output_path)
    });

    std::panic::set_hook(prev_hook);

    match plot_attempt {
        Ok(result) => result,
        Err(_) => Err(ReportError::Plot(
            "plotters panicked while rendering (missing font support?)".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::write_summary_markdown;
    use odds_core::enumerate::enumerate_hands;
    use odds_core::odds::{DrawTable, aggregate};

    #[test]
    fn markdown_lists_every_group_and_bucket() {
        let hands = enumerate_hands(17).expect("enumerates");
        let tables = aggregate(&hands, &DrawTable::standard(), 17);
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("summary.md");

        write_summary_markdown(&tables, &path).expect("writes");
        let rendered = std::fs::read_to_string(&path).expect("readable");

        assert!(rendered.contains("stand at 17"));
        assert!(rendered.contains("| Ace |"));
        assert!(rendered.contains("| 2 |"));
        assert!(rendered.contains(" BUST |"));
        assert!(rendered.contains("## Expected non-bust total"));
    }
}
