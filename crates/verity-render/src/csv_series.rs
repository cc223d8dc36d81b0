use std::fmt::Write as _;

use tracing::debug;
use verity_core::{ErrorInfo, ResultRecord, VerityError};

use crate::artifact::RenderedArtifact;
use crate::spec::{FigureKind, FigureSpec};
use crate::FigureRenderer;

fn render_error(code: &str, figure: &FigureSpec, message: impl Into<String>) -> VerityError {
    VerityError::Serde(ErrorInfo::new(code, message.into()).with_context("figure", figure.name.clone()))
}

/// Writes one record series as two-column CSV.
///
/// A `#` header names the evaluator, snapshot checksum and record hash so the
/// file can be traced back without the ledger. Values use the shortest
/// representation that round-trips to the same `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSeriesRenderer;

impl FigureRenderer for CsvSeriesRenderer {
    fn kind(&self) -> FigureKind {
        FigureKind::SeriesCsv
    }

    fn render(&self, figure: &FigureSpec, record: &ResultRecord) -> Result<RenderedArtifact, VerityError> {
        let name = figure
            .series
            .as_deref()
            .ok_or_else(|| render_error("render-spec", figure, "series figures must name a series"))?;
        let series = record.series(name).ok_or_else(|| {
            render_error(
                "render-missing-series",
                figure,
                format!("record from `{}` has no series `{name}`", record.evaluator()),
            )
        })?;

        let mut header = String::new();
        let _ = writeln!(header, "# figure: {}", figure.name);
        let _ = writeln!(header, "# evaluator: {}", record.evaluator());
        let _ = writeln!(header, "# snapshot_checksum: {}", record.snapshot_checksum());
        let _ = writeln!(header, "# record_hash: {}", record.record_hash());

        let mut wtr = csv::Writer::from_writer(header.into_bytes());
        wtr.write_record([
            format!("{} ({})", series.x_label, series.x_unit),
            format!("{name} ({})", series.y_unit),
        ])
        .map_err(|err| render_error("render-csv", figure, err.to_string()))?;
        for [x, y] in &series.points {
            wtr.write_record([x.to_string(), y.to_string()])
                .map_err(|err| render_error("render-csv", figure, err.to_string()))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|err| render_error("render-csv", figure, err.to_string()))?;
        debug!(figure = %figure.name, rows = series.len(), "rendered series csv");
        Ok(RenderedArtifact::new(
            &figure.name,
            "text/csv",
            bytes,
            record.evaluator().clone(),
            record.snapshot_checksum(),
            record.record_hash(),
        ))
    }
}
