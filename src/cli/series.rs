use super::ui;
use crate::core::series::DATE_FORMAT;
use crate::core::{InflationTable, SeriesProvider};
use anyhow::{Context, Result, bail};
use comfy_table::Cell;
use futures::future::join_all;
use std::path::Path;
use tracing::info;

/// Fetches every series concurrently and prints an overview of each.
///
/// With `output`, the single requested series is also written as CSV.
pub async fn run(
    provider: &dyn SeriesProvider,
    series_ids: &[String],
    output: Option<&Path>,
) -> Result<Vec<Result<InflationTable>>> {
    if output.is_some() && series_ids.len() != 1 {
        bail!("--output needs exactly one series, got {}", series_ids.len());
    }

    let pb = ui::new_progress_bar(series_ids.len() as u64);
    let futures = series_ids.iter().map(|id| {
        let pb = pb.clone();
        async move {
            let res = provider.fetch_series(id).await;
            pb.inc(1);
            res
        }
    });
    let results = join_all(futures).await;
    pb.finish_and_clear();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Series"),
        ui::header_cell("Observations"),
        ui::header_cell("First"),
        ui::header_cell("Last"),
        ui::header_cell("Latest index"),
    ]);
    for (id, result) in series_ids.iter().zip(&results) {
        match result {
            Ok(series) => table.add_row(vec![
                Cell::new(id),
                Cell::new(series.len()),
                ui::format_optional_cell(series.first(), |p| {
                    p.date.format(DATE_FORMAT).to_string()
                }),
                ui::format_optional_cell(series.last(), |p| {
                    p.date.format(DATE_FORMAT).to_string()
                }),
                ui::format_optional_cell(series.last(), |p| format!("{:.3}", p.index)),
            ]),
            Err(e) => table.add_row(vec![
                Cell::new(id),
                Cell::new(ui::style_text(&format!("{e:#}"), ui::StyleType::Error)),
            ]),
        };
    }
    println!("{table}");

    if let (Some(path), Some(Ok(series))) = (output, results.first()) {
        write_csv(series, path)?;
        info!("Wrote {} observations to {}", series.len(), path.display());
    }

    Ok(results)
}

pub fn write_csv(series: &InflationTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    writer.write_record(["date", "index"])?;
    for point in series.points() {
        writer.write_record([
            point.date.format(DATE_FORMAT).to_string(),
            point.index.to_string(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}
