use tracing::info;

use crate::archive::{Archive, PartitionFilter};
use crate::config::Config;
use crate::error::Result;
use crate::models::Price;
use crate::services::chart_service::PlottersCanvas;
use crate::services::report_service::{self, PartitionStatus};
use crate::utils::Table;

fn price_cell(price: Option<Price>) -> String {
    price.map_or_else(|| "-".to_string(), |p| p.to_string())
}

/// Returns the process exit code
pub fn execute(config: &Config, year: Option<i32>, month: Option<u32>) -> Result<u8> {
    info!("📈 Chart command called (year: {:?}, month: {:?})", year, month);

    let archive = Archive::new(&config.data_dir);
    let filter = PartitionFilter { year, month };
    let (width, height) = (config.chart_width, config.chart_height);
    info!("Charting {} instruments into {}", config.instruments.len(), archive.root().display());

    let reports = report_service::chart_archive(&archive, &filter, &config.instruments, |instrument| {
        PlottersCanvas::for_instrument(instrument, width, height)
    })?;

    let mut table = Table::new(vec![
        "Month",
        "Currency",
        "Points",
        "Best buy",
        "Best sell",
        "Chart",
    ]);
    for report in &reports {
        let month = report.partition.to_string();
        match &report.status {
            PartitionStatus::Charted(summaries) => {
                for summary in summaries {
                    table.add_row(vec![
                        month.clone(),
                        summary.instrument.clone(),
                        summary.points.to_string(),
                        price_cell(summary.best_buy),
                        price_cell(summary.best_sell),
                        summary.path.display().to_string(),
                    ]);
                }
            }
            PartitionStatus::Empty => {
                table.add_row(vec![
                    month,
                    "-".to_string(),
                    "0".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "⚠️ no records".to_string(),
                ]);
            }
            PartitionStatus::Failed(e) => {
                table.add_row(vec![
                    month,
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    format!("❌ {}", e),
                ]);
            }
        }
    }

    if table.is_empty() {
        println!("⚠️ Nothing to chart in {}", archive.root().display());
    } else {
        println!("{}", table.render());
    }

    Ok(report_service::exit_code(&reports))
}
