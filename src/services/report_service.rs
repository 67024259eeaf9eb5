use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::archive::{Archive, Partition, PartitionFilter};
use crate::error::{KursError, Result};
use crate::models::{InstrumentSet, Price};
use crate::services::chart_service::{self, ChartCanvas};
use crate::services::series_service;

/// What was drawn for one instrument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSummary {
    pub instrument: String,
    pub points: usize,
    pub best_buy: Option<Price>,
    pub best_sell: Option<Price>,
    pub path: PathBuf,
}

#[derive(Debug)]
pub enum PartitionStatus {
    Charted(Vec<ChartSummary>),
    Empty,
    Failed(KursError),
}

#[derive(Debug)]
pub struct PartitionReport {
    pub partition: Partition,
    pub status: PartitionStatus,
}

/// Consolidate and draw one partition, one chart per instrument.
/// Returns `None` when the partition holds no records.
pub fn chart_partition<F, C>(
    archive: &Archive,
    partition: &Partition,
    instruments: &InstrumentSet,
    make_canvas: &F,
) -> Result<Option<Vec<ChartSummary>>>
where
    F: Fn(&str) -> C,
    C: ChartCanvas,
{
    let records = archive.load_partition(partition)?;
    if records.is_empty() {
        return Ok(None);
    }

    let mut summaries = Vec::new();
    for series in series_service::consolidate(&records, instruments)? {
        let path = chart_service::chart_path(archive.root(), partition, &series.instrument);
        info!("Creating image at {}", path.display());

        let mut canvas = make_canvas(&series.instrument);
        chart_service::render_series(&mut canvas, &series, &path)?;

        summaries.push(ChartSummary {
            instrument: series.instrument.clone(),
            points: series.points.len(),
            best_buy: series.buy_max.anchor(),
            best_sell: series.sell_min.anchor(),
            path,
        });
    }

    Ok(Some(summaries))
}

/// Chart every partition selected by `filter`.
/// A failing partition is reported and does not stop the others.
pub fn chart_archive<F, C>(
    archive: &Archive,
    filter: &PartitionFilter,
    instruments: &InstrumentSet,
    make_canvas: F,
) -> Result<Vec<PartitionReport>>
where
    F: Fn(&str) -> C,
    C: ChartCanvas,
{
    let mut partitions = archive.partitions(filter)?;
    if partitions.is_empty() {
        match filter.exact() {
            Some(partition) => partitions.push(partition),
            None => warn!("No archive partitions match the selection"),
        }
    }

    let mut reports = Vec::new();
    for partition in partitions {
        let status = match chart_partition(archive, &partition, instruments, &make_canvas) {
            Ok(Some(summaries)) => PartitionStatus::Charted(summaries),
            Ok(None) => {
                warn!("No records found for partition {}", partition);
                PartitionStatus::Empty
            }
            Err(e) => {
                error!("Failed to chart partition {}: {}", partition, e);
                PartitionStatus::Failed(e)
            }
        };
        reports.push(PartitionReport { partition, status });
    }

    Ok(reports)
}

/// 0 when everything was charted, 1 if any partition failed,
/// 2 if something was empty (including an empty selection)
pub fn exit_code(reports: &[PartitionReport]) -> u8 {
    if reports
        .iter()
        .any(|r| matches!(r.status, PartitionStatus::Failed(_)))
    {
        1
    } else if reports.is_empty()
        || reports
            .iter()
            .any(|r| matches!(r.status, PartitionStatus::Empty))
    {
        2
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Quote, SnapshotRecord};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;

    use plotters::style::RGBColor;

    struct NullCanvas;

    impl ChartCanvas for NullCanvas {
        fn set_ticks(&mut self, _: &[usize], _: &[String]) {}
        fn plot_line(&mut self, _: &str, _: RGBColor, _: &[(usize, Price)]) {}
        fn plot_markers(&mut self, _: RGBColor, _: &[(usize, Price)]) {}
        fn save(&mut self, _: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn null_canvas(_: &str) -> NullCanvas {
        NullCanvas
    }

    fn record(month: u32, hour: u32, usd: i64, eur: i64) -> SnapshotRecord {
        let timestamp = NaiveDate::from_ymd_opt(2020, month, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        let mut quotes = BTreeMap::new();
        quotes.insert(
            "usd/uah".to_string(),
            Quote { buy: Price::whole(usd), sell: Price::whole(usd + 20) },
        );
        quotes.insert(
            "eur/uah".to_string(),
            Quote { buy: Price::whole(eur), sell: Price::whole(eur + 25) },
        );
        SnapshotRecord::new(timestamp, quotes)
    }

    #[test]
    fn test_charts_every_instrument() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());
        archive.write(&record(3, 9, 2700, 3050)).unwrap();
        archive.write(&record(3, 10, 2710, 3040)).unwrap();

        let reports = chart_archive(
            &archive,
            &PartitionFilter::default(),
            &InstrumentSet::default(),
            null_canvas,
        )
        .unwrap();

        assert_eq!(reports.len(), 1);
        let PartitionStatus::Charted(summaries) = &reports[0].status else {
            panic!("unexpected status: {:?}", reports[0].status);
        };
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].instrument, "usd");
        assert_eq!(summaries[0].points, 2);
        assert_eq!(summaries[0].best_buy, Some(Price::whole(2710)));
        assert_eq!(summaries[1].best_sell, Some(Price::whole(3065)));
        assert!(summaries[1].path.ends_with("year_2020/euro_2020_03.png"));
        assert_eq!(exit_code(&reports), 0);
    }

    #[test]
    fn test_failed_partition_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());
        archive.write(&record(3, 9, 2700, 3050)).unwrap();
        let broken = Partition::new(2020, 2).dir(dir.path());
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("2020_02_01__09_00_00.json"), "not json").unwrap();

        let reports = chart_archive(
            &archive,
            &PartitionFilter::default(),
            &InstrumentSet::default(),
            null_canvas,
        )
        .unwrap();

        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[0].status, PartitionStatus::Failed(_)));
        assert!(matches!(reports[1].status, PartitionStatus::Charted(_)));
        assert_eq!(exit_code(&reports), 1);
    }

    #[test]
    fn test_requested_missing_partition_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());
        let filter = PartitionFilter { year: Some(2021), month: Some(1) };

        let reports = chart_archive(&archive, &filter, &InstrumentSet::default(), null_canvas).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].status, PartitionStatus::Empty));
        assert_eq!(exit_code(&reports), 2);
    }

    #[test]
    fn test_empty_selection_signals_warning() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path());
        let filter = PartitionFilter { year: Some(2021), month: None };

        let reports = chart_archive(&archive, &filter, &InstrumentSet::default(), null_canvas).unwrap();
        assert!(reports.is_empty());
        assert_eq!(exit_code(&reports), 2);
    }
}
