use std::collections::HashMap;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::archive::Partition;
use crate::error::{KursError, Result};
use crate::models::{PlottedSeries, Price};

pub const BUY_COLOR: RGBColor = RED;
pub const SELL_COLOR: RGBColor = BLUE;

/// Anything a consolidated series can be drawn onto
pub trait ChartCanvas {
    /// Label the x axis at `indexes` with the matching `labels`
    fn set_ticks(&mut self, indexes: &[usize], labels: &[String]);
    fn plot_line(&mut self, name: &str, color: RGBColor, points: &[(usize, Price)]);
    fn plot_markers(&mut self, color: RGBColor, points: &[(usize, Price)]);
    fn save(&mut self, path: &Path) -> Result<()>;
}

/// `<root>/year_YYYY/<instrument>_YYYY_MM.png`
pub fn chart_path(root: &Path, partition: &Partition, instrument: &str) -> PathBuf {
    root.join(partition.year_dir_name()).join(format!(
        "{}_{}_{:02}.png",
        instrument, partition.year, partition.month
    ))
}

/// Draw a series: buy/sell lines plus markers where the best prices occurred
pub fn render_series<C: ChartCanvas>(canvas: &mut C, series: &PlottedSeries, path: &Path) -> Result<()> {
    if series.is_empty() {
        return Err(KursError::Chart(format!(
            "no points to draw for '{}'",
            series.instrument
        )));
    }

    canvas.set_ticks(&series.indexes(), &series.labels());
    canvas.plot_line("They sell", SELL_COLOR, &series.sell_line());
    canvas.plot_line("They buy", BUY_COLOR, &series.buy_line());

    // Useful extremums: cheap selling, expensive buying
    canvas.plot_markers(SELL_COLOR, &series.sell_min.points);
    canvas.plot_markers(BUY_COLOR, &series.buy_max.points);

    canvas.save(path)
}

type Points = Vec<(i32, f64)>;

fn to_points(points: &[(usize, Price)]) -> Points {
    points
        .iter()
        .map(|&(index, price)| (index as i32, price.as_f64()))
        .collect()
}

/// PNG chart drawn with plotters' bitmap backend.
/// Drawing calls are buffered and rendered in one go by `save`.
pub struct PlottersCanvas {
    width: u32,
    height: u32,
    caption: String,
    y_desc: String,
    ticks: HashMap<i32, String>,
    lines: Vec<(String, RGBColor, Points)>,
    markers: Vec<(RGBColor, Points)>,
}

impl PlottersCanvas {
    pub fn new(width: u32, height: u32, caption: &str, y_desc: &str) -> Self {
        Self {
            width,
            height,
            caption: caption.to_string(),
            y_desc: y_desc.to_string(),
            ticks: HashMap::new(),
            lines: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Canvas titled for one instrument, e.g. "USD rates"
    pub fn for_instrument(instrument: &str, width: u32, height: u32) -> Self {
        let upper = instrument.to_uppercase();
        Self::new(
            width,
            height,
            &format!("{} rates", upper),
            &format!("Hryvnas / 100 {}", upper),
        )
    }

    fn x_range(&self) -> (i32, i32) {
        let xs = self
            .lines
            .iter()
            .flat_map(|(_, _, points)| points.iter().map(|p| p.0))
            .chain(self.ticks.keys().copied());
        let (min, max) = xs.fold((i32::MAX, i32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        if min > max {
            (0, 1)
        } else {
            (min - 1, max + 1)
        }
    }

    fn y_range(&self) -> (f64, f64) {
        let ys: Vec<f64> = self
            .lines
            .iter()
            .flat_map(|(_, _, points)| points.iter())
            .chain(self.markers.iter().flat_map(|(_, points)| points.iter()))
            .map(|p| p.1)
            .collect();
        if ys.is_empty() {
            return (0.0, 1.0);
        }
        let min = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Pad so markers don't get clipped by the axes; a flat line still
        // gets a band proportional to its level
        let price_range = (max - min).max(max.abs() * 0.01).max(1e-8);
        let padding = price_range * 0.05;
        ((min - padding).max(0.0), max + padding)
    }
}

impl ChartCanvas for PlottersCanvas {
    fn set_ticks(&mut self, indexes: &[usize], labels: &[String]) {
        self.ticks = indexes
            .iter()
            .zip(labels)
            .map(|(&index, label)| (index as i32, label.clone()))
            .collect();
    }

    fn plot_line(&mut self, name: &str, color: RGBColor, points: &[(usize, Price)]) {
        self.lines.push((name.to_string(), color, to_points(points)));
    }

    fn plot_markers(&mut self, color: RGBColor, points: &[(usize, Price)]) {
        self.markers.push((color, to_points(points)));
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let (x_min, x_max) = self.x_range();
        let (y_min, y_max) = self.y_range();

        let backend = BitMapBackend::new(path, (self.width, self.height));
        let root = backend.into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| KursError::Chart(format!("Failed to fill canvas: {}", e)))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.caption, ("sans-serif", 24.0).into_font())
            .margin(15)
            .x_label_area_size(110)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| KursError::Chart(format!("Failed to build chart: {}", e)))?;

        let ticks = &self.ticks;
        chart
            .configure_mesh()
            .x_labels(ticks.len() + 2)
            .x_label_formatter(&|x: &i32| ticks.get(x).cloned().unwrap_or_default())
            .x_label_style(("sans-serif", 11).into_font().transform(FontTransform::Rotate90))
            .bold_line_style(&RGBColor(128, 128, 128).mix(0.5))
            .x_desc("Date")
            .y_desc(&self.y_desc)
            .draw()
            .map_err(|e| KursError::Chart(format!("Failed to draw mesh: {}", e)))?;

        for (name, color, points) in &self.lines {
            let color = *color;
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                .map_err(|e| KursError::Chart(format!("Failed to draw line: {}", e)))?
                .label(name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        for (color, points) in &self.markers {
            let color = *color;
            chart
                .draw_series(points.iter().map(|&point| Circle::new(point, 4, color.filled())))
                .map_err(|e| KursError::Chart(format!("Failed to draw markers: {}", e)))?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| KursError::Chart(format!("Failed to draw legend: {}", e)))?;

        root.present()
            .map_err(|e| KursError::Chart(format!("Failed to render chart: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use crate::services::series_service::SeriesBuilder;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct RecordingCanvas {
        ticks: Vec<(usize, String)>,
        lines: Vec<(String, RGBColor, Vec<(usize, Price)>)>,
        markers: Vec<(RGBColor, Vec<(usize, Price)>)>,
        saved: Option<PathBuf>,
    }

    impl ChartCanvas for RecordingCanvas {
        fn set_ticks(&mut self, indexes: &[usize], labels: &[String]) {
            self.ticks = indexes.iter().copied().zip(labels.iter().cloned()).collect();
        }

        fn plot_line(&mut self, name: &str, color: RGBColor, points: &[(usize, Price)]) {
            self.lines.push((name.to_string(), color, points.to_vec()));
        }

        fn plot_markers(&mut self, color: RGBColor, points: &[(usize, Price)]) {
            self.markers.push((color, points.to_vec()));
        }

        fn save(&mut self, path: &Path) -> Result<()> {
            self.saved = Some(path.to_path_buf());
            Ok(())
        }
    }

    fn sample_series() -> PlottedSeries {
        let mut builder = SeriesBuilder::new("usd");
        for (hour, buy, sell) in [(9, 2700, 2720), (10, 2710, 2715)] {
            builder.push(&Observation {
                timestamp: NaiveDate::from_ymd_opt(2020, 3, 1)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap(),
                instrument: "usd".to_string(),
                buy: Price::whole(buy),
                sell: Price::whole(sell),
            });
        }
        builder.finish()
    }

    #[test]
    fn test_render_series_draws_lines_and_markers() {
        let series = sample_series();
        let mut canvas = RecordingCanvas::default();
        render_series(&mut canvas, &series, Path::new("usd.png")).unwrap();

        assert_eq!(
            canvas.ticks,
            vec![(1, "2020-03-01 09:00".to_string()), (2, "2020-03-01 10:00".to_string())]
        );
        let names: Vec<&str> = canvas.lines.iter().map(|l| l.0.as_str()).collect();
        assert_eq!(names, vec!["They sell", "They buy"]);
        assert_eq!(canvas.lines[1].2, vec![(1, Price::whole(2700)), (2, Price::whole(2710))]);
        assert_eq!(canvas.markers[0], (SELL_COLOR, vec![(2, Price::whole(2715))]));
        assert_eq!(canvas.markers[1], (BUY_COLOR, vec![(2, Price::whole(2710))]));
        assert_eq!(canvas.saved, Some(PathBuf::from("usd.png")));
    }

    #[test]
    fn test_empty_series_is_not_drawn() {
        let mut canvas = RecordingCanvas::default();
        let err = render_series(&mut canvas, &PlottedSeries::new("usd"), Path::new("usd.png"));
        assert!(err.is_err());
        assert!(canvas.saved.is_none());
    }

    #[test]
    fn test_chart_path() {
        let path = chart_path(Path::new("data"), &Partition::new(2020, 3), "euro");
        assert_eq!(path, PathBuf::from("data/year_2020/euro_2020_03.png"));
    }

    #[test]
    fn test_plotters_canvas_ranges() {
        let mut canvas = PlottersCanvas::for_instrument("usd", 1800, 460);
        let series = sample_series();
        canvas.set_ticks(&series.indexes(), &series.labels());
        canvas.plot_line("They buy", BUY_COLOR, &series.buy_line());
        assert_eq!(canvas.caption, "USD rates");
        assert_eq!(canvas.x_range(), (0, 3));
        let (low, high) = canvas.y_range();
        assert!(low < 2700.0 && high > 2710.0);
    }

    #[test]
    fn test_sub_unit_prices_keep_their_scale() {
        let mut canvas = PlottersCanvas::for_instrument("rub", 1800, 460);
        let points = [(1, Price::from_minor(416)), (2, Price::from_minor(424))];
        canvas.plot_line("They buy", BUY_COLOR, &points);

        let (low, high) = canvas.y_range();
        assert!(low < 0.416 && high > 0.424);
        assert!(high - low < 0.1, "range {}..{} swamps the prices", low, high);
    }
}
