use crate::error::Result;
use crate::models::{
    Direction, ExtremumTrack, InstrumentSet, Observation, PlotPoint, PlottedSeries, Price,
    SnapshotRecord,
};

/// Axis label format for plotted points
pub const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

impl ExtremumTrack {
    /// Record `value` seen at `index`.
    ///
    /// Compared against the anchor (first point), not the latest one:
    /// strictly better resets the track, equal extends the plateau,
    /// worse leaves it untouched.
    pub fn observe(&mut self, index: usize, value: Price) {
        let Some(anchor) = self.anchor() else {
            self.points.push((index, value));
            return;
        };

        let better = match self.direction {
            Direction::Highest => value > anchor,
            Direction::Lowest => value < anchor,
        };

        if better {
            self.points.clear();
            self.points.push((index, value));
        } else if value == anchor {
            self.points.push((index, value));
        }
    }
}

/// Incrementally consolidates one instrument's observations
pub struct SeriesBuilder {
    series: PlottedSeries,
}

impl SeriesBuilder {
    pub fn new(instrument: &str) -> Self {
        Self {
            series: PlottedSeries::new(instrument),
        }
    }

    /// Feed the next observation in chronological order
    pub fn push(&mut self, observation: &Observation) {
        let label = observation.timestamp.format(LABEL_FORMAT).to_string();

        // A price is steady once it matched the two previous plotted points
        let steady = match self.series.points.as_slice() {
            [.., before_last, last] => {
                before_last.buy == observation.buy
                    && last.buy == observation.buy
                    && before_last.sell == observation.sell
                    && last.sell == observation.sell
            }
            _ => false,
        };

        let index = if steady {
            let last = self.series.points.len() - 1;
            let point = &mut self.series.points[last];
            point.label = label;
            point.buy = observation.buy;
            point.sell = observation.sell;
            point.index
        } else {
            let index = self.series.points.len() + 1;
            self.series.points.push(PlotPoint {
                index,
                label,
                buy: observation.buy,
                sell: observation.sell,
            });
            index
        };

        self.series.buy_max.observe(index, observation.buy);
        self.series.sell_min.observe(index, observation.sell);
    }

    pub fn finish(self) -> PlottedSeries {
        self.series
    }
}

/// Build one plotting series per instrument from a partition's records.
///
/// Records are ordered by their own timestamps first; the result depends on
/// that order. A record lacking any tracked pair fails the whole partition.
pub fn consolidate(
    records: &[SnapshotRecord],
    instruments: &InstrumentSet,
) -> Result<Vec<PlottedSeries>> {
    let mut ordered: Vec<&SnapshotRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.timestamp);

    let mut builders: Vec<SeriesBuilder> = instruments
        .iter()
        .map(|instrument| SeriesBuilder::new(&instrument.id))
        .collect();

    for record in ordered {
        for (instrument, builder) in instruments.iter().zip(builders.iter_mut()) {
            let observation = record.observation(instrument)?;
            builder.push(&observation);
        }
    }

    Ok(builders.into_iter().map(SeriesBuilder::finish).collect())
}
