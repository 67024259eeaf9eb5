//! Plotting series derived from archived snapshots

use super::price::Price;

/// Which end of the price range an extremum track follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Highest buy price: an expensive buy is good for the seller
    Highest,
    /// Lowest sell price: a cheap sell is good for the buyer
    Lowest,
}

/// A single point on the chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotPoint {
    pub index: usize,
    pub label: String,
    pub buy: Price,
    pub sell: Price,
}

/// Best price seen so far, plus every later point that matched it.
/// The first point is the anchor; it only changes when the whole track resets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtremumTrack {
    pub direction: Direction,
    pub points: Vec<(usize, Price)>,
}

impl ExtremumTrack {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            points: Vec::new(),
        }
    }

    pub fn anchor(&self) -> Option<Price> {
        self.points.first().map(|&(_, value)| value)
    }
}

/// Consolidated series for one instrument over one archive partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlottedSeries {
    pub instrument: String,
    pub points: Vec<PlotPoint>,
    pub buy_max: ExtremumTrack,
    pub sell_min: ExtremumTrack,
}

impl PlottedSeries {
    pub fn new(instrument: &str) -> Self {
        Self {
            instrument: instrument.to_string(),
            points: Vec::new(),
            buy_max: ExtremumTrack::new(Direction::Highest),
            sell_min: ExtremumTrack::new(Direction::Lowest),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn indexes(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.index).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    pub fn buy_line(&self) -> Vec<(usize, Price)> {
        self.points.iter().map(|p| (p.index, p.buy)).collect()
    }

    pub fn sell_line(&self) -> Vec<(usize, Price)> {
        self.points.iter().map(|p| (p.index, p.sell)).collect()
    }
}
