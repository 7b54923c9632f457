//! Running aggregate values. Each state is updated in O(1) per record.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CountState {
    pub count: i64,
}

impl CountState {
    pub fn add(&mut self) { self.count += 1; }
    pub fn remove(&mut self) { self.count -= 1; }
}

/// `ratio` is `numerator / denominator`, or 0 when the denominator is 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatioState {
    pub numerator: i64,
    pub denominator: i64,
    pub ratio: f64,
}

impl RatioState {
    /// `in_scope`: the record belongs to the population being measured.
    /// `hit`: the record also satisfies the counted condition.
    pub fn add(&mut self, in_scope: bool, hit: bool) {
        if !in_scope {
            return;
        }
        self.denominator += 1;
        if hit {
            self.numerator += 1;
        }
        self.ratio = ratio_of(self.numerator, self.denominator);
    }

    /// Once the denominator reaches zero the numerator and ratio are reset,
    /// but the denominator keeps its decremented value.
    pub fn remove(&mut self, in_scope: bool, hit: bool) {
        if !in_scope {
            return;
        }
        self.denominator -= 1;
        if self.denominator > 0 {
            if hit {
                self.numerator -= 1;
            }
            self.ratio = ratio_of(self.numerator, self.denominator);
        } else {
            self.numerator = 0;
            self.ratio = 0.0;
        }
    }
}

fn ratio_of(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

/// `mean` is `sum / count`, or 0 when nothing is counted. A non-numeric
/// input turns `sum` and `mean` into NaN until the group empties.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MeanState {
    pub count: i64,
    pub sum: f64,
    pub mean: f64,
}

impl MeanState {
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.mean = self.sum / self.count as f64;
    }

    pub fn remove(&mut self, value: f64) {
        self.count -= 1;
        if self.count > 0 {
            self.sum -= value;
            self.mean = self.sum / self.count as f64;
        } else {
            self.sum = 0.0;
            self.mean = 0.0;
        }
    }
}

/// Per-group accumulator. The variant is fixed by the reducer that created it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateState {
    Count(CountState),
    Ratio(RatioState),
    Mean(MeanState),
}

impl AggregateState {
    /// The number a chart plots for this state: count, ratio, or mean.
    pub fn value(&self) -> f64 {
        match self {
            AggregateState::Count(s) => s.count as f64,
            AggregateState::Ratio(s) => s.ratio,
            AggregateState::Mean(s) => s.mean,
        }
    }

    pub fn as_count(&self) -> Option<&CountState> {
        match self { AggregateState::Count(s) => Some(s), _ => None }
    }

    pub fn as_ratio(&self) -> Option<&RatioState> {
        match self { AggregateState::Ratio(s) => Some(s), _ => None }
    }

    pub fn as_mean(&self) -> Option<&MeanState> {
        match self { AggregateState::Mean(s) => Some(s), _ => None }
    }
}
