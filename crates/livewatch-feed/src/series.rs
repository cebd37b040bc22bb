use livewatch_common::types::TimeSeriesPoint;
use std::collections::VecDeque;

pub const DEFAULT_SERIES_CAPACITY: usize = 60;

/// Fixed-capacity FIFO of chart points. Pushing into a full series evicts the
/// oldest point.
#[derive(Debug, Clone)]
pub struct BoundedSeries {
    points: VecDeque<TimeSeriesPoint>,
    capacity: usize,
}

impl BoundedSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a point, returning the evicted one if the series was full.
    pub fn push(&mut self, point: TimeSeriesPoint) -> Option<TimeSeriesPoint> {
        let evicted = if self.points.len() >= self.capacity {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back(point);
        evicted
    }

    /// Replaces the contents with `points` (oldest first), keeping only the
    /// newest `capacity` of them.
    pub fn reseed(&mut self, points: impl IntoIterator<Item = TimeSeriesPoint>) {
        self.points.clear();
        for point in points {
            self.push(point);
        }
    }

    /// Oldest first.
    pub fn points(&self) -> &VecDeque<TimeSeriesPoint> {
        &self.points
    }

    pub fn to_vec(&self) -> Vec<TimeSeriesPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&TimeSeriesPoint> {
        self.points.back()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for BoundedSeries {
    fn default() -> Self {
        Self::new(DEFAULT_SERIES_CAPACITY)
    }
}
