use fxhash::FxHashSet;
use jiff::SignedDuration;

use crate::graph::{RoadSegment, SegmentIdx};
use crate::units::Kmh;

/// Travel weight in milliseconds.
pub type Weight = usize;

pub const MAX_WEIGHT: Weight = usize::MAX;

pub trait Weighting {
    fn segment_speed(&self, segment: &RoadSegment) -> Kmh;

    fn segment_duration(&self, segment: &RoadSegment) -> SignedDuration {
        segment.distance() / self.segment_speed(segment)
    }

    fn segment_weight(&self, segment: &RoadSegment, idx: SegmentIdx) -> Weight;
}

/// Weights every segment by its travel time at the road-class speed.
pub struct TravelTimeWeighting;

impl TravelTimeWeighting {
    pub fn new() -> Self {
        TravelTimeWeighting
    }
}

impl Default for TravelTimeWeighting {
    fn default() -> Self {
        TravelTimeWeighting::new()
    }
}

impl Weighting for TravelTimeWeighting {
    fn segment_speed(&self, segment: &RoadSegment) -> Kmh {
        segment.class().default_speed()
    }

    fn segment_weight(&self, segment: &RoadSegment, _idx: SegmentIdx) -> Weight {
        self.segment_duration(segment).as_millis() as Weight
    }
}

/// Wraps another weighting and inflates segments already used by earlier
/// candidates, steering the search towards genuine alternatives.
pub struct PenalizedWeighting<'a, W: Weighting> {
    inner: &'a W,
    penalized: FxHashSet<SegmentIdx>,
    factor: f64,
}

impl<'a, W: Weighting> PenalizedWeighting<'a, W> {
    pub fn new(inner: &'a W, factor: f64) -> Self {
        PenalizedWeighting {
            inner,
            penalized: FxHashSet::default(),
            factor,
        }
    }

    pub fn penalize(&mut self, segments: &[SegmentIdx]) {
        self.penalized.extend(segments.iter().copied());
    }
}

impl<W: Weighting> Weighting for PenalizedWeighting<'_, W> {
    fn segment_speed(&self, segment: &RoadSegment) -> Kmh {
        self.inner.segment_speed(segment)
    }

    fn segment_weight(&self, segment: &RoadSegment, idx: SegmentIdx) -> Weight {
        let base = self.inner.segment_weight(segment, idx);
        if self.penalized.contains(&idx) {
            (base as f64 * self.factor).round() as Weight
        } else {
            base
        }
    }
}
