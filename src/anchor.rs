//! Anchor extraction and smoothing.
//!
//! An *anchor* is a pixel-space point that overlay art is placed relative to. Raw anchors are
//! derived from one landmark each and jump around from frame to frame with the detector's
//! noise, so a short per-feature history of them is averaged before anything is drawn.

use nalgebra::{Point2, Vector2};

use crate::{
    filter::SlidingMean,
    landmark::{Idx, Landmarks},
    resolution::Resolution,
};

/// Number of raw anchor positions averaged per feature.
pub const SMOOTHING_WINDOW: usize = 5;

/// Vertical lift applied to both ear anchors, in pixels.
///
/// Empirically tuned against the positions the face mesh reports for the jawline landmarks;
/// not derived from face geometry.
const EAR_LIFT: f32 = 20.0;

/// Vertical drop applied to the chin anchor, in pixels. Empirically tuned, like [`EAR_LIFT`].
const CHIN_DROP: f32 = 10.0;

/// A facial feature that overlay art can be anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    LeftEar,
    RightEar,
    Chin,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::LeftEar, Feature::RightEar, Feature::Chin];

    /// The landmark this feature's anchor is derived from.
    fn landmark(self) -> Idx {
        match self {
            Feature::LeftEar => Idx::LeftEar,
            Feature::RightEar => Idx::RightEar,
            Feature::Chin => Idx::Chin,
        }
    }

    /// The empirical pixel-space adjustment applied on top of the landmark position.
    fn nudge(self) -> Vector2<f32> {
        match self {
            Feature::LeftEar | Feature::RightEar => Vector2::new(0.0, -EAR_LIFT),
            Feature::Chin => Vector2::new(0.0, CHIN_DROP),
        }
    }
}

/// Computes the raw pixel-space anchor for `feature` from a landmark set.
///
/// Normalized landmark coordinates are scaled by the render target's `resolution`, then the
/// feature's vertical nudge is applied. Returns `None` when the landmark set does not cover
/// the feature's index.
pub fn extract(
    feature: Feature,
    landmarks: &Landmarks,
    resolution: Resolution,
) -> Option<Point2<f32>> {
    let norm = landmarks.position(feature.landmark().into())?;
    let pixel = Point2::new(
        norm.x * resolution.width() as f32,
        norm.y * resolution.height() as f32,
    );
    Some(pixel + feature.nudge())
}

/// Per-feature sliding-window smoother over raw anchors.
///
/// Histories are refreshed by new detections but never proactively cleared: after tracking
/// loss, the last known positions keep being reported until new detections displace them.
pub struct AnchorSmoother {
    windows: [SlidingMean; 3],
}

impl AnchorSmoother {
    pub fn new() -> Self {
        Self {
            windows: [
                SlidingMean::new(SMOOTHING_WINDOW),
                SlidingMean::new(SMOOTHING_WINDOW),
                SlidingMean::new(SMOOTHING_WINDOW),
            ],
        }
    }

    /// Appends a raw anchor to `feature`'s history, evicting the oldest entry once full.
    pub fn push(&mut self, feature: Feature, point: Point2<f32>) {
        self.windows[feature as usize].push(point);
    }

    /// Returns the smoothed anchor for `feature`, or `None` while its history is empty.
    pub fn smoothed(&self, feature: Feature) -> Option<Point2<f32>> {
        self.windows[feature as usize].mean()
    }
}

impl Default for AnchorSmoother {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::landmark::MESH_POINTS;

    use super::*;

    fn landmarks_with(entries: &[(Idx, Point2<f32>)]) -> Landmarks {
        let mut positions = vec![Point2::new(0.0, 0.0); MESH_POINTS];
        for &(idx, pos) in entries {
            positions[idx as usize] = pos;
        }
        Landmarks::new(positions)
    }

    #[test]
    fn extract_scales_and_nudges() {
        let res = Resolution::new(640, 480);
        let lms = landmarks_with(&[
            (Idx::LeftEar, Point2::new(0.25, 0.5)),
            (Idx::RightEar, Point2::new(0.75, 0.5)),
            (Idx::Chin, Point2::new(0.5, 0.875)),
        ]);

        let left = extract(Feature::LeftEar, &lms, res).unwrap();
        assert_relative_eq!(left.x, 160.0);
        assert_relative_eq!(left.y, 220.0); // 240 - 20

        let right = extract(Feature::RightEar, &lms, res).unwrap();
        assert_relative_eq!(right.x, 480.0);
        assert_relative_eq!(right.y, 220.0);

        let chin = extract(Feature::Chin, &lms, res).unwrap();
        assert_relative_eq!(chin.x, 320.0);
        assert_relative_eq!(chin.y, 430.0); // 420 + 10
    }

    #[test]
    fn extract_requires_the_feature_index() {
        let res = Resolution::new(640, 480);
        let truncated = Landmarks::new(vec![Point2::new(0.5, 0.5); 140]);

        // 132 is covered, 152 and 361 are not
        assert!(extract(Feature::LeftEar, &truncated, res).is_some());
        assert_eq!(extract(Feature::Chin, &truncated, res), None);
        assert_eq!(extract(Feature::RightEar, &truncated, res), None);
    }

    #[test]
    fn features_are_smoothed_independently() {
        let mut smoother = AnchorSmoother::new();
        smoother.push(Feature::LeftEar, Point2::new(10.0, 10.0));
        smoother.push(Feature::LeftEar, Point2::new(20.0, 30.0));

        assert_eq!(
            smoother.smoothed(Feature::LeftEar),
            Some(Point2::new(15.0, 20.0))
        );
        assert_eq!(smoother.smoothed(Feature::RightEar), None);
        assert_eq!(smoother.smoothed(Feature::Chin), None);
    }

    #[test]
    fn window_slides_after_five_pushes() {
        let mut smoother = AnchorSmoother::new();
        for i in 0..5 {
            smoother.push(Feature::Chin, Point2::new(i as f32 * 5.0, 0.0));
        }
        // mean of 0, 5, 10, 15, 20
        assert_eq!(smoother.smoothed(Feature::Chin), Some(Point2::new(10.0, 0.0)));

        smoother.push(Feature::Chin, Point2::new(25.0, 0.0));
        // the first push no longer contributes
        assert_eq!(smoother.smoothed(Feature::Chin), Some(Point2::new(15.0, 0.0)));
    }
}