//! Facial landmark schema.
//!
//! Landmark detection itself happens in an external engine (MediaPipe's [Face Mesh] or a
//! compatible reimplementation); this module defines the per-frame data it hands over and the
//! [`Detector`] trait used to plug one in.
//!
//! [Face Mesh]: https://google.github.io/mediapipe/solutions/face_mesh.html

use nalgebra::Point2;

use crate::image::Image;

/// Number of points in the Face Mesh topology that the [`Idx`] indices refer to.
pub const MESH_POINTS: usize = 468;

/// A single face's landmark set.
///
/// Positions are normalized to `0..=1` relative to the frame they were detected in; convert to
/// pixels by multiplying with the render target's resolution.
#[derive(Debug, Clone, Default)]
pub struct Landmarks {
    positions: Vec<Point2<f32>>,
}

impl Landmarks {
    /// Creates a landmark set from normalized positions, indexed by mesh index.
    pub fn new(positions: Vec<Point2<f32>>) -> Self {
        Self { positions }
    }

    /// Returns the normalized position of the landmark at `index`.
    ///
    /// Returns `None` when this set does not cover `index`.
    pub fn position(&self, index: usize) -> Option<Point2<f32>> {
        self.positions.get(index).copied()
    }

    /// Returns the number of landmarks in this set.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Assigns a name to the landmark indices used for overlay placement.
///
/// Indices refer to the 468-point Face Mesh topology. "Left" and "Right" are relative to the
/// input image, not from the PoV of the depicted person.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idx {
    LeftEar = 132,
    Chin = 152,
    RightEar = 361,
}

impl Into<usize> for Idx {
    #[inline]
    fn into(self) -> usize {
        self as usize
    }
}

/// Produces facial landmark sets from camera frames.
///
/// Implement this to plug in a concrete detection engine. Detection is treated as a black box:
/// the pipeline only relies on the indices named by [`Idx`] being resolvable in the returned
/// set.
pub trait Detector {
    /// Runs landmark detection on `frame`.
    ///
    /// Returns the landmark set of the detected face, or `None` when no face is present. At
    /// most one face is reported per frame.
    fn detect(&mut self, frame: &Image) -> Option<Landmarks>;
}
