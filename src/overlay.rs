//! Overlay compositing.
//!
//! Draws the active jewelry category's sprite at the smoothed anchor positions. All offsets
//! and sizes here are empirically tuned placement constants tied to the anchor landmarks,
//! not derived from face geometry.

use nalgebra::Point2;

use crate::{
    anchor::{AnchorSmoother, Feature},
    assets::AssetStore,
    image::{Color, Image, Rect},
};

/// Number of selectable catalog entries per category.
pub const CATALOG_SIZE: u32 = 12;

/// On-screen size of one earring sprite, in pixels.
const EARRING_SIZE: (u32, u32) = (100, 100);
/// On-screen size of the necklace sprite, in pixels.
const NECKLACE_SIZE: (u32, u32) = (200, 100);

/// Horizontal shift of the left earring sprite relative to the left ear anchor.
const LEFT_EARRING_OFFSET_X: f32 = -60.0;
/// Horizontal shift of the right earring sprite relative to the right ear anchor.
const RIGHT_EARRING_OFFSET_X: f32 = -20.0;
/// Horizontal shift of the necklace sprite relative to the chin anchor.
const NECKLACE_OFFSET_X: f32 = -100.0;

/// A jewelry category that can be tried on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Earring,
    Necklace,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Earring, Category::Necklace];

    /// The singular category name used in catalog file names.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Earring => "earring",
            Category::Necklace => "necklace",
        }
    }

    /// The directory holding this category's art, relative to the asset root.
    pub fn dir(&self) -> &'static str {
        match self {
            Category::Earring => "earrings",
            Category::Necklace => "necklaces",
        }
    }

    /// The file name of the `n`-th catalog entry (1-based, `n <= CATALOG_SIZE`).
    pub fn catalog_entry(&self, n: u32) -> String {
        format!("{}{}.png", self.name(), n)
    }
}

/// Computes where `category`'s sprite should be drawn given the current smoothed anchors.
///
/// Earrings anchor to both ears and a side whose anchor is unavailable is skipped; the
/// necklace anchors to the chin. Anchors are rounded to whole pixels.
pub fn placements(category: Category, anchors: &AnchorSmoother) -> Vec<Rect> {
    let sized = |anchor: Point2<f32>, offset_x: f32, size: (u32, u32)| {
        Rect::from_top_left(
            (anchor.x + offset_x).round() as i32,
            anchor.y.round() as i32,
            size.0,
            size.1,
        )
    };

    match category {
        Category::Earring => [
            (Feature::LeftEar, LEFT_EARRING_OFFSET_X),
            (Feature::RightEar, RIGHT_EARRING_OFFSET_X),
        ]
        .iter()
        .filter_map(|&(feature, offset_x)| {
            Some(sized(anchors.smoothed(feature)?, offset_x, EARRING_SIZE))
        })
        .collect(),
        Category::Necklace => anchors
            .smoothed(Feature::Chin)
            .map(|anchor| sized(anchor, NECKLACE_OFFSET_X, NECKLACE_SIZE))
            .into_iter()
            .collect(),
    }
}

/// Draws the active category's sprite onto `target` at its placements.
///
/// Nothing is drawn when no mode is active, when the active category's asset has not loaded
/// yet, or when the needed anchors are unavailable. An inactive category never draws, even
/// with a loaded asset.
pub fn composite(
    target: &mut Image,
    mode: Option<Category>,
    assets: &AssetStore,
    anchors: &AnchorSmoother,
) {
    let category = match mode {
        Some(category) => category,
        None => return,
    };
    let sprite = match assets.loaded(category) {
        Some(sprite) => sprite,
        None => return,
    };

    for rect in placements(category, anchors) {
        target.blend(sprite, rect);
    }
}

/// Clears `target` and recomposites the overlay onto it.
pub fn render(
    target: &mut Image,
    mode: Option<Category>,
    assets: &AssetStore,
    anchors: &AnchorSmoother,
) {
    target.clear(Color::NULL);
    composite(target, mode, assets, anchors);
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;

    use super::*;

    #[test]
    fn catalog_naming() {
        assert_eq!(Category::Earring.dir(), "earrings");
        assert_eq!(Category::Necklace.catalog_entry(7), "necklace7.png");
        assert_eq!(Category::Earring.catalog_entry(1), "earring1.png");
    }

    #[test]
    fn earring_placements() {
        let mut anchors = AnchorSmoother::new();
        anchors.push(Feature::LeftEar, Point2::new(100.0, 200.0));
        anchors.push(Feature::RightEar, Point2::new(300.0, 200.0));

        assert_eq!(
            placements(Category::Earring, &anchors),
            vec![
                Rect::from_top_left(40, 200, 100, 100),
                Rect::from_top_left(280, 200, 100, 100),
            ]
        );
    }

    #[test]
    fn earring_skips_unavailable_side() {
        let mut anchors = AnchorSmoother::new();
        anchors.push(Feature::RightEar, Point2::new(300.0, 200.0));

        assert_eq!(
            placements(Category::Earring, &anchors),
            vec![Rect::from_top_left(280, 200, 100, 100)]
        );
    }

    #[test]
    fn necklace_placement() {
        let mut anchors = AnchorSmoother::new();
        anchors.push(Feature::Chin, Point2::new(200.0, 300.0));

        assert_eq!(
            placements(Category::Necklace, &anchors),
            vec![Rect::from_top_left(100, 300, 200, 100)]
        );
        assert_eq!(placements(Category::Earring, &anchors), vec![]);
    }

    #[test]
    fn no_anchors_no_placements() {
        let anchors = AnchorSmoother::new();
        assert!(placements(Category::Earring, &anchors).is_empty());
        assert!(placements(Category::Necklace, &anchors).is_empty());
    }
}
