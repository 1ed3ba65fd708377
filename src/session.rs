//! Frame loop orchestration.
//!
//! [`Session`] owns all mutable try-on state (active mode, selected assets, anchor histories,
//! render canvas) and drives extraction, smoothing and compositing for every detector result.
//! [`run`] wires a [`FrameSource`] and a [`Detector`] into that loop.

use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    anchor::{self, AnchorSmoother, Feature},
    assets::AssetStore,
    image::Image,
    landmark::{Detector, Landmarks},
    overlay::{self, Category, CATALOG_SIZE},
    resolution::Resolution,
    timer::{FpsCounter, Timer},
};

/// A virtual try-on session.
///
/// One of these lives for as long as the camera runs. Construction begins preloading both
/// categories' default assets; no mode is active until [`Session::select_mode`] is called, so
/// nothing is drawn initially.
pub struct Session {
    mode: Option<Category>,
    assets: AssetStore,
    smoother: AnchorSmoother,
    canvas: Option<Image>,
}

impl Session {
    /// Creates a session loading overlay art from `asset_root`.
    pub fn new<P: Into<PathBuf>>(asset_root: P) -> Result<Self, crate::Error> {
        Ok(Self {
            mode: None,
            assets: AssetStore::new(asset_root)?,
            smoother: AnchorSmoother::new(),
            canvas: None,
        })
    }

    /// Activates `category`'s try-on mode, replacing the previous mode.
    ///
    /// Previously loaded assets stay in memory: switching away and back re-renders them
    /// without a re-fetch.
    pub fn select_mode(&mut self, category: Category) {
        self.mode = Some(category);
    }

    /// The currently active category, if any.
    pub fn mode(&self) -> Option<Category> {
        self.mode
    }

    /// Begins switching `category`'s art to `file` (a file name inside the category's catalog
    /// directory).
    ///
    /// Returns immediately; the new image becomes visible once it has decoded. On failure the
    /// current image stays active.
    pub fn select_asset(&mut self, category: Category, file: &str) {
        self.assets.select(category, file);
    }

    /// Begins switching `category`'s art to catalog entry `n` (1-based).
    ///
    /// Out-of-catalog entries are ignored.
    pub fn select_catalog_entry(&mut self, category: Category, n: u32) {
        if !(1..=CATALOG_SIZE).contains(&n) {
            log::warn!(
                "ignoring out-of-catalog selection {} for {}",
                n,
                category.name()
            );
            return;
        }
        self.assets.select(category, &category.catalog_entry(n));
    }

    /// Sizes the render target to the camera's native resolution.
    ///
    /// Until a non-empty resolution has been established, [`Session::advance`] does nothing.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        if resolution.is_empty() {
            log::warn!("ignoring empty render target resolution {}", resolution);
            return;
        }
        self.canvas = Some(Image::new(resolution.width(), resolution.height()));
    }

    /// Processes one detector result and recomposites the overlay canvas.
    ///
    /// When no face was detected, no anchors are pushed this frame and the smoothed positions
    /// derived from earlier frames keep being used. Returns the canvas, or `None` while the
    /// render target's dimensions are not established yet.
    pub fn advance(&mut self, detection: Option<&Landmarks>) -> Option<&Image> {
        self.assets.poll();

        let canvas = self.canvas.as_mut()?;
        if let Some(landmarks) = detection {
            let resolution = canvas.resolution();
            for feature in Feature::ALL {
                if let Some(raw) = anchor::extract(feature, landmarks, resolution) {
                    self.smoother.push(feature, raw);
                }
            }
        }

        overlay::render(canvas, self.mode, &self.assets, &self.smoother);
        Some(&*canvas)
    }

    /// Composites the current overlay over a copy of `frame`, using the latest smoothed
    /// anchors.
    pub fn snapshot(&self, frame: &Image) -> Image {
        let mut shot = frame.clone();
        overlay::composite(&mut shot, self.mode, &self.assets, &self.smoother);
        shot
    }

    /// Writes a snapshot of `frame` plus the current overlay into `dir` as
    /// `jewelry-tryon-{timestamp}.png` and returns the path written.
    pub fn save_snapshot(&self, frame: &Image, dir: &Path) -> Result<PathBuf, crate::Error> {
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
        let path = dir.join(format!("jewelry-tryon-{timestamp}.png"));
        self.snapshot(frame).save(&path)?;
        Ok(path)
    }
}

/// A source of camera frames.
pub trait FrameSource {
    /// Native resolution of the frames this source produces.
    ///
    /// Reported once on stream start; the render target is sized to match.
    fn resolution(&self) -> Resolution;

    /// Reads the next frame, blocking until one is available.
    fn read(&mut self) -> Result<Image, crate::Error>;

    /// Profiling timers to include in FPS reports.
    fn timers(&self) -> Vec<&Timer> {
        Vec::new()
    }
}

/// Drives `session` with frames from `source` and detections from `detector`.
///
/// The render target is sized to the source's native resolution up front. Each composited
/// overlay is handed to `present` together with the camera frame it belongs to; return
/// `false` from `present` to stop the loop. No frame-rate control happens here, the loop
/// runs at whatever cadence `source` delivers frames.
pub fn run<S, D, F>(
    source: &mut S,
    detector: &mut D,
    session: &mut Session,
    mut present: F,
) -> Result<(), crate::Error>
where
    S: FrameSource,
    D: Detector,
    F: FnMut(&Image, &Image) -> bool,
{
    let resolution = source.resolution();
    if resolution.is_empty() {
        return Err(format!("frame source reports empty resolution {}", resolution).into());
    }
    session.set_resolution(resolution);

    let mut fps = FpsCounter::new("try-on");
    loop {
        let frame = source.read()?;
        let detection = detector.detect(&frame);

        let canvas = match session.advance(detection.as_ref()) {
            Some(canvas) => canvas,
            None => continue,
        };
        if !present(&frame, canvas) {
            return Ok(());
        }

        fps.tick_with(source.timers());
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use nalgebra::Point2;

    use crate::{
        image::Color,
        landmark::{Idx, MESH_POINTS},
    };

    use super::*;

    const RES: Resolution = Resolution::new(640, 480);

    /// Landmarks placing the smoothed anchors at left ear (100, 200), right ear (300, 200),
    /// chin (200, 300) on a 640x480 target.
    fn face() -> Landmarks {
        let mut positions = vec![Point2::new(0.0, 0.0); MESH_POINTS];
        positions[Idx::LeftEar as usize] = Point2::new(100.0 / 640.0, 220.0 / 480.0);
        positions[Idx::RightEar as usize] = Point2::new(300.0 / 640.0, 220.0 / 480.0);
        positions[Idx::Chin as usize] = Point2::new(200.0 / 640.0, 290.0 / 480.0);
        Landmarks::new(positions)
    }

    fn catalog() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (category, color) in [(Category::Earring, Color::RED), (Category::Necklace, Color::BLUE)]
        {
            std::fs::create_dir(dir.path().join(category.dir())).unwrap();
            let mut sprite = Image::new(4, 4);
            sprite.clear(color);
            sprite
                .save(dir.path().join(category.dir()).join(category.catalog_entry(1)))
                .unwrap();
        }
        dir
    }

    fn settled_session(dir: &tempfile::TempDir) -> Session {
        let mut session = Session::new(dir.path()).unwrap();
        session.set_resolution(RES);
        for _ in 0..500 {
            session.assets.poll();
            if Category::ALL.iter().all(|&c| !session.assets.is_pending(c)) {
                return session;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("assets did not settle");
    }

    #[test]
    fn advance_is_a_noop_without_dimensions() {
        let dir = catalog();
        let mut session = Session::new(dir.path()).unwrap();
        assert!(session.advance(Some(&face())).is_none());

        session.set_resolution(Resolution::new(0, 480));
        assert!(session.advance(Some(&face())).is_none());
    }

    #[test]
    fn nothing_renders_without_a_mode() {
        let dir = catalog();
        let mut session = settled_session(&dir);
        let canvas = session.advance(Some(&face())).unwrap();
        assert_eq!(canvas.get(90, 250), Color::NULL);
        assert_eq!(canvas.get(150, 350), Color::NULL);
    }

    #[test]
    fn earring_mode_draws_both_sides() {
        let dir = catalog();
        let mut session = settled_session(&dir);
        session.select_mode(Category::Earring);
        let canvas = session.advance(Some(&face())).unwrap();

        // left sprite covers (40, 200)..(140, 300), right (280, 200)..(380, 300)
        assert_eq!(canvas.get(90, 250), Color::RED);
        assert_eq!(canvas.get(330, 250), Color::RED);
        assert_eq!(canvas.get(39, 250), Color::NULL);
        // the necklace asset is loaded but its mode is inactive
        assert_eq!(canvas.get(150, 350), Color::NULL);
    }

    #[test]
    fn mode_switch_preserves_loaded_assets() {
        let dir = catalog();
        let mut session = settled_session(&dir);
        session.select_mode(Category::Earring);
        session.advance(Some(&face()));

        // deleting the files proves that switching back needs no re-fetch
        for category in Category::ALL {
            std::fs::remove_file(dir.path().join(category.dir()).join(category.catalog_entry(1)))
                .unwrap();
        }

        session.select_mode(Category::Necklace);
        let canvas = session.advance(Some(&face())).unwrap();
        assert_eq!(canvas.get(150, 350), Color::BLUE); // (100, 300)..(300, 400)
        assert_eq!(canvas.get(90, 250), Color::NULL);

        session.select_mode(Category::Earring);
        let canvas = session.advance(Some(&face())).unwrap();
        assert_eq!(canvas.get(90, 250), Color::RED);
    }

    #[test]
    fn face_loss_keeps_the_stale_overlay() {
        let dir = catalog();
        let mut session = settled_session(&dir);
        session.select_mode(Category::Necklace);
        session.advance(Some(&face()));

        // histories are not cleared when the face disappears
        let canvas = session.advance(None).unwrap();
        assert_eq!(canvas.get(150, 350), Color::BLUE);
    }

    #[test]
    fn snapshot_composites_over_the_frame() {
        let dir = catalog();
        let mut session = settled_session(&dir);
        session.select_mode(Category::Necklace);
        session.advance(Some(&face()));

        let mut frame = Image::new(RES.width(), RES.height());
        frame.clear(Color::WHITE);
        let shot = session.snapshot(&frame);
        assert_eq!(shot.get(150, 350), Color::BLUE);
        assert_eq!(shot.get(0, 0), Color::WHITE);

        let out = tempfile::tempdir().unwrap();
        let path = session.save_snapshot(&frame, out.path()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("jewelry-tryon-") && name.ends_with(".png"));
        assert!(path.exists());
    }
}
