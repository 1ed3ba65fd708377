//! Overlay asset loading and selection.
//!
//! Catalog images are decoded on a background worker so a slow disk never stalls the frame
//! loop. Each category has one slot; a slot swaps to a newly selected image only after it has
//! decoded successfully, so the compositor always sees either the previous image or the new
//! one, never a partial load. A failed load keeps the previous image active.

use std::path::PathBuf;

use pawawwewism::{promise, Promise, PromiseHandle, Worker};

use crate::{image::Image, overlay::Category};

struct LoadJob {
    path: PathBuf,
    result: Promise<Option<Image>>,
}

#[derive(Default)]
struct Slot {
    current: Option<Image>,
    pending: Option<PromiseHandle<Option<Image>>>,
}

/// Loads and holds the currently selected overlay image per category.
pub struct AssetStore {
    root: PathBuf,
    slots: [Slot; 2],
    loader: Worker<LoadJob>,
}

impl AssetStore {
    /// Creates a store reading catalog art from `root` and begins preloading both categories'
    /// first catalog entries.
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self, crate::Error> {
        let loader = Worker::builder()
            .name("asset loader")
            .spawn(|LoadJob { path, result }| match Image::load(&path) {
                Ok(image) => result.fulfill(Some(image)),
                Err(e) => {
                    log::warn!("failed to load overlay '{}': {}", path.display(), e);
                    result.fulfill(None);
                }
            })?;

        let mut store = Self {
            root: root.into(),
            slots: [Slot::default(), Slot::default()],
            loader,
        };
        for category in Category::ALL {
            store.select(category, &category.catalog_entry(1));
        }
        Ok(store)
    }

    /// Begins loading `file` as `category`'s active image.
    ///
    /// Returns immediately; the swap happens in a later [`AssetStore::poll`] once the image
    /// has decoded. A newer selection for the same category supersedes an older one that has
    /// not been applied yet.
    pub fn select(&mut self, category: Category, file: &str) {
        let path = self.root.join(category.dir()).join(file);
        log::debug!("selecting {} asset '{}'", category.name(), path.display());

        let (result, handle) = promise();
        self.loader.send(LoadJob { path, result });
        self.slots[category as usize].pending = Some(handle);
    }

    /// Applies any finished loads.
    ///
    /// Successful loads replace the slot's image; failed loads leave the previous image in
    /// place. Loads that are still in flight are left alone, so this never blocks the frame
    /// loop.
    pub fn poll(&mut self) {
        for slot in &mut self.slots {
            let done = slot.pending.as_ref().is_some_and(|h| !h.will_block());
            if done {
                match slot.pending.take().unwrap().block() {
                    Ok(Some(image)) => slot.current = Some(image),
                    // failed load or dead loader; the previous image stays active
                    Ok(None) | Err(_) => {}
                }
            }
        }
    }

    /// Returns whether `category` has a selection that has not finished loading yet.
    pub fn is_pending(&self, category: Category) -> bool {
        self.slots[category as usize].pending.is_some()
    }

    /// The currently active image for `category`, if one has ever loaded successfully.
    pub fn loaded(&self, category: Category) -> Option<&Image> {
        self.slots[category as usize].current.as_ref()
    }
}
