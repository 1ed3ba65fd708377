//! Try it on before you buy it.

pub mod anchor;
pub mod assets;
pub mod filter;
pub mod image;
pub mod landmark;
pub mod overlay;
pub mod resolution;
pub mod session;
pub mod timer;
pub mod webcam;

pub type Error = Box<dyn std::error::Error + Sync + Send>;
