//! Image manipulation.
//!
//! This module provides:
//!
//! - The [`Image`] type, an owned RGBA image.
//! - [`Rect`], an integer-valued rectangle representing part of an image.
//! - [`Color`], an 8-bit sRGB color with alpha.
//! - [`Image::blend`], the scaled alpha blit used to composite overlay sprites.

mod blend;
mod rect;


use std::{fmt, path::Path};

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::resolution::Resolution;

pub use rect::Rect;

/// An 8-bit sRGB image with alpha channel.
#[derive(Clone)]
pub struct Image {
    buf: RgbaImage,
}

impl Image {
    /// Creates an empty image of a specified size.
    ///
    /// The image will start out black and fully transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: ImageBuffer::new(width, height),
        }
    }

    /// Loads an image from the filesystem.
    ///
    /// The path must have a supported file extension (`jpeg`, `jpg` or `png`).
    pub fn load<A: AsRef<Path>>(path: A) -> Result<Self, crate::Error> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> Result<Self, crate::Error> {
        let data = std::fs::read(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jpg" | "jpeg") => Self::decode_jpeg(&data),
            Some("png") => {
                let buf =
                    image::load_from_memory_with_format(&data, image::ImageFormat::Png)?.to_rgba8();
                Ok(Self { buf })
            }
            _ => Err(format!(
                "invalid image path '{}' (must have one of the supported extensions)",
                path.display()
            )
            .into()),
        }
    }

    /// Decodes a JFIF JPEG or Motion JPEG from a byte slice.
    pub fn decode_jpeg(data: &[u8]) -> Result<Self, crate::Error> {
        use zune_jpeg::zune_core::{colorspace::ColorSpace, options::DecoderOptions};
        let options = DecoderOptions::default().jpeg_set_out_colorspace(ColorSpace::RGBA);
        let mut decomp = zune_jpeg::JpegDecoder::new_with_options(options, data);
        let buf = decomp.decode()?;
        let info = decomp
            .info()
            .ok_or("JPEG decoder produced no image info")?;
        let width = u32::from(info.width);
        let height = u32::from(info.height);
        let buf = ImageBuffer::from_raw(width, height, buf)
            .ok_or("JPEG decoder produced a truncated buffer")?;

        Ok(Self { buf })
    }

    /// Saves an image to the file system.
    ///
    /// The path must have a supported file extension (`jpeg`, `jpg` or `png`).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), crate::Error> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jpg" | "jpeg" | "png") => Ok(self.buf.save(path)?),
            _ => Err(format!(
                "invalid image path '{}' (must have one of the supported extensions)",
                path.display()
            )
            .into()),
        }
    }

    /// Returns the width of this image, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    /// Returns the height of this image, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    /// Returns the size of this image.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns a [`Rect`] covering this image.
    ///
    /// The rectangle will be positioned at `(0, 0)` and have the width and height of the image.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0, 0, self.width(), self.height())
    }

    /// Gets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        Color(self.buf[(x, y)].0)
    }

    /// Sets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.buf[(x, y)] = Rgba(color.0);
    }

    /// Clears the image, setting every pixel value to `color`.
    pub fn clear(&mut self, color: Color) {
        self.buf.pixels_mut().for_each(|pix| pix.0 = color.0);
    }

    /// Alpha-blends `sprite` over this image, stretched or shrunk to cover `dest`.
    ///
    /// Sampling is nearest neighbor. Parts of `dest` that lie outside of `self` are clipped;
    /// a zero-sized `dest` or `sprite` draws nothing.
    pub fn blend(&mut self, sprite: &Image, dest: Rect) {
        if sprite.width() == 0 || sprite.height() == 0 || dest.width() == 0 || dest.height() == 0 {
            return;
        }
        let clip = match self.rect().intersection(&dest) {
            Some(clip) => clip,
            None => return,
        };

        for y in clip.y()..clip.y() + clip.height() as i32 {
            for x in clip.x()..clip.x() + clip.width() as i32 {
                let src_x =
                    ((x - dest.x()) as f32 + 0.5) / dest.width() as f32 * sprite.width() as f32;
                let src_y =
                    ((y - dest.y()) as f32 + 0.5) / dest.height() as f32 * sprite.height() as f32;
                let src = sprite.get(
                    (src_x as u32).min(sprite.width() - 1),
                    (src_y as u32).min(sprite.height() - 1),
                );

                let blended = blend::alpha_over(self.get(x as u32, y as u32), src);
                self.set(x as u32, y as u32, blended);
            }
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Image", self.width(), self.height())
    }
}

/// An 8-bit RGBA color.
///
/// Colors are always in the sRGB color space and use non-premultiplied alpha.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Color(pub(crate) [u8; 4]);

impl Color {
    /// Fully transparent black (all components are 0).
    pub const NULL: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);

    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.0[3]
    }

    pub fn with_alpha(mut self, a: u8) -> Color {
        self.0[3] = a;
        self
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r(),
            self.g(),
            self.b(),
            self.a(),
        )
    }
}
