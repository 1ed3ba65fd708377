//! V4L2 webcam access.
//!
//! Currently, only V4L2 `VIDEO_CAPTURE` devices yielding JFIF JPEG or Motion JPEG frames are
//! supported.

use linuxvideo::{
    format::{PixFormat, PixelFormat},
    stream::ReadStream,
    CapabilityFlags, Device,
};

use crate::{
    image::Image,
    resolution::Resolution,
    session::FrameSource,
    timer::Timer,
};

/// A webcam yielding a stream of [`Image`]s.
pub struct Webcam {
    stream: ReadStream,
    resolution: Resolution,
    t_dequeue: Timer,
    t_decode: Timer,
}

impl Webcam {
    /// Opens the first supported webcam found.
    ///
    /// This function can block for a significant amount of time while the webcam initializes
    /// (on the order of hundreds of milliseconds).
    pub fn open() -> Result<Self, crate::Error> {
        for res in linuxvideo::list()? {
            match res {
                Ok(dev) => match Self::open_device(dev) {
                    Ok(Some(webcam)) => return Ok(webcam),
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!("{}", e);
                    }
                },
                Err(e) => {
                    log::warn!("{}", e);
                }
            }
        }

        Err("no supported webcam device found".into())
    }

    fn open_device(dev: Device) -> Result<Option<Self>, crate::Error> {
        let caps = dev.capabilities()?.device_capabilities();
        let path = dev.path()?;
        log::debug!("device {} capabilities: {:?}", path.display(), caps);

        if !caps.contains(CapabilityFlags::VIDEO_CAPTURE) {
            return Ok(None);
        }

        let capture = dev.video_capture(PixFormat::new(
            Resolution::RES_720P.width(),
            Resolution::RES_720P.height(),
            PixelFormat::MJPG,
        ))?;

        let format = capture.format();
        match format.pixel_format() {
            PixelFormat::JPEG | PixelFormat::MJPG => {}
            e => return Err(format!("unsupported pixel format {}", e).into()),
        }

        // The device is free to pick a resolution other than the one we asked for; the one it
        // settles on is what the render target has to match.
        let resolution = Resolution::new(format.width(), format.height());

        log::info!("opened {}, {}", path.display(), resolution);

        let stream = capture.into_stream()?;

        Ok(Some(Self {
            stream,
            resolution,
            t_dequeue: Timer::new("dequeue"),
            t_decode: Timer::new("decode"),
        }))
    }

    /// Returns the native resolution the camera delivers frames at.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Reads the next frame from the camera.
    ///
    /// If no frame is available, this method will block until one is.
    pub fn read(&mut self) -> Result<Image, crate::Error> {
        let resolution = self.resolution;
        let dequeue_guard = self.t_dequeue.start();
        Ok(self.stream.dequeue(|buf| {
            drop(dequeue_guard);
            let image = match self.t_decode.time(|| Image::decode_jpeg(&buf)) {
                Ok(image) => image,
                Err(e) => {
                    // Even high-quality webcams produce occasional corrupted MJPG frames.
                    // Hand back a blank image instead of erroring out; it yields no usable
                    // tracking data either way, but it keeps the frame cadence steady.
                    log::error!("webcam decode error: {}", e);
                    Image::new(resolution.width(), resolution.height())
                }
            };
            Ok(image)
        })?)
    }

}

impl FrameSource for Webcam {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn read(&mut self) -> Result<Image, crate::Error> {
        self.read()
    }

    /// Profiling timers for webcam access and decoding.
    fn timers(&self) -> Vec<&Timer> {
        vec![&self.t_dequeue, &self.t_decode]
    }
}
