//! Output resolutions and pixel formats.

/// The named output window sizes that sensors can be switched between.
///
/// The variants are declared in ascending order of area, so the derived
/// ordering matches [`Resolution::ASCENDING`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Resolution {
    Qcif,
    Qvga,
    Cif,
    Vga,
    Svga,
    Xga,
    Hd720,
    Sxga,
    Uxga,
}

impl Resolution {
    /// All of the resolutions, smallest first. Mode selection walks this
    /// list and takes the first that both covers the request and is
    /// populated for the sensor.
    pub const ASCENDING: [Resolution; 9] = [
        Resolution::Qcif,
        Resolution::Qvga,
        Resolution::Cif,
        Resolution::Vga,
        Resolution::Svga,
        Resolution::Xga,
        Resolution::Hd720,
        Resolution::Sxga,
        Resolution::Uxga,
    ];

    pub const fn width(self) -> u32 {
        self.size().0
    }

    pub const fn height(self) -> u32 {
        self.size().1
    }

    pub const fn size(self) -> (u32, u32) {
        match self {
            Resolution::Qcif => (176, 144),
            Resolution::Qvga => (320, 240),
            Resolution::Cif => (352, 288),
            Resolution::Vga => (640, 480),
            Resolution::Svga => (800, 600),
            Resolution::Xga => (1024, 768),
            Resolution::Hd720 => (1280, 720),
            Resolution::Sxga => (1280, 1024),
            Resolution::Uxga => (1600, 1200),
        }
    }

    /// Returns `true` if a window of this size is at least as large as the
    /// given dimensions in both directions.
    pub const fn covers(self, width: u32, height: u32) -> bool {
        let (w, h) = self.size();
        w >= width && h >= height
    }

    pub const fn name(self) -> &'static str {
        match self {
            Resolution::Qcif => "qcif",
            Resolution::Qvga => "qvga",
            Resolution::Cif => "cif",
            Resolution::Vga => "vga",
            Resolution::Svga => "svga",
            Resolution::Xga => "xga",
            Resolution::Hd720 => "720p",
            Resolution::Sxga => "sxga",
            Resolution::Uxga => "uxga",
        }
    }
}

/// The packed YUV 4:2:2 orderings the supported sensors can produce.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PixelFormat {
    Yuyv,
    Uyvy,
}

impl PixelFormat {
    /// The four-character code conventionally used for this format.
    pub const fn fourcc(self) -> [u8; 4] {
        match self {
            PixelFormat::Yuyv => *b"YUYV",
            PixelFormat::Uyvy => *b"UYVY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("yuyv") {
            Some(PixelFormat::Yuyv)
        } else if name.eq_ignore_ascii_case("uyvy") {
            Some(PixelFormat::Uyvy)
        } else {
            None
        }
    }

    /// Packed formats carry two pixels per macropixel, so their width must
    /// be even.
    pub const fn is_packed(self) -> bool {
        true
    }
}

/// A frame format as negotiated with the sensor: the frame dimensions and
/// how each pixel is encoded.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Format {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}

impl Format {
    pub const fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            width: width,
            height: height,
            pixel_format: pixel_format,
        }
    }

    pub const fn from_resolution(res: Resolution, pixel_format: PixelFormat) -> Self {
        Self::new(res.width(), res.height(), pixel_format)
    }
}

/// Still-capture frame sizes. Requests for exactly one of these sizes are
/// treated as snapshots, which affects flash and the post-switch control
/// refresh.
pub const CAPTURE_SIZES: [(u32, u32); 5] = [
    (1024, 768),
    (1280, 1024),
    (1600, 1200),
    (2048, 1536),
    (2592, 1944),
];

/// Video recording frame sizes, matched exactly in the same way as
/// [`CAPTURE_SIZES`].
pub const VIDEO_SIZES: [(u32, u32); 2] = [(1280, 720), (1920, 1080)];

/// How a requested frame size is treated when switching modes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RequestKind {
    Preview,
    Capture,
    Video,
}

impl RequestKind {
    pub fn classify(width: u32, height: u32) -> Self {
        if CAPTURE_SIZES.contains(&(width, height)) {
            RequestKind::Capture
        } else if VIDEO_SIZES.contains(&(width, height)) {
            RequestKind::Video
        } else {
            RequestKind::Preview
        }
    }
}
