use crate::{
    core::{Canvas, Fps, Rgba8Premul},
    error::SkockoResult,
};

/// Output quality preset. All scenes are designed on a 1280x720 logical
/// canvas; other presets scale every coordinate and font size uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Quality {
    Low,
    Medium,
    High,
}

impl Quality {
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Low => Canvas {
                width: 854,
                height: 480,
            },
            Self::Medium => Canvas {
                width: 1280,
                height: 720,
            },
            Self::High => Canvas {
                width: 1920,
                height: 1080,
            },
        }
    }

    pub fn scale(self) -> f64 {
        match self {
            Self::Low => 480.0 / 720.0,
            Self::Medium => 1.0,
            Self::High => 1080.0 / 720.0,
        }
    }

}

/// Shared visual vocabulary of the scene set: dark background, white body
/// text, and a small set of semantic accent colors.
#[derive(Clone, Debug)]
pub struct Theme {
    pub quality: Quality,
    pub canvas: Canvas,
    pub fps: Fps,
    /// Flattened under every frame before encoding.
    pub background: [u8; 4],
    pub text: Rgba8Premul,
    pub highlight: Rgba8Premul,
    pub success: Rgba8Premul,
    pub error: Rgba8Premul,
    pub accent: Rgba8Premul,
    pub muted: Rgba8Premul,
    pub body_font: String,
    pub mono_font: String,
    pub font_size: f32,
}

impl Theme {
    pub fn new(quality: Quality, body_font: impl Into<String>, mono_font: impl Into<String>) -> SkockoResult<Self> {
        Ok(Self {
            quality,
            canvas: quality.canvas(),
            fps: Fps::new(30, 1)?,
            background: [0x1a, 0x1a, 0x1a, 0xff],
            text: Rgba8Premul::opaque(0xff, 0xff, 0xff),
            highlight: Rgba8Premul::opaque(0xff, 0xff, 0x00),
            success: Rgba8Premul::opaque(0x83, 0xc1, 0x67),
            error: Rgba8Premul::opaque(0xfc, 0x62, 0x55),
            accent: Rgba8Premul::opaque(0x58, 0xc4, 0xdd),
            muted: Rgba8Premul::opaque(0x88, 0x88, 0x88),
            body_font: body_font.into(),
            mono_font: mono_font.into(),
            font_size: 36.0,
        })
    }

    /// Scales a 720p-design-space length to the output canvas.
    pub fn s(&self, v: f64) -> f64 {
        v * self.quality.scale()
    }

    /// Scales a 720p-design-space font size to the output canvas.
    pub fn fs(&self, v: f32) -> f32 {
        (v as f64 * self.quality.scale()) as f32
    }

    /// Canvas-space x for a 720p design-space x.
    pub fn x(&self, design_x: f64) -> f64 {
        self.s(design_x)
    }

    /// Canvas-space y for a 720p design-space y.
    pub fn y(&self, design_y: f64) -> f64 {
        self.s(design_y)
    }

    pub fn center_x(&self) -> f64 {
        f64::from(self.canvas.width) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        f64::from(self.canvas.height) / 2.0
    }
}
