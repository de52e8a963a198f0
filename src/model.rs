use std::collections::BTreeMap;

use crate::{
    anim::Anim,
    core::{Canvas, Fps, FrameIndex, FrameRange, Rgba8Premul, Transform2D},
    ease::Ease,
    error::{SkockoError, SkockoResult},
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Composition {
    pub fps: Fps,
    pub canvas: Canvas,
    pub duration: FrameIndex,            // total frames
    pub assets: BTreeMap<String, Asset>, // stable keys
    pub tracks: Vec<Track>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Track {
    pub name: String,
    pub z_base: i32,
    pub clips: Vec<Clip>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Clip {
    pub id: String,
    pub asset: String,     // key into Composition.assets
    pub range: FrameRange, // timeline placement [start,end)
    pub props: ClipProps,
    pub z_offset: i32,
    pub transition_in: Option<TransitionSpec>,
    pub transition_out: Option<TransitionSpec>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClipProps {
    pub transform: Anim<Transform2D>,
    pub opacity: Anim<f64>,      // 0..1 clamped in eval
    pub fill: Anim<Rgba8Premul>, // shape color / text color
}

/// Asset geometry and content. All geometry is centered on the local origin;
/// placement happens through the clip transform.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Asset {
    Text(TextAsset),
    Shape(ShapeAsset),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextAsset {
    pub text: String,
    pub font_source: String, // path relative to the assets root
    pub size_px: f32,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ShapeAsset {
    pub spec: ShapeSpec,
    pub style: ShapeStyle,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ShapeSpec {
    Rect { width: f64, height: f64 },
    RoundRect { width: f64, height: f64, radius: f64 },
    Square { side: f64 },
    Circle { radius: f64 },
    /// Straight segment spanning (-dx/2,-dy/2)..(dx/2,dy/2).
    Line { dx: f64, dy: f64, thickness: f64 },
    /// Filled arrow pointing along +y, `length` tall including the head.
    Arrow {
        length: f64,
        thickness: f64,
        head_length: f64,
        head_width: f64,
    },
    /// Raw SVG path data, already centered by the author.
    Path { svg_d: String },
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct ShapeStyle {
    /// Outline width; `None` means no outline.
    pub stroke_width: Option<f64>,
    /// Interior opacity factor in 0..1; 0 leaves only the outline.
    pub fill_opacity: f64,
}

impl ShapeStyle {
    pub fn filled() -> Self {
        Self {
            stroke_width: None,
            fill_opacity: 1.0,
        }
    }

    pub fn outlined(stroke_width: f64) -> Self {
        Self {
            stroke_width: Some(stroke_width),
            fill_opacity: 0.0,
        }
    }

    pub fn outlined_filled(stroke_width: f64, fill_opacity: f64) -> Self {
        Self {
            stroke_width: Some(stroke_width),
            fill_opacity,
        }
    }

    pub fn validate(&self) -> SkockoResult<()> {
        if let Some(w) = self.stroke_width {
            if !w.is_finite() || w <= 0.0 {
                return Err(SkockoError::validation(
                    "shape stroke_width must be finite and > 0",
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.fill_opacity) {
            return Err(SkockoError::validation(
                "shape fill_opacity must be within 0..=1",
            ));
        }
        if self.stroke_width.is_none() && self.fill_opacity == 0.0 {
            return Err(SkockoError::validation(
                "shape must have a stroke or a visible fill",
            ));
        }
        Ok(())
    }
}

impl ShapeSpec {
    pub fn validate(&self) -> SkockoResult<()> {
        let positive = |v: f64, what: &str| -> SkockoResult<()> {
            if !v.is_finite() || v <= 0.0 {
                return Err(SkockoError::validation(format!(
                    "shape {what} must be finite and > 0"
                )));
            }
            Ok(())
        };

        match self {
            Self::Rect { width, height } => {
                positive(*width, "width")?;
                positive(*height, "height")
            }
            Self::RoundRect {
                width,
                height,
                radius,
            } => {
                positive(*width, "width")?;
                positive(*height, "height")?;
                positive(*radius, "radius")
            }
            Self::Square { side } => positive(*side, "side"),
            Self::Circle { radius } => positive(*radius, "radius"),
            Self::Line { dx, dy, thickness } => {
                if !dx.is_finite() || !dy.is_finite() || (*dx == 0.0 && *dy == 0.0) {
                    return Err(SkockoError::validation("line must have non-zero extent"));
                }
                positive(*thickness, "thickness")
            }
            Self::Arrow {
                length,
                thickness,
                head_length,
                head_width,
            } => {
                positive(*length, "length")?;
                positive(*thickness, "thickness")?;
                positive(*head_length, "head_length")?;
                positive(*head_width, "head_width")?;
                if head_length >= length {
                    return Err(SkockoError::validation(
                        "arrow head_length must be shorter than length",
                    ));
                }
                Ok(())
            }
            Self::Path { svg_d } => {
                if svg_d.trim().is_empty() {
                    return Err(SkockoError::validation("path svg_d must be non-empty"));
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TransitionSpec {
    pub kind: String,
    pub duration_frames: u64,
    pub ease: Ease,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl TransitionSpec {
    pub fn validate(&self) -> SkockoResult<()> {
        if self.kind.trim().is_empty() {
            return Err(SkockoError::validation("transition kind must be non-empty"));
        }
        if self.duration_frames == 0 {
            return Err(SkockoError::validation(
                "transition duration_frames must be > 0",
            ));
        }
        Ok(())
    }
}

impl Asset {
    pub fn validate(&self) -> SkockoResult<()> {
        match self {
            Self::Text(t) => {
                if t.text.is_empty() {
                    return Err(SkockoError::validation("text asset must be non-empty"));
                }
                if t.font_source.trim().is_empty() {
                    return Err(SkockoError::validation(
                        "text asset font_source must be non-empty",
                    ));
                }
                if !t.size_px.is_finite() || t.size_px <= 0.0 {
                    return Err(SkockoError::validation(
                        "text size_px must be finite and > 0",
                    ));
                }
                Ok(())
            }
            Self::Shape(s) => {
                s.spec.validate()?;
                s.style.validate()
            }
        }
    }
}

impl Composition {
    pub fn validate(&self) -> SkockoResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(SkockoError::validation("fps must have num>0 and den>0"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(SkockoError::validation("canvas width/height must be > 0"));
        }
        if self.duration.0 == 0 {
            return Err(SkockoError::validation("duration must be > 0 frames"));
        }

        for (key, asset) in &self.assets {
            asset.validate().map_err(|e| {
                SkockoError::validation(format!("asset '{key}' is invalid: {e}"))
            })?;
        }

        for track in &self.tracks {
            for clip in &track.clips {
                if !self.assets.contains_key(&clip.asset) {
                    return Err(SkockoError::validation(format!(
                        "clip '{}' references missing asset key '{}'",
                        clip.id, clip.asset
                    )));
                }
                if clip.range.start.0 > clip.range.end.0 {
                    return Err(SkockoError::validation(format!(
                        "clip '{}' has invalid range (start > end)",
                        clip.id
                    )));
                }
                if clip.range.end.0 > self.duration.0 {
                    return Err(SkockoError::validation(format!(
                        "clip '{}' range exceeds composition duration",
                        clip.id
                    )));
                }

                clip.props.opacity.validate()?;
                clip.props.transform.validate()?;
                clip.props.fill.validate()?;

                if let Some(tr) = &clip.transition_in {
                    tr.validate()?;
                }
                if let Some(tr) = &clip.transition_out {
                    tr.validate()?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn basic_comp() -> Composition {
        let mut assets = BTreeMap::new();
        assets.insert(
            "box".to_string(),
            Asset::Shape(ShapeAsset {
                spec: ShapeSpec::Rect {
                    width: 100.0,
                    height: 40.0,
                },
                style: ShapeStyle::outlined_filled(2.0, 0.3),
            }),
        );
        Composition {
            fps: Fps::new(30, 1).unwrap(),
            canvas: Canvas {
                width: 1280,
                height: 720,
            },
            duration: FrameIndex(60),
            assets,
            tracks: vec![Track {
                name: "main".to_string(),
                z_base: 0,
                clips: vec![Clip {
                    id: "c0".to_string(),
                    asset: "box".to_string(),
                    range: FrameRange::new(FrameIndex(0), FrameIndex(60)).unwrap(),
                    props: ClipProps {
                        transform: Anim::constant(Transform2D::at(640.0, 360.0)),
                        opacity: Anim::constant(1.0),
                        fill: Anim::constant(Rgba8Premul::opaque(90, 140, 255)),
                    },
                    z_offset: 0,
                    transition_in: Some(TransitionSpec {
                        kind: "fade".to_string(),
                        duration_frames: 10,
                        ease: Ease::Linear,
                        params: serde_json::Value::Null,
                    }),
                    transition_out: None,
                }],
            }],
        }
    }

    #[test]
    fn json_roundtrip() {
        let comp = basic_comp();
        let s = serde_json::to_string_pretty(&comp).unwrap();
        let de: Composition = serde_json::from_str(&s).unwrap();
        assert_eq!(de.canvas.width, 1280);
        assert_eq!(de.assets.len(), 1);
    }

    #[test]
    fn validate_rejects_missing_asset() {
        let mut comp = basic_comp();
        comp.tracks[0].clips[0].asset = "missing".to_string();
        assert!(comp.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_bounds_range() {
        let mut comp = basic_comp();
        comp.tracks[0].clips[0].range = FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(999),
        };
        assert!(comp.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_shape() {
        let mut comp = basic_comp();
        comp.assets.insert(
            "bad".to_string(),
            Asset::Shape(ShapeAsset {
                spec: ShapeSpec::Circle { radius: -1.0 },
                style: ShapeStyle::filled(),
            }),
        );
        assert!(comp.validate().is_err());
    }

    #[test]
    fn validate_rejects_invisible_style() {
        assert!(
            ShapeStyle {
                stroke_width: None,
                fill_opacity: 0.0
            }
            .validate()
            .is_err()
        );
    }
}
