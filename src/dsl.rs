use std::collections::BTreeMap;

use crate::{
    anim::Anim,
    core::{Canvas, Fps, FrameIndex, FrameRange, Rgba8Premul, Transform2D},
    error::{SkockoError, SkockoResult},
    model::{Asset, Clip, ClipProps, Composition, Track, TransitionSpec},
};

pub struct CompositionBuilder {
    fps: Fps,
    canvas: Canvas,
    duration: FrameIndex,
    assets: BTreeMap<String, Asset>,
    tracks: Vec<Track>,
}

impl CompositionBuilder {
    pub fn new(fps: Fps, canvas: Canvas, duration: FrameIndex) -> Self {
        Self {
            fps,
            canvas,
            duration,
            assets: BTreeMap::new(),
            tracks: Vec::new(),
        }
    }

    pub fn asset(mut self, key: impl Into<String>, asset: Asset) -> SkockoResult<Self> {
        let key = key.into();
        if self.assets.contains_key(&key) {
            return Err(SkockoError::validation(format!(
                "duplicate asset key '{key}'"
            )));
        }
        self.assets.insert(key, asset);
        Ok(self)
    }

    pub fn track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn build(self) -> SkockoResult<Composition> {
        let comp = Composition {
            fps: self.fps,
            canvas: self.canvas,
            duration: self.duration,
            assets: self.assets,
            tracks: self.tracks,
        };
        comp.validate()?;
        Ok(comp)
    }
}

pub struct TrackBuilder {
    name: String,
    z_base: i32,
    clips: Vec<Clip>,
}

impl TrackBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            z_base: 0,
            clips: Vec::new(),
        }
    }

    pub fn z_base(mut self, z: i32) -> Self {
        self.z_base = z;
        self
    }

    pub fn clip(mut self, clip: Clip) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn build(self) -> SkockoResult<Track> {
        if self.name.trim().is_empty() {
            return Err(SkockoError::validation("track name must be non-empty"));
        }
        Ok(Track {
            name: self.name,
            z_base: self.z_base,
            clips: self.clips,
        })
    }
}

pub struct ClipBuilder {
    id: String,
    asset_key: String,
    range: FrameRange,
    z_offset: i32,
    opacity: Anim<f64>,
    transform: Anim<Transform2D>,
    fill: Anim<Rgba8Premul>,
    transition_in: Option<TransitionSpec>,
    transition_out: Option<TransitionSpec>,
}

impl ClipBuilder {
    pub fn new(id: impl Into<String>, asset_key: impl Into<String>, range: FrameRange) -> Self {
        Self {
            id: id.into(),
            asset_key: asset_key.into(),
            range,
            z_offset: 0,
            opacity: Anim::constant(1.0),
            transform: Anim::constant(Transform2D::default()),
            fill: Anim::constant(Rgba8Premul::opaque(255, 255, 255)),
            transition_in: None,
            transition_out: None,
        }
    }

    pub fn z_offset(mut self, z: i32) -> Self {
        self.z_offset = z;
        self
    }

    pub fn opacity(mut self, a: Anim<f64>) -> Self {
        self.opacity = a;
        self
    }

    pub fn transform(mut self, t: Anim<Transform2D>) -> Self {
        self.transform = t;
        self
    }

    pub fn at(self, x: f64, y: f64) -> Self {
        self.transform(Anim::constant(Transform2D::at(x, y)))
    }

    pub fn fill(mut self, c: Anim<Rgba8Premul>) -> Self {
        self.fill = c;
        self
    }

    pub fn color(self, c: Rgba8Premul) -> Self {
        self.fill(Anim::constant(c))
    }

    pub fn transition_in(mut self, tr: TransitionSpec) -> Self {
        self.transition_in = Some(tr);
        self
    }

    pub fn transition_out(mut self, tr: TransitionSpec) -> Self {
        self.transition_out = Some(tr);
        self
    }

    pub fn build(self) -> SkockoResult<Clip> {
        if self.id.trim().is_empty() {
            return Err(SkockoError::validation("clip id must be non-empty"));
        }
        if self.asset_key.trim().is_empty() {
            return Err(SkockoError::validation("clip asset key must be non-empty"));
        }
        self.opacity.validate()?;
        self.transform.validate()?;
        self.fill.validate()?;

        Ok(Clip {
            id: self.id,
            asset: self.asset_key,
            range: self.range,
            props: ClipProps {
                transform: self.transform,
                opacity: self.opacity,
                fill: self.fill,
            },
            z_offset: self.z_offset,
            transition_in: self.transition_in,
            transition_out: self.transition_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ease::Ease,
        model::{ShapeAsset, ShapeSpec, ShapeStyle},
    };

    #[test]
    fn builders_create_expected_structure() {
        let clip = ClipBuilder::new(
            "c0",
            "s0",
            FrameRange::new(FrameIndex(0), FrameIndex(30)).unwrap(),
        )
        .at(100.0, 50.0)
        .color(Rgba8Premul::opaque(255, 200, 0))
        .transition_in(TransitionSpec {
            kind: "fade".to_string(),
            duration_frames: 10,
            ease: Ease::Linear,
            params: serde_json::Value::Null,
        })
        .build()
        .unwrap();

        let track = TrackBuilder::new("main").clip(clip).build().unwrap();

        let comp = CompositionBuilder::new(
            Fps::new(30, 1).unwrap(),
            Canvas {
                width: 640,
                height: 360,
            },
            FrameIndex(30),
        )
        .asset(
            "s0",
            Asset::Shape(ShapeAsset {
                spec: ShapeSpec::Square { side: 24.0 },
                style: ShapeStyle::filled(),
            }),
        )
        .unwrap()
        .track(track)
        .build()
        .unwrap();

        assert_eq!(comp.assets.len(), 1);
        assert_eq!(comp.tracks.len(), 1);
    }

    #[test]
    fn duplicate_asset_key_is_rejected() {
        let builder = CompositionBuilder::new(
            Fps::new(30, 1).unwrap(),
            Canvas {
                width: 640,
                height: 360,
            },
            FrameIndex(1),
        )
        .asset(
            "s0",
            Asset::Shape(ShapeAsset {
                spec: ShapeSpec::Square { side: 24.0 },
                style: ShapeStyle::filled(),
            }),
        )
        .unwrap();
        assert!(
            builder
                .asset(
                    "s0",
                    Asset::Shape(ShapeAsset {
                        spec: ShapeSpec::Square { side: 10.0 },
                        style: ShapeStyle::filled(),
                    }),
                )
                .is_err()
        );
    }
}
