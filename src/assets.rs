use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use kurbo::Shape as _;

use crate::{
    core::BezPath,
    error::{SkockoError, SkockoResult},
    model::{Asset, Composition, ShapeAsset, ShapeSpec, TextAsset},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(pub u32);

/// RGBA8 brush color used by Parley text layout. The actual paint color comes
/// from the clip's animated fill at draw time; this only satisfies Parley's
/// brush requirements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub struct PreparedText {
    pub layout: parley::Layout<TextBrushRgba8>,
    pub font_bytes: Arc<Vec<u8>>,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
pub struct PreparedShape {
    pub fill_path: Option<BezPath>,
    pub stroke_path: Option<BezPath>,
    pub fill_opacity: f32,
}

pub enum PreparedAsset {
    Text(PreparedText),
    Shape(PreparedShape),
}

/// All assets of a composition, resolved to renderable form up front so the
/// per-frame path never touches the filesystem.
pub struct PreparedAssetStore {
    by_key: HashMap<String, AssetId>,
    prepared: Vec<PreparedAsset>,
}

impl PreparedAssetStore {
    pub fn prepare(comp: &Composition, assets_root: &Path) -> SkockoResult<Self> {
        let mut engine = TextLayoutEngine::new();
        let mut font_cache: HashMap<String, Arc<Vec<u8>>> = HashMap::new();

        let mut by_key = HashMap::with_capacity(comp.assets.len());
        let mut prepared = Vec::with_capacity(comp.assets.len());

        for (key, asset) in &comp.assets {
            let p = match asset {
                Asset::Text(t) => PreparedAsset::Text(prepare_text(
                    t,
                    assets_root,
                    &mut engine,
                    &mut font_cache,
                )?),
                Asset::Shape(s) => PreparedAsset::Shape(prepare_shape(s)?),
            };
            let id = AssetId(prepared.len() as u32);
            prepared.push(p);
            by_key.insert(key.clone(), id);
        }

        Ok(Self { by_key, prepared })
    }

    pub fn id_for_key(&self, key: &str) -> SkockoResult<AssetId> {
        self.by_key
            .get(key)
            .copied()
            .ok_or_else(|| SkockoError::evaluation(format!("unknown asset key '{key}'")))
    }

    pub fn get(&self, id: AssetId) -> SkockoResult<&PreparedAsset> {
        self.prepared
            .get(id.0 as usize)
            .ok_or_else(|| SkockoError::evaluation(format!("unknown asset id {id:?}")))
    }
}

/// Normalize and validate composition-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and
/// rejects absolute paths or parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> SkockoResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(SkockoError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(SkockoError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(SkockoError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(SkockoError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

fn prepare_text(
    t: &TextAsset,
    assets_root: &Path,
    engine: &mut TextLayoutEngine,
    font_cache: &mut HashMap<String, Arc<Vec<u8>>>,
) -> SkockoResult<PreparedText> {
    let rel = normalize_rel_path(&t.font_source)?;
    let font_bytes = match font_cache.get(&rel) {
        Some(bytes) => bytes.clone(),
        None => {
            let full: PathBuf = assets_root.join(&rel);
            let bytes = std::fs::read(&full).map_err(|e| {
                SkockoError::validation(format!(
                    "failed to read font '{}': {e}",
                    full.display()
                ))
            })?;
            let bytes = Arc::new(bytes);
            font_cache.insert(rel, bytes.clone());
            bytes
        }
    };

    let layout = engine.layout_plain(&t.text, &font_bytes, t.size_px)?;
    let (width, height) = (layout.width(), layout.height());

    Ok(PreparedText {
        layout,
        font_bytes,
        width,
        height,
    })
}

fn prepare_shape(s: &ShapeAsset) -> SkockoResult<PreparedShape> {
    s.spec.validate()?;
    s.style.validate()?;

    const TOL: f64 = 0.1;
    let base = base_path(&s.spec, TOL)?;

    // Lines and arrows carry their own thickness; their base path is already
    // the final fill geometry.
    let intrinsically_filled = matches!(s.spec, ShapeSpec::Line { .. } | ShapeSpec::Arrow { .. });

    let fill_opacity = if intrinsically_filled {
        1.0
    } else {
        s.style.fill_opacity as f32
    };

    let fill_path = (fill_opacity > 0.0).then(|| base.clone());

    let stroke_path = match (intrinsically_filled, s.style.stroke_width) {
        (false, Some(w)) => Some(kurbo::stroke(
            base,
            &kurbo::Stroke::new(w),
            &kurbo::StrokeOpts::default(),
            TOL,
        )),
        _ => None,
    };

    Ok(PreparedShape {
        fill_path,
        stroke_path,
        fill_opacity,
    })
}

fn base_path(spec: &ShapeSpec, tol: f64) -> SkockoResult<BezPath> {
    Ok(match *spec {
        ShapeSpec::Rect { width, height } => {
            kurbo::Rect::new(-width / 2.0, -height / 2.0, width / 2.0, height / 2.0).to_path(tol)
        }
        ShapeSpec::RoundRect {
            width,
            height,
            radius,
        } => kurbo::RoundedRect::new(
            -width / 2.0,
            -height / 2.0,
            width / 2.0,
            height / 2.0,
            radius,
        )
        .to_path(tol),
        ShapeSpec::Square { side } => {
            kurbo::Rect::new(-side / 2.0, -side / 2.0, side / 2.0, side / 2.0).to_path(tol)
        }
        ShapeSpec::Circle { radius } => kurbo::Circle::new((0.0, 0.0), radius).to_path(tol),
        ShapeSpec::Line { dx, dy, thickness } => {
            let mut seg = BezPath::new();
            seg.move_to((-dx / 2.0, -dy / 2.0));
            seg.line_to((dx / 2.0, dy / 2.0));
            kurbo::stroke(
                seg,
                &kurbo::Stroke::new(thickness),
                &kurbo::StrokeOpts::default(),
                tol,
            )
        }
        ShapeSpec::Arrow {
            length,
            thickness,
            head_length,
            head_width,
        } => arrow_path(length, thickness, head_length, head_width),
        ShapeSpec::Path { ref svg_d } => BezPath::from_svg(svg_d.trim())
            .map_err(|e| SkockoError::validation(format!("invalid svg_d: {e}")))?,
    })
}

/// Filled arrow polygon pointing along +y (screen-down), centered on origin.
fn arrow_path(length: f64, thickness: f64, head_length: f64, head_width: f64) -> BezPath {
    let half = length / 2.0;
    let shaft_end = half - head_length;
    let t = thickness / 2.0;
    let hw = head_width / 2.0;

    let mut p = BezPath::new();
    p.move_to((-t, -half));
    p.line_to((t, -half));
    p.line_to((t, shaft_end));
    p.line_to((hw, shaft_end));
    p.line_to((0.0, half)); // tip
    p.line_to((-hw, shaft_end));
    p.line_to((-t, shaft_end));
    p.close_path();
    p
}

/// Stateful helper for building Parley text layouts from raw font bytes.
struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl TextLayoutEngine {
    fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
    ) -> SkockoResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SkockoError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SkockoError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SkockoError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        }));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeStyle;

    #[test]
    fn normalize_rel_path_rules() {
        assert_eq!(normalize_rel_path("a/./b.ttf").unwrap(), "a/b.ttf");
        assert_eq!(normalize_rel_path("a\\b.ttf").unwrap(), "a/b.ttf");
        assert!(normalize_rel_path("/abs.ttf").is_err());
        assert!(normalize_rel_path("a/../b.ttf").is_err());
        assert!(normalize_rel_path("").is_err());
    }

    #[test]
    fn filled_rect_has_fill_only() {
        let p = prepare_shape(&ShapeAsset {
            spec: ShapeSpec::Rect {
                width: 10.0,
                height: 4.0,
            },
            style: ShapeStyle::filled(),
        })
        .unwrap();
        assert!(p.fill_path.is_some());
        assert!(p.stroke_path.is_none());
        assert_eq!(p.fill_opacity, 1.0);
    }

    #[test]
    fn outlined_square_has_stroke_only() {
        let p = prepare_shape(&ShapeAsset {
            spec: ShapeSpec::Square { side: 10.0 },
            style: ShapeStyle::outlined(2.0),
        })
        .unwrap();
        assert!(p.fill_path.is_none());
        assert!(p.stroke_path.is_some());
    }

    #[test]
    fn arrow_path_is_closed_and_centered() {
        let p = arrow_path(100.0, 6.0, 20.0, 16.0);
        let bbox = p.bounding_box();
        assert!((bbox.min_y() + 50.0).abs() < 1e-9);
        assert!((bbox.max_y() - 50.0).abs() < 1e-9);
        assert!((bbox.max_x() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn shape_geometry_is_centered() {
        let p = prepare_shape(&ShapeAsset {
            spec: ShapeSpec::Circle { radius: 5.0 },
            style: ShapeStyle::filled(),
        })
        .unwrap();
        let bbox = p.fill_path.unwrap().bounding_box();
        assert!(bbox.min_x() < -4.9 && bbox.max_x() > 4.9);
        assert!((bbox.min_x() + bbox.max_x()).abs() < 0.2);
    }

    #[test]
    fn store_rejects_unknown_key() {
        let comp = crate::model::tests::basic_comp();
        let store = PreparedAssetStore::prepare(&comp, Path::new(".")).unwrap();
        assert!(store.id_for_key("box").is_ok());
        assert!(store.id_for_key("nope").is_err());
    }
}
