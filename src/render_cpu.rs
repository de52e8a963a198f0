use std::collections::HashMap;

use crate::{
    assets::{AssetId, PreparedAsset, PreparedAssetStore},
    compile::{DrawOp, ScenePlan},
    core::Rgba8Premul,
    error::{SkockoError, SkockoResult},
    render::{FrameRGBA, RenderBackend, RenderSettings},
};

pub struct CpuBackend {
    settings: RenderSettings,
    font_cache: HashMap<AssetId, vello_cpu::peniko::FontData>,
    surface: Option<CpuSurface>,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            font_cache: HashMap::new(),
            surface: None,
        }
    }

    fn ensure_surface(&mut self, width: u32, height: u32) -> SkockoResult<()> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| SkockoError::evaluation("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| SkockoError::evaluation("surface height exceeds u16"))?;

        let needs_new = match &self.surface {
            Some(s) => s.width != width_u16 || s.height != height_u16,
            None => true,
        };
        if needs_new {
            self.surface = Some(CpuSurface {
                width: width_u16,
                height: height_u16,
                pixmap: vello_cpu::Pixmap::new(width_u16, height_u16),
            });
        }
        Ok(())
    }

    fn font_for_text_asset(
        &mut self,
        id: AssetId,
        assets: &PreparedAssetStore,
    ) -> SkockoResult<vello_cpu::peniko::FontData> {
        if let Some(font) = self.font_cache.get(&id) {
            return Ok(font.clone());
        }

        let prepared = assets.get(id)?;
        let PreparedAsset::Text(t) = prepared else {
            return Err(SkockoError::evaluation("AssetId is not a PreparedText"));
        };

        let font_bytes = t.font_bytes.as_ref().clone();
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        self.font_cache.insert(id, font.clone());
        Ok(font)
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(
        &mut self,
        plan: &ScenePlan,
        assets: &PreparedAssetStore,
    ) -> SkockoResult<FrameRGBA> {
        self.ensure_surface(plan.canvas.width, plan.canvas.height)?;

        let mut surface = self
            .surface
            .take()
            .ok_or_else(|| SkockoError::evaluation("render surface missing (bug)"))?;

        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        // `render_to_pixmap` replaces the pixmap contents, so the background
        // must be drawn into the context rather than pre-cleared.
        if let Some([r, g, b, a]) = self.settings.clear_rgba {
            if a > 0 {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                ctx.fill_path(&canvas_rect(plan.canvas.width, plan.canvas.height));
            }
        }
        for op in &plan.ops {
            draw_op(self, &mut ctx, op, assets)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);

        let data = surface.pixmap.data_as_u8_slice().to_vec();
        let frame = FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data,
            premultiplied: true,
        };
        self.surface = Some(surface);
        Ok(frame)
    }
}

fn draw_op(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    assets: &PreparedAssetStore,
) -> SkockoResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::Shape {
            asset,
            transform,
            color,
            opacity,
        } => {
            let prepared = assets.get(*asset)?;
            let PreparedAsset::Shape(shape) = prepared else {
                return Err(SkockoError::evaluation("AssetId is not a PreparedShape"));
            };

            ctx.set_transform(affine_to_cpu(*transform));

            if let Some(fill) = &shape.fill_path {
                let fill_opacity = opacity * shape.fill_opacity;
                if fill_opacity > 0.0 {
                    ctx.set_paint(paint_color(*color));
                    if fill_opacity < 1.0 {
                        ctx.push_opacity_layer(fill_opacity);
                    }
                    ctx.fill_path(&bezpath_to_cpu(fill));
                    if fill_opacity < 1.0 {
                        ctx.pop_layer();
                    }
                }
            }

            if let Some(stroke) = &shape.stroke_path {
                ctx.set_paint(paint_color(*color));
                if *opacity < 1.0 {
                    ctx.push_opacity_layer(*opacity);
                }
                ctx.fill_path(&bezpath_to_cpu(stroke));
                if *opacity < 1.0 {
                    ctx.pop_layer();
                }
            }

            Ok(())
        }
        DrawOp::Text {
            asset,
            transform,
            color,
            opacity,
        } => {
            let prepared = assets.get(*asset)?;
            let PreparedAsset::Text(t) = prepared else {
                return Err(SkockoError::evaluation("AssetId is not a PreparedText"));
            };

            let font = backend.font_for_text_asset(*asset, assets)?;
            ctx.set_transform(affine_to_cpu(*transform));
            // Clip fill overrides the layout brush so text color can animate.
            ctx.set_paint(paint_color(*color));

            if *opacity < 1.0 {
                ctx.push_opacity_layer(*opacity);
            }

            for line in t.layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };

                    let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }

            if *opacity < 1.0 {
                ctx.pop_layer();
            }

            Ok(())
        }
    }
}

fn paint_color(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn canvas_rect(width: u32, height: u32) -> vello_cpu::kurbo::BezPath {
    let mut p = vello_cpu::kurbo::BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((f64::from(width), 0.0));
    p.line_to((f64::from(width), f64::from(height)));
    p.line_to((0.0, f64::from(height)));
    p.close_path();
    p
}

fn affine_to_cpu(a: crate::core::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: crate::core::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &crate::core::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_rect_spans_the_full_surface() {
        use vello_cpu::kurbo::Shape as _;
        let r = canvas_rect(640, 360);
        let bbox = r.bounding_box();
        assert_eq!(bbox.min_x(), 0.0);
        assert_eq!(bbox.min_y(), 0.0);
        assert_eq!(bbox.max_x(), 640.0);
        assert_eq!(bbox.max_y(), 360.0);
    }

    #[test]
    fn bezpath_conversion_preserves_elements() {
        let mut p = crate::core::BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((1.0, 2.0));
        p.close_path();
        let cpu = bezpath_to_cpu(&p);
        assert_eq!(cpu.elements().len(), 3);
    }
}
