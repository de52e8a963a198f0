use std::path::Path;

use crate::{
    assets::PreparedAssetStore,
    compile::compile_frame,
    core::FrameIndex,
    encode_ffmpeg::{EncodeConfig, FfmpegEncoder, OutputFormat},
    error::{SkockoError, SkockoResult},
    eval::Evaluator,
    model::Composition,
    render::{FrameRGBA, RenderBackend},
};

/// Renders a single frame of `comp` through the backend.
#[tracing::instrument(skip(comp, backend, assets))]
pub fn render_frame(
    comp: &Composition,
    frame: FrameIndex,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> SkockoResult<FrameRGBA> {
    let graph = Evaluator::eval_frame(comp, frame)?;
    let plan = compile_frame(comp.canvas, &graph, assets)?;
    backend.render_plan(&plan, assets)
}

#[derive(Clone, Debug)]
pub struct RenderToFileOptions {
    pub format: OutputFormat,
    pub overwrite: bool,
    /// Opaque background composited under the frames before encoding.
    pub bg_rgba: [u8; 4],
}

/// Renders every frame of `comp` and pipes them through a single ffmpeg
/// process into `out_path`.
pub fn render_to_file(
    comp: &Composition,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
    out_path: &Path,
    opts: &RenderToFileOptions,
) -> SkockoResult<()> {
    comp.validate()?;

    let fps = comp.fps.as_f64().round() as u32;
    if fps == 0 {
        return Err(SkockoError::validation("composition fps rounds to zero"));
    }

    let cfg = EncodeConfig {
        width: comp.canvas.width,
        height: comp.canvas.height,
        fps,
        format: opts.format,
        out_path: out_path.to_path_buf(),
        overwrite: opts.overwrite,
    };
    let mut encoder = FfmpegEncoder::new(cfg, opts.bg_rgba)?;

    let total = comp.duration.0;
    for i in 0..total {
        let frame = render_frame(comp, FrameIndex(i), backend, assets)?;
        encoder.encode_frame(&frame)?;
        if i % 30 == 0 || i + 1 == total {
            tracing::info!(frame = i, total, "encoded");
        }
    }

    encoder.finish()
}
