//! skocko-anim renders short explainer animations about the internals of an
//! x86 assembly Mastermind ("Skocko") solver. Scenes are declarative
//! compositions of tracks and clips over keyframed properties, evaluated per
//! frame, compiled to draw ops, rasterized on the CPU, and piped to ffmpeg as
//! GIF or MP4.

#![forbid(unsafe_code)]

pub mod anim;
pub mod assets;
pub mod compile;
pub mod core;
pub mod dsl;
pub mod ease;
pub mod encode_ffmpeg;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod render_cpu;
pub mod scenes;
pub mod transitions;

pub use anim::{Anim, Expr, InterpMode, Keyframe, Keyframes, Lerp, LoopMode, SampleCtx};
pub use crate::core::{Canvas, FrameIndex, FrameRange, Fps, Rgba8Premul, Transform2D};
pub use dsl::{ClipBuilder, CompositionBuilder, TrackBuilder};
pub use ease::Ease;
pub use encode_ffmpeg::{EncodeConfig, FfmpegEncoder, OutputFormat};
pub use error::{SkockoError, SkockoResult};
pub use eval::{EvaluatedClipNode, EvaluatedGraph, Evaluator};
pub use model::{Asset, Clip, ClipProps, Composition, ShapeSpec, ShapeStyle, Track};
pub use pipeline::{render_frame, render_to_file, RenderToFileOptions};
pub use render::{BackendKind, FrameRGBA, RenderBackend, RenderSettings};
pub use scenes::theme::{Quality, Theme};
