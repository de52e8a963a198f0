use crate::{
    anim::SampleCtx,
    core::{FrameIndex, FrameRange, Rgba8Premul},
    error::{SkockoError, SkockoResult},
    model::{Clip, Composition, TransitionSpec},
    transitions::{TransitionKind, parse_transition},
};

#[derive(Clone, Debug)]
pub struct EvaluatedGraph {
    pub frame: FrameIndex,
    pub nodes: Vec<EvaluatedClipNode>,
}

#[derive(Clone, Debug)]
pub struct EvaluatedClipNode {
    pub clip_id: String,
    pub asset: String,
    pub z: i32,
    pub transform: kurbo::Affine,
    pub opacity: f64,
    pub fill: Rgba8Premul,
    pub transition_in: Option<ResolvedTransition>,
    pub transition_out: Option<ResolvedTransition>,
}

#[derive(Clone, Debug)]
pub struct ResolvedTransition {
    pub kind: TransitionKind,
    pub progress: f64, // 0..1
}

pub struct Evaluator;

impl Evaluator {
    #[tracing::instrument(skip(comp))]
    pub fn eval_frame(comp: &Composition, frame: FrameIndex) -> SkockoResult<EvaluatedGraph> {
        comp.validate()?;
        if frame.0 >= comp.duration.0 {
            return Err(SkockoError::evaluation("frame is out of bounds"));
        }

        let mut nodes_with_key: Vec<((i32, usize, u64, String), EvaluatedClipNode)> = Vec::new();

        for (track_index, track) in comp.tracks.iter().enumerate() {
            for clip in &track.clips {
                if !clip.range.contains(frame) {
                    continue;
                }

                let node = eval_clip(comp, clip, frame, track.z_base)?;
                let sort_key = (
                    node.z,
                    track_index,
                    clip.range.start.0,
                    node.clip_id.clone(),
                );
                nodes_with_key.push((sort_key, node));
            }
        }

        nodes_with_key.sort_by(|a, b| a.0.cmp(&b.0));
        let nodes = nodes_with_key.into_iter().map(|(_, n)| n).collect();

        Ok(EvaluatedGraph { frame, nodes })
    }
}

fn eval_clip(
    comp: &Composition,
    clip: &Clip,
    frame: FrameIndex,
    track_z_base: i32,
) -> SkockoResult<EvaluatedClipNode> {
    let clip_local = FrameIndex(frame.0 - clip.range.start.0);
    let ctx = SampleCtx {
        frame,
        fps: comp.fps,
        clip_local,
    };

    let opacity = clip.props.opacity.sample(ctx)?.clamp(0.0, 1.0);
    let transform = clip.props.transform.sample(ctx)?.to_affine();
    let fill = clip.props.fill.sample(ctx)?;

    Ok(EvaluatedClipNode {
        clip_id: clip.id.clone(),
        asset: clip.asset.clone(),
        z: track_z_base + clip.z_offset,
        transform,
        opacity,
        fill,
        transition_in: resolve_transition_in(clip, frame)?,
        transition_out: resolve_transition_out(clip, frame)?,
    })
}

fn resolve_transition_in(clip: &Clip, frame: FrameIndex) -> SkockoResult<Option<ResolvedTransition>> {
    let Some(spec) = clip.transition_in.as_ref() else {
        return Ok(None);
    };
    resolve_transition_window(spec, frame, clip.range, clip.range.start, TransitionEdge::In)
}

fn resolve_transition_out(
    clip: &Clip,
    frame: FrameIndex,
) -> SkockoResult<Option<ResolvedTransition>> {
    let Some(spec) = clip.transition_out.as_ref() else {
        return Ok(None);
    };
    resolve_transition_window(spec, frame, clip.range, clip.range.end, TransitionEdge::Out)
}

#[derive(Clone, Copy, Debug)]
enum TransitionEdge {
    In,
    Out,
}

fn resolve_transition_window(
    spec: &TransitionSpec,
    frame: FrameIndex,
    clip_range: FrameRange,
    edge_frame: FrameIndex,
    edge: TransitionEdge,
) -> SkockoResult<Option<ResolvedTransition>> {
    if spec.duration_frames == 0 {
        return Ok(None);
    }

    let clip_len = clip_range.len_frames();
    if clip_len == 0 {
        return Ok(None);
    }
    let dur = spec.duration_frames.min(clip_len);

    let (window_start, window_end_excl) = match edge {
        TransitionEdge::In => {
            let start = edge_frame.0;
            let end = start.saturating_add(dur);
            (FrameIndex(start), FrameIndex(end))
        }
        TransitionEdge::Out => {
            let end = edge_frame.0;
            let start = end.saturating_sub(dur);
            (FrameIndex(start), FrameIndex(end))
        }
    };

    if !(window_start.0 <= frame.0 && frame.0 < window_end_excl.0) {
        return Ok(None);
    }

    let denom = dur.saturating_sub(1);
    let t = if denom == 0 {
        1.0
    } else {
        let offset = frame.0 - window_start.0;
        (offset as f64) / (denom as f64)
    };
    let progress = spec.ease.apply(t).clamp(0.0, 1.0);

    Ok(Some(ResolvedTransition {
        kind: parse_transition(spec)?,
        progress,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        anim::Anim,
        core::{Canvas, Fps, Transform2D},
        ease::Ease,
        model::{Asset, ClipProps, ShapeAsset, ShapeSpec, ShapeStyle, Track},
    };
    use std::collections::BTreeMap;

    fn basic_comp(
        opacity: Anim<f64>,
        tr_in: Option<TransitionSpec>,
        tr_out: Option<TransitionSpec>,
    ) -> Composition {
        let mut assets = BTreeMap::new();
        assets.insert(
            "s0".to_string(),
            Asset::Shape(ShapeAsset {
                spec: ShapeSpec::Square { side: 10.0 },
                style: ShapeStyle::filled(),
            }),
        );
        Composition {
            fps: Fps::new(30, 1).unwrap(),
            canvas: Canvas {
                width: 640,
                height: 360,
            },
            duration: FrameIndex(20),
            assets,
            tracks: vec![Track {
                name: "main".to_string(),
                z_base: 0,
                clips: vec![Clip {
                    id: "c0".to_string(),
                    asset: "s0".to_string(),
                    range: FrameRange::new(FrameIndex(5), FrameIndex(15)).unwrap(),
                    props: ClipProps {
                        transform: Anim::constant(Transform2D::at(1.0, 2.0)),
                        opacity,
                        fill: Anim::constant(Rgba8Premul::opaque(255, 255, 255)),
                    },
                    z_offset: 0,
                    transition_in: tr_in,
                    transition_out: tr_out,
                }],
            }],
        }
    }

    #[test]
    fn visibility_respects_frame_range() {
        let comp = basic_comp(Anim::constant(1.0), None, None);
        for (frame, expected) in [(4u64, 0usize), (5, 1), (14, 1), (15, 0)] {
            assert_eq!(
                Evaluator::eval_frame(&comp, FrameIndex(frame))
                    .unwrap()
                    .nodes
                    .len(),
                expected,
                "frame {frame}"
            );
        }
    }

    #[test]
    fn opacity_is_clamped() {
        let comp = basic_comp(Anim::constant(2.0), None, None);
        let g = Evaluator::eval_frame(&comp, FrameIndex(5)).unwrap();
        assert_eq!(g.nodes[0].opacity, 1.0);
    }

    #[test]
    fn transition_progress_boundaries() {
        let tr = TransitionSpec {
            kind: "fade".to_string(),
            duration_frames: 3,
            ease: Ease::Linear,
            params: serde_json::Value::Null,
        };
        let comp = basic_comp(Anim::constant(1.0), Some(tr.clone()), Some(tr));

        // In transition at clip start frame.
        let g0 = Evaluator::eval_frame(&comp, FrameIndex(5)).unwrap();
        assert_eq!(g0.nodes[0].transition_in.as_ref().unwrap().progress, 0.0);

        // Last in-transition frame hits progress 1.0 (dur=3 => denom=2).
        let g_last_in = Evaluator::eval_frame(&comp, FrameIndex(7)).unwrap();
        assert_eq!(
            g_last_in.nodes[0].transition_in.as_ref().unwrap().progress,
            1.0
        );

        // Out transition starts at end-dur.
        let g_out0 = Evaluator::eval_frame(&comp, FrameIndex(12)).unwrap();
        assert_eq!(
            g_out0.nodes[0].transition_out.as_ref().unwrap().progress,
            0.0
        );

        let g_out_last = Evaluator::eval_frame(&comp, FrameIndex(14)).unwrap();
        assert_eq!(
            g_out_last.nodes[0]
                .transition_out
                .as_ref()
                .unwrap()
                .progress,
            1.0
        );
    }

    #[test]
    fn z_order_is_stable() {
        let mut comp = basic_comp(Anim::constant(1.0), None, None);
        let mut high = comp.tracks[0].clips[0].clone();
        high.id = "c1".to_string();
        high.z_offset = 5;
        comp.tracks[0].clips.insert(0, high);

        let g = Evaluator::eval_frame(&comp, FrameIndex(5)).unwrap();
        assert_eq!(g.nodes[0].clip_id, "c0");
        assert_eq!(g.nodes[1].clip_id, "c1");
    }
}
