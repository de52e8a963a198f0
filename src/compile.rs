use crate::{
    assets::{AssetId, PreparedAsset, PreparedAssetStore},
    core::{Affine, Canvas, Rgba8Premul, Vec2},
    error::SkockoResult,
    eval::{EvaluatedGraph, ResolvedTransition},
    transitions::TransitionKind,
};

/// Flat, z-ordered draw list for one frame on a single target surface.
#[derive(Clone, Debug)]
pub struct ScenePlan {
    pub canvas: Canvas,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug)]
pub enum DrawOp {
    Shape {
        asset: AssetId,
        transform: Affine,
        color: Rgba8Premul,
        opacity: f32,
    },
    Text {
        asset: AssetId,
        transform: Affine,
        color: Rgba8Premul,
        opacity: f32,
    },
}

pub fn compile_frame(
    canvas: Canvas,
    eval: &EvaluatedGraph,
    assets: &PreparedAssetStore,
) -> SkockoResult<ScenePlan> {
    let mut ops = Vec::with_capacity(eval.nodes.len());

    for node in &eval.nodes {
        let mut opacity = node.opacity as f32;
        let mut transform = node.transform;

        if let Some(tr) = &node.transition_in {
            apply_transition(&mut opacity, &mut transform, tr, TransitionEdge::In);
        }
        if let Some(tr) = &node.transition_out {
            apply_transition(&mut opacity, &mut transform, tr, TransitionEdge::Out);
        }

        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            continue;
        }

        let id = assets.id_for_key(&node.asset)?;
        let op = match assets.get(id)? {
            PreparedAsset::Shape(_) => DrawOp::Shape {
                asset: id,
                transform,
                color: node.fill,
                opacity,
            },
            PreparedAsset::Text(t) => DrawOp::Text {
                asset: id,
                // Text layouts are top-left anchored; recentre on the clip's
                // transform origin so placement matches shapes.
                transform: transform
                    * Affine::translate(Vec2::new(
                        -f64::from(t.width) / 2.0,
                        -f64::from(t.height) / 2.0,
                    )),
                color: node.fill,
                opacity,
            },
        };
        ops.push(op);
    }

    Ok(ScenePlan { canvas, ops })
}

#[derive(Clone, Copy, Debug)]
enum TransitionEdge {
    In,
    Out,
}

fn apply_transition(
    opacity: &mut f32,
    transform: &mut Affine,
    tr: &ResolvedTransition,
    edge: TransitionEdge,
) {
    // `visibility` runs 1 -> 0 as the clip disappears, whichever edge.
    let visibility = match edge {
        TransitionEdge::In => tr.progress,
        TransitionEdge::Out => 1.0 - tr.progress,
    } as f32;

    match &tr.kind {
        TransitionKind::Fade => {
            *opacity *= visibility;
        }
        TransitionKind::Slide { dx, dy } => {
            *opacity *= visibility;
            let remaining = 1.0 - f64::from(visibility);
            *transform = Affine::translate(Vec2::new(dx * remaining, dy * remaining)) * *transform;
        }
        TransitionKind::Pop { overshoot } => {
            *opacity *= visibility;
            let v = f64::from(visibility);
            // Scale overshoots on the way in, peaking mid-window.
            let scale = v + overshoot * (v * (1.0 - v) * 4.0);
            if scale > 0.0 {
                *transform = *transform * Affine::scale(scale);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::FrameIndex,
        eval::Evaluator,
        model::tests::basic_comp,
    };
    use std::path::Path;

    #[test]
    fn compile_emits_one_op_per_visible_node() {
        let comp = basic_comp();
        let assets = PreparedAssetStore::prepare(&comp, Path::new(".")).unwrap();
        let eval = Evaluator::eval_frame(&comp, FrameIndex(30)).unwrap();
        let plan = compile_frame(comp.canvas, &eval, &assets).unwrap();
        assert_eq!(plan.ops.len(), 1);
        match &plan.ops[0] {
            DrawOp::Shape { opacity, .. } => assert_eq!(*opacity, 1.0),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn fade_in_first_frame_is_dropped() {
        // basic_comp has a 10-frame fade-in; frame 0 has progress 0 -> culled.
        let comp = basic_comp();
        let assets = PreparedAssetStore::prepare(&comp, Path::new(".")).unwrap();
        let eval = Evaluator::eval_frame(&comp, FrameIndex(0)).unwrap();
        let plan = compile_frame(comp.canvas, &eval, &assets).unwrap();
        assert!(plan.ops.is_empty());
    }

    #[test]
    fn slide_offsets_transform_mid_window() {
        let mut opacity = 1.0f32;
        let mut transform = Affine::IDENTITY;
        apply_transition(
            &mut opacity,
            &mut transform,
            &ResolvedTransition {
                kind: TransitionKind::Slide { dx: 100.0, dy: 0.0 },
                progress: 0.25,
            },
            TransitionEdge::In,
        );
        let p = transform * kurbo::Point::new(0.0, 0.0);
        assert!((p.x - 75.0).abs() < 1e-9);
        assert_eq!(opacity, 0.25);
    }
}
