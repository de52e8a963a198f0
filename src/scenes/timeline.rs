use crate::{
    anim::{Anim, InterpMode, Keyframe, Keyframes, Lerp},
    core::{FrameIndex, FrameRange, Fps},
    ease::Ease,
    error::SkockoResult,
    model::TransitionSpec,
};

/// Frame cursor used to schedule clips sequentially, the way a storyboard
/// reads: show this, wait, then show that.
#[derive(Clone, Copy, Debug)]
pub struct Timeline {
    fps: Fps,
    cursor: u64,
}

impl Timeline {
    pub fn new(fps: Fps) -> Self {
        Self { fps, cursor: 0 }
    }

    pub fn frames(&self, secs: f64) -> u64 {
        self.fps.secs_to_frames(secs)
    }

    pub fn now(&self) -> FrameIndex {
        FrameIndex(self.cursor)
    }

    /// Advances the cursor without scheduling anything.
    pub fn wait(&mut self, secs: f64) {
        self.cursor += self.frames(secs);
    }

    /// Returns a range starting at the cursor and advances past it.
    pub fn span(&mut self, secs: f64) -> SkockoResult<FrameRange> {
        let start = self.cursor;
        self.cursor += self.frames(secs).max(1);
        FrameRange::new(FrameIndex(start), FrameIndex(self.cursor))
    }

    /// Range from the cursor to an absolute end frame; does not advance.
    pub fn until(&self, end: FrameIndex) -> SkockoResult<FrameRange> {
        FrameRange::new(FrameIndex(self.cursor), end)
    }

    /// Range covering `secs` from the cursor without advancing. Used for
    /// clips that overlap the next scheduled step.
    pub fn overlay(&self, secs: f64) -> SkockoResult<FrameRange> {
        let end = self.cursor + self.frames(secs).max(1);
        FrameRange::new(FrameIndex(self.cursor), FrameIndex(end))
    }

    pub fn end(&self) -> FrameIndex {
        FrameIndex(self.cursor)
    }
}

pub fn fade(duration_frames: u64) -> TransitionSpec {
    TransitionSpec {
        kind: "fade".to_string(),
        duration_frames,
        ease: Ease::InOutQuad,
        params: serde_json::Value::Null,
    }
}

pub fn slide(duration_frames: u64, dx: f64, dy: f64) -> TransitionSpec {
    TransitionSpec {
        kind: "slide".to_string(),
        duration_frames,
        ease: Ease::OutCubic,
        params: serde_json::json!({ "dx": dx, "dy": dy }),
    }
}

pub fn pop(duration_frames: u64) -> TransitionSpec {
    TransitionSpec {
        kind: "pop".to_string(),
        duration_frames,
        ease: Ease::OutBack,
        params: serde_json::Value::Null,
    }
}

/// Linear keyframe track from `(clip_local_frame, value)` steps. Steps must
/// already be in frame order.
pub fn keys<T: Lerp + Clone>(steps: Vec<(u64, T)>) -> Anim<T> {
    keys_eased(steps, Ease::InOutQuad)
}

pub fn keys_eased<T: Lerp + Clone>(steps: Vec<(u64, T)>, ease: Ease) -> Anim<T> {
    Anim::Keyframes(Keyframes {
        keys: steps
            .into_iter()
            .map(|(frame, value)| Keyframe {
                frame: FrameIndex(frame),
                value,
                ease,
            })
            .collect(),
        mode: InterpMode::Linear,
        default: None,
    })
}

/// Stepped track that snaps to each value with no interpolation.
pub fn hold_keys<T: Lerp + Clone>(steps: Vec<(u64, T)>) -> Anim<T> {
    Anim::Keyframes(Keyframes {
        keys: steps
            .into_iter()
            .map(|(frame, value)| Keyframe {
                frame: FrameIndex(frame),
                value,
                ease: Ease::Linear,
            })
            .collect(),
        mode: InterpMode::Hold,
        default: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::SampleCtx;

    fn ctx(frame: u64) -> SampleCtx {
        SampleCtx {
            frame: FrameIndex(frame),
            fps: Fps::new(30, 1).unwrap(),
            clip_local: FrameIndex(frame),
        }
    }

    #[test]
    fn span_advances_cursor() {
        let mut tl = Timeline::new(Fps::new(30, 1).unwrap());
        let a = tl.span(1.0).unwrap();
        let b = tl.span(0.5).unwrap();
        assert_eq!((a.start.0, a.end.0), (0, 30));
        assert_eq!((b.start.0, b.end.0), (30, 45));
        assert_eq!(tl.end().0, 45);
    }

    #[test]
    fn overlay_does_not_advance() {
        let mut tl = Timeline::new(Fps::new(30, 1).unwrap());
        tl.wait(1.0);
        let r = tl.overlay(2.0).unwrap();
        assert_eq!((r.start.0, r.end.0), (30, 90));
        assert_eq!(tl.now().0, 30);
    }

    #[test]
    fn hold_keys_snap_between_steps() {
        let anim = hold_keys(vec![(0, 1.0), (10, 2.0), (20, 3.0)]);
        assert_eq!(anim.sample(ctx(9)).unwrap(), 1.0);
        assert_eq!(anim.sample(ctx(10)).unwrap(), 2.0);
        assert_eq!(anim.sample(ctx(25)).unwrap(), 3.0);
    }

    #[test]
    fn keys_interpolate_between_steps() {
        let anim = keys_eased(vec![(0, 0.0), (10, 10.0)], Ease::Linear);
        assert_eq!(anim.sample(ctx(5)).unwrap(), 5.0);
    }
}
