use crate::{
    core::{FrameIndex, Fps, Rgba8Premul, Transform2D, Vec2},
    ease::Ease,
    error::{SkockoError, SkockoResult},
};

#[derive(Clone, Copy, Debug)]
pub struct SampleCtx {
    pub frame: FrameIndex,      // global frame
    pub fps: Fps,               // global fps
    pub clip_local: FrameIndex, // frame - clip.start
}

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (*a as f64 + ((*b as f64 - *a as f64) * t)) as f32
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Transform2D {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            translate: <Vec2 as Lerp>::lerp(&a.translate, &b.translate, t),
            rotation_rad: a.rotation_rad + (b.rotation_rad - a.rotation_rad) * t,
            scale: <Vec2 as Lerp>::lerp(&a.scale, &b.scale, t),
            anchor: <Vec2 as Lerp>::lerp(&a.anchor, &b.anchor, t),
        }
    }
}

impl Lerp for Rgba8Premul {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Self {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
            a: lerp_u8(a.a, b.a, t),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Anim<T> {
    Keyframes(Keyframes<T>),
    Expr(Expr<T>),
}

impl<T> Anim<T>
where
    T: Lerp + Clone,
{
    pub fn constant(value: T) -> Self {
        Self::Keyframes(Keyframes {
            keys: vec![Keyframe {
                frame: FrameIndex(0),
                value,
                ease: Ease::Linear,
            }],
            mode: InterpMode::Hold,
            default: None,
        })
    }

    pub fn sample(&self, ctx: SampleCtx) -> SkockoResult<T> {
        match self {
            Self::Keyframes(kf) => kf.sample(ctx),
            Self::Expr(expr) => expr.sample(ctx),
        }
    }

    pub fn validate(&self) -> SkockoResult<()> {
        match self {
            Self::Keyframes(kf) => kf.validate(),
            Self::Expr(expr) => expr.validate(),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframes<T> {
    pub keys: Vec<Keyframe<T>>, // sorted by frame
    pub mode: InterpMode,       // linear/hold
    pub default: Option<T>,     // value when no keys exist
}

impl<T> Keyframes<T>
where
    T: Lerp + Clone,
{
    pub fn validate(&self) -> SkockoResult<()> {
        if self.keys.is_empty() && self.default.is_none() {
            return Err(SkockoError::animation(
                "Keyframes must have at least one key or a default value",
            ));
        }
        if !self.keys.windows(2).all(|w| w[0].frame.0 <= w[1].frame.0) {
            return Err(SkockoError::animation(
                "Keyframes keys must be sorted by frame",
            ));
        }
        Ok(())
    }

    pub fn sample(&self, ctx: SampleCtx) -> SkockoResult<T> {
        if self.keys.is_empty() {
            return self
                .default
                .clone()
                .ok_or_else(|| SkockoError::animation("Keyframes has no keys and no default"));
        }

        let f = ctx.clip_local.0;
        let idx = self.keys.partition_point(|k| k.frame.0 <= f);

        if idx == 0 {
            return Ok(self.keys[0].value.clone());
        }
        if idx >= self.keys.len() {
            return Ok(self.keys[self.keys.len() - 1].value.clone());
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let denom = b.frame.0.saturating_sub(a.frame.0);
        if denom == 0 {
            return Ok(a.value.clone());
        }

        let t = ((f - a.frame.0) as f64) / (denom as f64);
        let te = a.ease.apply(t);
        match self.mode {
            InterpMode::Hold => Ok(a.value.clone()),
            InterpMode::Linear => Ok(T::lerp(&a.value, &b.value, te)),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    pub frame: FrameIndex,
    pub value: T,
    pub ease: Ease, // ease applied toward next key
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum InterpMode {
    Hold,
    Linear,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Expr<T> {
    Delay {
        inner: Box<Anim<T>>,
        by: u64,
    },
    Loop {
        inner: Box<Anim<T>>,
        period: u64,
        mode: LoopMode,
    },
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum LoopMode {
    Repeat,
    PingPong,
}

impl<T> Expr<T>
where
    T: Lerp + Clone,
{
    pub fn validate(&self) -> SkockoResult<()> {
        match self {
            Self::Delay { inner, by: _ } => inner.validate(),
            Self::Loop {
                inner,
                period,
                mode: _,
            } => {
                if *period == 0 {
                    return Err(SkockoError::animation("Loop period must be > 0"));
                }
                inner.validate()
            }
        }
    }

    pub fn sample(&self, ctx: SampleCtx) -> SkockoResult<T> {
        fn with_clip_local(mut ctx: SampleCtx, clip_local: FrameIndex) -> SampleCtx {
            let delta = clip_local.0 as i128 - ctx.clip_local.0 as i128;
            let new_frame = if delta >= 0 {
                ctx.frame.0.saturating_add(delta as u64)
            } else {
                ctx.frame.0.saturating_sub((-delta) as u64)
            };
            ctx.frame = FrameIndex(new_frame);
            ctx.clip_local = clip_local;
            ctx
        }

        match self {
            Self::Delay { inner, by } => {
                let f = ctx.clip_local.0;
                let mapped = FrameIndex(if f < *by { 0 } else { f - by });
                inner.sample(with_clip_local(ctx, mapped))
            }
            Self::Loop {
                inner,
                period,
                mode,
            } => {
                if *period == 0 {
                    return Err(SkockoError::animation("Loop period must be > 0"));
                }
                let f = ctx.clip_local.0;
                let mapped = match mode {
                    LoopMode::Repeat => FrameIndex(f % period),
                    LoopMode::PingPong => {
                        if *period == 1 {
                            FrameIndex(0)
                        } else {
                            let cycle = 2 * (period - 1);
                            let pos = f % cycle;
                            if pos < *period {
                                FrameIndex(pos)
                            } else {
                                FrameIndex(cycle - pos)
                            }
                        }
                    }
                };
                inner.sample(with_clip_local(ctx, mapped))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(frame: u64) -> SampleCtx {
        SampleCtx {
            frame: FrameIndex(frame),
            fps: Fps::new(30, 1).unwrap(),
            clip_local: FrameIndex(frame),
        }
    }

    fn ramp(end_frame: u64, from: f64, to: f64) -> Anim<f64> {
        Anim::Keyframes(Keyframes {
            keys: vec![
                Keyframe {
                    frame: FrameIndex(0),
                    value: from,
                    ease: Ease::Linear,
                },
                Keyframe {
                    frame: FrameIndex(end_frame),
                    value: to,
                    ease: Ease::Linear,
                },
            ],
            mode: InterpMode::Linear,
            default: None,
        })
    }

    #[test]
    fn keyframes_hold_is_constant_between_keys() {
        let anim = Anim::Keyframes(Keyframes {
            keys: vec![
                Keyframe {
                    frame: FrameIndex(0),
                    value: 1.0,
                    ease: Ease::Linear,
                },
                Keyframe {
                    frame: FrameIndex(10),
                    value: 3.0,
                    ease: Ease::Linear,
                },
            ],
            mode: InterpMode::Hold,
            default: None,
        });
        assert_eq!(anim.sample(ctx(5)).unwrap(), 1.0);
        assert_eq!(anim.sample(ctx(10)).unwrap(), 3.0);
    }

    #[test]
    fn keyframes_linear_interpolates() {
        assert_eq!(ramp(10, 0.0, 10.0).sample(ctx(5)).unwrap(), 5.0);
    }

    #[test]
    fn unsorted_keys_fail_validation() {
        let anim = Anim::Keyframes(Keyframes {
            keys: vec![
                Keyframe {
                    frame: FrameIndex(10),
                    value: 0.0,
                    ease: Ease::Linear,
                },
                Keyframe {
                    frame: FrameIndex(0),
                    value: 1.0,
                    ease: Ease::Linear,
                },
            ],
            mode: InterpMode::Linear,
            default: None,
        });
        assert!(anim.validate().is_err());
    }

    #[test]
    fn expr_delay_shifts_time() {
        let delayed = Anim::Expr(Expr::Delay {
            inner: Box::new(ramp(10, 0.0, 10.0)),
            by: 5,
        });
        assert_eq!(delayed.sample(ctx(5)).unwrap(), 0.0);
        assert_eq!(delayed.sample(ctx(10)).unwrap(), 5.0);
    }

    #[test]
    fn expr_loop_ping_pong_reflects() {
        let looped = Anim::Expr(Expr::Loop {
            inner: Box::new(ramp(9, 0.0, 9.0)),
            period: 10,
            mode: LoopMode::PingPong,
        });
        assert_eq!(looped.sample(ctx(9)).unwrap(), 9.0);
        assert_eq!(looped.sample(ctx(10)).unwrap(), 8.0);
        assert_eq!(looped.sample(ctx(18)).unwrap(), 0.0);
    }

    #[test]
    fn color_lerp_midpoint() {
        let a = Rgba8Premul::opaque(0, 0, 0);
        let b = Rgba8Premul::opaque(200, 100, 50);
        let mid = Rgba8Premul::lerp(&a, &b, 0.5);
        assert_eq!((mid.r, mid.g, mid.b, mid.a), (100, 50, 25, 255));
    }
}
