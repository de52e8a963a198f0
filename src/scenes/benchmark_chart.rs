//! Closing chart: per-game solve time of the assembly build against the C
//! reference, bars growing from the x-axis.

use super::{
    line, place, rect, text,
    theme::Theme,
    timeline::{self, keys_eased, Timeline},
};
use crate::{
    anim::Anim,
    core::{FrameRange, Transform2D, Vec2},
    dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    ease::Ease,
    error::{SkockoError, SkockoResult},
    model::{Composition, ShapeStyle},
};

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub assembly_time_ms: f64,
    pub c_time_ms: f64,
    pub max_time_ms: f64,
    pub bar_width: f64,
    pub chart_height: f64,
    pub show_speedup: bool,
    pub grow_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assembly_time_ms: 2.5,
            c_time_ms: 6.5,
            max_time_ms: 10.0,
            bar_width: 110.0,
            chart_height: 360.0,
            show_speedup: true,
            grow_secs: 1.2,
        }
    }
}

pub fn compose(cfg: &Config, theme: &Theme) -> SkockoResult<Composition> {
    if cfg.assembly_time_ms <= 0.0 || cfg.c_time_ms <= 0.0 {
        return Err(SkockoError::config("times must be > 0"));
    }
    if cfg.max_time_ms < cfg.assembly_time_ms.max(cfg.c_time_ms) {
        return Err(SkockoError::config("max_time_ms must cover both bars"));
    }

    let mut tl = Timeline::new(theme.fps);
    tl.wait(1.5);
    let axes_in = tl.now();
    tl.wait(1.0);
    let asm_in = tl.now();
    tl.wait(cfg.grow_secs + 0.4);
    let c_in = tl.now();
    tl.wait(cfg.grow_secs + 0.4);
    let speedup_in = tl.now();
    tl.wait(3.0);
    let total = tl.end();

    let mut b = CompositionBuilder::new(theme.fps, theme.canvas, total);
    let mut main = TrackBuilder::new("main");

    b = b.asset(
        "title",
        text(theme, "Benchmark: Assembly vs C Performance", 30.0),
    )?;
    main = main.clip(
        ClipBuilder::new("title", "title", Timeline::new(theme.fps).until(total)?)
            .transform(Anim::constant(place(theme, 640.0, 60.0)))
            .color(theme.text)
            .transition_in(timeline::fade(12))
            .transition_out(timeline::fade(12))
            .build()?,
    );

    // Axes. The y axis spans the chart height, the x axis the bar area.
    let base_y = 540.0;
    let origin_x = 420.0;
    b = b.asset("y-axis", line(theme, 0.0, cfg.chart_height + 30.0, 3.0))?;
    b = b.asset("x-axis", line(theme, 520.0, 0.0, 3.0))?;
    b = b.asset("x-label", text(theme, "Implementation", 20.0))?;
    b = b.asset("y-label", text(theme, "Time (ms)", 20.0))?;

    let axes_range = FrameRange::new(axes_in, total)?;
    for (key, x, y, rot) in [
        (
            "y-axis",
            origin_x,
            base_y - (cfg.chart_height + 30.0) / 2.0,
            0.0,
        ),
        ("x-axis", origin_x + 260.0, base_y, 0.0),
        ("x-label", origin_x + 260.0, base_y + 50.0, 0.0),
        (
            "y-label",
            origin_x - 60.0,
            base_y - cfg.chart_height / 2.0,
            -std::f64::consts::FRAC_PI_2,
        ),
    ] {
        main = main.clip(
            ClipBuilder::new(key, key, axes_range)
                .transform(Anim::constant(Transform2D {
                    rotation_rad: rot,
                    ..place(theme, x, y)
                }))
                .color(if key.contains("axis") {
                    theme.accent
                } else {
                    theme.muted
                })
                .transition_in(timeline::fade(10))
                .build()?,
        );
    }

    // Tick labels every 2 ms.
    let ms_to_px = cfg.chart_height / cfg.max_time_ms;
    let mut ms = 0.0;
    let mut tick = 0;
    while ms <= cfg.max_time_ms {
        let key = format!("tick-{tick}");
        b = b.asset(&key, text(theme, format!("{ms:.0}"), 16.0))?;
        main = main.clip(
            ClipBuilder::new(&key, &key, axes_range)
                .transform(Anim::constant(place(
                    theme,
                    origin_x - 25.0,
                    base_y - ms * ms_to_px,
                )))
                .color(theme.muted)
                .transition_in(timeline::fade(10))
                .build()?,
        );
        ms += 2.0;
        tick += 1;
    }

    // Bars grow upward from the axis via a bottom-anchored vertical scale.
    let bars = [
        (
            "asm",
            "Assembly",
            cfg.assembly_time_ms,
            theme.success,
            origin_x + 140.0,
            asm_in,
        ),
        ("c", "C", cfg.c_time_ms, theme.error, origin_x + 340.0, c_in),
    ];
    let grow = theme.fps.secs_to_frames(cfg.grow_secs);

    for (id, label, time_ms, color, x, start) in bars {
        let height = time_ms * ms_to_px;
        let bar_key = format!("bar-{id}");
        b = b.asset(
            &bar_key,
            rect(theme, cfg.bar_width, height, ShapeStyle::filled()),
        )?;

        let anchor = Vec2::new(0.0, theme.s(height) / 2.0);
        let bar_at = |sy: f64| Transform2D {
            translate: Vec2::new(theme.s(x), theme.s(base_y - height / 2.0)),
            rotation_rad: 0.0,
            scale: Vec2::new(1.0, sy.max(0.001)),
            anchor,
        };
        main = main.clip(
            ClipBuilder::new(&bar_key, &bar_key, FrameRange::new(start, total)?)
                .transform(keys_eased(
                    vec![(0, bar_at(0.0)), (grow, bar_at(1.0))],
                    Ease::OutCubic,
                ))
                .color(color)
                .build()?,
        );

        let name_key = format!("bar-label-{id}");
        b = b.asset(&name_key, text(theme, label, 20.0))?;
        main = main.clip(
            ClipBuilder::new(&name_key, &name_key, FrameRange::new(start, total)?)
                .transform(Anim::constant(place(theme, x, base_y + 26.0)))
                .color(color)
                .transition_in(timeline::fade(8))
                .build()?,
        );

        let time_key = format!("bar-time-{id}");
        b = b.asset(&time_key, text(theme, format!("{time_ms:.1} ms"), 18.0))?;
        main = main.clip(
            ClipBuilder::new(
                &time_key,
                &time_key,
                FrameRange::new(crate::core::FrameIndex(start.0 + grow), total)?,
            )
            .transform(Anim::constant(place(theme, x, base_y - height - 24.0)))
            .color(theme.text)
            .transition_in(timeline::fade(8))
            .build()?,
        );
    }

    if cfg.show_speedup {
        let speedup = cfg.c_time_ms / cfg.assembly_time_ms;
        b = b.asset(
            "speedup",
            text(theme, format!("{speedup:.1}x faster"), 26.0),
        )?;
        main = main.clip(
            ClipBuilder::new("speedup", "speedup", FrameRange::new(speedup_in, total)?)
                .transform(Anim::constant(place(theme, 1020.0, 300.0)))
                .color(theme.highlight)
                .transition_in(timeline::pop(14))
                .build()?,
        );
    }

    b.track(main.build()?).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::theme::Quality;

    fn theme() -> Theme {
        Theme::new(Quality::Medium, "f.ttf", "m.ttf").unwrap()
    }

    #[test]
    fn chart_builds_two_bars_with_speedup() {
        let comp = compose(&Config::default(), &theme()).unwrap();
        let clips = &comp.tracks[0].clips;
        assert!(clips.iter().any(|c| c.id == "bar-asm"));
        assert!(clips.iter().any(|c| c.id == "bar-c"));
        assert!(clips.iter().any(|c| c.id == "speedup"));
    }

    #[test]
    fn speedup_can_be_disabled() {
        let cfg = Config {
            show_speedup: false,
            ..Config::default()
        };
        let comp = compose(&cfg, &theme()).unwrap();
        assert!(!comp.tracks[0].clips.iter().any(|c| c.id == "speedup"));
    }

    #[test]
    fn axis_must_cover_bars() {
        let cfg = Config {
            max_time_ms: 5.0,
            ..Config::default()
        };
        assert!(compose(&cfg, &theme()).is_err());
    }
}
