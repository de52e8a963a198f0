//! Entropy view of the solve: a dot grid of the 1296 starting candidates
//! thins out guess by guess while a bar tracks the remaining bits of
//! uncertainty.

use super::{
    circle, place, rect, text,
    theme::Theme,
    timeline::{self, keys_eased, Timeline},
};
use crate::{
    anim::Anim,
    core::{FrameIndex, FrameRange, Transform2D, Vec2},
    dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    ease::Ease,
    error::{SkockoError, SkockoResult},
    model::{Composition, ShapeStyle},
};

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub remaining_counts: Vec<u64>,
    pub entropy_bits: Vec<f64>,
    pub guess_descriptions: Vec<String>,
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub dot_radius: f64,
    pub dot_pitch: f64,
    pub bar_max_width: f64,
    pub step_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remaining_counts: vec![1296, 432, 144, 48, 12, 3, 1],
            entropy_bits: vec![10.34, 8.75, 7.17, 5.58, 3.58, 1.58, 0.0],
            guess_descriptions: [
                "Initial possibilities",
                "After first guess",
                "After second guess",
                "After third guess",
                "After fourth guess",
                "After fifth guess",
                "Solution found!",
            ]
            .map(str::to_string)
            .to_vec(),
            grid_rows: 36,
            grid_cols: 36,
            dot_radius: 3.0,
            dot_pitch: 9.0,
            bar_max_width: 560.0,
            step_secs: 2.0,
        }
    }
}

pub fn compose(cfg: &Config, theme: &Theme) -> SkockoResult<Composition> {
    let steps = cfg.remaining_counts.len();
    if steps == 0
        || cfg.entropy_bits.len() != steps
        || cfg.guess_descriptions.len() != steps
    {
        return Err(SkockoError::config(
            "remaining_counts, entropy_bits and guess_descriptions must be equal-length and non-empty",
        ));
    }
    if cfg.grid_rows == 0 || cfg.grid_cols == 0 {
        return Err(SkockoError::config("grid must have rows and cols"));
    }
    let grid_total = u64::from(cfg.grid_rows) * u64::from(cfg.grid_cols);
    if cfg.remaining_counts[0] > grid_total {
        return Err(SkockoError::config(format!(
            "grid of {}x{} cannot show {} candidates",
            cfg.grid_rows, cfg.grid_cols, cfg.remaining_counts[0]
        )));
    }

    let mut tl = Timeline::new(theme.fps);
    tl.wait(1.5);
    let grid_in = tl.now();
    tl.wait(1.0);
    let step_starts: Vec<u64> = (0..steps)
        .map(|_| {
            let f = tl.now().0;
            tl.wait(cfg.step_secs);
            f
        })
        .collect();
    tl.wait(1.5);
    let total = tl.end();

    let mut b = CompositionBuilder::new(theme.fps, theme.canvas, total);
    let mut main = TrackBuilder::new("main");

    b = b.asset("title", text(theme, "Entropy Reduction in Mastermind", 30.0))?;
    main = main.clip(
        ClipBuilder::new("title", "title", Timeline::new(theme.fps).until(total)?)
            .transform(Anim::constant(place(theme, 640.0, 54.0)))
            .color(theme.text)
            .transition_in(timeline::fade(12))
            .transition_out(timeline::fade(12))
            .build()?,
    );

    // Candidate grid, row-major from the top left. Dot i survives step k iff
    // i < remaining_counts[k]; it fades on the first step that drops it.
    b = b.asset("dot", circle(theme, cfg.dot_radius, ShapeStyle::filled()))?;
    let grid_left = 420.0 - cfg.dot_pitch * f64::from(cfg.grid_cols - 1) / 2.0;
    let grid_top = 400.0 - cfg.dot_pitch * f64::from(cfg.grid_rows - 1) / 2.0;
    let fade_len = 12u64;

    for i in 0..cfg.remaining_counts[0] {
        let row = i / u64::from(cfg.grid_cols);
        let col = i % u64::from(cfg.grid_cols);
        let x = grid_left + cfg.dot_pitch * col as f64;
        let y = grid_top + cfg.dot_pitch * row as f64;

        let dropped_at = cfg
            .remaining_counts
            .iter()
            .position(|&count| i >= count)
            .map(|k| step_starts[k].saturating_sub(grid_in.0));

        let opacity = match dropped_at {
            None => Anim::constant(1.0),
            Some(at) => keys_eased(vec![(at, 1.0), (at + fade_len, 0.1)], Ease::OutQuad),
        };

        main = main.clip(
            ClipBuilder::new(format!("dot-{i}"), "dot", FrameRange::new(grid_in, total)?)
                .transform(Anim::constant(place(theme, x, y)))
                .color(theme.accent)
                .opacity(opacity)
                .transition_in(timeline::fade(10))
                .build()?,
        );
    }

    // Entropy bar anchored at its left edge so the horizontal scale reads as
    // shrinking uncertainty.
    let bar_w = cfg.bar_max_width;
    b = b.asset("bar", rect(theme, bar_w, 24.0, ShapeStyle::filled()))?;
    b = b.asset("bar-label", text(theme, "Entropy (bits)", 18.0))?;

    let bar_anchor = Vec2::new(-theme.s(bar_w) / 2.0, 0.0);
    let bar_at = |frac: f64| Transform2D {
        translate: Vec2::new(theme.s(640.0), theme.s(620.0)),
        rotation_rad: 0.0,
        scale: Vec2::new(frac.max(0.001), 1.0),
        anchor: bar_anchor,
    };
    let e0 = cfg.entropy_bits[0].max(f64::MIN_POSITIVE);
    let bar_keys: Vec<(u64, Transform2D)> = step_starts
        .iter()
        .zip(&cfg.entropy_bits)
        .map(|(&f, &e)| (f.saturating_sub(grid_in.0), bar_at(e / e0)))
        .collect();
    main = main
        .clip(
            ClipBuilder::new("bar", "bar", FrameRange::new(grid_in, total)?)
                .transform(keys_eased(bar_keys, Ease::InOutCubic))
                .color(theme.highlight)
                .transition_in(timeline::fade(10))
                .build()?,
        )
        .clip(
            ClipBuilder::new(
                "bar-label",
                "bar-label",
                FrameRange::new(grid_in, total)?,
            )
            .transform(Anim::constant(place(theme, 640.0, 580.0)))
            .color(theme.muted)
            .transition_in(timeline::fade(10))
            .build()?,
        );

    // Per-step caption on the right.
    for (k, start) in step_starts.iter().enumerate() {
        let end = step_starts
            .get(k + 1)
            .map(|f| FrameIndex(*f))
            .unwrap_or(total);
        let caption = format!(
            "{}: {} possibilities = {:.2} bits",
            cfg.guess_descriptions[k], cfg.remaining_counts[k], cfg.entropy_bits[k]
        );
        let key = format!("step-{k}");
        b = b.asset(&key, text(theme, caption, 20.0))?;
        main = main.clip(
            ClipBuilder::new(&key, &key, FrameRange::new(FrameIndex(*start), end)?)
                .transform(Anim::constant(place(theme, 950.0, 360.0)))
                .color(if k + 1 == steps {
                    theme.success
                } else {
                    theme.text
                })
                .transition_in(timeline::fade(6))
                .build()?,
        );
    }

    b.track(main.build()?).build()
}
