//! Candidate elimination: the solver walks the candidate array, replays the
//! last feedback against each entry, and compacts the survivors back into
//! memory. Blocks flash as they are tested and drop to the survivor row or
//! gray out.

use super::{
    mono, place, rect, text,
    theme::Theme,
    timeline::{self, hold_keys, keys_eased, Timeline},
};
use crate::{
    anim::Anim,
    core::{FrameIndex, FrameRange},
    dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    ease::Ease,
    error::{SkockoError, SkockoResult},
    model::{Composition, ShapeStyle},
};

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub num_candidates: u32,
    pub candidates_to_keep: Vec<u32>,
    pub block_width: f64,
    pub block_height: f64,
    pub block_spacing: f64,
    pub test_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_candidates: 10,
            candidates_to_keep: vec![0, 2, 4, 6, 8],
            block_width: 80.0,
            block_height: 44.0,
            block_spacing: 16.0,
            test_secs: 0.9,
        }
    }
}

pub fn compose(cfg: &Config, theme: &Theme) -> SkockoResult<Composition> {
    if cfg.num_candidates == 0 {
        return Err(SkockoError::config("num_candidates must be > 0"));
    }
    if let Some(bad) = cfg
        .candidates_to_keep
        .iter()
        .find(|&&i| i >= cfg.num_candidates)
    {
        return Err(SkockoError::config(format!(
            "candidates_to_keep index {bad} out of range 0..{}",
            cfg.num_candidates
        )));
    }

    let mut tl = Timeline::new(theme.fps);
    tl.wait(1.5);
    let array_in = tl.now();
    tl.wait(1.2);

    let test_starts: Vec<u64> = (0..cfg.num_candidates)
        .map(|_| {
            let f = tl.now().0;
            tl.wait(cfg.test_secs);
            f
        })
        .collect();
    tl.wait(0.5);
    let summary_in = tl.now();
    tl.wait(2.5);
    let total = tl.end();

    let mut b = CompositionBuilder::new(theme.fps, theme.canvas, total);
    let mut main = TrackBuilder::new("main");

    b = b.asset("title", text(theme, "Elimination Loop Execution", 30.0))?;
    main = main.clip(
        ClipBuilder::new("title", "title", Timeline::new(theme.fps).until(total)?)
            .transform(Anim::constant(place(theme, 640.0, 60.0)))
            .color(theme.text)
            .transition_in(timeline::fade(12))
            .transition_out(timeline::fade(12))
            .build()?,
    );

    b = b.asset("array-label", text(theme, "Memory array (candidates)", 22.0))?;
    main = main.clip(
        ClipBuilder::new(
            "array-label",
            "array-label",
            FrameRange::new(array_in, total)?,
        )
        .transform(Anim::constant(place(theme, 520.0, 150.0)))
        .color(theme.muted)
        .transition_in(timeline::fade(10))
        .build()?,
    );

    b = b.asset(
        "loop-code",
        mono(
            theme,
            "movl sve_kombinacije(,%ecx,4), %ebx\n\
             call histogram\n\
             cmpl crveni, %esi\n\
             jne skip\n\
             movl %ebx, rezultat(,%edx,4)\n\
             incl %edx",
            16.0,
        ),
    )?;
    main = main.clip(
        ClipBuilder::new(
            "loop-code",
            "loop-code",
            FrameRange::new(array_in, total)?,
        )
        .transform(Anim::constant(place(theme, 1080.0, 260.0)))
        .color(theme.text)
        .transition_in(timeline::fade(10))
        .build()?,
    );

    // Candidate blocks. Each one flashes under test, then either drops to
    // the survivor row (slot assigned by %edx order) or dims out.
    let pitch = cfg.block_width + cfg.block_spacing;
    let left = 520.0 - pitch * f64::from(cfg.num_candidates - 1) / 2.0;
    let src_y = 220.0;
    let dst_y = 420.0;

    b = b.asset(
        "block",
        rect(
            theme,
            cfg.block_width,
            cfg.block_height,
            ShapeStyle::outlined_filled(2.0, 0.3),
        ),
    )?;

    let mut kept_so_far = 0u32;
    for i in 0..cfg.num_candidates {
        let keep = cfg.candidates_to_keep.contains(&i);
        let test_at = test_starts[i as usize].saturating_sub(array_in.0);
        let x = left + pitch * f64::from(i);
        let test_len = theme.fps.secs_to_frames(cfg.test_secs);

        let color = {
            let verdict = if keep { theme.success } else { theme.error };
            hold_keys(vec![
                (0, theme.muted),
                (test_at, theme.highlight),
                (test_at + test_len / 2, verdict),
            ])
        };

        let transform = if keep {
            let dst_x = left + pitch * f64::from(kept_so_far);
            kept_so_far += 1;
            keys_eased(
                vec![
                    (test_at + test_len / 2, place(theme, x, src_y)),
                    (test_at + test_len, place(theme, dst_x, dst_y)),
                ],
                Ease::InOutCubic,
            )
        } else {
            Anim::constant(place(theme, x, src_y))
        };

        let opacity = if keep {
            Anim::constant(1.0)
        } else {
            keys_eased(
                vec![(test_at + test_len / 2, 1.0), (test_at + test_len, 0.25)],
                Ease::OutQuad,
            )
        };

        let id = format!("cand-{i}");
        main = main.clip(
            ClipBuilder::new(&id, "block", FrameRange::new(array_in, total)?)
                .transform(transform)
                .fill(color)
                .opacity(opacity)
                .transition_in(timeline::fade(8))
                .build()?,
        );
    }

    // %ecx readout stepping through the loop.
    for (i, start) in test_starts.iter().enumerate() {
        let end = test_starts
            .get(i + 1)
            .map(|f| FrameIndex(*f))
            .unwrap_or(summary_in);
        let key = format!("ecx-{i}");
        b = b.asset(&key, mono(theme, format!("%ecx = {i}"), 20.0))?;
        main = main.clip(
            ClipBuilder::new(&key, &key, FrameRange::new(FrameIndex(*start), end)?)
                .transform(Anim::constant(place(theme, 520.0, 320.0)))
                .color(theme.highlight)
                .transition_in(timeline::fade(4))
                .build()?,
        );
    }

    b = b.asset(
        "summary",
        text(
            theme,
            format!(
                "{} of {} candidates remain",
                cfg.candidates_to_keep.len(),
                cfg.num_candidates
            ),
            24.0,
        ),
    )?;
    main = main.clip(
        ClipBuilder::new("summary", "summary", FrameRange::new(summary_in, total)?)
            .transform(Anim::constant(place(theme, 640.0, 520.0)))
            .color(theme.success)
            .transition_in(timeline::slide(12, 0.0, theme.s(24.0)))
            .build()?,
    );

    b.track(main.build()?).build()
}
