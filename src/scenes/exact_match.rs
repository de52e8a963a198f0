//! Exact-match counting: AND the packed guess against the packed secret,
//! then count the surviving bits. Matching bit cells light up one by one
//! while the counter climbs.

use super::{
    asm, mono, place, square, text,
    theme::Theme,
    timeline::{self, Timeline},
};
use crate::{
    anim::Anim,
    core::{FrameIndex, FrameRange},
    dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    error::SkockoResult,
    model::{Composition, ShapeStyle},
};

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub guess_value: u32,
    pub secret_value: u32,
    pub cell_size: f64,
    pub count_step_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            guess_value: 0x80A0_2040,
            secret_value: 0x8010_2040,
            cell_size: 18.0,
            count_step_secs: 0.6,
        }
    }
}

pub fn compose(cfg: &Config, theme: &Theme) -> SkockoResult<Composition> {
    let and_result = cfg.guess_value & cfg.secret_value;
    let match_count = asm::exact_matches(cfg.guess_value, cfg.secret_value);

    let mut tl = Timeline::new(theme.fps);
    tl.wait(1.5);
    let rows_in = tl.now();
    tl.wait(1.5);
    let result_in = tl.now();
    tl.wait(1.0);

    // One beat per set bit in the AND result, scanned from bit 31 down,
    // mirroring the shrl loop of the counting routine.
    let count_starts: Vec<u64> = (0..match_count)
        .map(|_| {
            let f = tl.now().0;
            tl.wait(cfg.count_step_secs);
            f
        })
        .collect();
    tl.wait(0.5);
    let verdict_in = tl.now();
    tl.wait(2.5);
    let total = tl.end();

    let mut b = CompositionBuilder::new(theme.fps, theme.canvas, total);
    let mut main = TrackBuilder::new("main");

    b = b.asset("title", text(theme, "Exact Match Calculation", 30.0))?;
    main = main.clip(
        ClipBuilder::new("title", "title", Timeline::new(theme.fps).until(total)?)
            .transform(Anim::constant(place(theme, 640.0, 60.0)))
            .color(theme.text)
            .transition_in(timeline::fade(12))
            .transition_out(timeline::fade(12))
            .build()?,
    );

    b = b.asset(
        "calc",
        mono(
            theme,
            format!(
                "0x{:08X} & 0x{:08X} = 0x{:08X}",
                cfg.guess_value, cfg.secret_value, and_result
            ),
            20.0,
        ),
    )?;
    main = main.clip(
        ClipBuilder::new("calc", "calc", FrameRange::new(rows_in, total)?)
            .transform(Anim::constant(place(theme, 640.0, 130.0)))
            .color(theme.text)
            .transition_in(timeline::fade(10))
            .build()?,
    );

    // Three 32-cell rows: guess, secret, and their AND.
    let rows: [(&str, u32, f64, FrameIndex); 3] = [
        ("guess", cfg.guess_value, 220.0, rows_in),
        ("secret", cfg.secret_value, 270.0, rows_in),
        ("and", and_result, 350.0, result_in),
    ];
    b = b.asset(
        "bit-cell",
        square(theme, cfg.cell_size, ShapeStyle::outlined_filled(1.5, 0.7)),
    )?;

    let left = 640.0 - 16.0 * cfg.cell_size + cfg.cell_size / 2.0;
    let mut match_beat = 0usize;
    for (row_name, value, y, appears) in rows {
        let key = format!("label-{row_name}");
        b = b.asset(&key, text(theme, row_name, 18.0))?;
        main = main.clip(
            ClipBuilder::new(&key, &key, FrameRange::new(appears, total)?)
                .transform(Anim::constant(place(
                    theme,
                    left - 4.0 * cfg.cell_size,
                    y,
                )))
                .color(theme.muted)
                .transition_in(timeline::fade(8))
                .build()?,
        );

        for k in 0..32u32 {
            let bit = (value >> (31 - k)) & 1 == 1;
            let id = format!("{row_name}-bit-{k}");
            let color = match (row_name, bit) {
                ("and", true) => theme.success,
                (_, true) => theme.accent,
                (_, false) => theme.muted,
            };

            // Surviving AND bits pop in on their counting beat instead of
            // with the rest of the row.
            let (start, transition) = if row_name == "and" && bit {
                let s = FrameIndex(count_starts[match_beat]);
                match_beat += 1;
                (s, timeline::pop(10))
            } else {
                (appears, timeline::fade(8))
            };

            let x = left + f64::from(k) * cfg.cell_size + f64::from(k / 8) * 10.0;
            main = main.clip(
                ClipBuilder::new(&id, "bit-cell", FrameRange::new(start, total)?)
                    .transform(Anim::constant(place(theme, x, y)))
                    .color(color)
                    .opacity(Anim::constant(if bit { 1.0 } else { 0.25 }))
                    .transition_in(transition)
                    .build()?,
            );
        }
    }

    // Counter readout climbing with each surviving bit.
    for (i, start) in count_starts.iter().enumerate() {
        let end = count_starts
            .get(i + 1)
            .map(|f| FrameIndex(*f))
            .unwrap_or(total);
        let key = format!("count-{i}");
        b = b.asset(&key, mono(theme, format!("{}", i + 1), 26.0))?;
        main = main.clip(
            ClipBuilder::new(&key, &key, FrameRange::new(FrameIndex(*start), end)?)
                .transform(Anim::constant(place(theme, 640.0, 430.0)))
                .color(theme.highlight)
                .transition_in(timeline::pop(8))
                .build()?,
        );
    }

    b = b.asset(
        "verdict",
        text(
            theme,
            format!("Number of exact matches: {match_count}"),
            24.0,
        ),
    )?;
    main = main.clip(
        ClipBuilder::new("verdict", "verdict", FrameRange::new(verdict_in, total)?)
            .transform(Anim::constant(place(theme, 640.0, 500.0)))
            .color(theme.success)
            .transition_in(timeline::slide(12, 0.0, theme.s(24.0)))
            .build()?,
    );

    b.track(main.build()?).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::theme::Quality;

    #[test]
    fn default_values_give_three_matches() {
        let theme = Theme::new(Quality::Medium, "f.ttf", "m.ttf").unwrap();
        let comp = compose(&Config::default(), &theme).unwrap();
        let counts = comp.tracks[0]
            .clips
            .iter()
            .filter(|c| c.id.starts_with("count-"))
            .count();
        assert_eq!(counts, 3);
    }

    #[test]
    fn zero_matches_still_builds() {
        let theme = Theme::new(Quality::Medium, "f.ttf", "m.ttf").unwrap();
        let cfg = Config {
            guess_value: 0xF0F0_F0F0,
            secret_value: 0x0F0F_0F0F,
            ..Config::default()
        };
        let comp = compose(&cfg, &theme).unwrap();
        assert!(comp.validate().is_ok());
    }
}
