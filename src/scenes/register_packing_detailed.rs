//! Bit-level view of the packed register: 32 cells grouped into four bytes,
//! each symbol lighting up its bit before `rorl $8` walks the whole word one
//! byte to the right.

use super::{
    place, square, text,
    theme::Theme,
    timeline::{self, hold_keys, Timeline},
};
use crate::{
    anim::Anim,
    core::{FrameIndex, FrameRange, Rgba8Premul},
    dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    error::{SkockoError, SkockoResult},
    model::{Composition, ShapeStyle},
};

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub symbols: Vec<String>,
    pub symbol_bits: Vec<u8>,
    pub cell_size: f64,
    pub step_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: ["SKOCKO", "TREF", "PIK", "HERC"]
                .map(str::to_string)
                .to_vec(),
            symbol_bits: vec![0b1000_0000, 0b0100_0000, 0b0010_0000, 0b0001_0000],
            cell_size: 24.0,
            step_secs: 1.2,
        }
    }
}

const BYTE_COLORS: [Rgba8Premul; 4] = [
    Rgba8Premul::opaque(0x23, 0x6b, 0x8e),
    Rgba8Premul::opaque(0x49, 0xa8, 0x8f),
    Rgba8Premul::opaque(0x69, 0x9c, 0x52),
    Rgba8Premul::opaque(0x64, 0x41, 0x72),
];

pub fn compose(cfg: &Config, theme: &Theme) -> SkockoResult<Composition> {
    if cfg.symbols.len() != 4 || cfg.symbol_bits.len() != 4 {
        return Err(SkockoError::config(
            "detailed packing view expects exactly 4 symbols and 4 bit patterns",
        ));
    }

    let mut tl = Timeline::new(theme.fps);
    tl.wait(1.5);
    let cells_in = tl.now();
    tl.wait(1.0);

    // Per step: symbol caption, bit lights up in the low byte, then the lit
    // pattern shifts one byte group per rorl.
    let mut step_starts = Vec::with_capacity(4);
    for _ in 0..4 {
        step_starts.push(tl.now().0);
        tl.wait(cfg.step_secs);
        tl.wait(cfg.step_secs * 0.6); // rorl shift beat
    }
    tl.wait(1.5);
    let total = tl.end();

    // Word state after each step, bit index 31 on the left.
    let mut word: u32 = 0;
    let mut word_states = Vec::with_capacity(4);
    for bits in &cfg.symbol_bits {
        word = (word.rotate_left(8) & !0xFF) | u32::from(*bits);
        word_states.push(word);
    }

    let mut b = CompositionBuilder::new(theme.fps, theme.canvas, total);
    let mut main = TrackBuilder::new("main");

    b = b.asset(
        "title",
        text(theme, "Packing the Combination into One 32-bit Register", 30.0),
    )?;
    main = main.clip(
        ClipBuilder::new("title", "title", Timeline::new(theme.fps).until(total)?)
            .transform(Anim::constant(place(theme, 640.0, 60.0)))
            .color(theme.text)
            .transition_in(timeline::fade(12))
            .transition_out(timeline::fade(12))
            .build()?,
    );

    b = b.asset("reg-label", text(theme, "32-bit Register (%ebx)", 24.0))?;
    main = main.clip(
        ClipBuilder::new(
            "reg-label",
            "reg-label",
            Timeline::new(theme.fps).until(total)?,
        )
        .transform(Anim::constant(place(theme, 640.0, 180.0)))
        .color(theme.text)
        .transition_in(timeline::fade(12))
        .build()?,
    );

    // 32 cells, byte group 3 leftmost. Cell k shows bit (31 - k).
    let span = 32.0 * cfg.cell_size + 3.0 * 12.0;
    let left = 640.0 - span / 2.0 + cfg.cell_size / 2.0;
    b = b.asset(
        "cell",
        square(theme, cfg.cell_size, ShapeStyle::outlined_filled(2.0, 0.6)),
    )?;

    let cells_range = FrameRange::new(cells_in, total)?;
    for k in 0..32u32 {
        let byte_group = k / 8; // 0 = byte 3 (leftmost)
        let bit_index = 31 - k;
        let x = left + f64::from(k) * cfg.cell_size + f64::from(byte_group) * 12.0;
        let base = BYTE_COLORS[byte_group as usize];

        // Dim base color, flipping to the highlight while the bit is set.
        let mut color_steps = vec![(0u64, dim(base))];
        for (step, state) in word_states.iter().enumerate() {
            let at = step_starts[step].saturating_sub(cells_in.0);
            let lit = (state >> bit_index) & 1 == 1;
            color_steps.push((at, if lit { theme.highlight } else { dim(base) }));
        }
        // Consecutive equal colors collapse to the earlier key.
        color_steps.dedup_by(|later, earlier| later.1 == earlier.1);

        let id = format!("cell-{k}");
        main = main.clip(
            ClipBuilder::new(&id, "cell", cells_range)
                .transform(Anim::constant(place(theme, x, 260.0)))
                .fill(hold_keys(color_steps))
                .transition_in(timeline::fade(10))
                .build()?,
        );
    }

    // Byte group captions, byte 3 on the left matching memory order on screen.
    for g in 0..4u32 {
        let label = format!("Byte {}", 3 - g);
        let key = format!("byte-label-{g}");
        let x = left + (f64::from(g) * 8.0 + 3.5) * cfg.cell_size + f64::from(g) * 12.0;
        b = b.asset(&key, text(theme, label, 18.0))?;
        main = main.clip(
            ClipBuilder::new(&key, &key, cells_range)
                .transform(Anim::constant(place(theme, x, 310.0)))
                .color(theme.muted)
                .transition_in(timeline::fade(10))
                .build()?,
        );
    }

    // One caption per packed symbol.
    for (i, symbol) in cfg.symbols.iter().enumerate() {
        let start = FrameIndex(step_starts[i]);
        let end = step_starts
            .get(i + 1)
            .map(|f| FrameIndex(*f))
            .unwrap_or(total);
        let key = format!("symbol-{i}");
        b = b.asset(
            &key,
            text(
                theme,
                format!("{} -> bit 0b{:08b}", symbol, cfg.symbol_bits[i]),
                22.0,
            ),
        )?;
        main = main.clip(
            ClipBuilder::new(&key, &key, FrameRange::new(start, end)?)
                .transform(Anim::constant(place(theme, 640.0, 420.0)))
                .color(theme.text)
                .transition_in(timeline::slide(10, 0.0, theme.s(30.0)))
                .transition_out(timeline::fade(8))
                .build()?,
        );
    }

    b.track(main.build()?).build()
}

fn dim(c: Rgba8Premul) -> Rgba8Premul {
    Rgba8Premul {
        r: c.r / 2,
        g: c.g / 2,
        b: c.b / 2,
        a: c.a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::theme::Quality;

    #[test]
    fn builds_32_cells_and_4_captions() {
        let theme = Theme::new(Quality::Medium, "f.ttf", "m.ttf").unwrap();
        let comp = compose(&Config::default(), &theme).unwrap();
        let clips = &comp.tracks[0].clips;
        assert_eq!(clips.iter().filter(|c| c.id.starts_with("cell-")).count(), 32);
        assert_eq!(
            clips.iter().filter(|c| c.id.starts_with("symbol-")).count(),
            4
        );
    }

    #[test]
    fn wrong_symbol_count_is_rejected() {
        let theme = Theme::new(Quality::Medium, "f.ttf", "m.ttf").unwrap();
        let cfg = Config {
            symbols: vec!["SKOCKO".to_string()],
            ..Config::default()
        };
        assert!(compose(&cfg, &theme).is_err());
    }
}
