//! Step-through of the packing loop: `rorb %cl, %bl` places a symbol's bit
//! in the low byte, `rorl $8, %ebx` makes room for the next one. The
//! register readout follows the arithmetic for each packed symbol.

use super::{
    asm, mono, place, rect, text,
    theme::Theme,
    timeline::{self, Timeline},
};
use crate::{
    anim::Anim,
    dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    error::{SkockoError, SkockoResult},
    model::{Composition, ShapeStyle},
};

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub symbols: Vec<String>,
    pub symbol_bits: Vec<u8>,
    pub initial_mask: u32,
    pub rotate_count: u32,
    pub step_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: ["SKOCKO", "TREF", "PIK", "HERC"]
                .map(str::to_string)
                .to_vec(),
            symbol_bits: vec![0b1000_0000, 0b0100_0000, 0b0010_0000, 0b0001_0000],
            initial_mask: 0b10000000_10000000_10000000_10000000,
            rotate_count: 3,
            step_secs: 1.0,
        }
    }
}

pub fn compose(cfg: &Config, theme: &Theme) -> SkockoResult<Composition> {
    if cfg.symbols.is_empty() || cfg.symbols.len() != cfg.symbol_bits.len() {
        return Err(SkockoError::config(
            "symbols and symbol_bits must be non-empty and equal-length",
        ));
    }

    let mut tl = Timeline::new(theme.fps);
    tl.wait(1.5);

    // Register readout states: one per executed instruction.
    struct ValueState {
        start: u64,
        hex: String,
        success: bool,
        caption: Option<String>,
    }

    let mut states = vec![ValueState {
        start: tl.now().0,
        hex: format!("0x{:08X}", cfg.initial_mask),
        success: false,
        caption: None,
    }];
    tl.wait(cfg.step_secs);

    let mut value = cfg.initial_mask;
    for (symbol, _bits) in cfg.symbols.iter().zip(&cfg.symbol_bits) {
        value = asm::rorb(value, cfg.rotate_count);
        states.push(ValueState {
            start: tl.now().0,
            hex: format!("0x{value:08X}"),
            success: true,
            caption: Some(format!("rorb places {symbol}")),
        });
        tl.wait(cfg.step_secs);

        value = asm::rorl(value, 8);
        states.push(ValueState {
            start: tl.now().0,
            hex: format!("0x{value:08X}"),
            success: false,
            caption: Some("rorl $8 rotates the register".to_string()),
        });
        tl.wait(cfg.step_secs);
    }

    tl.wait(1.5);
    let total = tl.end();

    let mut b = CompositionBuilder::new(theme.fps, theme.canvas, total);
    let mut main = TrackBuilder::new("main");

    b = b.asset(
        "title",
        text(theme, "Executing Bit Placement in Register", 30.0),
    )?;
    main = main.clip(
        ClipBuilder::new("title", "title", Timeline::new(theme.fps).until(total)?)
            .transform(Anim::constant(place(theme, 640.0, 60.0)))
            .color(theme.text)
            .transition_in(timeline::fade(12))
            .transition_out(timeline::fade(12))
            .build()?,
    );

    b = b.asset("code", mono(theme, "rorb %cl, %bl\nrorl $8, %ebx", 20.0))?;
    // The code block flashes toward the highlight color at each rorb step.
    let mut code_colors = vec![(0, theme.text)];
    for s in states.iter().filter(|s| s.success) {
        let at = s.start;
        code_colors.push((at.saturating_sub(6), theme.text));
        code_colors.push((at, theme.highlight));
        code_colors.push((at + 8, theme.text));
    }
    main = main.clip(
        ClipBuilder::new(
            "code",
            "code",
            Timeline::new(theme.fps).until(total)?,
        )
        .transform(Anim::constant(place(theme, 180.0, 140.0)))
        .fill(timeline::keys(code_colors))
        .transition_in(timeline::fade(12))
        .build()?,
    );

    b = b.asset(
        "reg-box",
        rect(theme, 380.0, 76.0, ShapeStyle::outlined_filled(3.0, 0.08)),
    )?;
    b = b.asset("reg-label", text(theme, "%ebx", 24.0))?;
    main = main
        .clip(
            ClipBuilder::new(
                "reg-box",
                "reg-box",
                Timeline::new(theme.fps).until(total)?,
            )
            .transform(Anim::constant(place(theme, 640.0, 340.0)))
            .color(theme.accent)
            .transition_in(timeline::pop(14))
            .build()?,
        )
        .clip(
            ClipBuilder::new(
                "reg-label",
                "reg-label",
                Timeline::new(theme.fps).until(total)?,
            )
            .transform(Anim::constant(place(theme, 640.0, 280.0)))
            .color(theme.text)
            .transition_in(timeline::fade(12))
            .build()?,
        );

    for (i, st) in states.iter().enumerate() {
        let end = states
            .get(i + 1)
            .map(|n| crate::core::FrameIndex(n.start))
            .unwrap_or(total);
        let range = crate::core::FrameRange::new(crate::core::FrameIndex(st.start), end)?;

        let value_key = format!("value-{i}");
        b = b.asset(&value_key, mono(theme, st.hex.clone(), 22.0))?;
        main = main.clip(
            ClipBuilder::new(&value_key, &value_key, range)
                .transform(Anim::constant(place(theme, 640.0, 340.0)))
                .color(if st.success {
                    theme.success
                } else {
                    theme.text
                })
                .transition_in(timeline::fade(5))
                .z_offset(1)
                .build()?,
        );

        if let Some(caption) = &st.caption {
            let caption_key = format!("caption-{i}");
            b = b.asset(&caption_key, text(theme, caption.clone(), 20.0))?;
            main = main.clip(
                ClipBuilder::new(&caption_key, &caption_key, range)
                    .transform(Anim::constant(place(theme, 640.0, 440.0)))
                    .color(theme.muted)
                    .transition_in(timeline::fade(5))
                    .build()?,
            );
        }
    }

    b.track(main.build()?).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::theme::Quality;

    #[test]
    fn default_scene_shows_all_packing_steps() {
        let theme = Theme::new(Quality::Medium, "f.ttf", "m.ttf").unwrap();
        let comp = compose(&Config::default(), &theme).unwrap();
        // One readout per instruction: initial + (rorb, rorl) per symbol.
        let readouts = comp
            .tracks[0]
            .clips
            .iter()
            .filter(|c| c.id.starts_with("value-"))
            .count();
        assert_eq!(readouts, 1 + 2 * 4);
    }

    #[test]
    fn mismatched_symbol_tables_are_rejected() {
        let theme = Theme::new(Quality::Medium, "f.ttf", "m.ttf").unwrap();
        let cfg = Config {
            symbol_bits: vec![0x80],
            ..Config::default()
        };
        assert!(compose(&cfg, &theme).is_err());
    }
}
