//! Stack writes for the feedback display: `subl` hops %esp over the unused
//! slots, then three `pushl`s drop the peg glyph addresses into place.

use super::{
    arrow, circle, mono, place, rect, text,
    theme::Theme,
    timeline::{self, keys_eased, Timeline},
};
use crate::{
    anim::Anim,
    core::{FrameIndex, FrameRange, Rgba8Premul, Transform2D, Vec2},
    dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    ease::Ease,
    error::{SkockoError, SkockoResult},
    model::{Composition, ShapeStyle},
};

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct PushedSymbol {
    pub name: String,
    pub rgb: [u8; 3],
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub stack_slots: u32,
    pub skip_slots: u32,
    pub symbols_to_push: Vec<PushedSymbol>,
    pub slot_width: f64,
    pub slot_height: f64,
    pub slot_spacing: f64,
    pub step_secs: f64,
}

impl Default for PushedSymbol {
    fn default() -> Self {
        Self {
            name: "peg".to_string(),
            rgb: [255, 255, 255],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack_slots: 15,
            skip_slots: 3,
            symbols_to_push: vec![
                PushedSymbol {
                    name: "yellow".to_string(),
                    rgb: [0xff, 0xff, 0x00],
                },
                PushedSymbol {
                    name: "red".to_string(),
                    rgb: [0xfc, 0x62, 0x55],
                },
                PushedSymbol {
                    name: "blue".to_string(),
                    rgb: [0x58, 0xc4, 0xdd],
                },
            ],
            slot_width: 150.0,
            slot_height: 30.0,
            slot_spacing: 6.0,
            step_secs: 1.1,
        }
    }
}

pub fn compose(cfg: &Config, theme: &Theme) -> SkockoResult<Composition> {
    let pushes = cfg.symbols_to_push.len() as u32;
    if pushes == 0 {
        return Err(SkockoError::config("symbols_to_push must be non-empty"));
    }
    if cfg.skip_slots + pushes > cfg.stack_slots {
        return Err(SkockoError::config(
            "skip_slots + pushes exceeds stack_slots",
        ));
    }

    let mut tl = Timeline::new(theme.fps);
    tl.wait(1.5);
    let stack_in = tl.now();
    tl.wait(1.2);
    let sub_at = tl.now().0;
    tl.wait(cfg.step_secs);
    let push_starts: Vec<u64> = (0..pushes)
        .map(|_| {
            let f = tl.now().0;
            tl.wait(cfg.step_secs);
            f
        })
        .collect();
    tl.wait(2.0);
    let total = tl.end();

    let mut b = CompositionBuilder::new(theme.fps, theme.canvas, total);
    let mut main = TrackBuilder::new("main");

    b = b.asset("title", text(theme, "Stack Overwrite Execution", 30.0))?;
    main = main.clip(
        ClipBuilder::new("title", "title", Timeline::new(theme.fps).until(total)?)
            .transform(Anim::constant(place(theme, 640.0, 60.0)))
            .color(theme.text)
            .transition_in(timeline::fade(12))
            .transition_out(timeline::fade(12))
            .build()?,
    );

    b = b.asset(
        "push-code",
        mono(
            theme,
            "subl %eax, %esp\n\
             pushl $znak_zuti\n\
             pushl $znak_crveni\n\
             pushl $znak_plavi",
            18.0,
        ),
    )?;
    main = main.clip(
        ClipBuilder::new(
            "push-code",
            "push-code",
            FrameRange::new(stack_in, total)?,
        )
        .transform(Anim::constant(place(theme, 1020.0, 280.0)))
        .color(theme.text)
        .transition_in(timeline::fade(10))
        .build()?,
    );

    // Stack grows downward on screen; slot 0 on top.
    let pitch = cfg.slot_height + cfg.slot_spacing;
    let top_y = 150.0;
    let stack_x = 520.0;
    let slot_y = |i: u32| top_y + pitch * f64::from(i);

    b = b.asset(
        "slot",
        rect(
            theme,
            cfg.slot_width,
            cfg.slot_height,
            ShapeStyle::outlined_filled(2.0, 0.2),
        ),
    )?;
    b = b.asset("slot-empty", text(theme, "empty", 14.0))?;

    let stack_range = FrameRange::new(stack_in, total)?;
    for i in 0..cfg.stack_slots {
        main = main.clip(
            ClipBuilder::new(format!("slot-{i}"), "slot", stack_range)
                .transform(Anim::constant(place(theme, stack_x, slot_y(i))))
                .color(theme.muted)
                .transition_in(timeline::fade(8))
                .build()?,
        );

        // "empty" caption until (and unless) a push lands on the slot.
        let filled_at = (i >= cfg.skip_slots && i < cfg.skip_slots + pushes)
            .then(|| push_starts[(i - cfg.skip_slots) as usize]);
        let label_range = match filled_at {
            Some(f) => FrameRange::new(stack_in, FrameIndex(f))?,
            None => stack_range,
        };
        main = main.clip(
            ClipBuilder::new(format!("slot-empty-{i}"), "slot-empty", label_range)
                .transform(Anim::constant(place(theme, stack_x, slot_y(i))))
                .color(theme.muted)
                .transition_in(timeline::fade(8))
                .transition_out(timeline::fade(4))
                .build()?,
        );
    }

    // %esp pointer beside the stack: subl hops it over the skipped slots,
    // each push advances it one more slot.
    b = b.asset("esp-arrow", arrow(theme, 40.0, 7.0))?;
    b = b.asset("esp-label", mono(theme, "%esp", 18.0))?;
    let esp_x = stack_x - cfg.slot_width / 2.0 - 50.0;
    let esp_at = |slot: u32| {
        Transform2D {
            translate: Vec2::new(theme.s(esp_x), theme.s(slot_y(slot))),
            rotation_rad: -std::f64::consts::FRAC_PI_2,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
        }
    };
    let mut esp_keys = vec![(0u64, esp_at(0))];
    esp_keys.push((sub_at.saturating_sub(stack_in.0), esp_at(0)));
    esp_keys.push((
        sub_at.saturating_sub(stack_in.0) + theme.fps.secs_to_frames(cfg.step_secs) / 2,
        esp_at(cfg.skip_slots),
    ));
    for (k, f) in push_starts.iter().enumerate() {
        let at = f.saturating_sub(stack_in.0);
        esp_keys.push((at, esp_at(cfg.skip_slots + k as u32)));
        esp_keys.push((
            at + theme.fps.secs_to_frames(cfg.step_secs) / 2,
            esp_at(cfg.skip_slots + k as u32 + 1),
        ));
    }
    main = main
        .clip(
            ClipBuilder::new("esp-arrow", "esp-arrow", stack_range)
                .transform(keys_eased(esp_keys.clone(), Ease::InOutCubic))
                .color(theme.error)
                .transition_in(timeline::fade(8))
                .build()?,
        )
        .clip(
            ClipBuilder::new("esp-label", "esp-label", stack_range)
                .transform(keys_eased(
                    esp_keys
                        .into_iter()
                        .map(|(f, t)| {
                            let mut t = t;
                            t.translate.x -= theme.s(55.0);
                            t.rotation_rad = 0.0;
                            (f, t)
                        })
                        .collect(),
                    Ease::InOutCubic,
                ))
                .color(theme.error)
                .transition_in(timeline::fade(8))
                .build()?,
        );

    // Pushed pegs pop into their slots.
    for (k, sym) in cfg.symbols_to_push.iter().enumerate() {
        let slot = cfg.skip_slots + k as u32;
        let start = FrameIndex(push_starts[k]);
        let peg_key = format!("peg-{k}");
        let name_key = format!("peg-name-{k}");
        b = b.asset(&peg_key, circle(theme, 9.0, ShapeStyle::filled()))?;
        b = b.asset(&name_key, text(theme, sym.name.clone(), 14.0))?;
        let color = Rgba8Premul::opaque(sym.rgb[0], sym.rgb[1], sym.rgb[2]);

        main = main
            .clip(
                ClipBuilder::new(&peg_key, &peg_key, FrameRange::new(start, total)?)
                    .transform(Anim::constant(place(
                        theme,
                        stack_x - cfg.slot_width / 4.0,
                        slot_y(slot),
                    )))
                    .color(color)
                    .transition_in(timeline::pop(10))
                    .z_offset(1)
                    .build()?,
            )
            .clip(
                ClipBuilder::new(&name_key, &name_key, FrameRange::new(start, total)?)
                    .transform(Anim::constant(place(
                        theme,
                        stack_x + cfg.slot_width / 8.0,
                        slot_y(slot),
                    )))
                    .color(color)
                    .transition_in(timeline::fade(8))
                    .z_offset(1)
                    .build()?,
            );
    }

    b.track(main.build()?).build()
}
