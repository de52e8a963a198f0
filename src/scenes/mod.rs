//! Scripted scene catalog. Every scene explains one mechanism of an x86
//! assembly Mastermind ("Skocko") solver as a short motion-graphics clip:
//! register bit packing, exact-match counting, candidate elimination,
//! entropy reduction, stack writes for display, and a closing benchmark.

pub mod asm;
pub mod benchmark_chart;
pub mod elimination_loop;
pub mod entropy_reduction;
pub mod exact_match;
pub mod register_packing;
pub mod register_packing_detailed;
pub mod stack_overwrite;
pub mod theme;
pub mod timeline;

use crate::{
    core::Transform2D,
    error::{SkockoError, SkockoResult},
    model::{Asset, Composition, ShapeAsset, ShapeSpec, ShapeStyle, TextAsset},
};
use self::theme::Theme;

/// Scene names with the one-line summaries printed by `list`.
pub const SCENES: [(&str, &str); 7] = [
    (
        "register-packing",
        "pack a 4-symbol combination into one 32-bit register with rorb/rorl",
    ),
    (
        "register-packing-detailed",
        "the same packing shown bit by bit across four byte groups",
    ),
    (
        "exact-match",
        "count exact matches with a bitwise AND and a popcount",
    ),
    (
        "elimination-loop",
        "walk the candidate array, keeping survivors and fading the rest",
    ),
    (
        "entropy-reduction",
        "thin 1296 possible combinations guess by guess as an entropy bar shrinks",
    ),
    (
        "stack-overwrite",
        "step %esp past scratch slots and push peg symbols for the printf display",
    ),
    (
        "benchmark-chart",
        "per-game solve time, the assembly solver next to the C one",
    ),
];

/// Iterates the scene names in catalog order.
pub fn scene_names() -> impl Iterator<Item = &'static str> {
    SCENES.iter().map(|(name, _)| *name)
}

/// Builds the named scene. `config` overrides the scene's defaults; pass
/// `None` to use them as-is.
pub fn build(
    name: &str,
    config: Option<&serde_json::Value>,
    theme: &Theme,
) -> SkockoResult<Composition> {
    fn cfg<C: Default + serde::de::DeserializeOwned>(
        config: Option<&serde_json::Value>,
    ) -> SkockoResult<C> {
        match config {
            None => Ok(C::default()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| SkockoError::config(format!("invalid scene config: {e}"))),
        }
    }

    match name {
        "register-packing" => register_packing::compose(&cfg(config)?, theme),
        "register-packing-detailed" => register_packing_detailed::compose(&cfg(config)?, theme),
        "exact-match" => exact_match::compose(&cfg(config)?, theme),
        "elimination-loop" => elimination_loop::compose(&cfg(config)?, theme),
        "entropy-reduction" => entropy_reduction::compose(&cfg(config)?, theme),
        "stack-overwrite" => stack_overwrite::compose(&cfg(config)?, theme),
        "benchmark-chart" => benchmark_chart::compose(&cfg(config)?, theme),
        other => Err(SkockoError::config(format!(
            "unknown scene '{other}' (see `list` for available scenes)"
        ))),
    }
}

// Asset shorthands shared by the scene modules. Sizes are in 720p design
// space and scaled by the theme.

pub(crate) fn text(theme: &Theme, s: impl Into<String>, size: f32) -> Asset {
    Asset::Text(TextAsset {
        text: s.into(),
        font_source: theme.body_font.clone(),
        size_px: theme.fs(size),
    })
}

pub(crate) fn mono(theme: &Theme, s: impl Into<String>, size: f32) -> Asset {
    Asset::Text(TextAsset {
        text: s.into(),
        font_source: theme.mono_font.clone(),
        size_px: theme.fs(size),
    })
}

pub(crate) fn rect(theme: &Theme, w: f64, h: f64, style: ShapeStyle) -> Asset {
    Asset::Shape(ShapeAsset {
        spec: ShapeSpec::Rect {
            width: theme.s(w),
            height: theme.s(h),
        },
        style,
    })
}

pub(crate) fn square(theme: &Theme, side: f64, style: ShapeStyle) -> Asset {
    Asset::Shape(ShapeAsset {
        spec: ShapeSpec::Square {
            side: theme.s(side),
        },
        style,
    })
}

pub(crate) fn circle(theme: &Theme, radius: f64, style: ShapeStyle) -> Asset {
    Asset::Shape(ShapeAsset {
        spec: ShapeSpec::Circle {
            radius: theme.s(radius),
        },
        style,
    })
}

pub(crate) fn line(theme: &Theme, dx: f64, dy: f64, thickness: f64) -> Asset {
    Asset::Shape(ShapeAsset {
        spec: ShapeSpec::Line {
            dx: theme.s(dx),
            dy: theme.s(dy),
            thickness: theme.s(thickness),
        },
        style: ShapeStyle::filled(),
    })
}

pub(crate) fn arrow(theme: &Theme, length: f64, thickness: f64) -> Asset {
    Asset::Shape(ShapeAsset {
        spec: ShapeSpec::Arrow {
            length: theme.s(length),
            thickness: theme.s(thickness),
            head_length: theme.s(length * 0.3),
            head_width: theme.s(thickness * 3.5),
        },
        style: ShapeStyle::filled(),
    })
}

/// Static placement at 720p design-space coordinates.
pub(crate) fn place(theme: &Theme, x: f64, y: f64) -> Transform2D {
    Transform2D::at(theme.s(x), theme.s(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::theme::Quality;

    fn test_theme() -> Theme {
        Theme::new(Quality::Medium, "fonts/body.ttf", "fonts/mono.ttf").unwrap()
    }

    #[test]
    fn every_scene_builds_and_validates() {
        let theme = test_theme();
        for name in scene_names() {
            let comp = build(name, None, &theme).unwrap_or_else(|e| panic!("{name}: {e}"));
            comp.validate().unwrap_or_else(|e| panic!("{name}: {e}"));
            assert!(comp.duration.0 > 0, "{name} has zero duration");
        }
    }

    #[test]
    fn unknown_scene_is_rejected() {
        assert!(build("no-such-scene", None, &test_theme()).is_err());
    }

    #[test]
    fn scene_config_overrides_apply() {
        let theme = test_theme();
        let cfg = serde_json::json!({ "num_candidates": 6, "candidates_to_keep": [1, 3] });
        let comp = build("elimination-loop", Some(&cfg), &theme).unwrap();
        comp.validate().unwrap();
    }

    #[test]
    fn bad_scene_config_is_rejected() {
        let theme = test_theme();
        let cfg = serde_json::json!({ "num_candidates": "ten" });
        assert!(build("elimination-loop", Some(&cfg), &theme).is_err());
    }
}
