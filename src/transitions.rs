use crate::{
    error::{SkockoError, SkockoResult},
    model::TransitionSpec,
};

/// Parsed transition behavior. All kinds modulate opacity; `Slide` and `Pop`
/// additionally offset or scale the clip transform while in the window.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionKind {
    Fade,
    Slide { dx: f64, dy: f64 },
    Pop { overshoot: f64 },
}

pub fn parse_transition(spec: &TransitionSpec) -> SkockoResult<TransitionKind> {
    let kind = spec.kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(SkockoError::validation("transition kind must be non-empty"));
    }

    let params = if spec.params.is_null() {
        None
    } else {
        Some(spec.params.as_object().ok_or_else(|| {
            SkockoError::validation("transition params must be an object when set")
        })?)
    };

    let num = |name: &str, default: f64| -> SkockoResult<f64> {
        match params.and_then(|p| p.get(name)).and_then(|v| v.as_f64()) {
            None => Ok(default),
            Some(v) if v.is_finite() => Ok(v),
            Some(_) => Err(SkockoError::validation(format!(
                "transition param '{name}' must be finite"
            ))),
        }
    };

    match kind.as_str() {
        "fade" => Ok(TransitionKind::Fade),
        "slide" => {
            let dx = num("dx", 0.0)?;
            let dy = num("dy", 0.0)?;
            if dx == 0.0 && dy == 0.0 {
                return Err(SkockoError::validation(
                    "slide transition needs a non-zero dx or dy",
                ));
            }
            Ok(TransitionKind::Slide { dx, dy })
        }
        "pop" => {
            let overshoot = num("overshoot", 0.15)?;
            if !(0.0..=1.0).contains(&overshoot) {
                return Err(SkockoError::validation(
                    "pop overshoot must be within 0..=1",
                ));
            }
            Ok(TransitionKind::Pop { overshoot })
        }
        _ => Err(SkockoError::validation(format!(
            "unknown transition kind '{kind}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ease::Ease;

    fn spec(kind: &str, params: serde_json::Value) -> TransitionSpec {
        TransitionSpec {
            kind: kind.to_string(),
            duration_frames: 10,
            ease: Ease::Linear,
            params,
        }
    }

    #[test]
    fn fade_parses() {
        assert_eq!(
            parse_transition(&spec("fade", serde_json::Value::Null)).unwrap(),
            TransitionKind::Fade
        );
    }

    #[test]
    fn slide_requires_offset() {
        assert!(parse_transition(&spec("slide", serde_json::Value::Null)).is_err());
        assert_eq!(
            parse_transition(&spec("slide", serde_json::json!({ "dy": -40.0 }))).unwrap(),
            TransitionKind::Slide { dx: 0.0, dy: -40.0 }
        );
    }

    #[test]
    fn pop_default_overshoot() {
        assert_eq!(
            parse_transition(&spec("pop", serde_json::Value::Null)).unwrap(),
            TransitionKind::Pop { overshoot: 0.15 }
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(parse_transition(&spec("wipe", serde_json::Value::Null)).is_err());
    }
}
