pub type SkockoResult<T> = Result<T, SkockoError>;

#[derive(thiserror::Error, Debug)]
pub enum SkockoError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("animation error: {0}")]
    Animation(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkockoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            SkockoError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            SkockoError::animation("x")
                .to_string()
                .contains("animation error:")
        );
        assert!(
            SkockoError::evaluation("x")
                .to_string()
                .contains("evaluation error:")
        );
        assert!(SkockoError::config("x").to_string().contains("config error:"));
        assert!(SkockoError::encode("x").to_string().contains("encode error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = SkockoError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
