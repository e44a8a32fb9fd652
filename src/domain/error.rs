//! Domain error types.

/// A parse error with position information for expression parsing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for steptrader.
#[derive(Debug, thiserror::Error)]
pub enum SteptraderError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    ExprParse(#[from] ParseError),

    #[error(transparent)]
    Universe(#[from] crate::domain::universe::UniverseError),

    #[error("no data for {code}")]
    NoData { code: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SteptraderError> for std::process::ExitCode {
    fn from(err: &SteptraderError) -> Self {
        let code: u8 = match err {
            SteptraderError::Io(_) => 1,
            SteptraderError::ConfigParse { .. }
            | SteptraderError::ConfigMissing { .. }
            | SteptraderError::ConfigInvalid { .. } => 2,
            SteptraderError::Data { .. }
            | SteptraderError::NoData { .. }
            | SteptraderError::Universe(_) => 3,
            SteptraderError::ExprParse(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
