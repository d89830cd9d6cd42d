use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Unsupported script language '{0}'")]
    UnsupportedLanguage(String),

    #[error("Script syntax error at token {position}: {message}")]
    Syntax { position: usize, message: String },
}
