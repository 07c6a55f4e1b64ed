use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error(transparent)]
    Typeahead(#[from] typeahead::TypeaheadError),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl CliError {
    pub fn json(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
