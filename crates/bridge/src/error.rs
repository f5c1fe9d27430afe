use thiserror::Error;

/// Errors that can surface out of a bridge run.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("ui refresh failed: {source}")]
    Ui {
        #[source]
        source: anyhow::Error,
    },

    #[error("background task '{name}' failed: {source}")]
    Task {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("deferred work unit '{label}' failed: {source}")]
    WorkUnit {
        label: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cooperative unit '{name}' panicked")]
    UnitPanic { name: String },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}
