use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("{line_number}: Unmarshaling `{text}` as JSON has failed. {error}")]
    Json {
        line_number: usize,
        text: String,
        error: serde_json::Error,
    },
    #[error("Unable to encode the migrated directive. {0}")]
    Encode(serde_json::Error),
    #[error("{path}: {error}")]
    Io {
        path: String,
        error: std::io::Error,
    },
    #[error("{path}:{source}")]
    Content {
        path: String,
        #[source]
        source: Box<MigrateError>,
    },
}
