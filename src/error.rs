#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Rasterizer error for {file}: {message}")]
    Rasterizer { file: String, message: String },

    #[error("{0}")]
    General(String),
}
