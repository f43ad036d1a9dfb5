use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocChatError {
    #[error("Failed to extract text from {file}: {reason}")]
    Extraction { file: String, reason: String },

    #[error("{file} is not valid UTF-8 text: {source}")]
    Decode {
        file: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Generation service error: {0}")]
    GenerationService(String),

    #[error("No documents have been indexed")]
    EmptyIndex,

    #[error("Uploaded documents contained no extractable text")]
    EmptyDocument,

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Missing API key: set llm.api_key in config.toml or DOCCHAT_API_KEY")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl DocChatError {
    /// Message shown to the person using the app.
    ///
    /// Internal details (endpoints, status bodies) stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Extraction { file, .. } => format!("Could not read {file}."),
            Self::Decode { file, .. } => {
                format!("{file} is not a valid UTF-8 text file.")
            }
            Self::EmbeddingService(_) => {
                "Indexing failed because the embedding service returned an error. \
                 Your previous documents are still loaded; please try again."
                    .to_string()
            }
            Self::GenerationService(_) => {
                "The language model could not answer right now. Please ask again.".to_string()
            }
            Self::EmptyIndex => "Please upload documents to start the conversation.".to_string(),
            Self::EmptyDocument => {
                "None of the uploaded files contained any readable text.".to_string()
            }
            Self::EmptyQuestion => "Please type a question.".to_string(),
            Self::InvalidRequest(reason) => reason.clone(),
            Self::SessionNotFound(_) => {
                "Your session has expired. Please reload to start a new one.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// True for conditions caused by the caller rather than by a backend failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Extraction { .. }
                | Self::Decode { .. }
                | Self::EmptyIndex
                | Self::EmptyDocument
                | Self::EmptyQuestion
                | Self::InvalidRequest(_)
                | Self::SessionNotFound(_)
        )
    }
}

impl From<config::ConfigError> for DocChatError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DocChatError>;
