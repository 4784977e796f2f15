use std::fmt;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// LLM service errors
    Llm(LlmError),
    /// Structured-extraction errors
    Parse(ParseError),
    /// Configuration errors
    Config(ConfigError),
    /// Anything else (wraps third-party errors)
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Llm(e) => write!(f, "LLM error: {}", e),
            AppError::Parse(e) => write!(f, "parse error: {}", e),
            AppError::Config(e) => write!(f, "config error: {}", e),
            AppError::Other(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Llm(e) => Some(e),
            AppError::Parse(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// LLM service errors
#[derive(Debug)]
pub enum LlmError {
    /// API call failed
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Response carried no choices
    EmptyResponse {
        model: String,
    },
    /// Response choice carried no content
    EmptyContent {
        model: String,
    },
    /// Request construction failed
    RequestBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ApiCallFailed { model, source } => {
                write!(f, "LLM API call failed (model: {}): {}", model, source)
            }
            LlmError::EmptyResponse { model } => {
                write!(f, "LLM returned no choices (model: {})", model)
            }
            LlmError::EmptyContent { model } => {
                write!(f, "LLM returned empty content (model: {})", model)
            }
            LlmError::RequestBuildFailed { source } => {
                write!(f, "failed to build LLM request: {}", source)
            }
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::ApiCallFailed { source, .. }
            | LlmError::RequestBuildFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// Structured-extraction errors
///
/// Each parser tier reports its own failure so the fallback chain is
/// visible in signatures instead of hidden control flow.
#[derive(Debug)]
pub enum ParseError {
    /// Text contained no JSON object at all
    NoJsonObject,
    /// Strict JSON parse failed
    InvalidJson {
        source: serde_json::Error,
    },
    /// Regex field extraction found neither question nor answer
    NoKeyFields,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoJsonObject => write!(f, "no JSON object found in text"),
            ParseError::InvalidJson { source } => write!(f, "invalid JSON: {}", source),
            ParseError::NoKeyFields => {
                write!(f, "field extraction recovered neither question nor answer")
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::InvalidJson { source } => Some(source),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Environment variable failed to parse
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// Required environment variable missing
    EnvVarNotFound {
        var_name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "environment variable {} failed to parse: value '{}' is not a valid {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::EnvVarNotFound { var_name } => {
                write!(f, "environment variable {} not set", var_name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== Conversions from common error types ==========
// No manual From<AppError> for anyhow::Error is needed: anyhow covers every
// type that implements std::error::Error.

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(ParseError::InvalidJson { source: err })
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::Parse(err)
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Llm(err)
    }
}

// ========== Convenience constructors ==========

impl AppError {
    /// LLM API call failure
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// Empty LLM content
    pub fn llm_empty_content(model: impl Into<String>) -> Self {
        AppError::Llm(LlmError::EmptyContent {
            model: model.into(),
        })
    }
}

// ========== Result alias ==========

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
