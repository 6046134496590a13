use serde::{Deserialize, Serialize};

/// A fatal error raised while composing a document. Recoverable problems (a photo that
/// cannot be fetched or decoded) never surface here: they are converted into in-document
/// fallback text by the composer and only leave a log entry behind. Everything that does
/// surface through this type aborts the whole composition call.
#[derive(Debug)]
pub enum ComposeError {
    /// The supplied record cannot be laid out at all, for example because its risk values
    /// fall outside the accepted range or its identifier is empty.
    RecordInvalid {
        /// An explanation of which part of the record was rejected.
        reason: String,
    },
    /// The external serializer failed to encode the finished page list. The number of
    /// pages that had been built is reported so the caller can tell how far we got.
    SerializationFailed {
        /// How many pages had been laid out before the serializer gave up.
        pages_built: usize,
        /// The stringified error reported by the serializer.
        source_error: String,
    },
}

impl std::fmt::Display for ComposeError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComposeError::RecordInvalid { reason } => write!(
                formatter,
                "The record is invalid: {}",
                minimize_first_letter(reason.clone())
            ),
            ComposeError::SerializationFailed {
                pages_built,
                source_error,
            } => write!(
                formatter,
                "Failed to serialize the document after building {} pages: {}",
                pages_built,
                minimize_first_letter(source_error.clone())
            ),
        }
    }
}

impl std::error::Error for ComposeError {}

impl ComposeError {
    /// Create a `RecordInvalid` error with the given explanation.
    pub fn record_invalid<S: Into<String>>(reason: S) -> ComposeError {
        ComposeError::RecordInvalid {
            reason: reason.into(),
        }
    }

    /// Create a `SerializationFailed` error from the serializer's own error, remembering
    /// how many pages had already been built.
    pub fn serialization_failed(pages_built: usize, error: &dyn std::error::Error) -> ComposeError {
        ComposeError::SerializationFailed {
            pages_built,
            source_error: error.to_string(),
        }
    }
}

/// A recoverable failure while obtaining the bytes of one photo attachment. This error is
/// scoped to a single attachment: the composer logs it, writes a fallback line into the
/// document and carries on with the remaining attachments.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FetchError {
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_error {
            Some(source_error) => write!(
                formatter,
                "{}: {}",
                self.context,
                minimize_first_letter(source_error.to_string()),
            ),
            None => write!(formatter, "{}", self.context),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Create a new `FetchError` with the given context.
    pub fn with_context<S: Into<String>>(context: S) -> FetchError {
        FetchError {
            context: context.into(),
            source_error: None,
        }
    }

    /// Create a new `FetchError` with the given context and source error.
    pub fn with_error<S: Into<String>>(context: S, error: &dyn std::error::Error) -> FetchError {
        FetchError {
            context: context.into(),
            source_error: Some(error.to_string()),
        }
    }
}

/// Minimizes the first letter of a string, it is used for standardizing the error message.
fn minimize_first_letter(string: String) -> String {
    let mut characters = string.chars();
    match characters.next() {
        None => String::new(),
        Some(character) => character.to_lowercase().chain(characters).collect(),
    }
}
