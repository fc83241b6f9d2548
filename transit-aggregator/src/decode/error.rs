//! Decoder error types.

/// A payload could not be turned into domain records.
///
/// Raised per batch; the orchestrator turns it into a failed source flag.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Markup was not well-formed
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// JSON was not well-formed or had the wrong shape
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed payload for a different document type
    #[error("unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    /// The feed answered with an error document instead of data
    #[error("upstream error{}: {message}", code_suffix(.code))]
    Upstream {
        code: Option<String>,
        message: String,
    },
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" {c}")).unwrap_or_default()
}

/// Why a single record inside an otherwise valid payload was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RecordError {
    #[error("missing required field {0}")]
    Missing(&'static str),

    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}

impl RecordError {
    pub(crate) fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        RecordError::Invalid {
            field,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DecodeError::UnexpectedRoot {
            expected: "ctatt",
            found: "html".into(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected root element <html>, expected <ctatt>"
        );

        let err = DecodeError::Upstream {
            code: Some("101".into()),
            message: "Invalid API key".into(),
        };
        assert_eq!(err.to_string(), "upstream error 101: Invalid API key");

        let err = DecodeError::Upstream {
            code: None,
            message: "Invalid API access key supplied".into(),
        };
        assert_eq!(
            err.to_string(),
            "upstream error: Invalid API access key supplied"
        );

        let err = RecordError::Missing("staId");
        assert_eq!(err.to_string(), "missing required field staId");
    }
}
