//! Error taxonomy for a single search.

use crate::completion::{CompletionError, FailureKind};

/// Prefix shared by every server-side failure message
const GENERIC_FAILURE: &str = "Ocorreu uma falha ao gerar os dados após múltiplas tentativas.";

/// Errors surfaced by a search
///
/// Completion failures never appear here directly: they are absorbed by the
/// retry loop and only escalate wrapped in [`SearchError::ExhaustedRetries`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Missing or unrecognized request fields; never retried
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Every attempt failed
    #[error("Completion failed after {attempts} attempts: {last}")]
    ExhaustedRetries {
        attempts: u32,
        last: CompletionError,
    },
}

impl SearchError {
    /// Whether the caller sent a bad request
    pub fn is_client_error(&self) -> bool {
        matches!(self, SearchError::InvalidInput(_))
    }

    /// Actionable message suitable for end users
    pub fn user_message(&self) -> String {
        match self {
            SearchError::InvalidInput(message) => message.clone(),
            SearchError::ExhaustedRetries { last, .. } => match last.kind() {
                FailureKind::RemoteUnavailable => format!(
                    "{} O serviço de IA pode estar sobrecarregado ou indisponível; tente novamente em instantes.",
                    GENERIC_FAILURE
                ),
                FailureKind::EmptyCompletion | FailureKind::MalformedResponse => format!(
                    "{} A IA retornou um formato inesperado; tente novamente.",
                    GENERIC_FAILURE
                ),
            },
        }
    }
}
