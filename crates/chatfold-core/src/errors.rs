/// Errors returned by the fallible fold entry points.
///
/// Folding itself is total; failures come from the update source, from the
/// caller's cancellation, or from decoding a captured update sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FoldError {
    /// The update source yielded an error. Updates before it stay applied.
    #[error("update source failed: {message}")]
    Source { message: String },
    /// The fold was aborted while waiting for the next update.
    #[error("fold cancelled")]
    Cancelled,
    /// A capture could not be read, for example because a line is not UTF-8.
    #[error("failed to read capture at line {line}: {message}")]
    Read { line: usize, message: String },
    /// A captured update record could not be decoded.
    #[error("invalid update record at line {line}: {message}")]
    Decode { line: usize, message: String },
}

impl FoldError {
    pub(crate) fn source_msg(message: impl std::fmt::Display) -> Self {
        Self::Source {
            message: message.to_string(),
        }
    }
}
