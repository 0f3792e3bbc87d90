use thiserror::Error;

pub type Result<T> = std::result::Result<T, GreetingError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GreetingError {
    /// The argument row does not match the function signature.
    #[error("invalid argument for {function}(): {reason}")]
    InvalidArgument {
        function: &'static str,
        reason: String,
    },

    #[error("unknown scalar function: {0}")]
    UnknownFunction(String),

    /// The linked crypto library did not report a version. Raised at startup,
    /// never from a function call.
    #[error("linked crypto library is unavailable: {0}")]
    CryptoLibraryUnavailable(String),
}

impl GreetingError {
    pub(crate) fn invalid_argument(function: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function,
            reason: reason.into(),
        }
    }
}
