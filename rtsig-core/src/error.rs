use core::fmt;

#[cfg(feature = "alloc")]
use alloc::string::String;

/// Errors raised whilst running rtsig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An argument passed into a function or `initialize` call was invalid.
    /// Raised synchronously; the callee mutates no state.
    #[cfg(feature = "alloc")]
    InvalidArg {
        /// The invalid arg.
        arg: String,
        /// Explaining why arg is invalid.
        reason: String,
    },
    /// An argument passed into a function or `initialize` call was invalid.
    #[cfg(not(feature = "alloc"))]
    InvalidArg,
    /// An `apply` or getter was called before a successful `initialize`.
    NotInitialized {
        /// The module that was not initialized.
        module: &'static str,
    },
    /// A numeric kernel failed at runtime (non-convergent root finding,
    /// overflow, backend failure). Raised after cleanup.
    #[cfg(feature = "alloc")]
    RuntimeFailure {
        /// Why execution failed.
        reason: String,
    },
    /// A numeric kernel failed at runtime.
    #[cfg(not(feature = "alloc"))]
    RuntimeFailure,
}

/// Alias for results carrying an rtsig [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "alloc")]
            Error::InvalidArg { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            #[cfg(not(feature = "alloc"))]
            Error::InvalidArg => write!(f, "Invalid argument."),
            Error::NotInitialized { module } => {
                write!(f, "`{module}` has not been initialized.")
            }
            #[cfg(feature = "alloc")]
            Error::RuntimeFailure { reason } => write!(f, "Runtime failure: {reason}"),
            #[cfg(not(feature = "alloc"))]
            Error::RuntimeFailure => write!(f, "Runtime failure."),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_formats_each_kind() {
        let e = Error::InvalidArg {
            arg: "order".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(e.to_string(), "Invalid argument `order`: must be positive");

        let e = Error::NotInitialized { module: "FirFilter" };
        assert_eq!(e.to_string(), "`FirFilter` has not been initialized.");

        let e = Error::RuntimeFailure {
            reason: "overflow".into(),
        };
        assert_eq!(e.to_string(), "Runtime failure: overflow");
    }
}
