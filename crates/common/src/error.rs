use thiserror::Error;

/// Failure reported by code the registry calls but does not own, such as a
/// channel's login payload gatherer.
#[derive(Error, Debug)]
pub enum Error {
    /// Plain message, usually built through [`Context`].
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Callback(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn callback(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Callback(Box::new(source))
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Context ─────────────────────────────────────────────────────────────────

/// Error types that can be built from a message string.
///
/// Implement it for a crate's error type and invoke [`impl_context!`] next to
/// it to get `.context()` / `.with_context()` on `Result` and `Option`.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

#[doc(hidden)]
pub fn prefixed(context: String, source: impl std::fmt::Display) -> String {
    format!("{context}: {source}")
}

/// Define a `Context` trait for the `Error` and `Result` in scope.
///
/// ```ignore
/// // next to `enum Error` and `type Result<T>`
/// netreg_common::impl_context!();
/// ```
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            /// Replace the error with `"{context}: {error}"`, or with
            /// `context` alone for `None`.
            fn context(self, context: impl Into<String>) -> Result<T>;

            /// Lazy form of [`Context::context`].
            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.with_context(|| context)
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.map_err(|e| {
                    <Error as $crate::FromMessage>::from_message($crate::error::prefixed(
                        f().into(),
                        e,
                    ))
                })
            }
        }

        impl<T> Context<T> for Option<T> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.with_context(|| context)
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.ok_or_else(|| <Error as $crate::FromMessage>::from_message(f().into()))
            }
        }
    };
}

crate::impl_context!();

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn context_prefixes_source_message() {
        let parsed = "x1".parse::<u32>();
        let err = parsed.context("parse payload length").unwrap_err();
        assert!(err.to_string().starts_with("parse payload length: "));
    }

    #[test]
    fn option_context_uses_message() {
        let missing: Option<u8> = None;
        let err = missing.with_context(|| "no payload bytes").unwrap_err();
        assert_eq!(err.to_string(), "no payload bytes");
    }

    #[test]
    fn io_and_callback_errors() {
        let err: Error = std::io::Error::other("disk gone").into();
        assert!(matches!(err, Error::Io(_)));
        let wrapped = Error::callback(std::io::Error::other("inner"));
        assert_eq!(wrapped.to_string(), "inner");
    }
}
