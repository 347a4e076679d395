//! Utility macros for the HTTP crate.

/// Returns early with `$error` unless `$predicate` holds.
///
/// Like `assert!`, but for validation checks that should surface as an error
/// instead of a panic.
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
