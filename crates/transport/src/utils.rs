//! Small macros shared by the decoders.

/// Returns `Err($error)` from the enclosing function unless `$predicate` holds.
///
/// ```text
/// ensure!(is_token(byte), ParseError::MethodChar);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
