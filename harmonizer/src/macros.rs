//! Shorthands for building [`crate::error::HarmonizerError`] values at the failure site.

/// Builds a [`crate::error::HarmonizerError`] from a kind, a static description, an optional
/// detail rendered with `to_string` and an optional `source:` error.
///
/// ```ignore
/// harmonizer_error!(ErrorKind::IoError, "Failed to create shard file", path.display(), source: err)
/// ```
#[macro_export]
macro_rules! harmonizer_error {
    ($kind:expr, $desc:expr $(, source: $source:expr)?) => {{
        let err = $crate::error::HarmonizerError::from(($kind, $desc));
        $(let err = err.with_source($source);)?
        err
    }};
    ($kind:expr, $desc:expr, $detail:expr $(, source: $source:expr)?) => {{
        let err = $crate::error::HarmonizerError::from(($kind, $desc, $detail.to_string()));
        $(let err = err.with_source($source);)?
        err
    }};
}

/// Returns early with the error [`harmonizer_error!`] builds from the same arguments.
#[macro_export]
macro_rules! bail {
    ($($args:tt)+) => {
        return ::core::result::Result::Err($crate::harmonizer_error!($($args)+))
    };
}
