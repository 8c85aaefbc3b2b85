use std::{fmt, result};

/// Error variants produced by this crate.
///
/// Every variant carries the `file:line` of the site that raised it,
/// stamped in by the [err_at] macro, so a log line alone is enough to
/// locate the failing call without a backtrace.
#[derive(Debug)]
pub enum Error {
    /// `add` was called for a DN/ID that is already mapped.
    Exists(String, String),
    /// Requested DN/ID/key is not present in the index.
    NotFound(String, String),
    /// Stored row is structurally inconsistent: wrong-sized IDL value,
    /// a hierarchical node with a dangling parent, or a delete_key on an
    /// absent member.
    Corrupt(String, String),
    /// Caller violated the API contract: `NOID`, an unnormalized DN, or
    /// a descendants() prefix outside `{ONE, SUBTREE}`.
    Invalid(String, String),
    /// Failure propagated from the transactional key-value store.
    Storage(String, String),
    /// Failure from the local filesystem (env open, lock file, ...).
    IoError(String, String),
}

pub type Result<T> = result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Exists(p, msg) => write!(f, "{} Exists: {}", p, msg),
            Error::NotFound(p, msg) => write!(f, "{} NotFound: {}", p, msg),
            Error::Corrupt(p, msg) => write!(f, "{} Corrupt: {}", p, msg),
            Error::Invalid(p, msg) => write!(f, "{} Invalid: {}", p, msg),
            Error::Storage(p, msg) => write!(f, "{} Storage: {}", p, msg),
            Error::IoError(p, msg) => write!(f, "{} IoError: {}", p, msg),
        }
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        use Error::*;

        match (self, other) {
            (Exists(_, _), Exists(_, _)) => true,
            (NotFound(_, _), NotFound(_, _)) => true,
            (Corrupt(_, _), Corrupt(_, _)) => true,
            (Invalid(_, _), Invalid(_, _)) => true,
            (Storage(_, _), Storage(_, _)) => true,
            (IoError(_, _), IoError(_, _)) => true,
            _ => false,
        }
    }
}

#[cfg(feature = "lmdb-backend")]
impl From<lmdb::Error> for Error {
    fn from(err: lmdb::Error) -> Error {
        match err {
            lmdb::Error::NotFound => Error::NotFound("lmdb".to_string(), "key".to_string()),
            lmdb::Error::KeyExist => Error::Exists("lmdb".to_string(), "key".to_string()),
            err => Error::Storage("lmdb".to_string(), err.to_string()),
        }
    }
}

/// Stamp an [Error] with `file:line` and optionally build it from a
/// format string, or convert the error side of a `Result` while passing
/// the `Ok` side through unchanged.
///
/// ```ignore
/// err_at!(NotFound, msg: "dn {} not mapped", dn)?;
/// let buf = err_at!(IoError, file.read(&mut buf))?;
/// ```
#[macro_export]
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err($crate::Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err($crate::Error::$v(prefix, err.to_string()))
            }
        }
    }};
}
