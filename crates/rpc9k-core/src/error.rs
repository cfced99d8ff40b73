//! Shared error type across rpc9k crates.

use thiserror::Error;

use crate::protocol::Kind;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Wire data named a kind the registry does not know.
    UnknownKind,
    /// Wire data could not be decoded into its kind.
    Malformed,
    /// A name is not declared by the current message.
    NoSuchRoute,
    /// The current message kind has no children to fetch.
    NotFetchable,
    /// The current message kind cannot be invoked.
    NotCallable,
    /// The transport failed to deliver a request.
    Transport,
    /// Too many redirect hops.
    RedirectLoop,
    /// The payload could not be coerced into the caller's type.
    Scan,
    /// Scan was given a target but the envelope is empty (or vice versa).
    NothingToScan,
    /// The client holds no resolved resource.
    NotOpen,
    /// The server replied with an Error message.
    Remote,
    /// Invalid client configuration.
    Config,
    /// A value could not be encoded for the wire.
    Encode,
}

impl ErrorCode {
    /// String representation used as the `Id` of Error envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnknownKind => "UNKNOWN_KIND",
            ErrorCode::Malformed => "MALFORMED",
            ErrorCode::NoSuchRoute => "NO_SUCH_ROUTE",
            ErrorCode::NotFetchable => "NOT_FETCHABLE",
            ErrorCode::NotCallable => "NOT_CALLABLE",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::RedirectLoop => "REDIRECT_LOOP",
            ErrorCode::Scan => "SCAN",
            ErrorCode::NothingToScan => "NOTHING_TO_SCAN",
            ErrorCode::NotOpen => "NOT_OPEN",
            ErrorCode::Remote => "REMOTE",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Encode => "ENCODE",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, Rpc9kError>;

/// Unified error type used by core and client.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rpc9kError {
    #[error("unknown message kind: {0}")]
    UnknownKind(String),
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("no such route on {kind}: {name}")]
    NoSuchRoute { kind: Kind, name: String },
    #[error("{kind} has no fetchable route: {name}")]
    NotFetchable { kind: Kind, name: String },
    #[error("{0} is not callable")]
    NotCallable(Kind),
    #[error("can't fetch {segment} (resolved: {prefix:?}): {source}")]
    Unresolved {
        segment: String,
        prefix: String,
        source: Box<Rpc9kError>,
    },
    #[error("transport: {0}")]
    Transport(String),
    #[error("too many redirects ({hops}) at {url}")]
    RedirectLoop { url: String, hops: usize },
    #[error("scan failed: {0}")]
    Scan(String),
    #[error("{0} has no value to scan")]
    NotScannable(Kind),
    #[error("nothing to scan")]
    NothingToScan,
    #[error("no scan target for {0}")]
    NoScanTarget(Kind),
    #[error("no url opened")]
    NotOpen,
    #[error("{id}: {text}")]
    Remote { id: String, text: String },
    #[error("config: {0}")]
    Config(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

impl Rpc9kError {
    /// Map internal error to a stable client-facing code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Rpc9kError::UnknownKind(_) => ErrorCode::UnknownKind,
            Rpc9kError::Malformed(_) => ErrorCode::Malformed,
            Rpc9kError::NoSuchRoute { .. } => ErrorCode::NoSuchRoute,
            Rpc9kError::NotFetchable { .. } => ErrorCode::NotFetchable,
            Rpc9kError::NotCallable(_) => ErrorCode::NotCallable,
            Rpc9kError::Unresolved { source, .. } => source.code(),
            Rpc9kError::Transport(_) => ErrorCode::Transport,
            Rpc9kError::RedirectLoop { .. } => ErrorCode::RedirectLoop,
            Rpc9kError::Scan(_) | Rpc9kError::NotScannable(_) => ErrorCode::Scan,
            Rpc9kError::NothingToScan | Rpc9kError::NoScanTarget(_) => ErrorCode::NothingToScan,
            Rpc9kError::NotOpen => ErrorCode::NotOpen,
            Rpc9kError::Remote { .. } => ErrorCode::Remote,
            Rpc9kError::Config(_) => ErrorCode::Config,
            Rpc9kError::Encode(_) => ErrorCode::Encode,
        }
    }

    /// Identifier carried by the Error envelope built from this error.
    ///
    /// Remote errors keep the server's id; everything else uses its code.
    pub fn id(&self) -> &str {
        match self {
            Rpc9kError::Remote { id, .. } => id,
            Rpc9kError::Unresolved { source, .. } => source.id(),
            other => other.code().as_str(),
        }
    }
}
