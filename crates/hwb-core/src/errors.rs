use std::fmt;

/// Core error type for the bot.
///
/// Adapter crates map their library errors into this type so the poll loop can
/// classify failures through [`ErrorKind`] alone.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("endpoint unavailable: {failure}; request: {request}")]
    EndpointUnavailable {
        request: RequestContext,
        failure: EndpointFailure,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("missing field in homework: {0}")]
    MissingField(&'static str),

    #[error("unknown homework status: {0}")]
    UnknownVerdict(String),

    #[error("message {text:?} has not been sent: {reason}")]
    DeliveryFailed { text: String, reason: String },

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Closed set of error kinds the poll loop classifies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Io,
    EndpointUnavailable,
    MalformedResponse,
    MissingField,
    UnknownVerdict,
    DeliveryFailed,
    External,
}

impl ErrorKind {
    /// Whether a failure of this kind is reported to the operator chat.
    pub fn operator_notifiable(self) -> bool {
        match self {
            ErrorKind::EndpointUnavailable
            | ErrorKind::MalformedResponse
            | ErrorKind::UnknownVerdict
            | ErrorKind::DeliveryFailed
            | ErrorKind::External => true,
            ErrorKind::MissingField | ErrorKind::Config | ErrorKind::Io => false,
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
            Error::EndpointUnavailable { .. } => ErrorKind::EndpointUnavailable,
            Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Error::MissingField(_) => ErrorKind::MissingField,
            Error::UnknownVerdict(_) => ErrorKind::UnknownVerdict,
            Error::DeliveryFailed { .. } => ErrorKind::DeliveryFailed,
            Error::External(_) => ErrorKind::External,
        }
    }
}

/// Enough of an outbound request to reproduce it by hand.
///
/// Header values that carry credentials are stored redacted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GET {} params [{}] headers [{}]",
            self.url,
            join_pairs(&self.params),
            join_pairs(&self.headers)
        )
    }
}

fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why the status endpoint could not produce a payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndpointFailure {
    /// The server answered with something other than 200.
    Status(u16),
    /// The request did not complete within the configured timeout.
    Timeout,
    /// DNS, connect, TLS or other transport-level failure.
    Transport(String),
    /// 200 with a body that is not valid JSON.
    Decode(String),
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointFailure::Status(code) => write!(f, "wrong page status {code}"),
            EndpointFailure::Timeout => write!(f, "request timed out"),
            EndpointFailure::Transport(e) => write!(f, "transport error: {e}"),
            EndpointFailure::Decode(e) => write!(f, "undecodable body: {e}"),
        }
    }
}
