use std::fmt;

use serde::Serialize;

/// Which protocol versions the client may speak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// HTTP/1.x only.
    #[default]
    Http1,
    /// HTTP/2 when the server negotiates it over TLS, HTTP/1.1 otherwise.
    Http2,
}

impl ClientKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http1 => "HTTP/1.x",
            Self::Http2 => "HTTP/2.0",
        }
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
