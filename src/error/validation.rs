use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Missing URL (pass it as an argument or provide it in config).")]
    MissingUrl,
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported scheme '{scheme}' in '{url}'. Use http or https.")]
    UnsupportedScheme { scheme: String, url: String },
    #[error("URL '{url}' has no host.")]
    MissingHost { url: String },
    #[error("Invalid test duration (must be >= 1s).")]
    TestDurationTooShort,
    #[error("{method} requests cannot have a body.")]
    BodyNotAllowed { method: &'static str },
    #[error("Use either --body or --body-file, not both.")]
    BodyProvidedTwice,
    #[error("No path to TLS certificate (--key requires --cert).")]
    KeyRequiresCert,
    #[error("No path to TLS certificate private key (--cert requires --key).")]
    CertRequiresKey,
    #[error("Empty print spec is not a valid spec.")]
    EmptyPrintSpec,
    #[error("'{part}' is not a valid part of print spec. Use intro, progress, or result.")]
    InvalidPrintSpecPart { part: String },
    #[error("Unknown output format '{value}'. Use plain-text (pt) or json (j).")]
    UnknownFormat { value: String },
    #[error("Cannot use --http1 and --http2 at the same time.")]
    ClientKindConflict,
}
