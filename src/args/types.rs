use std::fmt;
use std::num::NonZeroU64;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Default, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Connect,
    Delete,
    #[default]
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Trace => "TRACE",
        }
    }

    /// Whether a request body may be sent with this method.
    #[must_use]
    pub const fn can_have_body(self) -> bool {
        !matches!(
            self,
            Self::Connect | Self::Get | Self::Head | Self::Options | Self::Trace
        )
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "plain-text", alias = "pt")]
    PlainText,
    #[serde(rename = "json", alias = "j")]
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "plain-text" | "pt" => Ok(Self::PlainText),
            "json" | "j" => Ok(Self::Json),
            _ => Err(ValidationError::UnknownFormat {
                value: s.to_owned(),
            }),
        }
    }
}

/// Which parts of the output get printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintSpec {
    pub intro: bool,
    pub progress: bool,
    pub result: bool,
}

impl PrintSpec {
    pub const ALL: Self = Self {
        intro: true,
        progress: true,
        result: true,
    };

    pub const NOTHING: Self = Self {
        intro: false,
        progress: false,
        result: false,
    };
}

impl Default for PrintSpec {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::str::FromStr for PrintSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyPrintSpec);
        }
        let mut spec = Self::NOTHING;
        for part in s.split(',') {
            match part.trim() {
                "i" | "intro" => spec.intro = true,
                "p" | "progress" => spec.progress = true,
                "r" | "result" => spec.result = true,
                other => {
                    return Err(ValidationError::InvalidPrintSpecPart {
                        part: other.to_owned(),
                    });
                }
            }
        }
        Ok(spec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositiveU64(NonZeroU64);

impl PositiveU64 {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    #[must_use]
    pub const fn non_zero(self) -> NonZeroU64 {
        self.0
    }
}

impl TryFrom<u64> for PositiveU64 {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(value)
            .map(PositiveU64)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl From<NonZeroU64> for PositiveU64 {
    fn from(value: NonZeroU64) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for PositiveU64 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveU64::try_from(value)
    }
}

impl fmt::Display for PositiveU64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
