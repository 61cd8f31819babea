use std::io;
use std::path::{Path, PathBuf};

use futures_util::{future, stream};
use reqwest::Body;

use crate::config::BodySource;
use crate::error::{HttpError, RequestError};

/// How the body of every request is produced.
#[derive(Debug, Clone)]
pub(super) enum RequestBody {
    /// Already attached to the request template; holds its length.
    Fixed(u64),
    /// Sent chunked from memory on every request.
    StreamInline(Vec<u8>),
    /// Re-opened and streamed from disk on every request.
    StreamFile(PathBuf),
}

impl RequestBody {
    /// Resolves the configured body. Buffered bodies are returned separately
    /// so they can be attached to the request template once.
    pub(super) fn prepare(
        source: &BodySource,
        stream: bool,
    ) -> Result<(Self, Option<Vec<u8>>), HttpError> {
        let buffered = |data: Vec<u8>| {
            let len = super::len_u64(data.len());
            (Self::Fixed(len), (len > 0).then_some(data))
        };
        match (source, stream) {
            (BodySource::Empty, _) => Ok((Self::Fixed(0), None)),
            (BodySource::Inline(body), false) => Ok(buffered(body.clone().into_bytes())),
            (BodySource::Inline(body), true) => {
                Ok((Self::StreamInline(body.clone().into_bytes()), None))
            }
            (BodySource::File(path), false) => std::fs::read(path)
                .map(buffered)
                .map_err(|err| read_error(path, err)),
            (BodySource::File(path), true) => {
                std::fs::metadata(path).map_err(|err| read_error(path, err))?;
                Ok((Self::StreamFile(path.clone()), None))
            }
        }
    }

    /// Produces a fresh streaming body and its length, or `None` when the body
    /// is part of the request template.
    pub(super) async fn open_stream(&self) -> Result<Option<(Body, u64)>, RequestError> {
        match self {
            Self::Fixed(_) => Ok(None),
            Self::StreamInline(data) => {
                let chunk: Result<Vec<u8>, io::Error> = Ok(data.clone());
                let body = Body::wrap_stream(stream::once(future::ready(chunk)));
                Ok(Some((body, super::len_u64(data.len()))))
            }
            Self::StreamFile(path) => {
                let file = tokio::fs::File::open(path).await.map_err(|err| {
                    RequestError::OpenBodyFile {
                        path: path.clone(),
                        source: err,
                    }
                })?;
                let len = file.metadata().await.map_or(0, |meta| meta.len());
                Ok(Some((Body::from(file), len)))
            }
        }
    }

    pub(super) const fn is_streaming(&self) -> bool {
        !matches!(self, Self::Fixed(_))
    }

    pub(super) const fn fixed_len(&self) -> u64 {
        match self {
            Self::Fixed(len) => *len,
            Self::StreamInline(_) | Self::StreamFile(_) => 0,
        }
    }
}

fn read_error(path: &Path, source: io::Error) -> HttpError {
    HttpError::ReadBodyFile {
        path: path.to_path_buf(),
        source,
    }
}
