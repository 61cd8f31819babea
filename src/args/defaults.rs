use std::num::NonZeroU64;
use std::time::Duration;

pub(crate) const DEFAULT_CONNECTIONS: NonZeroU64 = match NonZeroU64::new(125) {
    Some(connections) => connections,
    None => NonZeroU64::MIN,
};
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub(crate) const DEFAULT_TEST_DURATION: Duration = Duration::from_secs(10);

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("volley/", env!("CARGO_PKG_VERSION"));
