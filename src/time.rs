//! Time source capability.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::UnixTs;

/// Supplies the timestamps stamped onto lifecycle and match events.
///
/// The engine never reads the wall clock directly, so tests can drive it
/// with a fixed or scripted clock.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> UnixTs;
}

/// Wall-clock time source.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> UnixTs {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards");
        UnixTs(duration.as_nanos() as i64)
    }
}
