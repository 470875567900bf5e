use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Wall-clock time derived from tokio's monotonic clock.
///
/// The clock reads the wall time once and then advances with
/// `tokio::time::Instant`, so start times can be turned into timer deadlines
/// and a paused test runtime moves both together.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    wall: DateTime<Utc>,
    instant: Instant,
}

impl Clock {
    pub fn system() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            instant: Instant::now(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.instant.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall + elapsed
    }

    /// The timer deadline for a wall-clock moment; moments already past map
    /// to the clock's anchor, which is never in the future.
    pub fn instant_at(&self, at: DateTime<Utc>) -> Instant {
        match (at - self.wall).to_std() {
            Ok(offset) => self.instant + offset,
            Err(_) => self.instant,
        }
    }
}
