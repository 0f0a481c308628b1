//! System clock adapter.

use chrono::{DateTime, SubsecRound, Utc};

use crate::ports::clock::Clock;

/// Wall-clock time truncated to whole seconds, the resolution of backup
/// stamps.
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn returns_current_second() {
        let before = Utc::now().trunc_subsecs(0);
        let now = LiveClock.now();
        let after = Utc::now();

        assert!(now >= before);
        assert!(now <= after);
        assert_eq!(now.nanosecond(), 0);
    }
}
