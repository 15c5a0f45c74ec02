use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A measurement of the wall clock, in milliseconds since the unix epoch.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(u64);

impl Timestamp {
    #[inline]
    pub fn from_millis(millis: u64) -> Timestamp {
        Timestamp(millis)
    }

    #[inline]
    pub fn millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn now() -> Timestamp {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| Duration::from_millis(0));

        Timestamp(elapsed.as_secs() * 1_000 + u64::from(elapsed.subsec_millis()))
    }
}

impl std::ops::Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0 + rhs.as_secs() * 1_000 + u64::from(rhs.subsec_millis()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arithmetic() {
        let t1 = Timestamp::from_millis(1_000);
        let t2 = t1 + Duration::from_millis(2_500);
        assert_eq!(t2.millis(), 3_500);
        assert_eq!(t2 - t1, Duration::from_millis(2_500));
        // The clock never runs backwards from the caller's point of view.
        assert_eq!(t1 - t2, Duration::from_millis(0));
    }
}
