use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// How long bootstrap may wait for DOMContentLoaded
    pub ready_wait: Duration,
    pub navigation: Duration,
    pub check_interval: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            ready_wait: Duration::from_millis(15000),
            navigation: Duration::from_millis(30000),
            check_interval: Duration::from_millis(100),
        }
    }
}

impl TimeoutConfig {
    pub fn with_ready_wait(mut self, ms: u64) -> Self {
        self.ready_wait = Duration::from_millis(ms);
        self
    }

    pub fn with_navigation(mut self, ms: u64) -> Self {
        self.navigation = Duration::from_millis(ms);
        self
    }

    pub fn fast() -> Self {
        Self {
            ready_wait: Duration::from_millis(5000),
            navigation: Duration::from_millis(15000),
            check_interval: Duration::from_millis(50),
        }
    }

    pub fn patient() -> Self {
        Self {
            ready_wait: Duration::from_millis(60000),
            navigation: Duration::from_millis(60000),
            check_interval: Duration::from_millis(250),
        }
    }
}
