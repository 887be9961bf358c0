use chrono::{DateTime, Utc};

pub mod attendance;
pub mod report;
pub mod sync;

#[cfg(test)]
mod report_tests;

/// Injected time source so the engine never reads wall-clock time ambiently.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
