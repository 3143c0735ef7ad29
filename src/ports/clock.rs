use chrono::{Local, NaiveDateTime};

/// Source of the instant shows are classified against.
///
/// Start times are stored naive, so "now" is the server's local wall clock.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
