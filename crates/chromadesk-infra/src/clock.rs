//! `Clock` implementation backed by the local wall clock.

use chrono::{Local, NaiveDate};

use chromadesk_core::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
