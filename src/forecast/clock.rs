use chrono::{Days, NaiveDate};

/// A calendar clock that hands out a fixed number of consecutive days.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use grid_forecast::forecast::clock::DayClock;
///
/// let first = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
/// let mut clock = DayClock::new(first, 3);
/// let mut days = Vec::new();
///
/// clock.run(|step, date| days.push((step, date.to_string())));
/// assert_eq!(days[2], (2, "2024-03-01".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct DayClock {
    /// Date handed out by the next tick.
    next: Option<NaiveDate>,
    /// Steps already handed out.
    current: usize,
    /// Total steps to run.
    total: usize,
}

impl DayClock {
    /// Creates a clock whose first tick is `first`.
    pub fn new(first: NaiveDate, total: usize) -> Self {
        Self {
            next: Some(first),
            current: 0,
            total,
        }
    }

    /// Advances one day.
    ///
    /// # Returns
    ///
    /// * `Some((step, date))` - zero-based step index and its date
    /// * `None` - once `total` days were handed out (or the calendar ran out)
    pub fn tick(&mut self) -> Option<(usize, NaiveDate)> {
        if self.current >= self.total {
            return None;
        }
        let date = self.next?;
        let step = self.current;
        self.current += 1;
        self.next = date.checked_add_days(Days::new(1));
        Some((step, date))
    }

    pub fn remaining(&self) -> usize {
        self.total - self.current
    }

    /// Runs `f` for each remaining day.
    pub fn run(&mut self, mut f: impl FnMut(usize, NaiveDate)) {
        while let Some((step, date)) = self.tick() {
            f(step, date);
        }
    }
}
