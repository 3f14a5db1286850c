use {
    std::time::Duration,
    time::OffsetDateTime,
};

/// Window the seller has to approve the winning bid after the auction closes.
pub const DEFAULT_APPROVAL_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// The instant by which the seller must have approved the winning bid.
/// Computed exactly once, when the auction closes.
pub fn compute_approval_deadline(end_time: OffsetDateTime, window: Duration) -> OffsetDateTime {
    end_time + window
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRemaining {
    pub days:       u64,
    pub hours:      u8,
    pub minutes:    u8,
    pub is_overdue: bool,
}

impl TimeRemaining {
    const OVERDUE: TimeRemaining = TimeRemaining {
        days:       0,
        hours:      0,
        minutes:    0,
        is_overdue: true,
    };
}

/// Whole-unit breakdown of the time left until `deadline`. Fractions of a
/// minute are floored away, never rounded up or carried.
pub fn time_remaining(deadline: OffsetDateTime, now: OffsetDateTime) -> TimeRemaining {
    if deadline <= now {
        return TimeRemaining::OVERDUE;
    }
    let total_minutes = (deadline - now).whole_minutes();
    TimeRemaining {
        days:       (total_minutes / (24 * 60)) as u64,
        hours:      ((total_minutes / 60) % 24) as u8,
        minutes:    (total_minutes % 60) as u8,
        is_overdue: false,
    }
}
