//! Practitioner availability
//!
//! Availability is a pure function of a practitioner's shift type and the
//! simulated time. Minute 0 is Monday 00:00, so the weekday and minute of day
//! are derived arithmetically. Shift windows are half-open and never cross
//! midnight.

use tracing::trace;

use super::Practitioner;
use crate::simulation::time_manager::{
    day_of_week, minute_of_day, start_of_day, week_number, SimMinutes, TimeWindow,
    MINUTES_PER_DAY,
};
use crate::types::ShiftType;

const MON: u64 = 0;
const TUE: u64 = 1;
const THU: u64 = 3;
const FRI: u64 = 4;
const SAT: u64 = 5;
const SUN: u64 = 6;

const ROTATION_BLOCK_MINUTES: u64 = 8 * 60;

/// Working windows of a shift on a given day, as minute-of-day ranges
pub fn shift_windows(shift: ShiftType, rotation_offset: u8, day: SimMinutes) -> Vec<TimeWindow> {
    let dow = day_of_week(day);
    let weekday = (MON..=FRI).contains(&dow);
    let hours = |from: u64, to: u64| TimeWindow::new(from * 60, to * 60);

    match shift {
        ShiftType::FullTime if weekday => vec![hours(9, 17)],
        ShiftType::EveningShift if weekday => vec![hours(14, 22)],
        ShiftType::SplitShift if weekday => vec![hours(9, 12), hours(14, 18)],
        ShiftType::PartTime if matches!(dow, TUE | THU | SAT) => vec![hours(8, 12)],
        ShiftType::WeekendOnly if matches!(dow, SAT | SUN) => vec![hours(10, 16)],
        ShiftType::Rotating8Hour => {
            let block = (week_number(day) + u64::from(rotation_offset)) % 3;
            let start = block * ROTATION_BLOCK_MINUTES;
            vec![TimeWindow::new(start, start + ROTATION_BLOCK_MINUTES)]
        }
        _ => Vec::new(),
    }
}

impl Practitioner {
    /// Working windows on the day containing `t`, in simulated minutes
    pub fn windows_on_day(&self, t: SimMinutes) -> Vec<TimeWindow> {
        let day_start = start_of_day(t);
        shift_windows(self.shift, self.rotation_offset, t)
            .into_iter()
            .map(|w| TimeWindow::new(day_start + w.start, day_start + w.end))
            .collect()
    }

    /// Whether the practitioner is on shift at `t`
    pub fn is_available(&self, t: SimMinutes) -> bool {
        let minute = minute_of_day(t);
        shift_windows(self.shift, self.rotation_offset, t)
            .iter()
            .any(|w| w.contains(minute))
    }

    /// Whether a visit of `duration` minutes starting at `start` lies inside one shift window
    pub fn fits_within_shift(&self, start: SimMinutes, duration: SimMinutes) -> bool {
        let minute = minute_of_day(start);
        shift_windows(self.shift, self.rotation_offset, start)
            .iter()
            .any(|w| w.start <= minute && minute + duration <= w.end)
    }

    /// Whether the visit fits the shift and overlaps none of the busy intervals
    pub fn is_free(&self, start: SimMinutes, duration: SimMinutes, busy: &[TimeWindow]) -> bool {
        let visit = TimeWindow::new(start, start + duration);
        self.fits_within_shift(start, duration) && !busy.iter().any(|b| b.overlaps(&visit))
    }
}

/// Search parameters for appointment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSearch {
    /// How far past the search start slots are considered, in minutes
    pub lookahead: SimMinutes,
    /// Candidate slot starts are multiples of this many minutes
    pub granularity: SimMinutes,
}

impl Default for SlotSearch {
    fn default() -> Self {
        Self {
            lookahead: 7 * MINUTES_PER_DAY,
            granularity: 15,
        }
    }
}

impl SlotSearch {
    /// Earliest slot at or after `from` where the practitioner is free for `duration`
    ///
    /// Returns `None` when nothing fits within the lookahead window.
    pub fn find_next_available(
        &self,
        practitioner: &Practitioner,
        from: SimMinutes,
        duration: SimMinutes,
        busy: &[TimeWindow],
    ) -> Option<SimMinutes> {
        let granularity = self.granularity.max(1);
        let limit = from.saturating_add(self.lookahead);
        let mut candidate = from.div_ceil(granularity) * granularity;

        while candidate < limit {
            if practitioner.is_free(candidate, duration, busy) {
                trace!(practitioner = %practitioner.id, slot = candidate, "found free slot");
                return Some(candidate);
            }
            candidate += granularity;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::time_manager::{MINUTES_PER_HOUR, MINUTES_PER_WEEK};
    use crate::types::PractitionerId;
    use uuid::Uuid;

    fn practitioner(shift: ShiftType) -> Practitioner {
        Practitioner::new(PractitionerId(Uuid::nil()), shift)
    }

    fn at(day: u64, hour: u64, minute: u64) -> SimMinutes {
        day * MINUTES_PER_DAY + hour * MINUTES_PER_HOUR + minute
    }

    #[test]
    fn test_full_time_hours() {
        let p = practitioner(ShiftType::FullTime);
        assert!(!p.is_available(at(0, 8, 59)));
        assert!(p.is_available(at(0, 9, 0)));
        assert!(p.is_available(at(4, 16, 59)));
        assert!(!p.is_available(at(4, 17, 0)));
        assert!(!p.is_available(at(5, 10, 0)));
        assert!(!p.is_available(at(6, 10, 0)));
    }

    #[test]
    fn test_split_shift_gap() {
        let p = practitioner(ShiftType::SplitShift);
        assert!(p.is_available(at(1, 11, 30)));
        assert!(!p.is_available(at(1, 13, 0)));
        assert!(p.is_available(at(1, 14, 0)));
        assert!(!p.is_available(at(1, 18, 0)));
    }

    #[test]
    fn test_part_time_and_weekend_days() {
        let part_time = practitioner(ShiftType::PartTime);
        assert!(!part_time.is_available(at(0, 9, 0)));
        assert!(part_time.is_available(at(1, 9, 0)));
        assert!(part_time.is_available(at(3, 9, 0)));
        assert!(part_time.is_available(at(5, 11, 59)));
        assert!(!part_time.is_available(at(5, 12, 0)));

        let weekend = practitioner(ShiftType::WeekendOnly);
        assert!(!weekend.is_available(at(4, 12, 0)));
        assert!(weekend.is_available(at(5, 10, 0)));
        assert!(weekend.is_available(at(6, 15, 59)));
        assert!(!weekend.is_available(at(6, 16, 0)));
    }

    #[test]
    fn test_evening_shift() {
        let p = practitioner(ShiftType::EveningShift);
        assert!(p.is_available(at(2, 21, 59)));
        assert!(!p.is_available(at(2, 22, 0)));
        assert!(!p.is_available(at(2, 13, 59)));
    }

    #[test]
    fn test_rotating_block_changes_weekly() {
        let p = practitioner(ShiftType::Rotating8Hour);
        // Week 0, offset 0: night block
        assert!(p.is_available(at(0, 3, 0)));
        assert!(!p.is_available(at(0, 9, 0)));
        // Week 1: day block, every day including weekends
        assert!(p.is_available(MINUTES_PER_WEEK + at(6, 9, 0)));
        assert!(!p.is_available(MINUTES_PER_WEEK + at(6, 3, 0)));
        // Week 2: evening block
        assert!(p.is_available(2 * MINUTES_PER_WEEK + at(3, 20, 0)));

        let shifted = practitioner(ShiftType::Rotating8Hour).with_rotation_offset(1);
        assert!(shifted.is_available(at(0, 9, 0)));
    }

    #[test]
    fn test_fits_within_shift() {
        let p = practitioner(ShiftType::FullTime);
        assert!(p.fits_within_shift(at(0, 16, 0), 60));
        assert!(!p.fits_within_shift(at(0, 16, 15), 60));
        assert!(!p.fits_within_shift(at(0, 8, 45), 30));

        let split = practitioner(ShiftType::SplitShift);
        assert!(!split.fits_within_shift(at(0, 11, 30), 45));
    }

    #[test]
    fn test_find_next_available_skips_busy_and_closed_time() {
        let p = practitioner(ShiftType::FullTime);
        let search = SlotSearch::default();

        // Saturday morning rolls over to Monday 09:00
        let slot = search.find_next_available(&p, at(5, 8, 0), 30, &[]);
        assert_eq!(slot, Some(at(7, 9, 0)));

        // Busy 09:00-10:00 pushes the slot to 10:00
        let busy = [TimeWindow::new(at(0, 9, 0), at(0, 10, 0))];
        let slot = search.find_next_available(&p, at(0, 8, 0), 30, &busy);
        assert_eq!(slot, Some(at(0, 10, 0)));

        // Unaligned start rounds up to the granularity
        let slot = search.find_next_available(&p, at(0, 9, 1), 15, &[]);
        assert_eq!(slot, Some(at(0, 9, 15)));
    }

    #[test]
    fn test_find_next_available_respects_lookahead() {
        let p = practitioner(ShiftType::WeekendOnly);
        let search = SlotSearch {
            lookahead: MINUTES_PER_DAY,
            granularity: 15,
        };
        assert_eq!(search.find_next_available(&p, at(0, 0, 0), 30, &[]), None);
        assert_eq!(
            search.find_next_available(&p, at(5, 0, 0), 30, &[]),
            Some(at(5, 10, 0))
        );
    }

    #[test]
    fn test_windows_on_day_are_absolute() {
        let p = practitioner(ShiftType::SplitShift);
        let windows = p.windows_on_day(at(2, 13, 0));
        assert_eq!(
            windows,
            vec![
                TimeWindow::new(at(2, 9, 0), at(2, 12, 0)),
                TimeWindow::new(at(2, 14, 0), at(2, 18, 0)),
            ]
        );
    }
}
