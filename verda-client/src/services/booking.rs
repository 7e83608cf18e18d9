//! Appointment slot scheduler
//!
//! Computes a calendar grid and the bookable half-hour slots for a service
//! provider, filtering by elapsed time and occupancy. The scheduler only
//! filters against the occupied set its caller supplies — confirming a
//! selection does not reserve the slot anywhere, so two independent flows
//! can still pick the same provider/time; guarding against that is the
//! caller's responsibility.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use shared::models::{BookingConfirmation, OccupiedSlot, TimeSlot};
use shared::{AppError, AppResult};
use std::collections::HashSet;

/// First bookable hour of the day
const OPEN_HOUR: u32 = 9;
/// Slots stop before this hour
const CLOSE_HOUR: u32 = 18;
/// Slot granularity in minutes
const SLOT_MINUTES: u32 = 30;

/// 7-column month grid: leading `None` cells pad to day 1's weekday
/// (Sunday-first), then one cell per day of the month.
pub fn month_grid(year: i32, month: u32) -> Vec<Option<NaiveDate>> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let leading = first.weekday().num_days_from_sunday() as usize;
    let mut cells: Vec<Option<NaiveDate>> = vec![None; leading];

    let mut day = first;
    loop {
        cells.push(Some(day));
        match day.succ_opt() {
            Some(next) if next.month() == month => day = next,
            _ => break,
        }
    }
    cells
}

/// Half-hour slots from 09:00 up to (not including) 18:00 for one date.
///
/// A slot is past when `date` is today and its hh:mm is at or before `now`
/// (minute granularity — a slot equal to "now" counts as past). A slot is
/// occupied when `(date, time)` appears in `occupied`.
pub fn day_slots(
    date: NaiveDate,
    occupied: &HashSet<OccupiedSlot>,
    now: NaiveDateTime,
) -> Vec<TimeSlot> {
    let date_label = date.format("%Y-%m-%d").to_string();
    let is_today = date == now.date();
    let now_minutes = now.hour() * 60 + now.minute();

    let mut slots = Vec::new();
    let mut minutes = OPEN_HOUR * 60;
    while minutes < CLOSE_HOUR * 60 {
        let label = format!("{:02}:{:02}", minutes / 60, minutes % 60);
        let is_past = is_today && minutes <= now_minutes;
        let is_occupied = occupied.contains(&OccupiedSlot {
            date: date_label.clone(),
            time: label.clone(),
        });
        slots.push(TimeSlot {
            time: label,
            available: !is_past && !is_occupied,
        });
        minutes += SLOT_MINUTES;
    }
    slots
}

/// Date/time selection state for one booking flow.
///
/// Selecting a date clears any previously selected time; navigating months
/// resets both. `confirm` only succeeds once a date and an available time
/// are both chosen.
#[derive(Debug, Clone)]
pub struct BookingCalendar {
    provider_id: String,
    occupied: HashSet<OccupiedSlot>,
    /// Fixed clock for tests; `None` means wall clock
    fixed_now: Option<NaiveDateTime>,
    cursor_year: i32,
    cursor_month: u32,
    selected_date: Option<NaiveDate>,
    selected_time: Option<String>,
}

impl BookingCalendar {
    /// Calendar for a provider, starting on the current month
    pub fn new(provider_id: impl Into<String>, occupied: Vec<OccupiedSlot>) -> Self {
        Self::build(provider_id.into(), occupied, None)
    }

    /// Calendar with a fixed clock (tests)
    pub fn with_now(
        provider_id: impl Into<String>,
        occupied: Vec<OccupiedSlot>,
        now: NaiveDateTime,
    ) -> Self {
        Self::build(provider_id.into(), occupied, Some(now))
    }

    fn build(
        provider_id: String,
        occupied: Vec<OccupiedSlot>,
        fixed_now: Option<NaiveDateTime>,
    ) -> Self {
        let today = fixed_now
            .map(|n| n.date())
            .unwrap_or_else(|| Local::now().date_naive());
        Self {
            provider_id,
            occupied: occupied.into_iter().collect(),
            fixed_now,
            cursor_year: today.year(),
            cursor_month: today.month(),
            selected_date: None,
            selected_time: None,
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.fixed_now
            .unwrap_or_else(|| Local::now().naive_local())
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn selected_time(&self) -> Option<&str> {
        self.selected_time.as_deref()
    }

    /// Grid for the month the cursor is on
    pub fn grid(&self) -> Vec<Option<NaiveDate>> {
        month_grid(self.cursor_year, self.cursor_month)
    }

    /// Slots for the selected date (empty when no date is selected)
    pub fn slots(&self) -> Vec<TimeSlot> {
        match self.selected_date {
            Some(date) => day_slots(date, &self.occupied, self.now()),
            None => Vec::new(),
        }
    }

    /// Whether a date can be selected (today or later)
    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        date >= self.today()
    }

    /// Select a date; any previously selected time is invalidated
    pub fn select_date(&mut self, date: NaiveDate) -> AppResult<()> {
        if date < self.today() {
            return Err(AppError::validation(format!(
                "cannot book a past date: {date}"
            )));
        }
        self.selected_date = Some(date);
        self.selected_time = None;
        Ok(())
    }

    /// Select a time slot on the selected date; unavailable slots are
    /// rejected
    pub fn select_time(&mut self, time: &str) -> AppResult<()> {
        let Some(date) = self.selected_date else {
            return Err(AppError::invalid_state("select a date before a time"));
        };
        let slots = day_slots(date, &self.occupied, self.now());
        let slot = slots
            .iter()
            .find(|s| s.time == time)
            .ok_or_else(|| AppError::validation(format!("unknown time slot: {time}")))?;
        if !slot.available {
            return Err(AppError::invalid_state(format!(
                "time slot {time} on {date} is not available"
            )));
        }
        self.selected_time = Some(time.to_string());
        Ok(())
    }

    /// Move the cursor one month forward, resetting the selection
    pub fn next_month(&mut self) {
        if self.cursor_month == 12 {
            self.cursor_month = 1;
            self.cursor_year += 1;
        } else {
            self.cursor_month += 1;
        }
        self.reset_selection();
    }

    /// Move the cursor one month back, resetting the selection
    pub fn prev_month(&mut self) {
        if self.cursor_month == 1 {
            self.cursor_month = 12;
            self.cursor_year -= 1;
        } else {
            self.cursor_month -= 1;
        }
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        self.selected_date = None;
        self.selected_time = None;
    }

    /// Whether both a date and an available time are chosen
    pub fn can_confirm(&self) -> bool {
        self.selected_date.is_some() && self.selected_time.is_some()
    }

    /// Confirm the selection, yielding the `(date, time)` pair the checkout
    /// flow threads into order creation
    pub fn confirm(&self) -> AppResult<BookingConfirmation> {
        let (Some(date), Some(time)) = (self.selected_date, self.selected_time.as_ref()) else {
            return Err(AppError::invalid_state(
                "select a date and a time before confirming",
            ));
        };
        let confirmation = BookingConfirmation {
            date: date.format("%Y-%m-%d").to_string(),
            time: time.clone(),
        };
        tracing::debug!(
            provider_id = %self.provider_id,
            date = %confirmation.date,
            time = %confirmation.time,
            "booking slot confirmed"
        );
        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
    }

    fn slot_map(slots: &[TimeSlot]) -> std::collections::HashMap<&str, bool> {
        slots.iter().map(|s| (s.time.as_str(), s.available)).collect()
    }

    #[test]
    fn test_month_grid_leading_blanks() {
        // 2024-01-01 is a Monday: one leading blank (Sunday-first grid)
        let grid = month_grid(2024, 1);
        assert_eq!(grid.len(), 1 + 31);
        assert!(grid[0].is_none());
        assert_eq!(grid[1], NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(grid[31], NaiveDate::from_ymd_opt(2024, 1, 31));

        // 2024-09-01 is a Sunday: no leading blanks
        let grid = month_grid(2024, 9);
        assert_eq!(grid.len(), 30);
        assert_eq!(grid[0], NaiveDate::from_ymd_opt(2024, 9, 1));
    }

    #[test]
    fn test_month_grid_february_leap_year() {
        // 2024-02-01 is a Thursday
        let grid = month_grid(2024, 2);
        assert_eq!(grid.len(), 4 + 29);
        assert!(grid[0..4].iter().all(|c| c.is_none()));
        assert_eq!(grid[4 + 28], NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_day_slots_mid_morning_boundary() {
        // Current time 10:05 on 2024-01-15, 14:00 occupied
        let occupied: HashSet<_> = [OccupiedSlot::new("2024-01-15", "14:00")].into();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let slots = day_slots(date, &occupied, at("2024-01-15", "10:05"));

        let by_time = slot_map(&slots);
        assert_eq!(by_time["09:30"], false); // past
        assert_eq!(by_time["10:00"], false); // past, inclusive boundary
        assert_eq!(by_time["10:30"], true);
        assert_eq!(by_time["14:00"], false); // occupied
        assert_eq!(by_time["15:00"], true);
    }

    #[test]
    fn test_day_slots_boundary_exactly_now() {
        // Slot equal to "now" is treated as past
        let occupied = HashSet::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let slots = day_slots(date, &occupied, at("2024-01-15", "10:30"));
        let by_time = slot_map(&slots);
        assert_eq!(by_time["10:30"], false);
        assert_eq!(by_time["11:00"], true);
    }

    #[test]
    fn test_day_slots_range_and_count() {
        let occupied = HashSet::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let slots = day_slots(date, &occupied, at("2024-01-15", "10:05"));

        // 09:00 .. 17:30, half-hour steps
        assert_eq!(slots.len(), 18);
        assert_eq!(slots[0].time, "09:00");
        assert_eq!(slots.last().unwrap().time, "17:30");
        // Future date: nothing is past
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_occupancy_is_per_date() {
        let occupied: HashSet<_> = [OccupiedSlot::new("2024-01-15", "14:00")].into();
        let other_day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let slots = day_slots(other_day, &occupied, at("2024-01-15", "10:05"));
        assert_eq!(slot_map(&slots)["14:00"], true);
    }

    fn calendar() -> BookingCalendar {
        BookingCalendar::with_now(
            "coach-7",
            vec![OccupiedSlot::new("2024-01-15", "14:00")],
            at("2024-01-15", "10:05"),
        )
    }

    #[test]
    fn test_select_date_clears_time() {
        let mut cal = calendar();
        cal.select_date(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap())
            .unwrap();
        cal.select_time("14:00").unwrap();
        assert!(cal.can_confirm());

        cal.select_date(NaiveDate::from_ymd_opt(2024, 1, 17).unwrap())
            .unwrap();
        assert_eq!(cal.selected_time(), None);
        assert!(!cal.can_confirm());
    }

    #[test]
    fn test_past_date_rejected() {
        let mut cal = calendar();
        let err = cal
            .select_date(NaiveDate::from_ymd_opt(2024, 1, 14).unwrap())
            .unwrap_err();
        assert!(err.is_validation());
        assert!(!cal.is_selectable(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
        assert!(cal.is_selectable(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
    }

    #[test]
    fn test_unavailable_time_rejected() {
        let mut cal = calendar();
        cal.select_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .unwrap();

        // Occupied
        assert!(cal.select_time("14:00").unwrap_err().is_invalid_state());
        // Past
        assert!(cal.select_time("09:30").unwrap_err().is_invalid_state());
        // Not on the half-hour grid
        assert!(cal.select_time("14:15").unwrap_err().is_validation());
        // Fine
        cal.select_time("15:00").unwrap();
    }

    #[test]
    fn test_time_requires_date_first() {
        let mut cal = calendar();
        assert!(cal.select_time("15:00").unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_month_navigation_resets_selection() {
        let mut cal = calendar();
        cal.select_date(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap())
            .unwrap();
        cal.select_time("15:00").unwrap();

        cal.next_month();
        assert_eq!(cal.selected_date(), None);
        assert_eq!(cal.selected_time(), None);
        assert_eq!(cal.grid()[0..4].iter().filter(|c| c.is_none()).count(), 4);

        cal.prev_month();
        // Back on January 2024
        assert_eq!(cal.grid()[1], NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_month_navigation_year_rollover() {
        let mut cal = BookingCalendar::with_now("coach-7", vec![], at("2024-12-05", "08:00"));
        cal.next_month();
        assert_eq!(cal.grid()[3], NaiveDate::from_ymd_opt(2025, 1, 1));
        cal.prev_month();
        cal.prev_month();
        // 2024-11-01 is a Friday: five leading blanks
        assert_eq!(cal.grid()[5], NaiveDate::from_ymd_opt(2024, 11, 1));
    }

    #[test]
    fn test_confirm_requires_full_selection() {
        let mut cal = calendar();
        assert!(cal.confirm().unwrap_err().is_invalid_state());

        cal.select_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .unwrap();
        assert!(cal.confirm().is_err());

        cal.select_time("10:30").unwrap();
        let confirmation = cal.confirm().unwrap();
        assert_eq!(confirmation.date, "2024-01-15");
        assert_eq!(confirmation.time, "10:30");
    }

    #[test]
    fn test_confirm_zero_pads_date() {
        let mut cal = BookingCalendar::with_now("coach-7", vec![], at("2024-03-02", "08:00"));
        cal.select_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .unwrap();
        cal.select_time("09:00").unwrap();
        assert_eq!(cal.confirm().unwrap().date, "2024-03-05");
    }
}
