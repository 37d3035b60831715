//! Month grid for a calendar renderer.
//!
//! Weeks start on Monday. Each cell carries the day's status and, for days
//! that can be booked, its place in the current selection.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::model::CalendarDate;

use super::availability::Availability;
use super::selector::SelectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Free,
    Booked,
    Holiday,
    Past,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRole {
    None,
    Start,
    End,
    /// Start and end on the same day.
    Single,
    InRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: CalendarDate,
    pub status: DayStatus,
    pub role: SelectionRole,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st (0 = the month starts on a Monday).
    pub leading_blanks: u32,
    pub loading: bool,
    /// One cell per day; empty while loading.
    pub days: Vec<DayCell>,
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (ny, nm) = next_month(year, month);
    let next_first = NaiveDate::from_ymd_opt(ny, nm, 1)?;
    Some((next_first - first).num_days() as u32)
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 { (year + 1, 1) } else { (year, month + 1) }
}

pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 { (year - 1, 12) } else { (year, month - 1) }
}

fn status_of(day: CalendarDate, availability: &Availability, today: CalendarDate) -> DayStatus {
    if let Some(occ) = availability.occupancy() {
        if occ.is_booked(day) {
            return DayStatus::Booked;
        }
        if occ.is_holiday(day) {
            return DayStatus::Holiday;
        }
    }
    if day < today { DayStatus::Past } else { DayStatus::Free }
}

fn role_of(day: CalendarDate, selection: &SelectionState) -> SelectionRole {
    match *selection {
        SelectionState::Empty => SelectionRole::None,
        SelectionState::PartialFrom { from } if day == from => SelectionRole::Start,
        SelectionState::PartialFrom { .. } => SelectionRole::None,
        SelectionState::Complete { from, to } if day == from && day == to => SelectionRole::Single,
        SelectionState::Complete { from, .. } if day == from => SelectionRole::Start,
        SelectionState::Complete { to, .. } if day == to => SelectionRole::End,
        SelectionState::Complete { from, to } if from < day && day < to => SelectionRole::InRange,
        SelectionState::Complete { .. } => SelectionRole::None,
    }
}

impl MonthView {
    /// `None` if `month` is not 1..=12 or the year is out of range.
    pub fn build(
        year: i32,
        month: u32,
        availability: &Availability,
        selection: &SelectionState,
        today: CalendarDate,
    ) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let count = days_in_month(year, month)?;
        let leading_blanks = first.weekday().num_days_from_monday();

        if availability.is_loading() {
            return Some(Self {
                year,
                month,
                leading_blanks,
                loading: true,
                days: Vec::new(),
            });
        }

        let days = first
            .iter_days()
            .take(count as usize)
            .map(|date| {
                let status = status_of(date, availability, today);
                // selection styling only shows on days that can be booked
                let role = if status == DayStatus::Free {
                    role_of(date, selection)
                } else {
                    SelectionRole::None
                };
                DayCell {
                    date,
                    status,
                    role,
                    is_today: date == today,
                }
            })
            .collect();

        Some(Self {
            year,
            month,
            leading_blanks,
            loading: false,
            days,
        })
    }

    pub fn first_day(&self) -> Option<CalendarDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn cell(&self, day: CalendarDate) -> Option<&DayCell> {
        self.days.iter().find(|c| c.date == day)
    }

    pub fn count(&self, status: DayStatus) -> usize {
        self.days.iter().filter(|c| c.status == status).count()
    }
}

/// Plain-text grid. Markers after the day number:
/// `x` booked, `h` holiday, `-` past, `[`/`]` selection ends, `=` in range.
impl fmt::Display for MonthView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self
            .first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default();
        writeln!(f, "{title:^28}")?;
        writeln!(f, " Mo  Tu  We  Th  Fr  Sa  Su")?;
        if self.loading {
            return writeln!(f, "        (loading...)");
        }

        let mut col = 0;
        for _ in 0..self.leading_blanks {
            write!(f, "    ")?;
            col += 1;
        }
        for cell in &self.days {
            let marker = match (cell.status, cell.role) {
                (DayStatus::Booked, _) => 'x',
                (DayStatus::Holiday, _) => 'h',
                (DayStatus::Past, _) => '-',
                (DayStatus::Free, SelectionRole::Start | SelectionRole::Single) => '[',
                (DayStatus::Free, SelectionRole::End) => ']',
                (DayStatus::Free, SelectionRole::InRange) => '=',
                (DayStatus::Free, SelectionRole::None) if cell.is_today => '*',
                (DayStatus::Free, SelectionRole::None) => ' ',
            };
            write!(f, " {:>2}{marker}", cell.date.day())?;
            col += 1;
            if col == 7 {
                writeln!(f)?;
                col = 0;
            }
        }
        if col != 0 {
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::availability::OccupancySet;
    use crate::model::{DateRange, parse_date};

    fn d(s: &str) -> CalendarDate {
        parse_date(s).unwrap()
    }

    fn casa_ulivo() -> Availability {
        Availability::Ready(OccupancySet::from_ranges(
            "casa-ulivo",
            &[
                DateRange::new(d("2024-11-10"), d("2024-11-15")),
                DateRange::new(d("2024-11-25"), d("2024-11-28")),
            ],
            &[DateRange::new(d("2024-12-24"), d("2024-12-26"))],
        ))
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
        assert_eq!(next_month(2024, 12), (2025, 1));
        assert_eq!(prev_month(2025, 1), (2024, 12));
    }

    #[test]
    fn november_2024_grid() {
        let today = d("2024-11-05");
        let view = MonthView::build(2024, 11, &casa_ulivo(), &SelectionState::Empty, today).unwrap();
        // 2024-11-01 is a Friday
        assert_eq!(view.leading_blanks, 4);
        assert_eq!(view.days.len(), 30);
        assert_eq!(view.count(DayStatus::Past), 4);
        assert_eq!(view.count(DayStatus::Booked), 10);
        assert_eq!(view.count(DayStatus::Holiday), 0);
        assert!(view.cell(today).unwrap().is_today);
    }

    #[test]
    fn booked_wins_over_past() {
        let today = d("2024-11-20");
        let view = MonthView::build(2024, 11, &casa_ulivo(), &SelectionState::Empty, today).unwrap();
        assert_eq!(view.cell(d("2024-11-12")).unwrap().status, DayStatus::Booked);
        assert_eq!(view.cell(d("2024-11-16")).unwrap().status, DayStatus::Past);
    }

    #[test]
    fn selection_roles() {
        let today = d("2024-11-01");
        let sel = SelectionState::Complete {
            from: d("2024-11-16"),
            to: d("2024-11-19"),
        };
        let view = MonthView::build(2024, 11, &casa_ulivo(), &sel, today).unwrap();
        assert_eq!(view.cell(d("2024-11-16")).unwrap().role, SelectionRole::Start);
        assert_eq!(view.cell(d("2024-11-17")).unwrap().role, SelectionRole::InRange);
        assert_eq!(view.cell(d("2024-11-19")).unwrap().role, SelectionRole::End);
        assert_eq!(view.cell(d("2024-11-20")).unwrap().role, SelectionRole::None);

        let single = SelectionState::Complete {
            from: d("2024-11-20"),
            to: d("2024-11-20"),
        };
        let view = MonthView::build(2024, 11, &casa_ulivo(), &single, today).unwrap();
        assert_eq!(view.cell(d("2024-11-20")).unwrap().role, SelectionRole::Single);
    }

    #[test]
    fn holidays_shown_separately() {
        let view = MonthView::build(2024, 12, &casa_ulivo(), &SelectionState::Empty, d("2024-11-01")).unwrap();
        assert_eq!(view.count(DayStatus::Holiday), 3);
        assert_eq!(view.count(DayStatus::Booked), 0);
        // 2024-12-01 is a Sunday
        assert_eq!(view.leading_blanks, 6);
    }

    #[test]
    fn loading_has_no_cells() {
        let view = MonthView::build(
            2024,
            11,
            &Availability::loading("casa-ulivo"),
            &SelectionState::Empty,
            d("2024-11-01"),
        )
        .unwrap();
        assert!(view.loading);
        assert!(view.days.is_empty());
        assert!(view.to_string().contains("loading"));
    }

    #[test]
    fn text_grid() {
        let view = MonthView::build(2024, 11, &casa_ulivo(), &SelectionState::Empty, d("2024-11-05")).unwrap();
        let text = view.to_string();
        assert!(text.contains("November 2024"));
        assert!(text.contains(" 10x"));
        assert!(text.contains("  5*"));
        assert!(text.contains("  4-"));
        // 4 blanks then Friday the 1st
        let first_week = text.lines().nth(2).unwrap();
        assert!(first_week.starts_with("                  1-"));
    }
}
