use tokio::sync::watch;

use crate::model::{CalendarDate, DateRange};

use super::availability::Availability;

/// Check-in / check-out picked so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    PartialFrom {
        from: CalendarDate,
    },
    /// Every day of `from..=to` was available when `to` was clicked.
    Complete {
        from: CalendarDate,
        to: CalendarDate,
    },
}

impl SelectionState {
    pub fn from(&self) -> Option<CalendarDate> {
        match *self {
            SelectionState::Empty => None,
            SelectionState::PartialFrom { from } | SelectionState::Complete { from, .. } => Some(from),
        }
    }

    pub fn to(&self) -> Option<CalendarDate> {
        match *self {
            SelectionState::Complete { to, .. } => Some(to),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SelectionState::Complete { .. })
    }

    pub fn as_range(&self) -> Option<DateRange> {
        match *self {
            SelectionState::Complete { from, to } => Some(DateRange::new(from, to)),
            _ => None,
        }
    }
}

/// Apply one day click.
///
/// Clicks on unavailable days, or while `interactive` is false, leave the
/// state as it was. A second click that would enclose an unavailable day
/// starts a new selection at the clicked day instead of completing.
pub fn transition(
    state: SelectionState,
    day: CalendarDate,
    availability: &Availability,
    today: CalendarDate,
    interactive: bool,
) -> SelectionState {
    if !interactive || !availability.is_available(day, today) {
        return state;
    }
    match state {
        SelectionState::Empty | SelectionState::Complete { .. } => SelectionState::PartialFrom { from: day },
        SelectionState::PartialFrom { from } if day < from => SelectionState::PartialFrom { from: day },
        SelectionState::PartialFrom { from } => {
            let blocked = interior(from, day).any(|d| !availability.is_available(d, today));
            if blocked {
                SelectionState::PartialFrom { from: day }
            } else {
                SelectionState::Complete { from, to: day }
            }
        }
    }
}

/// Days strictly between `a` and `b`.
fn interior(a: CalendarDate, b: CalendarDate) -> impl Iterator<Item = CalendarDate> {
    std::iter::successors(a.succ_opt(), |d| d.succ_opt()).take_while(move |d| *d < b)
}

/// Owns the selection of one booking flow and publishes every change.
pub struct RangeSelector {
    state: watch::Sender<SelectionState>,
    interactive: bool,
}

impl RangeSelector {
    pub fn new(interactive: bool) -> Self {
        let (state, _) = watch::channel(SelectionState::Empty);
        Self { state, interactive }
    }

    pub fn state(&self) -> SelectionState {
        *self.state.borrow()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Receives the new state after every transition that changed it.
    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    pub fn click(&self, day: CalendarDate, availability: &Availability, today: CalendarDate) -> SelectionState {
        let current = self.state();
        let next = transition(current, day, availability, today, self.interactive);
        if next == current {
            tracing::trace!("click on {day} ignored");
        } else {
            self.state.send_replace(next);
        }
        next
    }

    pub fn reset(&self) {
        self.state.send_if_modified(|s| {
            let changed = *s != SelectionState::Empty;
            *s = SelectionState::Empty;
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::availability::OccupancySet;
    use crate::model::parse_date;

    fn d(s: &str) -> CalendarDate {
        parse_date(s).unwrap()
    }

    /// Approved booking 2024-11-10..2024-11-15, no holidays.
    fn november() -> Availability {
        Availability::Ready(OccupancySet::from_ranges(
            "casa-ulivo",
            &[DateRange::new(d("2024-11-10"), d("2024-11-15"))],
            &[],
        ))
    }

    fn today() -> CalendarDate {
        d("2024-11-01")
    }

    fn clicks(days: &[&str], avail: &Availability) -> SelectionState {
        days.iter()
            .fold(SelectionState::Empty, |s, day| transition(s, d(day), avail, today(), true))
    }

    #[test]
    fn free_range_completes() {
        let s = clicks(&["2024-11-16", "2024-11-20"], &november());
        assert_eq!(
            s,
            SelectionState::Complete {
                from: d("2024-11-16"),
                to: d("2024-11-20")
            }
        );
    }

    #[test]
    fn range_over_booking_restarts_at_second_click() {
        let s = clicks(&["2024-11-08", "2024-11-20"], &november());
        assert_eq!(s, SelectionState::PartialFrom { from: d("2024-11-20") });
    }

    #[test]
    fn earlier_second_click_restarts() {
        let s = clicks(&["2024-11-20", "2024-11-17"], &november());
        assert_eq!(s, SelectionState::PartialFrom { from: d("2024-11-17") });
    }

    #[test]
    fn same_day_twice_is_one_day_selection() {
        let s = clicks(&["2024-11-20", "2024-11-20"], &november());
        assert_eq!(
            s,
            SelectionState::Complete {
                from: d("2024-11-20"),
                to: d("2024-11-20")
            }
        );
    }

    #[test]
    fn adjacent_to_booking_completes() {
        let s = clicks(&["2024-11-05", "2024-11-09"], &november());
        assert!(s.is_complete());
        assert_eq!(s.as_range(), Some(DateRange::new(d("2024-11-05"), d("2024-11-09"))));
    }

    #[test]
    fn click_after_complete_starts_over() {
        let s = clicks(&["2024-11-16", "2024-11-20", "2024-11-25"], &november());
        assert_eq!(s, SelectionState::PartialFrom { from: d("2024-11-25") });
    }

    #[test]
    fn unavailable_clicks_change_nothing() {
        let avail = november();
        let states = [
            SelectionState::Empty,
            SelectionState::PartialFrom { from: d("2024-11-03") },
            SelectionState::Complete {
                from: d("2024-11-16"),
                to: d("2024-11-18"),
            },
        ];
        for s in states {
            // booked
            assert_eq!(transition(s, d("2024-11-12"), &avail, today(), true), s);
            // past
            assert_eq!(transition(s, d("2024-10-31"), &avail, today(), true), s);
        }
    }

    #[test]
    fn today_is_selectable() {
        let s = clicks(&["2024-11-01"], &november());
        assert_eq!(s, SelectionState::PartialFrom { from: today() });
    }

    #[test]
    fn non_interactive_ignores_clicks() {
        let s = transition(SelectionState::Empty, d("2024-11-20"), &november(), today(), false);
        assert_eq!(s, SelectionState::Empty);
    }

    #[test]
    fn loading_calendar_ignores_clicks() {
        let loading = Availability::loading("casa-ulivo");
        let s = transition(SelectionState::Empty, d("2024-11-20"), &loading, today(), true);
        assert_eq!(s, SelectionState::Empty);
    }

    #[test]
    fn holiday_in_between_also_restarts() {
        let avail = Availability::Ready(OccupancySet::from_ranges(
            "casa-ulivo",
            &[],
            &[DateRange::new(d("2024-12-24"), d("2024-12-26"))],
        ));
        let s = clicks(&["2024-12-20", "2024-12-28"], &avail);
        assert_eq!(s, SelectionState::PartialFrom { from: d("2024-12-28") });
    }

    #[test]
    fn complete_never_encloses_unavailable_day() {
        let avail = Availability::Ready(OccupancySet::from_ranges(
            "casa",
            &[
                DateRange::new(d("2024-11-05"), d("2024-11-06")),
                DateRange::new(d("2024-11-14"), d("2024-11-14")),
            ],
            &[DateRange::new(d("2024-11-20"), d("2024-11-21"))],
        ));
        let window: Vec<_> = DateRange::new(d("2024-10-30"), d("2024-11-25")).days().collect();

        // every ordered pair of clicks, starting from every reachable state
        for &a in &window {
            for &b in &window {
                for &c in &[window[0], d("2024-11-10"), d("2024-11-22")] {
                    let mut s = SelectionState::Empty;
                    for day in [c, a, b] {
                        s = transition(s, day, &avail, today(), true);
                        if let SelectionState::Complete { from, to } = s {
                            assert!(from <= to);
                            for day in DateRange::new(from, to).days() {
                                assert!(avail.is_available(day, today()), "{day} in {from}..{to}");
                            }
                        }
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn selector_publishes_changes() {
        let avail = november();
        let selector = RangeSelector::new(true);
        let mut rx = selector.subscribe();

        selector.click(d("2024-11-16"), &avail, today());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SelectionState::PartialFrom { from: d("2024-11-16") });

        // ignored click: nothing published
        selector.click(d("2024-11-12"), &avail, today());
        assert!(!rx.has_changed().unwrap());

        let s = selector.click(d("2024-11-18"), &avail, today());
        assert!(s.is_complete());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), s);

        selector.reset();
        assert_eq!(selector.state(), SelectionState::Empty);
        assert!(rx.has_changed().unwrap());
    }
}
