//! Booking list queries for the admin views.

use crate::date_range::DateRange;
use crate::types::{Booking, BookingStatus, RoomId, UserId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Criteria a booking must meet to be listed
///
/// Empty criteria match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFilter {
    /// Only this status
    pub status: Option<BookingStatus>,
    /// Only bookings owned by this account
    pub user_id: Option<UserId>,
    /// Only bookings of this room
    pub room_id: Option<RoomId>,
    /// Case-insensitive match on guest name, guest email or booking id
    pub search: Option<String>,
    /// Only stays sharing a night with this window (calendar view)
    pub window: Option<DateRange>,
}

impl BookingFilter {
    /// Matches every booking
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one status
    #[must_use]
    pub const fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to one account
    #[must_use]
    pub const fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Restricts to one room
    #[must_use]
    pub const fn for_room(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    /// Adds a free-text search term
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restricts to stays overlapping `window`
    #[must_use]
    pub const fn within(mut self, window: DateRange) -> Self {
        self.window = Some(window);
        self
    }

    /// Whether `booking` meets every criterion
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        if self.status.is_some_and(|status| status != booking.status) {
            return false;
        }
        if self.user_id.is_some_and(|user_id| !booking.is_owned_by(user_id)) {
            return false;
        }
        if self.room_id.is_some_and(|room_id| room_id != booking.room_id) {
            return false;
        }
        if let Some(window) = &self.window {
            let overlaps = DateRange::new(booking.check_in, booking.check_out)
                .is_ok_and(|stay| stay.overlaps(window));
            if !overlaps {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => matches_search(booking, &term.to_lowercase()),
        }
    }
}

fn matches_search(booking: &Booking, term: &str) -> bool {
    let contains = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|value| value.to_lowercase().contains(term))
    };
    contains(&booking.guest_name)
        || contains(&booking.guest_email)
        || booking.id.is_some_and(|id| id.to_string().contains(term))
}

/// Column to order a booking list by
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSort {
    /// Backend id, unsaved bookings first
    #[default]
    Id,
    /// Arrival date
    CheckIn,
    /// Departure date
    CheckOut,
    /// Lifecycle status
    Status,
    /// Contact name, missing names first
    GuestName,
    /// Total price
    TotalPrice,
}

impl BookingSort {
    fn compare(self, a: &Booking, b: &Booking) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::CheckIn => a.check_in.cmp(&b.check_in),
            Self::CheckOut => a.check_out.cmp(&b.check_out),
            Self::Status => a.status.cmp(&b.status),
            Self::GuestName => a.guest_name.cmp(&b.guest_name),
            Self::TotalPrice => a.total_price.cmp(&b.total_price),
        }
    }
}

/// Stable sort of `bookings` by `key`, descending when `descending`
pub fn sort_bookings(bookings: &mut [Booking], key: BookingSort, descending: bool) {
    bookings.sort_by(|a, b| {
        let ordering = key.compare(a, b);
        if descending { ordering.reverse() } else { ordering }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BookingId, BookingType, Money, PaymentStatus};
    use chrono::{NaiveDate, Utc};

    fn booking(id: u64, name: &str, check_in: &str, check_out: &str, status: BookingStatus) -> Booking {
        Booking {
            id: Some(BookingId::new(id)),
            room_id: RoomId::new(id % 2 + 1),
            user_id: Some(UserId::new(id * 10)),
            check_in: NaiveDate::parse_from_str(check_in, "%Y-%m-%d").unwrap(),
            check_out: NaiveDate::parse_from_str(check_out, "%Y-%m-%d").unwrap(),
            guest_count: 1,
            status,
            payment_status: PaymentStatus::Unpaid,
            total_price: Money::from_units(u32::try_from(id).unwrap() * 50),
            booking_type: BookingType::Standard,
            guest_name: Some(name.to_string()),
            guest_email: Some(format!("{}@example.com", name.to_lowercase())),
            guest_phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn bookings() -> Vec<Booking> {
        vec![
            booking(1, "Zoltan", "2024-05-01", "2024-05-03", BookingStatus::Pending),
            booking(2, "Anna", "2024-05-10", "2024-05-12", BookingStatus::Confirmed),
            booking(13, "Maria", "2024-04-28", "2024-05-02", BookingStatus::Cancelled),
        ]
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(bookings().iter().all(|b| BookingFilter::new().matches(b)));
    }

    #[test]
    fn search_covers_name_email_and_id() {
        let list = bookings();
        let ids = |filter: &BookingFilter| -> Vec<u64> {
            list.iter()
                .filter(|b| filter.matches(b))
                .filter_map(|b| b.id.map(BookingId::get))
                .collect()
        };
        assert_eq!(ids(&BookingFilter::new().with_search("ANNA")), vec![2]);
        assert_eq!(ids(&BookingFilter::new().with_search("maria@")), vec![13]);
        assert_eq!(ids(&BookingFilter::new().with_search("1")), vec![1, 13]);
        assert_eq!(ids(&BookingFilter::new().with_search("  ")), vec![1, 2, 13]);
    }

    #[test]
    fn criteria_combine() {
        let list = bookings();
        let filter = BookingFilter::new()
            .with_status(BookingStatus::Confirmed)
            .for_user(UserId::new(20));
        let found: Vec<_> = list.iter().filter(|b| filter.matches(b)).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Some(BookingId::new(2)));

        let other_room = BookingFilter::new().for_room(RoomId::new(1));
        assert!(!other_room.matches(&list[0]));
    }

    #[test]
    fn window_keeps_overlapping_stays() {
        let window = DateRange::parse("2024-05-02", "2024-05-04").unwrap();
        let filter = BookingFilter::new().within(window);
        let found: Vec<_> = bookings()
            .into_iter()
            .filter(|b| filter.matches(b))
            .filter_map(|b| b.id)
            .collect();
        assert_eq!(found, vec![BookingId::new(1)]);
    }

    #[test]
    fn sorting_by_column() {
        let mut list = bookings();
        sort_bookings(&mut list, BookingSort::CheckIn, false);
        let names: Vec<_> = list.iter().filter_map(|b| b.guest_name.clone()).collect();
        assert_eq!(names, ["Maria", "Zoltan", "Anna"]);

        sort_bookings(&mut list, BookingSort::TotalPrice, true);
        assert_eq!(list[0].id, Some(BookingId::new(13)));

        sort_bookings(&mut list, BookingSort::GuestName, false);
        assert_eq!(list[0].guest_name.as_deref(), Some("Anna"));
    }
}
