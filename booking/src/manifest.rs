//! Per-booking guest list.
//!
//! A manifest holds one row per expected occupant. Rows are either guest
//! records the backend has stored (they carry an id) or placeholders waiting
//! to be filled in. The row count never exceeds the limit, which tracks the
//! booking's guest count.

use crate::error::{BookingError, Result};
use crate::types::Guest;
use serde::{Deserialize, Serialize};

/// Ordered guest rows of one booking with their size limit
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestManifest {
    guests: Vec<Guest>,
    limit: usize,
}

impl GuestManifest {
    /// Empty manifest allowing `limit` rows
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            guests: Vec::new(),
            limit,
        }
    }

    /// Manifest for guests loaded from the backend
    ///
    /// # Errors
    ///
    /// [`BookingError::ManifestSize`] if there are more guests than `limit`.
    pub fn from_guests(limit: usize, guests: Vec<Guest>) -> Result<Self> {
        if guests.len() > limit {
            return Err(BookingError::ManifestSize {
                requested: to_i64(guests.len()),
                reason: format!("booking allows {limit} guests"),
            });
        }
        Ok(Self { guests, limit })
    }

    /// Manifest for every stored guest of a booking
    ///
    /// The limit grows to the number of guests when the backend returns more
    /// than `limit`, so no stored guest is dropped.
    #[must_use]
    pub fn with_stored(limit: usize, guests: Vec<Guest>) -> Self {
        let limit = limit.max(guests.len());
        Self { guests, limit }
    }

    /// Resizes to exactly `target` rows
    ///
    /// Pads with placeholders or drops rows from the tail, and makes `target`
    /// the new limit. Calling it twice with the same target changes nothing.
    ///
    /// # Errors
    ///
    /// [`BookingError::ManifestSize`] if `target` is negative.
    pub fn ensure_size(&mut self, target: i64) -> Result<()> {
        let target = usize::try_from(target).map_err(|_| BookingError::ManifestSize {
            requested: target,
            reason: "size must not be negative".to_string(),
        })?;
        self.guests.resize_with(target, Guest::placeholder);
        self.limit = target;
        Ok(())
    }

    /// Changes the limit without touching the rows
    ///
    /// # Errors
    ///
    /// [`BookingError::ManifestSize`] if more rows than `limit` exist.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if self.guests.len() > limit {
            return Err(BookingError::ManifestSize {
                requested: to_i64(limit),
                reason: format!("{} guests are already listed", self.guests.len()),
            });
        }
        self.limit = limit;
        Ok(())
    }

    /// Updates the row with the guest's id, or appends a new guest
    ///
    /// Returns the row index.
    ///
    /// # Errors
    ///
    /// - [`BookingError::GuestNotFound`] if the guest has an id no row carries
    /// - [`BookingError::ManifestSize`] if a new guest would exceed the limit
    pub fn upsert(&mut self, guest: Guest) -> Result<usize> {
        if let Some(id) = guest.id {
            let index = self
                .guests
                .iter()
                .position(|row| row.id == Some(id))
                .ok_or(BookingError::GuestNotFound { guest_id: id })?;
            self.guests[index] = guest;
            return Ok(index);
        }

        if self.guests.len() >= self.limit {
            return Err(BookingError::ManifestSize {
                requested: to_i64(self.guests.len() + 1),
                reason: format!("booking allows {} guests", self.limit),
            });
        }
        self.guests.push(guest);
        Ok(self.guests.len() - 1)
    }

    /// Puts `guest` in the first blank row, or appends it, keeping its id
    ///
    /// Returns the row index.
    ///
    /// # Errors
    ///
    /// [`BookingError::ManifestSize`] if no row is blank and the limit is reached.
    pub fn add(&mut self, guest: Guest) -> Result<usize> {
        if let Some(index) = self.guests.iter().position(Guest::is_blank) {
            self.guests[index] = guest;
            return Ok(index);
        }
        if self.guests.len() >= self.limit {
            return Err(BookingError::ManifestSize {
                requested: to_i64(self.guests.len() + 1),
                reason: format!("booking allows {} guests", self.limit),
            });
        }
        self.guests.push(guest);
        Ok(self.guests.len() - 1)
    }

    /// Replaces the row at `index`
    ///
    /// A row holding a stored guest only takes that same guest.
    ///
    /// # Errors
    ///
    /// - [`BookingError::IndexOutOfRange`] if there is no such row
    /// - [`BookingError::ManifestSize`] if the row holds another stored guest
    pub fn set(&mut self, index: usize, guest: Guest) -> Result<()> {
        let len = self.guests.len();
        let occupied = self.persisted_count();
        let row = self
            .guests
            .get_mut(index)
            .ok_or(BookingError::IndexOutOfRange { index, len })?;
        if row.is_persisted() && row.id != guest.id {
            return Err(BookingError::ManifestSize {
                requested: to_i64(occupied + 1),
                reason: format!("row {index} already holds a registered guest"),
            });
        }
        *row = guest;
        Ok(())
    }

    /// Removes and returns the row at `index`
    ///
    /// # Errors
    ///
    /// [`BookingError::IndexOutOfRange`] if there is no such row.
    pub fn remove(&mut self, index: usize) -> Result<Guest> {
        if index >= self.guests.len() {
            return Err(BookingError::IndexOutOfRange {
                index,
                len: self.guests.len(),
            });
        }
        Ok(self.guests.remove(index))
    }

    /// Row at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Guest> {
        self.guests.get(index)
    }

    /// All rows in order
    #[must_use]
    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.guests.len()
    }

    /// No rows at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }

    /// Maximum number of rows
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Whether any row carries a backend id
    #[must_use]
    pub fn has_persisted_guests(&self) -> bool {
        self.guests.iter().any(Guest::is_persisted)
    }

    /// Rows carrying a backend id
    #[must_use]
    pub fn persisted_count(&self) -> usize {
        self.guests.iter().filter(|guest| guest.is_persisted()).count()
    }

    /// Every row is a stored guest and the limit is reached
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.guests.len() == self.limit && self.guests.iter().all(Guest::is_persisted)
    }

    /// Moves rows with content ahead of blank placeholders, keeping order
    pub fn compact(&mut self) {
        let (filled, blank): (Vec<_>, Vec<_>) = self.guests.drain(..).partition(|guest| !guest.is_blank());
        self.guests = filled;
        self.guests.extend(blank);
    }

    /// Drops every blank placeholder
    pub fn trim_placeholders(&mut self) {
        self.guests.retain(|guest| !guest.is_blank());
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
