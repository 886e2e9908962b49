//! Caller identity.

use crate::error::{BookingError, Result};
use crate::lifecycle::LifecycleEvent;
use crate::types::{Role, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is acting, passed explicitly into every command and API call
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Signed-in account
    pub user_id: UserId,
    /// Account role
    pub role: Role,
    /// Bearer token for the backend
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl Session {
    /// Session without a token
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            token: None,
        }
    }

    /// Attaches a bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Hotel staff
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Owner of a booking this session creates for `requested`
    ///
    /// A customer who names nobody books for themselves.
    #[must_use]
    pub fn booking_owner(&self, requested: Option<UserId>) -> Option<UserId> {
        match requested {
            None if !self.is_staff() => Some(self.user_id),
            owner => owner,
        }
    }

    /// Checks that this session may perform `event` on a booking owned by `owner`
    ///
    /// Staff may do anything. Customers act only on their own bookings and
    /// never confirm or complete them.
    ///
    /// # Errors
    ///
    /// [`BookingError::Forbidden`] otherwise.
    pub fn authorize(&self, event: LifecycleEvent, owner: Option<UserId>) -> Result<()> {
        if self.is_staff() {
            return Ok(());
        }
        let own = owner == Some(self.user_id);
        let allowed = match event {
            LifecycleEvent::Create
            | LifecycleEvent::Edit
            | LifecycleEvent::Cancel
            | LifecycleEvent::ManageGuests => own,
            LifecycleEvent::Confirm | LifecycleEvent::Complete => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(BookingError::Forbidden { role: self.role, event })
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
