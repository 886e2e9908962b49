//! User-facing notifications.

use serde::{Deserialize, Serialize};
use std::future::Future;

/// A yes/no question put to the user before an irreversible step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPrompt {
    /// Headline
    pub title: String,
    /// Explanation below the headline
    pub text: String,
    /// Label of the accepting button
    pub confirm_label: String,
}

impl ConfirmationPrompt {
    /// Prompt with the given texts
    #[must_use]
    pub fn new(title: impl Into<String>, text: impl Into<String>, confirm_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            confirm_label: confirm_label.into(),
        }
    }

    /// Asked before a booking is cancelled
    #[must_use]
    pub fn cancel_booking() -> Self {
        Self::new("Are you sure?", "This action cannot be undone!", "Yes, cancel it!")
    }

    /// Asked before a stay is closed
    #[must_use]
    pub fn complete_booking() -> Self {
        Self::new(
            "Complete this booking?",
            "Completed bookings can no longer be edited.",
            "Yes, complete it!",
        )
    }

    /// Asked before a registered guest is deleted
    #[must_use]
    pub fn delete_guest() -> Self {
        Self::new("Are you sure?", "This action cannot be undone!", "Yes, delete it!")
    }
}

/// Shows outcomes to the user and asks for confirmations
pub trait Notifier: Send + Sync {
    /// Reports a completed action
    fn success(&self, message: &str) -> impl Future<Output = ()> + Send;

    /// Reports a failed action
    fn failure(&self, message: &str) -> impl Future<Output = ()> + Send;

    /// Asks the user to confirm; `true` means go ahead
    fn confirm(&self, prompt: &ConfirmationPrompt) -> impl Future<Output = bool> + Send;
}
