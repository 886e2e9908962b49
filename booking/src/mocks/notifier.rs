//! Notifier that records what it was asked to show.

use crate::providers::{ConfirmationPrompt, Notifier};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// One thing shown to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// Success toast
    Success(String),
    /// Failure toast
    Failure(String),
    /// Confirmation dialog
    Prompt(ConfirmationPrompt),
}

#[derive(Debug)]
struct Recording {
    log: Vec<Notification>,
    answers: VecDeque<bool>,
    default_answer: bool,
}

/// Records notifications and answers prompts from a script
///
/// Prompts take the next scripted answer, or the default answer once the
/// script runs out.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingNotifier {
    /// Notifier that accepts every prompt
    #[must_use]
    pub fn new() -> Self {
        Self::answering(true)
    }

    /// Notifier that declines every prompt
    #[must_use]
    pub fn declining() -> Self {
        Self::answering(false)
    }

    fn answering(default_answer: bool) -> Self {
        Self {
            recording: Arc::new(Mutex::new(Recording {
                log: Vec::new(),
                answers: VecDeque::new(),
                default_answer,
            })),
        }
    }

    /// Scripts the answer to the next unanswered prompt
    pub fn answer_next(&self, answer: bool) {
        if let Ok(mut recording) = self.recording.lock() {
            recording.answers.push_back(answer);
        }
    }

    /// Everything shown so far, in order
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.recording
            .lock()
            .map(|recording| recording.log.clone())
            .unwrap_or_default()
    }

    /// Success messages shown so far
    #[must_use]
    pub fn successes(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Success(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Failure messages shown so far
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Failure(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, notification: Notification) -> Option<bool> {
        let mut recording = self.recording.lock().ok()?;
        let answer = match notification {
            Notification::Prompt(_) => Some(
                recording
                    .answers
                    .pop_front()
                    .unwrap_or(recording.default_answer),
            ),
            _ => None,
        };
        recording.log.push(notification);
        answer
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) -> impl Future<Output = ()> + Send {
        self.record(Notification::Success(message.to_string()));
        async {}
    }

    fn failure(&self, message: &str) -> impl Future<Output = ()> + Send {
        self.record(Notification::Failure(message.to_string()));
        async {}
    }

    fn confirm(&self, prompt: &ConfirmationPrompt) -> impl Future<Output = bool> + Send {
        let answer = self.record(Notification::Prompt(prompt.clone())).unwrap_or(false);
        async move { answer }
    }
}
