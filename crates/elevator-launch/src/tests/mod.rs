//! Crate-level test doubles and BDD tests.

use std::collections::VecDeque;
use std::io;
use std::path::Path;

use mockall::mock;

use crate::dispatch::{Offload, OffloadError, OffloadJob};
use crate::invoke::{BrokerInvoker, DirectInvoker};
use crate::outcome::LaunchOutcome;
use crate::presenter::Presenter;
use crate::target::LaunchTarget;


mock! {
    pub Broker {}
    impl BrokerInvoker for Broker {
        fn invoke(&self, target: &Path) -> LaunchOutcome;
    }
}

mock! {
    pub Direct {}
    impl DirectInvoker for Direct {
        fn invoke(&self, target: &LaunchTarget) -> LaunchOutcome;
    }
}

/// Something the presenter was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Status { message: String, is_error: bool },
    Alert { title: String, message: String },
    Question(String),
}

/// Presenter recording every call in order.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub shown: Vec<Shown>,
    pub answers: VecDeque<bool>,
}

impl RecordingPresenter {
    pub fn alerts(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter_map(|shown| match shown {
                Shown::Alert { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<(&str, bool)> {
        self.shown.iter().rev().find_map(|shown| match shown {
            Shown::Status { message, is_error } => Some((message.as_str(), *is_error)),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    fn show_status(&mut self, message: &str, is_error: bool) {
        self.shown.push(Shown::Status {
            message: message.to_owned(),
            is_error,
        });
    }

    fn alert(&mut self, title: &str, message: &str) {
        self.shown.push(Shown::Alert {
            title: title.to_owned(),
            message: message.to_owned(),
        });
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.shown.push(Shown::Question(question.to_owned()));
        self.answers.pop_front().unwrap_or(false)
    }
}

/// Runs offloaded jobs on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineOffload;

impl Offload for InlineOffload {
    fn run(&self, job: OffloadJob) -> Result<(), OffloadError> {
        job();
        Ok(())
    }
}

/// Refuses every job.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingOffload;

impl Offload for FailingOffload {
    fn run(&self, _job: OffloadJob) -> Result<(), OffloadError> {
        Err(OffloadError::Spawn(io::Error::other("thread limit reached")))
    }
}
