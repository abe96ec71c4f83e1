//! Per-target launch dispatch and the broker fallback cascade.
//!
//! The [`LaunchDispatcher`] is what the interactive application calls to
//! start a shortcut. Targets named like the broker sentinel are handed to the
//! [`BrokerInvoker`] on a worker thread; everything else goes straight to the
//! [`DirectInvoker`] on the calling thread.
//!
//! Worker threads never touch the [`Presenter`]. They send a
//! [`LaunchCompletion`] back over a channel, and the owner thread applies it
//! with [`LaunchDispatcher::complete`] (usually through
//! [`LaunchDispatcher::drain`]). The fallback cascade therefore always runs on
//! the owner thread, including any direct start it triggers.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::invoke::{BrokerInvoker, DirectInvoker};
use crate::outcome::LaunchOutcome;
use crate::presenter::{Presenter, report_failure};
use crate::target::LaunchTarget;

/// Tracing target for dispatch events.
const DISPATCH_TARGET: &str = "elevator_launch::dispatch";

/// Name given to broker worker threads.
pub const BROKER_WORKER_NAME: &str = "elevator-broker";

/// Work handed to an [`Offload`].
pub type OffloadJob = Box<dyn FnOnce() + Send + 'static>;

/// Errors raised when background work cannot be started.
#[derive(Debug, Error)]
pub enum OffloadError {
    /// The worker thread could not be spawned.
    #[error("failed to start broker worker: {0}")]
    Spawn(#[source] io::Error),
}

/// Runs a job away from the owner thread.
pub trait Offload {
    /// Starts `job` and returns without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`OffloadError`] when the job could not be started; the job
    /// is dropped unrun in that case.
    fn run(&self, job: OffloadJob) -> Result<(), OffloadError>;
}

/// [`Offload`] spawning one named thread per job.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadOffload;

impl Offload for ThreadOffload {
    fn run(&self, job: OffloadJob) -> Result<(), OffloadError> {
        thread::Builder::new()
            .name(BROKER_WORKER_NAME.to_owned())
            .spawn(job)
            .map(drop)
            .map_err(OffloadError::Spawn)
    }
}

/// Result of a broker invocation, delivered to the owner thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCompletion {
    /// Target the broker was asked to start.
    pub target: LaunchTarget,
    /// Classified broker result.
    pub outcome: LaunchOutcome,
}

/// Routes launch requests and applies the fallback cascade.
pub struct LaunchDispatcher<D, O = ThreadOffload> {
    broker: Arc<dyn BrokerInvoker>,
    direct: D,
    offload: O,
    completions: Sender<LaunchCompletion>,
}

impl<D, O> LaunchDispatcher<D, O> {
    /// Creates a dispatcher that reports broker results on `completions`.
    #[must_use]
    pub const fn new(
        broker: Arc<dyn BrokerInvoker>,
        direct: D,
        offload: O,
        completions: Sender<LaunchCompletion>,
    ) -> Self {
        Self {
            broker,
            direct,
            offload,
            completions,
        }
    }
}

impl<D, O> LaunchDispatcher<D, O>
where
    D: DirectInvoker,
    O: Offload,
{
    /// Starts `target`. Results are reported through `presenter`, never
    /// returned.
    ///
    /// Broker-routed targets complete later: their result arrives on the
    /// completion channel and takes effect when the owner thread passes it
    /// to [`Self::complete`].
    pub fn launch<P: Presenter + ?Sized>(&self, target: LaunchTarget, presenter: &mut P) {
        if !target.requires_broker() {
            debug!(target: DISPATCH_TARGET, launch = %target, "launching directly");
            let outcome = self.direct.invoke(&target);
            finish(&target, &outcome, presenter);
            return;
        }

        info!(target: DISPATCH_TARGET, launch = %target, "routing launch through broker");
        presenter.show_status(
            &format!("Requesting elevation for {} via EPM client...", target.path().display()),
            false,
        );

        let broker = Arc::clone(&self.broker);
        let completions = self.completions.clone();
        let job: OffloadJob = Box::new(move || {
            let outcome = broker.invoke(target.path());
            let completion = LaunchCompletion { target, outcome };
            if completions.send(completion).is_err() {
                debug!(target: DISPATCH_TARGET, "launch completion dropped: owner has gone");
            }
        });
        if let Err(error) = self.offload.run(job) {
            warn!(target: DISPATCH_TARGET, error = %error, "broker worker failed to start");
            report_failure(presenter, &error.to_string());
        }
    }

    /// Applies a broker result on the owner thread.
    pub fn complete<P: Presenter + ?Sized>(&self, completion: LaunchCompletion, presenter: &mut P) {
        let LaunchCompletion { target, outcome } = completion;
        debug!(
            target: DISPATCH_TARGET,
            launch = %target,
            outcome = %outcome,
            "broker completed"
        );
        match outcome {
            LaunchOutcome::BrokerUnavailable if target.request_elevation() => {
                presenter.show_status(
                    "EPM client not installed; requesting elevation directly",
                    false,
                );
                self.fall_back(&target.with_elevation(true), presenter);
            }
            LaunchOutcome::BrokerPermissionDenied => {
                presenter.show_status(
                    "EPM client refused the request (0x8000FFFF); launching directly",
                    false,
                );
                self.fall_back(&target, presenter);
            }
            other => finish(&target, &other, presenter),
        }
    }

    /// Applies every completion already waiting on `receiver` and returns
    /// how many were applied. Never blocks.
    pub fn drain<P: Presenter + ?Sized>(
        &self,
        receiver: &Receiver<LaunchCompletion>,
        presenter: &mut P,
    ) -> usize {
        let mut applied = 0;
        for completion in receiver.try_iter() {
            self.complete(completion, presenter);
            applied += 1;
        }
        applied
    }

    fn fall_back<P: Presenter + ?Sized>(&self, target: &LaunchTarget, presenter: &mut P) {
        info!(target: DISPATCH_TARGET, launch = %target, "falling back to direct launch");
        let outcome = self.direct.invoke(target);
        finish(target, &outcome, presenter);
    }
}

/// Reports a terminal outcome. No further fallback happens after this.
fn finish<P: Presenter + ?Sized>(target: &LaunchTarget, outcome: &LaunchOutcome, presenter: &mut P) {
    if outcome.is_success() {
        presenter.show_status(&format!("Started: {target}"), false);
        return;
    }
    warn!(target: DISPATCH_TARGET, launch = %target, outcome = %outcome, "launch failed");
    report_failure(presenter, &format!("{}: {outcome}", target.path().display()));
}

#[cfg(test)]
mod tests;
