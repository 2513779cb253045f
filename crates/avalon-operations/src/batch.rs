//! Fail-fast execution of one stage over many targets.
//!
//! Targets run on blocking worker threads, at most `concurrency` at a time. A single
//! poll loop on a fixed interval collects finished workers and forwards their progress
//! as events. The first failure cancels every target that has not started yet; running
//! ones are allowed to finish.

use std::{sync::Arc, time::Duration};

use avalon_config::config::Config;
use avalon_core::{
    error::AvalonError,
    progress::{self, ProgressHandle, Sample},
    registry::Target,
    task::run_stage,
    AvalonResult,
};
use avalon_events::{AvalonEvent, EventSinkHandle, Stage, TaskId, TaskStatus};
use tokio::{
    sync::{
        mpsc::{self, error::TryRecvError, UnboundedSender},
        Semaphore,
    },
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{AvalonContext, TaskOutcome, TaskResult};

/// How often the poll loop looks at running workers.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Outcomes of a finished batch, in the order targets were given.
#[derive(Debug)]
pub struct BatchReport {
    pub stage: Stage,
    pub results: Vec<TaskResult>,
    first_failure: Option<usize>,
}

impl BatchReport {
    /// The failure that was observed first, not necessarily the first in order.
    pub fn first_error(&self) -> Option<&AvalonError> {
        let result = self.results.get(self.first_failure?)?;
        match &result.outcome {
            TaskOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }

    pub fn canceled(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_canceled()).count()
    }

    /// Names of the targets that succeeded, or the first failure tagged with its target.
    pub fn into_result(mut self) -> AvalonResult<Vec<String>> {
        if let Some(result) = self
            .first_failure
            .and_then(|index| self.results.get_mut(index))
        {
            if let TaskOutcome::Failed(err) =
                std::mem::replace(&mut result.outcome, TaskOutcome::Canceled)
            {
                return Err(err.in_task(&result.target, self.stage));
            }
        }

        Ok(self
            .results
            .into_iter()
            .filter(|r| r.outcome.is_success())
            .map(|r| r.target)
            .collect())
    }
}

/// One target waiting for a worker.
struct Job {
    task_id: TaskId,
    target: Target,
    stage: Stage,
    config: Arc<Config>,
    progress: ProgressHandle,
    cancel: CancellationToken,
    events: EventSinkHandle,
}

impl Job {
    fn index(&self) -> usize {
        self.task_id as usize
    }

    /// Runs on the worker thread.
    fn run(self) -> TaskOutcome {
        if self.cancel.is_cancelled() {
            trace!(name = %self.target.name, "canceled before start");
            return TaskOutcome::Canceled;
        }

        self.events.emit(AvalonEvent::TaskStarted {
            task_id: self.task_id,
            target: self.target.name.clone(),
        });
        debug!(name = %self.target.name, stage = %self.stage, "task started");

        match run_stage(
            &self.target,
            self.stage,
            &self.config,
            self.task_id,
            &self.progress,
        ) {
            Ok(()) => TaskOutcome::Success,
            Err(err) => {
                self.cancel.cancel();
                TaskOutcome::Failed(err)
            }
        }
    }
}

type Dispatched = (usize, JoinHandle<TaskOutcome>);

/// Hands jobs to blocking workers as permits free up. Stops at the first cancellation.
async fn dispatch(
    jobs: Vec<Job>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    tx: UnboundedSender<Dispatched>,
) {
    for job in jobs {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };
        if cancel.is_cancelled() {
            break;
        }

        let index = job.index();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job.run()
        });
        if tx.send((index, handle)).is_err() {
            break;
        }
    }
}

/// Runs `stage` for every target with at most `concurrency` running at once.
///
/// Never returns early: every dispatched worker is awaited. Use
/// [`BatchReport::into_result`] to turn a failed batch into an error.
pub async fn run_batch(
    ctx: &AvalonContext,
    targets: Vec<Target>,
    stage: Stage,
    concurrency: usize,
) -> BatchReport {
    let total = targets.len();
    let events = ctx.event_handle();
    debug!(stage = %stage, count = total, concurrency, "starting batch");
    events.emit(AvalonEvent::BatchStarted {
        stage,
        total: total as u32,
    });

    let names: Vec<String> = targets.iter().map(|t| t.name.clone()).collect();
    if total == 0 {
        return BatchReport {
            stage,
            results: Vec::new(),
            first_failure: None,
        };
    }

    let config = Arc::new(ctx.config().clone());
    let cancel = CancellationToken::new();
    let mut readers = Vec::with_capacity(total);
    let mut jobs = Vec::with_capacity(total);
    for (index, target) in targets.into_iter().enumerate() {
        let (handle, reader) = progress::channel();
        readers.push(reader);
        jobs.push(Job {
            task_id: index as TaskId,
            target,
            stage,
            config: config.clone(),
            progress: handle,
            cancel: cancel.clone(),
            events: events.clone(),
        });
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    tokio::spawn(dispatch(jobs, semaphore, cancel.clone(), tx));

    let mut outcomes: Vec<Option<TaskOutcome>> = (0..total).map(|_| None).collect();
    let mut samples = vec![Sample::default(); total];
    let mut running: Vec<Dispatched> = Vec::new();
    let mut dispatching = true;
    let mut first_failure = None;
    let mut completed = 0u32;
    let mut failed = 0u32;
    let mut reported = (u32::MAX, u32::MAX);

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        while dispatching {
            match rx.try_recv() {
                Ok(entry) => running.push(entry),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => dispatching = false,
            }
        }

        let mut i = 0;
        while i < running.len() {
            if !running[i].1.is_finished() {
                i += 1;
                continue;
            }

            let (index, handle) = running.swap_remove(i);
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => TaskOutcome::Failed(AvalonError::WorkerPanic(err.to_string())),
            };

            let status = match &outcome {
                TaskOutcome::Success => TaskStatus::Success,
                TaskOutcome::Failed(err) => {
                    debug!(name = %names[index], error = %err, "task failed");
                    failed += 1;
                    cancel.cancel();
                    first_failure.get_or_insert(index);
                    TaskStatus::Failed(err.to_string())
                }
                TaskOutcome::Canceled => TaskStatus::Canceled,
            };
            completed += 1;
            events.emit(AvalonEvent::TaskFinished {
                task_id: index as TaskId,
                target: names[index].clone(),
                status,
            });
            outcomes[index] = Some(outcome);
        }

        for (index, _) in &running {
            let sample = readers[*index].latest();
            if sample != samples[*index] {
                samples[*index] = sample;
                events.emit(AvalonEvent::TaskProgress {
                    task_id: *index as TaskId,
                    target: names[*index].clone(),
                    completed: sample.completed,
                    total: sample.total,
                });
            }
        }

        if reported != (completed, failed) {
            reported = (completed, failed);
            events.emit(AvalonEvent::BatchProgress {
                completed,
                total: total as u32,
                failed,
            });
        }

        if !dispatching && running.is_empty() {
            break;
        }
    }

    let results: Vec<TaskResult> = names
        .into_iter()
        .zip(outcomes)
        .enumerate()
        .map(|(index, (target, outcome))| {
            let outcome = outcome.unwrap_or_else(|| {
                events.emit(AvalonEvent::TaskFinished {
                    task_id: index as TaskId,
                    target: target.clone(),
                    status: TaskStatus::Canceled,
                });
                TaskOutcome::Canceled
            });
            TaskResult {
                target,
                outcome,
            }
        })
        .collect();

    if completed as usize != total {
        events.emit(AvalonEvent::BatchProgress {
            completed: total as u32,
            total: total as u32,
            failed,
        });
    }

    let report = BatchReport {
        stage,
        results,
        first_failure,
    };
    debug!(
        stage = %stage,
        failed = report.failed(),
        canceled = report.canceled(),
        "batch finished"
    );
    report
}
