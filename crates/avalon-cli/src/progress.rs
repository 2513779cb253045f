use std::{
    collections::HashMap,
    sync::{mpsc::Receiver, Arc, LazyLock},
    time::Duration,
};

use avalon_events::{AvalonEvent, TaskId, TaskStatus, UpdateCheckStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nu_ansi_term::Color::{Cyan, Red};
use tracing::debug;

use crate::utils::{progress_enabled, version_or_none, Colored};

/// Shared MultiProgress instance for suspend/stop from other modules.
static MULTI: LazyLock<Arc<MultiProgress>> = LazyLock::new(|| Arc::new(MultiProgress::new()));

/// Pause progress display, run the closure, then resume.
pub fn suspend<F: FnOnce()>(f: F) {
    MULTI.suspend(f);
}

/// Stop and clear all progress bars.
pub fn stop() {
    MULTI.clear().ok();
}

/// Owns the background thread drawing progress.
///
/// The context holding the channel sender must be dropped before [`finish`](Self::finish),
/// otherwise the thread keeps waiting for events.
pub struct ProgressGuard {
    handle: Option<std::thread::JoinHandle<()>>,
}

impl ProgressGuard {
    /// Waits for the handler thread to drain the remaining events.
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

fn total_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:>20.bold}  {wide_bar:.green/dim}  {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━─")
}

fn task_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:>20}  {wide_bar:.cyan/dim}  {percent:>3}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━─")
}

fn describe_update_check(target: &str, status: &UpdateCheckStatus) -> String {
    match status {
        UpdateCheckStatus::Available {
            installed,
            remote,
        } => {
            format!(
                "{target}: update available {} -> {remote}",
                version_or_none(installed.as_deref())
            )
        }
        UpdateCheckStatus::UpToDate {
            version,
        } => format!("{target}: {version} is up to date"),
    }
}

fn new_bar(length: u64) -> ProgressBar {
    if progress_enabled() {
        ProgressBar::new(length)
    } else {
        ProgressBar::hidden()
    }
}

/// Spawns a thread that maps [`AvalonEvent`]s to progress bars.
///
/// A batch gets one aggregate "Total" bar. Each task gets a row of its own only while
/// its last sample is unfinished; the row is dropped once it completes.
pub fn spawn_event_handler(receiver: Receiver<AvalonEvent>) -> ProgressGuard {
    let handle = std::thread::spawn(move || {
        let mut total: Option<ProgressBar> = None;
        let mut tasks: HashMap<TaskId, ProgressBar> = HashMap::new();

        while let Ok(event) = receiver.recv() {
            match event {
                AvalonEvent::BatchStarted {
                    stage,
                    total: count,
                } => {
                    if let Some(old) = total.take() {
                        old.finish_and_clear();
                    }
                    if count == 0 {
                        continue;
                    }
                    let pb = MULTI.add(new_bar(count as u64));
                    pb.set_style(total_style());
                    pb.set_prefix("Total");
                    pb.set_message(stage.to_string());
                    pb.enable_steady_tick(Duration::from_millis(100));
                    total = Some(pb);
                }
                AvalonEvent::BatchProgress {
                    completed,
                    total: count,
                    failed,
                } => {
                    if let Some(pb) = &total {
                        pb.set_position(completed as u64);
                        if failed > 0 {
                            pb.set_message(format!("({failed} failed)"));
                        }
                        if completed >= count {
                            pb.finish_and_clear();
                            total = None;
                        }
                    }
                }
                AvalonEvent::TaskStarted {
                    task_id,
                    target,
                } => {
                    debug!(task_id, name = %target, "task started");
                }
                AvalonEvent::TaskProgress {
                    task_id,
                    target,
                    completed,
                    total: length,
                } => {
                    if completed >= length {
                        if let Some(pb) = tasks.remove(&task_id) {
                            pb.finish_and_clear();
                        }
                        continue;
                    }
                    let pb = tasks.entry(task_id).or_insert_with(|| {
                        let bar = new_bar(length);
                        let bar = match &total {
                            Some(total) => MULTI.insert_before(total, bar),
                            None => MULTI.add(bar),
                        };
                        bar.set_style(task_style());
                        bar.set_prefix(Colored(Cyan, &target).to_string());
                        bar
                    });
                    pb.set_length(length);
                    pb.set_position(completed);
                }
                AvalonEvent::TaskFinished {
                    task_id,
                    target,
                    status,
                } => {
                    if let Some(pb) = tasks.remove(&task_id) {
                        pb.finish_and_clear();
                    }
                    if let TaskStatus::Failed(err) = status {
                        MULTI.suspend(|| {
                            eprintln!(" {} {}: {}", Colored(Red, "✗"), Colored(Cyan, &target), err);
                        });
                    }
                }
                AvalonEvent::UpdateCheck {
                    target,
                    status,
                } => {
                    debug!("{}", describe_update_check(&target, &status));
                }
            }
        }

        for (_, pb) in tasks.drain() {
            pb.finish_and_clear();
        }
        if let Some(pb) = total {
            pb.finish_and_clear();
        }
    });

    ProgressGuard {
        handle: Some(handle),
    }
}
