// ABOUTME: Background poll loop for a submitted research task and the handle that controls it
// ABOUTME: Publishes tracker state over a watch channel and never applies a result after cancel or dispose

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::controller::{CancelAck, TaskLifecycleController};
use crate::credentials::Credential;
use crate::error::ResearchResult;
use crate::types::ResearchTask;

/// Client-side view of a tracked task
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerState {
    /// Submitted, no snapshot observed yet
    Pending,
    /// Latest non-terminal snapshot
    Active(ResearchTask),
    /// Provider reported completed, failed, or cancelled
    Finished(ResearchTask),
    /// Cancelled locally; whatever the provider reports later is ignored
    Cancelled { task_id: String },
    /// The provider requires sign-in; polling stopped
    AuthRequired,
}

impl TrackerState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished(_) | Self::Cancelled { .. } | Self::AuthRequired
        )
    }

    pub fn task(&self) -> Option<&ResearchTask> {
        match self {
            Self::Active(task) | Self::Finished(task) => Some(task),
            _ => None,
        }
    }
}

struct Shared {
    state: watch::Sender<TrackerState>,
    cancelled: AtomicBool,
    stopped: AtomicBool,
    stop_notify: Notify,
}

impl Shared {
    fn halted(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.stopped.load(Ordering::SeqCst)
    }

    /// Apply a poll result. The halt check runs under the channel's write
    /// lock, so a result can never land after cancel or dispose.
    fn publish(&self, next: TrackerState) -> bool {
        self.state.send_if_modified(|current| {
            if self.halted() || current.is_terminal() {
                return false;
            }
            *current = next;
            true
        })
    }

    fn publish_cancelled(&self, task_id: &str) -> bool {
        self.state.send_if_modified(|current| {
            if current.is_terminal() {
                return false;
            }
            *current = TrackerState::Cancelled {
                task_id: task_id.to_string(),
            };
            true
        })
    }
}

/// Handle to a task's poll loop. Dropping it stops the loop.
pub struct TaskHandle {
    task_id: String,
    controller: TaskLifecycleController,
    credential: Credential,
    shared: Arc<Shared>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl TaskHandle {
    pub(crate) fn spawn(
        controller: TaskLifecycleController,
        task_id: String,
        credential: Credential,
    ) -> Self {
        let (state, _) = watch::channel(TrackerState::Pending);
        let shared = Arc::new(Shared {
            state,
            cancelled: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            stop_notify: Notify::new(),
        });

        let poll_task = tokio::spawn(run_poll_loop(
            controller.clone(),
            task_id.clone(),
            credential.clone(),
            shared.clone(),
        ));

        Self {
            task_id,
            controller,
            credential,
            shared,
            poll_task: Mutex::new(Some(poll_task)),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn state(&self) -> TrackerState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.shared.state.subscribe()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    /// Wait until the tracker reaches a terminal state. Returns `None` if the
    /// handle is disposed first.
    pub async fn wait_for_terminal(&self) -> Option<TrackerState> {
        let mut rx = self.subscribe();
        loop {
            let stopped = self.shared.stop_notify.notified();
            tokio::pin!(stopped);
            stopped.as_mut().enable();

            {
                let current = rx.borrow_and_update();
                if current.is_terminal() {
                    return Some(current.clone());
                }
            }
            if self.is_stopped() {
                return None;
            }

            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                }
                _ = &mut stopped => {}
            }
        }
    }

    /// Stop tracking locally, then ask the provider to cancel. The local
    /// state is `Cancelled` whatever the provider answers.
    pub async fn cancel(&self) -> ResearchResult<CancelAck> {
        self.shared.cancelled.store(true, Ordering::SeqCst);
        if self.shared.publish_cancelled(&self.task_id) {
            info!("Task {} cancelled locally", self.task_id);
        }
        self.dispose();

        self.controller.cancel(&self.task_id, &self.credential).await
    }

    /// Stop the poll loop. No poll is dispatched or applied after this returns.
    pub fn dispose(&self) {
        if self.shared.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        let poll_task = match self.poll_task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(poll_task) = poll_task {
            poll_task.abort();
        }

        self.shared.stop_notify.notify_waiters();
        debug!("Stopped polling task {}", self.task_id);
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("task_id", &self.task_id)
            .field("state", &self.state())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

async fn run_poll_loop(
    controller: TaskLifecycleController,
    task_id: String,
    credential: Credential,
    shared: Arc<Shared>,
) {
    let period = controller.poll_interval().max(Duration::from_millis(1));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!("Polling task {} every {:?}", task_id, period);

    loop {
        // First tick completes immediately
        ticker.tick().await;

        if shared.halted() {
            debug!("Poll loop for {} halted", task_id);
            return;
        }

        match controller.poll(&task_id, &credential).await {
            Ok(task) => {
                let status = task.status;
                let terminal = status.is_terminal();
                let next = if terminal {
                    TrackerState::Finished(task)
                } else {
                    TrackerState::Active(task)
                };

                if !shared.publish(next) {
                    debug!("Discarded late poll result for {}", task_id);
                    return;
                }
                if terminal {
                    info!("Task {} finished with status {}", task_id, status);
                    return;
                }
            }
            Err(e) if e.is_auth_required() => {
                warn!("Polling task {} needs sign-in: {}", task_id, e);
                shared.publish(TrackerState::AuthRequired);
                return;
            }
            Err(e) => {
                warn!("Polling error for task {} (will retry): {}", task_id, e);
            }
        }
    }
}
