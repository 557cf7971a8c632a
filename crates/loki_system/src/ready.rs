//! Ready-queue scheduler.
//!
//! Tasks enqueued before the host is ready are buffered; the first readiness
//! signal from the bound mechanism drains them in FIFO order, exactly once.
//! After that, [`ReadyQueue::enqueue`] runs tasks on the spot.
//!
//! Each task runs isolated: an `Err` or a panic is logged at error severity
//! and the next task still runs.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use loki_host::{HostEnvironment, ReadinessMechanism};
use tracing::{debug, info};

use crate::log::Logger;

/// A unit of deferred work.
pub type DeferredTask = Box<dyn FnOnce() -> anyhow::Result<()>>;

#[derive(Default)]
struct SchedulerState {
    fired: bool,
    draining: bool,
    pending: VecDeque<DeferredTask>,
    mechanism: Option<ReadinessMechanism>,
}

/// Handle to the process-wide ready-queue.
///
/// Clones share state, so a task may capture a clone and enqueue more work.
/// Work enqueued while the queue is draining joins the same drain.
#[derive(Clone)]
pub struct ReadyQueue {
    state: Rc<RefCell<SchedulerState>>,
    logger: Logger,
}

impl fmt::Debug for ReadyQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ReadyQueue")
            .field("fired", &state.fired)
            .field("pending", &state.pending.len())
            .field("mechanism", &state.mechanism)
            .finish()
    }
}

impl ReadyQueue {
    /// Create an unbound, unfired queue.
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self {
            state: Rc::new(RefCell::new(SchedulerState::default())),
            logger,
        }
    }

    /// Defer `task` until the host is ready, or run it now if it already is.
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        self.push(Box::new(task));
    }

    /// Like [`ReadyQueue::enqueue`], but `None` is accepted and ignored.
    pub fn enqueue_maybe(&self, task: Option<DeferredTask>) {
        match task {
            Some(task) => self.push(task),
            None => debug!("ignoring empty deferred task"),
        }
    }

    fn push(&self, task: DeferredTask) {
        let task = {
            let mut state = self.state.borrow_mut();
            if !state.fired {
                state.pending.push_back(task);
                return;
            }
            task
        };
        self.run_isolated(task);
    }

    /// Choose the readiness mechanism for this run.
    ///
    /// The first call picks the most preferred mechanism `env` supports and
    /// returns it; later calls return that same choice. With no event
    /// mechanism available the queue drains right away.
    pub fn bind<E: HostEnvironment + ?Sized>(&self, env: &E) -> ReadinessMechanism {
        let mechanism = {
            let mut state = self.state.borrow_mut();
            if let Some(bound) = state.mechanism {
                return bound;
            }
            let mechanism = ReadinessMechanism::select(env);
            state.mechanism = Some(mechanism);
            mechanism
        };
        info!(%mechanism, "ready-queue bound");
        if mechanism == ReadinessMechanism::Immediate {
            self.drain();
        }
        mechanism
    }

    /// Deliver a readiness signal from the host.
    ///
    /// Only the bound mechanism drains the queue, and only the first time.
    /// Returns `true` if this call drained it.
    pub fn signal(&self, mechanism: ReadinessMechanism) -> bool {
        {
            let state = self.state.borrow();
            if state.mechanism != Some(mechanism) {
                debug!(%mechanism, bound = ?state.mechanism, "ignoring unbound readiness signal");
                return false;
            }
            if state.fired || state.draining {
                debug!(%mechanism, "ready-queue already fired");
                return false;
            }
        }
        self.drain();
        true
    }

    fn drain(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.fired || state.draining {
                return;
            }
            state.draining = true;
        }

        let mut ran = 0usize;
        loop {
            let next = self.state.borrow_mut().pending.pop_front();
            let Some(task) = next else { break };
            self.run_isolated(task);
            ran += 1;
        }

        let mut state = self.state.borrow_mut();
        state.draining = false;
        state.fired = true;
        info!(tasks = ran, "ready-queue drained");
    }

    fn run_isolated(&self, task: DeferredTask) {
        match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.logger.error(format!("deferred task failed: {err:#}")),
            Err(payload) => self.logger.error(format!(
                "deferred task panicked: {}",
                panic_message(payload.as_ref())
            )),
        }
    }

    /// Returns `true` once the queue has drained.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.state.borrow().fired
    }

    /// Number of tasks waiting for readiness.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// The mechanism chosen by [`ReadyQueue::bind`], if bound.
    #[must_use]
    pub fn mechanism(&self) -> Option<ReadinessMechanism> {
        self.state.borrow().mechanism
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
