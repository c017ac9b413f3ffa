//! Dedicated engine thread and the call gateway guarding it.
//!
//! All engine state is owned by one worker thread. Every other thread goes
//! through a [`Gateway`] handle: [`Gateway::execute`] for blocking calls that
//! want a result back, [`Gateway::post`] for fire-and-forget dispatch. Jobs
//! are executed in the order they were enqueued. Callbacks the engine emits
//! are reposted through the same queue, so listener code always finds itself
//! on the engine thread and needs no locking of its own to touch engine-owned
//! state; it still has to hop to a UI thread before touching widgets.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};

use tracing::{trace, warn};

use crate::task::Job;

enum Command {
	Run(Job),
	Shutdown,
}

struct Shared {
	tx: Sender<Command>,
	engine_thread: ThreadId,
	alive: AtomicBool,
	handle: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable handle to the engine thread.
///
/// Dropping the last handle does not stop the thread; tear it down explicitly
/// with [`Gateway::shutdown`]. After shutdown every [`Gateway::execute`]
/// returns `None` and [`Gateway::post`] drops the task.
#[derive(Clone)]
pub struct Gateway {
	shared: Arc<Shared>,
}

impl Gateway {
	/// Start the engine thread and return a handle to it.
	#[must_use]
	pub fn spawn() -> Self {
		let (tx, rx) = mpsc::channel();
		let handle = thread::spawn(move || worker_loop(rx));
		let engine_thread = handle.thread().id();
		Self {
			shared: Arc::new(Shared {
				tx,
				engine_thread,
				alive: AtomicBool::new(true),
				handle: Mutex::new(Some(handle)),
			}),
		}
	}

	/// Whether the calling thread is the engine thread.
	#[must_use]
	pub fn is_engine_thread(&self) -> bool {
		thread::current().id() == self.shared.engine_thread
	}

	/// Assert that the caller is on the engine thread.
	///
	/// This is the self-documenting guard for code that touches engine-owned
	/// objects directly. The failure is a programmer error, not a runtime
	/// condition, and panics accordingly.
	pub fn assert_engine_thread(&self) {
		assert!(
			self.is_engine_thread(),
			"engine state touched from a foreign thread; route the call through Gateway::execute"
		);
	}

	/// Run `task` on the engine thread and return its result.
	///
	/// When the caller already is the engine thread the task runs inline,
	/// with no queue hop and no possibility of deadlock. Any other caller
	/// blocks until the engine thread has finished the task.
	///
	/// Returns `None` when the task panicked or the engine thread is gone;
	/// panics never cross the thread boundary as unwinding. A missing result
	/// is the only failure signal callers get.
	pub fn execute<T, F>(&self, task: F) -> Option<T>
	where
		T: Send + 'static,
		F: FnOnce() -> T + Send + 'static,
	{
		if self.is_engine_thread() {
			return match catch_unwind(AssertUnwindSafe(task)) {
				Ok(value) => Some(value),
				Err(_) => {
					warn!("inline engine task panicked; reporting no result");
					None
				}
			};
		}

		if !self.shared.alive.load(AtomicOrdering::Acquire) {
			return None;
		}

		let (result_tx, result_rx) = mpsc::channel();
		let job = Job::new(move || match catch_unwind(AssertUnwindSafe(task)) {
			Ok(value) => {
				let _ = result_tx.send(value);
			}
			Err(_) => {
				warn!("engine task panicked; reporting no result");
			}
		});

		if self.shared.tx.send(Command::Run(job)).is_err() {
			return None;
		}

		// A dropped sender (panicked task or engine teardown while the job
		// was still queued) surfaces as a receive error, never as a hang.
		result_rx.recv().ok()
	}

	/// Enqueue `task` on the engine thread without waiting for it.
	///
	/// This is the channel engine backends use to deliver their callbacks on
	/// the engine thread, and front-ends use to dispatch UI-originated work
	/// without blocking the UI thread. Posting from the engine thread itself
	/// enqueues as well: the task runs after the current one completes.
	///
	/// Returns whether the task was accepted; after shutdown it is dropped.
	pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
		if !self.shared.alive.load(AtomicOrdering::Acquire) {
			trace!("dropping task posted after gateway shutdown");
			return false;
		}
		self.shared.tx.send(Command::Run(Job::new(task))).is_ok()
	}

	/// Stop the engine thread.
	///
	/// Jobs already queued still run; then the thread exits and is joined.
	/// Safe to call more than once and from any thread, including the engine
	/// thread itself (the join is skipped there).
	pub fn shutdown(&self) {
		if self.shared.alive.swap(false, AtomicOrdering::AcqRel) {
			let _ = self.shared.tx.send(Command::Shutdown);
		}
		if self.is_engine_thread() {
			return;
		}
		let handle = self
			.shared
			.handle
			.lock()
			.ok()
			.and_then(|mut slot| slot.take());
		if let Some(handle) = handle {
			let _ = handle.join();
		}
	}
}

fn worker_loop(rx: Receiver<Command>) {
	trace!("engine thread started");
	while let Ok(command) = rx.recv() {
		match command {
			Command::Run(job) => job.run(),
			Command::Shutdown => break,
		}
	}
	trace!("engine thread stopped");
}
