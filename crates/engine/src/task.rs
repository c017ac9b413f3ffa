//! Closure-as-message payloads executed on the engine thread.

/// A unit of work shipped to the engine thread.
///
/// The payload is a boxed closure so call sites stay generic while the engine
/// thread executes the work. A job runs exactly once and is never retried;
/// any result marshaling back to the submitter is the closure's own business.
pub(crate) struct Job(Box<dyn FnOnce() + Send>);

impl Job {
	pub(crate) fn new(task: impl FnOnce() + Send + 'static) -> Self {
		Self(Box::new(task))
	}

	pub(crate) fn run(self) {
		(self.0)();
	}
}
