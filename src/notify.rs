use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use crate::addr::WeakAddr;
use crate::Watcher;

/// The set of watchers currently subscribed to one modifier.
///
/// Entries are weak and keyed by pointer identity: a watcher that
/// went away is skipped at notify time, and removing one that was
/// never added does nothing. Modifier implementations hold one of
/// these and call [`Watchers::notify`] from every setter that
/// actually changed state.
pub struct Watchers {
	set: BTreeSet<WeakAddr<dyn Watcher>>,
}

impl Default for Watchers {
	fn default() -> Self {
		Watchers::new()
	}
}

impl Watchers {
	pub fn new() -> Self {
		Watchers {
			set: BTreeSet::new(),
		}
	}

	pub fn add(&mut self, watcher: Weak<dyn Watcher>) {
		self.set.insert(WeakAddr::new(watcher));
	}

	pub fn remove(&mut self, watcher: &Weak<dyn Watcher>) {
		self.set.remove(&WeakAddr::new(watcher.clone()));
	}

	pub fn notify(&self) {
		for watcher in &self.set {
			if let Some(watcher) = watcher.upgrade() {
				watcher.mark_dirty();
			}
		}
	}
}

/// Shared switch a host holds to keep modifiers quiet while it is
/// not running.
///
/// Gated-off changes still land in the modifier's state; the host
/// re-broadcasts once it flips the gate back on. The default gate is
/// always open.
#[derive(Clone)]
pub struct NotifyGate {
	enabled: Rc<Cell<bool>>,
}

impl Default for NotifyGate {
	fn default() -> Self {
		NotifyGate::new()
	}
}

impl NotifyGate {
	pub fn new() -> Self {
		NotifyGate {
			enabled: Rc::new(Cell::new(true)),
		}
	}

	pub fn enabled(&self) -> bool {
		self.enabled.get()
	}

	pub fn set_enabled(&self, enabled: bool) {
		self.enabled.set(enabled);
	}
}
