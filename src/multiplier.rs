use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::modifier::{ModifierId, StatModifier};
use crate::notify::{NotifyGate, Watchers};
use crate::query::Query;
use crate::Watcher;

/// Scales the queried value by a constant factor.
///
/// The reference modifier: an amount, an `enabled` switch, an
/// application order, and a change broadcast from every setter that
/// actually changed something. It attaches to both integer and float
/// stats; the integer flavor multiplies through `f32` and truncates.
pub struct Multiplier {
	body: Rc<MultiplierBody>,
}

impl Clone for Multiplier {
	fn clone(&self) -> Self {
		Multiplier {
			body: self.body.clone(),
		}
	}
}

pub struct MultiplierBody {
	id: ModifierId,
	inner: RefCell<MultiplierInner>,
}

struct MultiplierInner {
	amount: f32,
	enabled: bool,
	order: i32,
	gate: NotifyGate,
	watchers: Watchers,
}

impl Multiplier {
	pub fn new(amount: f32) -> Self {
		Multiplier::with_order(amount, 0)
	}

	pub fn with_order(amount: f32, order: i32) -> Self {
		Multiplier {
			body: Rc::new(MultiplierBody {
				id: ModifierId::new(),
				inner: RefCell::new(MultiplierInner {
					amount,
					enabled: true,
					order,
					gate: NotifyGate::new(),
					watchers: Watchers::new(),
				}),
			}),
		}
	}

	pub fn id(&self) -> ModifierId {
		self.body.id
	}

	pub fn amount(&self) -> f32 {
		self.body.inner.borrow().amount
	}

	pub fn set_amount(&self, amount: f32) {
		let changed = {
			let mut inner = self.body.inner.borrow_mut();
			if inner.amount != amount {
				inner.amount = amount;
				true
			} else {
				false
			}
		};
		if changed {
			self.broadcast();
		}
	}

	pub fn enabled(&self) -> bool {
		self.body.inner.borrow().enabled
	}

	pub fn set_enabled(&self, enabled: bool) {
		let changed = {
			let mut inner = self.body.inner.borrow_mut();
			if inner.enabled != enabled {
				inner.enabled = enabled;
				true
			} else {
				false
			}
		};
		if changed {
			self.broadcast();
		}
	}

	pub fn toggle(&self) {
		let enabled = self.enabled();
		self.set_enabled(!enabled);
	}

	pub fn order(&self) -> i32 {
		self.body.inner.borrow().order
	}

	pub fn set_order(&self, order: i32) {
		let changed = {
			let mut inner = self.body.inner.borrow_mut();
			if inner.order != order {
				inner.order = order;
				true
			} else {
				false
			}
		};
		if changed {
			self.broadcast();
		}
	}

	/// Hands the host's gate to this modifier. The wiring itself is
	/// silent; only later changes go through the gate.
	pub fn set_gate(&self, gate: NotifyGate) {
		self.body.inner.borrow_mut().gate = gate;
	}

	/// Alerts any stats holding this modifier that the value must be
	/// recalculated. Setters broadcast on their own; this is public
	/// so a host can flush changes made while the gate was closed.
	pub fn broadcast(&self) {
		self.body.broadcast();
	}
}

impl MultiplierBody {
	fn broadcast(&self) {
		let inner = self.inner.borrow();
		if inner.gate.enabled() {
			inner.watchers.notify();
		}
	}
}

impl StatModifier<i32> for MultiplierBody {
	fn id(&self) -> ModifierId {
		self.id
	}

	fn order(&self) -> i32 {
		self.inner.borrow().order
	}

	fn apply(&self, query: &mut Query<i32>) {
		let inner = self.inner.borrow();
		if inner.enabled {
			query.current = (query.current as f32 * inner.amount) as i32;
		}
	}

	fn watched_by(&self, watcher: Weak<dyn Watcher>) {
		self.inner.borrow_mut().watchers.add(watcher);
	}

	fn not_watched_by(&self, watcher: &Weak<dyn Watcher>) {
		self.inner.borrow_mut().watchers.remove(watcher);
	}
}

impl StatModifier<f32> for MultiplierBody {
	fn id(&self) -> ModifierId {
		self.id
	}

	fn order(&self) -> i32 {
		self.inner.borrow().order
	}

	fn apply(&self, query: &mut Query<f32>) {
		let inner = self.inner.borrow();
		if inner.enabled {
			query.current *= inner.amount;
		}
	}

	fn watched_by(&self, watcher: Weak<dyn Watcher>) {
		self.inner.borrow_mut().watchers.add(watcher);
	}

	fn not_watched_by(&self, watcher: &Weak<dyn Watcher>) {
		self.inner.borrow_mut().watchers.remove(watcher);
	}
}

impl From<&Multiplier> for Rc<dyn StatModifier<i32>> {
	fn from(multiplier: &Multiplier) -> Self {
		multiplier.body.clone()
	}
}

impl From<&Multiplier> for Rc<dyn StatModifier<f32>> {
	fn from(multiplier: &Multiplier) -> Self {
		multiplier.body.clone()
	}
}
