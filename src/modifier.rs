use std::rc::Weak;

use snowflake::ProcessUniqueId;

use crate::query::Query;
use crate::Watcher;

/// Process-unique identity assigned to a modifier at construction.
///
/// Two modifier instances are the same modifier iff their ids match,
/// regardless of any other state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ModifierId(ProcessUniqueId);

impl ModifierId {
	pub fn new() -> Self {
		ModifierId(ProcessUniqueId::new())
	}
}

impl Default for ModifierId {
	fn default() -> Self {
		ModifierId::new()
	}
}

/// Something that can modify `T` stats.
///
/// A modifier is free-standing: it may be attached to any number of
/// stats at once, and its identity and transform are independent of
/// any particular owner. Every piece of state whose change would
/// change [`StatModifier::apply`]'s output — including the order key —
/// must be reported through the watcher channel when it changes.
pub trait StatModifier<T>: 'static
where
	T: Copy + 'static,
{
	/// Identity used for equality and de-duplication.
	fn id(&self) -> ModifierId;

	/// Modifiers with a lower order are applied first.
	fn order(&self) -> i32;

	/// Handles the modification of the queried value. Must be
	/// deterministic given the modifier's own state, must not fail,
	/// and must leave the query untouched while the modifier is
	/// inactive.
	fn apply(&self, query: &mut Query<T>);

	/// Notify this modifier that `watcher` started to listen.
	fn watched_by(&self, watcher: Weak<dyn Watcher>);

	/// Notify this modifier that `watcher` stopped to listen.
	/// Unsubscribing a watcher that never subscribed is a no-op.
	fn not_watched_by(&self, watcher: &Weak<dyn Watcher>);
}

impl<T> PartialEq for dyn StatModifier<T>
where
	T: Copy + 'static,
{
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T> Eq for dyn StatModifier<T> where T: Copy + 'static {}

/// Template trait for modifiers of `i32` or `f32` values.
pub trait NumericModifier: StatModifier<i32> + StatModifier<f32> {}

impl<M> NumericModifier for M where M: StatModifier<i32> + StatModifier<f32> {}
