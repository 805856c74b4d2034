pub mod macros;

mod addr;
mod chain;
mod modifier;
mod multiplier;
mod notify;
mod query;
mod stat;

use std::rc::Rc;

pub use chain::ModifierChain;
pub use modifier::{ModifierId, NumericModifier, StatModifier};
pub use multiplier::Multiplier;
pub use notify::{NotifyGate, Watchers};
pub use query::Query;
pub use stat::StatValue;

/// Receiver half of a modifier's change channel.
///
/// A stat registers itself with every modifier it holds and is told
/// to drop its cache whenever one of them reports a change. The
/// registration is weak on both sides: neither party keeps the other
/// alive, and a handle whose target is gone is simply skipped.
pub trait Watcher: 'static {
	/// This function is called when a watched modifier changed in a
	/// way that affects the modified value. It must not add or remove
	/// modifiers; it only flags state.
	fn mark_dirty(self: Rc<Self>);
}
