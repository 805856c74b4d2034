use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::chain::ModifierChain;
use crate::modifier::{ModifierId, StatModifier};
use crate::query::Query;
use crate::Watcher;

/// A base value with an attached modifier chain and a cached result.
///
/// Reads are pull-based: mutations — of the base value, of the chain
/// membership, or of any held modifier's own state — only mark the
/// cache dirty, and the next [`StatValue::value`] call runs a fresh
/// [`Query`] through the chain exactly once, however many mutations
/// happened in between.
///
/// The stat does not own its modifiers. It holds weak handles and one
/// change subscription per member; both go away when the member is
/// removed or when the stat itself is dropped.
pub struct StatValue<T>
where
	T: Copy + 'static,
{
	body: Rc<StatBody<T>>,
}

impl<T> Clone for StatValue<T>
where
	T: Copy + 'static,
{
	fn clone(&self) -> Self {
		StatValue {
			body: self.body.clone(),
		}
	}
}

pub struct StatBody<T>
where
	T: Copy + 'static,
{
	inner: RefCell<StatInner<T>>,
}

struct StatInner<T>
where
	T: Copy + 'static,
{
	base: T,
	cached: T,
	dirty: bool,
	chain: ModifierChain<T>,
}

impl<T> StatValue<T>
where
	T: Copy + 'static,
{
	pub fn new(base: T) -> Self {
		StatValue {
			body: Rc::new_cyclic(|this| StatBody {
				inner: RefCell::new(StatInner {
					base,
					cached: base,
					dirty: true,
					chain: ModifierChain::new(this.clone() as Weak<dyn Watcher>),
				}),
			}),
		}
	}

	pub fn with_modifiers<I>(base: T, modifiers: I) -> Self
	where
		I: IntoIterator<Item = Rc<dyn StatModifier<T>>>,
	{
		let stat = StatValue::new(base);
		stat.add_modifiers(modifiers);
		stat
	}

	pub fn base(&self) -> T {
		self.body.inner.borrow().base
	}

	/// Overwrites the base value and marks the cache dirty.
	pub fn set_base(&self, value: T) {
		let mut inner = self.body.inner.borrow_mut();
		inner.base = value;
		inner.dirty = true;
	}

	/// The base value with all modifiers applied. Recomputes only if
	/// a mutation happened since the last read.
	pub fn value(&self) -> T {
		let mut inner = self.body.inner.borrow_mut();
		if inner.dirty {
			inner.recompute()
		} else {
			inner.cached
		}
	}

	/// Recomputes and refreshes the cache, bypassing the dirty check.
	pub fn recompute(&self) -> T {
		self.body.inner.borrow_mut().recompute()
	}

	pub fn is_dirty(&self) -> bool {
		self.body.inner.borrow().dirty
	}

	/// Flags the cached value as stale. This is the callback every
	/// subscribed modifier fires into; it also runs whenever the base
	/// value or the chain membership changes.
	pub fn mark_dirty(&self) {
		self.body.inner.borrow_mut().mark_dirty();
	}

	/// Attaches a modifier and subscribes to its change channel.
	/// Adding a modifier that is already present is a no-op; returns
	/// whether it was actually added.
	pub fn add_modifier(&self, modifier: impl Into<Rc<dyn StatModifier<T>>>) -> bool {
		let modifier = modifier.into();
		let mut inner = self.body.inner.borrow_mut();
		let added = inner.chain.add(&modifier);
		if added {
			inner.dirty = true;
		}
		added
	}

	/// Attaches many modifiers at once; the chain is re-sorted once
	/// for the whole batch. Returns whether any was new.
	pub fn add_modifiers<I>(&self, modifiers: I) -> bool
	where
		I: IntoIterator<Item = Rc<dyn StatModifier<T>>>,
	{
		let mut inner = self.body.inner.borrow_mut();
		let added = inner.chain.add_many(modifiers);
		if added {
			inner.dirty = true;
		}
		added
	}

	/// Detaches a modifier and unsubscribes from it. Removing an
	/// absent modifier is a no-op; returns whether it was actually
	/// removed.
	pub fn remove_modifier(&self, modifier: impl Into<Rc<dyn StatModifier<T>>>) -> bool {
		let modifier = modifier.into();
		let mut inner = self.body.inner.borrow_mut();
		let removed = inner.chain.remove(&modifier);
		if removed {
			inner.dirty = true;
		}
		removed
	}

	pub fn remove_modifiers<I>(&self, modifiers: I) -> bool
	where
		I: IntoIterator<Item = Rc<dyn StatModifier<T>>>,
	{
		let mut inner = self.body.inner.borrow_mut();
		let removed = inner.chain.remove_many(modifiers);
		if removed {
			inner.dirty = true;
		}
		removed
	}

	/// Detaches and unsubscribes from every modifier.
	pub fn clear_modifiers(&self) -> bool {
		let mut inner = self.body.inner.borrow_mut();
		let cleared = inner.chain.clear();
		if cleared {
			inner.dirty = true;
		}
		cleared
	}

	pub fn modifier_count(&self) -> usize {
		self.body.inner.borrow().chain.len()
	}

	pub fn has_modifier(&self, id: ModifierId) -> bool {
		self.body.inner.borrow().chain.contains(id)
	}

	pub fn modifier_ids(&self) -> Vec<ModifierId> {
		self.body.inner.borrow().chain.ids()
	}
}

impl<T> StatInner<T>
where
	T: Copy + 'static,
{
	fn mark_dirty(&mut self) {
		self.dirty = true;
		// A notification may have been an order change, so the
		// materialized sequence has to be rebuilt as well.
		self.chain.mark_stale();
	}

	fn recompute(&mut self) -> T {
		let mut query = Query::new(self.base);
		self.chain.apply_all(&mut query);
		self.cached = query.current;
		self.dirty = false;
		tracing::trace!(modifiers = self.chain.len(), "stat recomputed");
		self.cached
	}
}

impl<T> Watcher for StatBody<T>
where
	T: Copy + 'static,
{
	fn mark_dirty(self: Rc<Self>) {
		self.inner.borrow_mut().mark_dirty();
	}
}

impl<T> From<T> for StatValue<T>
where
	T: Copy + 'static,
{
	fn from(base: T) -> Self {
		StatValue::new(base)
	}
}

impl<T> Debug for StatValue<T>
where
	T: Copy + Debug + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.body.inner.borrow();
		f.debug_struct("StatValue")
			.field("base", &inner.base)
			.field("dirty", &inner.dirty)
			.finish()
	}
}
