use std::rc::{Rc, Weak};

use fxhash::FxHashSet;
use smallvec::SmallVec;

use crate::modifier::{ModifierId, StatModifier};
use crate::query::Query;
use crate::Watcher;

struct ChainEntry<T>
where
	T: Copy + 'static,
{
	id: ModifierId,
	seq: u64,
	modifier: Weak<dyn StatModifier<T>>,
}

/// An ordered, de-duplicated set of modifiers, materialized as the
/// ascending-order sequence a query runs through. Ties in order
/// resolve by insertion order.
///
/// Membership and order changes only flag the sequence as stale; the
/// sort happens once, right before the next application. Adding N
/// modifiers therefore costs one sort, not N.
///
/// The chain holds its members weakly and owns the subscription
/// lifecycle: adding a modifier registers the owning watcher with it,
/// removing (or dropping the chain) unregisters. Members whose
/// backing modifier is gone are pruned before every sort and never
/// reach the query.
pub struct ModifierChain<T>
where
	T: Copy + 'static,
{
	entries: SmallVec<[ChainEntry<T>; 4]>,
	ids: FxHashSet<ModifierId>,
	watcher: Weak<dyn Watcher>,
	next_seq: u64,
	stale: bool,
}

impl<T> ModifierChain<T>
where
	T: Copy + 'static,
{
	pub fn new(watcher: Weak<dyn Watcher>) -> Self {
		ModifierChain {
			entries: SmallVec::new(),
			ids: FxHashSet::default(),
			watcher,
			next_seq: 0,
			stale: false,
		}
	}

	/// Number of live members.
	pub fn len(&self) -> usize {
		self.entries
			.iter()
			.filter(|entry| entry.modifier.strong_count() > 0)
			.count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn contains(&self, id: ModifierId) -> bool {
		self.entries
			.iter()
			.any(|entry| entry.id == id && entry.modifier.strong_count() > 0)
	}

	pub fn ids(&self) -> Vec<ModifierId> {
		self.entries
			.iter()
			.filter(|entry| entry.modifier.strong_count() > 0)
			.map(|entry| entry.id)
			.collect()
	}

	/// Inserts a modifier and subscribes the owning watcher to its
	/// change channel. Returns whether the member is new; a modifier
	/// that is already present is left alone.
	pub fn add(&mut self, modifier: &Rc<dyn StatModifier<T>>) -> bool {
		let id = modifier.id();
		if !self.ids.insert(id) {
			return false;
		}

		modifier.watched_by(self.watcher.clone());
		self.entries.push(ChainEntry {
			id,
			seq: self.next_seq,
			modifier: Rc::downgrade(modifier),
		});
		self.next_seq += 1;
		self.stale = true;
		true
	}

	/// Bulk [`ModifierChain::add`]. Returns whether any member is
	/// new. The shared stale flag means the whole batch is sorted
	/// once, at the next application.
	pub fn add_many<I>(&mut self, modifiers: I) -> bool
	where
		I: IntoIterator<Item = Rc<dyn StatModifier<T>>>,
	{
		let mut changed = false;
		for modifier in modifiers {
			changed |= self.add(&modifier);
		}
		changed
	}

	/// Removes a modifier and unsubscribes the owning watcher from
	/// it. Removing an absent modifier is a no-op.
	pub fn remove(&mut self, modifier: &Rc<dyn StatModifier<T>>) -> bool {
		self.remove_id(modifier.id())
	}

	pub fn remove_many<I>(&mut self, modifiers: I) -> bool
	where
		I: IntoIterator<Item = Rc<dyn StatModifier<T>>>,
	{
		let mut changed = false;
		for modifier in modifiers {
			changed |= self.remove(&modifier);
		}
		changed
	}

	fn remove_id(&mut self, id: ModifierId) -> bool {
		if !self.ids.remove(&id) {
			return false;
		}

		let pos = self.entries.iter().position(|entry| entry.id == id);
		if let Some(pos) = pos {
			let entry = self.entries.remove(pos);
			if let Some(modifier) = entry.modifier.upgrade() {
				modifier.not_watched_by(&self.watcher);
			}
		}
		self.stale = true;
		true
	}

	/// Removes every member, unsubscribing from each one that is
	/// still alive. Works on a drained snapshot, so no member list is
	/// mutated while it is being walked.
	pub fn clear(&mut self) -> bool {
		if self.entries.is_empty() {
			return false;
		}

		for entry in self.entries.drain(..) {
			if let Some(modifier) = entry.modifier.upgrade() {
				modifier.not_watched_by(&self.watcher);
			}
		}
		self.ids.clear();
		self.stale = false;
		true
	}

	/// Flags the materialized sequence as out of date. A watcher
	/// notification may have been an order change, so the owning stat
	/// calls this alongside its own dirty flag.
	pub fn mark_stale(&mut self) {
		self.stale = true;
	}

	/// Runs every member over the query, strictly in ascending order.
	pub fn apply_all(&mut self, query: &mut Query<T>) {
		if self.stale {
			self.rebuild();
		}

		for entry in &self.entries {
			match entry.modifier.upgrade() {
				Some(modifier) => modifier.apply(query),
				// Dropped since the last rebuild: skip now, prune on
				// the next pass.
				None => self.stale = true,
			}
		}
	}

	fn rebuild(&mut self) {
		let ids = &mut self.ids;
		let before = self.entries.len();
		self.entries.retain(|entry| {
			if entry.modifier.strong_count() > 0 {
				true
			} else {
				ids.remove(&entry.id);
				false
			}
		});

		let pruned = before - self.entries.len();
		if pruned > 0 {
			tracing::trace!(pruned, "dropped stale chain members");
		}

		self.entries.sort_by_cached_key(|entry| {
			let order = entry.modifier.upgrade().map_or(0, |m| m.order());
			(order, entry.seq)
		});
		self.stale = false;
	}
}

impl<T> Drop for ModifierChain<T>
where
	T: Copy + 'static,
{
	fn drop(&mut self) {
		self.clear();
	}
}
