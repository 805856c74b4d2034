/// The query for the value of a stat: the base value it started from
/// and the current value being modified, threaded by reference
/// through the modifier chain during one recomputation pass.
///
/// A query lives for exactly one pass. It is created fresh from the
/// stat's base value, handed to each modifier in order, and discarded
/// once the final `current` is cached.
pub struct Query<T> {
	base: T,
	pub current: T,
}

impl<T> Query<T>
where
	T: Copy,
{
	pub fn new(base: T) -> Self {
		Query {
			base,
			current: base,
		}
	}

	/// The unmodified value this pass started from. (Read only)
	pub fn base(&self) -> T {
		self.base
	}
}
