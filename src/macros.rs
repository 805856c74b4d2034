/// Builds the `Vec` of modifier handles the bulk operations take.
///
/// ```ignore
/// stat.add_modifiers(modifiers![&haste, &armor]);
/// ```
#[macro_export]
macro_rules! modifiers {
	($($modifier:expr),* $(,)?) => {
		::std::vec![$( ::core::convert::Into::into($modifier) ),*]
	};
}
