//! Macros for concise term construction.

/// Build a mapping [`Term`](crate::core::Term) from `key => value` pairs.
///
/// Values are anything convertible into a term, including `&Variable`
/// placeholders and nested `mapping!`/`sequence!` invocations. Key order
/// is preserved.
///
/// # Example
///
/// ```
/// use efsm::core::{Term, TermType, Variable};
/// use efsm::{mapping, sequence};
///
/// let i = Variable::new("i", TermType::Int);
/// let trigger = mapping! {
///     "command" => "Start",
///     "args" => sequence![&i, true],
/// };
///
/// assert_eq!(trigger.get("command"), Some(&Term::from("Start")));
/// assert!(!trigger.is_ground());
/// assert!(mapping! {}.is_ground());
/// ```
#[macro_export]
macro_rules! mapping {
    () => {
        $crate::core::Term::Mapping($crate::core::Mapping::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut entries = $crate::core::Mapping::new();
        $(
            entries.insert($key, $value);
        )+
        $crate::core::Term::Mapping(entries)
    }};
}

/// Build a sequence [`Term`](crate::core::Term) from its items.
///
/// # Example
///
/// ```
/// use efsm::core::Term;
/// use efsm::sequence;
///
/// let items = sequence![1, "two", false];
/// assert_eq!(items, Term::Sequence(vec![Term::from(1), Term::from("two"), Term::from(false)]));
/// ```
#[macro_export]
macro_rules! sequence {
    ($($item:expr),* $(,)?) => {
        $crate::core::Term::Sequence(vec![$($crate::core::Term::from($item)),*])
    };
}
