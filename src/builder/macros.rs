//! Macros for ergonomic state construction.

/// Build [`StateHooks`](crate::StateHooks) from closures, naming only the
/// slots a state actually uses.
///
/// # Example
///
/// ```rust
/// use stratum::hooks;
///
/// let silent = hooks!();
/// assert!(silent.entry.is_empty());
///
/// let hooks = hooks! {
///     entry: || println!("entering"),
///     exit: || println!("leaving"),
/// };
/// assert_eq!(hooks.entry.len(), 1);
/// assert!(hooks.tick.is_empty());
/// ```
#[macro_export]
macro_rules! hooks {
    () => {
        $crate::core::StateHooks::none()
    };
    ($($slot:ident : $action:expr),+ $(,)?) => {{
        let mut hooks = $crate::core::StateHooks::none();
        $(hooks.$slot = $crate::core::ActionHandle::from_fn($action);)+
        hooks
    }};
}
