//! Guard conditions for transitions.
//!
//! A condition is a boolean predicate evaluated once per check. From the
//! engine's point of view it is read-only: it may sample external mutable
//! state but must never mutate engine state. Sampling failures are surfaced
//! as [`ConditionError`] and abort the tick instead of being swallowed.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Failure raised while evaluating a condition, typically from a fallible
/// sampling function.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("condition evaluation failed: {0}")]
pub struct ConditionError(String);

impl ConditionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Boolean predicate guarding a transition.
///
/// Any `Fn() -> bool` closure is a condition (the custom-predicate
/// variant), so simple guards need no wrapper type:
///
/// ```rust
/// use stratum::Condition;
///
/// let ready = || 2 + 2 == 4;
/// assert_eq!(ready.test(), Ok(true));
/// ```
pub trait Condition: Send + Sync {
    /// Evaluate the predicate once. Must not mutate engine state.
    fn test(&self) -> Result<bool, ConditionError>;
}

impl<F> Condition for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn test(&self) -> Result<bool, ConditionError> {
        Ok(self())
    }
}

/// Comparison operator for [`Comparison`] conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

type Sampler<T> = Box<dyn Fn() -> Result<T, ConditionError> + Send + Sync>;

/// Compares a freshly sampled value against a fixed reference value.
///
/// The sampler runs on every [`Condition::test`] call; nothing is cached.
///
/// ```rust
/// use stratum::{CompareOp, Comparison, Condition};
/// use std::sync::atomic::{AtomicI64, Ordering};
/// use std::sync::Arc;
///
/// let health = Arc::new(AtomicI64::new(100));
/// let sampled = Arc::clone(&health);
/// let low_health = Comparison::new(CompareOp::Lt, 25, move || {
///     sampled.load(Ordering::SeqCst)
/// });
///
/// assert_eq!(low_health.test(), Ok(false));
/// health.store(10, Ordering::SeqCst);
/// assert_eq!(low_health.test(), Ok(true));
/// ```
pub struct Comparison<T> {
    op: CompareOp,
    reference: T,
    sample: Sampler<T>,
}

impl<T: PartialOrd> Comparison<T> {
    /// Comparison with an infallible sampler.
    pub fn new<F>(op: CompareOp, reference: T, sample: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            op,
            reference,
            sample: Box::new(move || Ok(sample())),
        }
    }

    /// Comparison whose sampler may fail; the error aborts the tick.
    pub fn fallible<F>(op: CompareOp, reference: T, sample: F) -> Self
    where
        F: Fn() -> Result<T, ConditionError> + Send + Sync + 'static,
    {
        Self {
            op,
            reference,
            sample: Box::new(sample),
        }
    }
}

impl<T> Condition for Comparison<T>
where
    T: PartialOrd + Send + Sync,
{
    fn test(&self) -> Result<bool, ConditionError> {
        let sampled = (self.sample)()?;
        Ok(match self.op {
            CompareOp::Eq => sampled == self.reference,
            CompareOp::Ne => sampled != self.reference,
            CompareOp::Lt => sampled < self.reference,
            CompareOp::Le => sampled <= self.reference,
            CompareOp::Gt => sampled > self.reference,
            CompareOp::Ge => sampled >= self.reference,
        })
    }
}

/// True when every term is true; short-circuits on the first false term.
/// True over an empty term list.
pub struct And {
    terms: Vec<Box<dyn Condition>>,
}

impl And {
    pub fn new(terms: Vec<Box<dyn Condition>>) -> Self {
        Self { terms }
    }
}

impl Condition for And {
    fn test(&self) -> Result<bool, ConditionError> {
        for term in &self.terms {
            if !term.test()? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// True when any term is true; short-circuits on the first true term.
/// False over an empty term list.
pub struct Or {
    terms: Vec<Box<dyn Condition>>,
}

impl Or {
    pub fn new(terms: Vec<Box<dyn Condition>>) -> Self {
        Self { terms }
    }
}

impl Condition for Or {
    fn test(&self) -> Result<bool, ConditionError> {
        for term in &self.terms {
            if term.test()? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Negates one sub-condition.
pub struct Not {
    inner: Box<dyn Condition>,
}

impl Not {
    pub fn new(inner: impl Condition + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Condition for Not {
    fn test(&self) -> Result<bool, ConditionError> {
        Ok(!self.inner.test()?)
    }
}

/// Marker for conditions holding resettable trigger state.
pub trait Reset {
    fn reset(&self);
}

/// Externally-triggered latch: starts false, becomes true when [`fire`]d,
/// and stays true until [`reset`].
///
/// Testing never clears the flag, and the engine never resets it either:
/// callers owning latch conditions are responsible for resetting them when
/// the owning state exits, otherwise a stale trigger persists across
/// unrelated activations.
///
/// Clones share the same flag, so one copy can guard a transition while
/// another stays with the host for firing and resetting.
///
/// [`fire`]: Latch::fire
/// [`reset`]: Reset::reset
#[derive(Clone, Debug, Default)]
pub struct Latch {
    fired: Arc<AtomicBool>,
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the external signal fired. Firing repeatedly before the
    /// next reset is indistinguishable from firing once.
    pub fn fire(&self) {
        self.fired.store(true, Ordering::SeqCst);
    }
}

impl Reset for Latch {
    fn reset(&self) {
        self.fired.store(false, Ordering::SeqCst);
    }
}

impl Condition for Latch {
    fn test(&self) -> Result<bool, ConditionError> {
        Ok(self.fired.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, AtomicUsize};

    fn flag(value: bool) -> Box<dyn Condition> {
        Box::new(move || value)
    }

    #[test]
    fn closure_is_a_condition() {
        let condition = || true;
        assert_eq!(condition.test(), Ok(true));
    }

    #[test]
    fn comparison_covers_every_operator() {
        let cases = [
            (CompareOp::Eq, 5, 5, true),
            (CompareOp::Eq, 4, 5, false),
            (CompareOp::Ne, 4, 5, true),
            (CompareOp::Ne, 5, 5, false),
            (CompareOp::Lt, 4, 5, true),
            (CompareOp::Lt, 5, 5, false),
            (CompareOp::Le, 5, 5, true),
            (CompareOp::Le, 6, 5, false),
            (CompareOp::Gt, 6, 5, true),
            (CompareOp::Gt, 5, 5, false),
            (CompareOp::Ge, 5, 5, true),
            (CompareOp::Ge, 4, 5, false),
        ];

        for (op, sampled, reference, expected) in cases {
            let condition = Comparison::new(op, reference, move || sampled);
            assert_eq!(condition.test(), Ok(expected), "{op:?} {sampled} {reference}");
        }
    }

    #[test]
    fn comparison_samples_fresh_on_every_test() {
        let value = Arc::new(AtomicI64::new(0));
        let calls = Arc::new(AtomicUsize::new(0));

        let sampled = Arc::clone(&value);
        let counted = Arc::clone(&calls);
        let condition = Comparison::new(CompareOp::Gt, 10, move || {
            counted.fetch_add(1, Ordering::SeqCst);
            sampled.load(Ordering::SeqCst)
        });

        assert_eq!(condition.test(), Ok(false));
        value.store(42, Ordering::SeqCst);
        assert_eq!(condition.test(), Ok(true));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fallible_sampler_error_is_surfaced() {
        let condition = Comparison::fallible(CompareOp::Eq, 1, || {
            Err(ConditionError::new("sensor offline"))
        });

        assert_eq!(
            condition.test(),
            Err(ConditionError::new("sensor offline"))
        );
    }

    #[test]
    fn and_is_true_over_empty_terms() {
        assert_eq!(And::new(Vec::new()).test(), Ok(true));
    }

    #[test]
    fn or_is_false_over_empty_terms() {
        assert_eq!(Or::new(Vec::new()).test(), Ok(false));
    }

    #[test]
    fn and_short_circuits_on_first_false() {
        let evaluated = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&evaluated);
        let tail: Box<dyn Condition> = Box::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            true
        });

        let condition = And::new(vec![flag(true), flag(false), tail]);
        assert_eq!(condition.test(), Ok(false));
        assert_eq!(evaluated.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn or_short_circuits_on_first_true() {
        let evaluated = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&evaluated);
        let tail: Box<dyn Condition> = Box::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            false
        });

        let condition = Or::new(vec![flag(false), flag(true), tail]);
        assert_eq!(condition.test(), Ok(true));
        assert_eq!(evaluated.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn not_negates() {
        assert_eq!(Not::new(|| false).test(), Ok(true));
        assert_eq!(Not::new(|| true).test(), Ok(false));
    }

    #[test]
    fn latch_starts_false_and_latches_fires() {
        let latch = Latch::new();
        assert_eq!(latch.test(), Ok(false));

        latch.fire();
        assert_eq!(latch.test(), Ok(true));
        // Testing does not clear the flag.
        assert_eq!(latch.test(), Ok(true));
    }

    #[test]
    fn latch_fires_collapse_until_reset() {
        let latch = Latch::new();
        for _ in 0..5 {
            latch.fire();
        }
        assert_eq!(latch.test(), Ok(true));

        latch.reset();
        assert_eq!(latch.test(), Ok(false));

        latch.fire();
        assert_eq!(latch.test(), Ok(true));
    }

    #[test]
    fn latch_clones_share_the_flag() {
        let latch = Latch::new();
        let guard = latch.clone();

        latch.fire();
        assert_eq!(guard.test(), Ok(true));

        latch.reset();
        assert_eq!(guard.test(), Ok(false));
    }

    #[test]
    fn combinator_errors_propagate() {
        let failing: Box<dyn Condition> = Box::new(Comparison::fallible(
            CompareOp::Eq,
            0,
            || Err(ConditionError::new("boom")),
        ));

        let condition = And::new(vec![flag(true), failing]);
        assert_eq!(condition.test(), Err(ConditionError::new("boom")));
    }
}
