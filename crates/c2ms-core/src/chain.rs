//! Ordered custom validators, run ahead of the built-in compliance check.
//!
//! A `ValidatorChain` is itself a `MessageValidator`, so scopes nest: a
//! connection-scope chain can be registered inside a factory-scope chain and
//! so on.  Evaluation is strictly in registration order and stops at the first
//! error.  The built-in checker runs only when every custom validator passes.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use c2ms_contracts::{Message, Status};

use crate::traits::MessageValidator;

/// Adapts a closure into a `MessageValidator`.
pub struct FnValidator<F>(pub F);

impl<F> MessageValidator for FnValidator<F>
where
    F: Fn(&Message) -> Status + Send + Sync,
{
    fn validate(&self, msg: &Message) -> Status {
        (self.0)(msg)
    }
}

/// An ordered list of custom validators.
#[derive(Clone, Default)]
pub struct ValidatorChain {
    validators: Vec<Arc<dyn MessageValidator>>,
}

impl ValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `validator`; it runs after everything registered before it.
    pub fn register(&mut self, validator: Arc<dyn MessageValidator>) {
        self.validators.push(validator);
    }

    pub fn register_fn<F>(&mut self, f: F)
    where
        F: Fn(&Message) -> Status + Send + Sync + 'static,
    {
        self.register(Arc::new(FnValidator(f)));
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run the chain, then `builtin` if the chain passed.
    pub fn validate_with(&self, msg: &Message, builtin: &dyn MessageValidator) -> Status {
        let status = self.validate(msg);
        if status.has_error() {
            return status;
        }
        builtin.validate(msg)
    }
}

impl MessageValidator for ValidatorChain {
    fn validate(&self, msg: &Message) -> Status {
        for (index, validator) in self.validators.iter().enumerate() {
            let status = validator.validate(msg);
            if status.has_error() {
                debug!(index, reason = %status.reason, "custom validator rejected message");
                return status;
            }
        }
        Status::ok()
    }
}

impl fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorChain")
            .field("validators", &self.validators.len())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use c2ms_contracts::MessageKind;

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Records its tag into a shared log and returns the given status.
    fn recorder(
        log: &Arc<Mutex<Vec<&'static str>>>,
        tag: &'static str,
        fail: bool,
    ) -> impl Fn(&Message) -> Status + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |_msg: &Message| {
            log.lock().unwrap().push(tag);
            if fail {
                Status::custom(format!("{tag} failed"), 1)
            } else {
                Status::ok()
            }
        }
    }

    struct CountingBuiltin {
        calls: AtomicUsize,
    }

    impl MessageValidator for CountingBuiltin {
        fn validate(&self, _msg: &Message) -> Status {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Status::ok()
        }
    }

    fn msg() -> Message {
        Message::new(MessageKind::Publish)
    }

    // ── Ordering and short-circuit ────────────────────────────────────────────

    #[test]
    fn test_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = ValidatorChain::new();
        chain.register_fn(recorder(&log, "first", false));
        chain.register_fn(recorder(&log, "second", false));
        chain.register_fn(recorder(&log, "third", false));

        assert!(chain.validate(&msg()).is_ok());
        assert_eq!(*log.lock().unwrap(), ["first", "second", "third"]);
    }

    /// The first failure is returned and nothing after it runs, including the
    /// built-in checker.
    #[test]
    fn test_stops_at_first_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = ValidatorChain::new();
        chain.register_fn(recorder(&log, "first", false));
        chain.register_fn(recorder(&log, "second", true));
        chain.register_fn(recorder(&log, "third", true));
        let builtin = CountingBuiltin { calls: AtomicUsize::new(0) };

        let status = chain.validate_with(&msg(), &builtin);
        assert!(status.has_error());
        assert_eq!(status.reason, "second failed");
        assert_eq!(*log.lock().unwrap(), ["first", "second"]);
        assert_eq!(builtin.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_builtin_runs_after_passing_chain() {
        let builtin = CountingBuiltin { calls: AtomicUsize::new(0) };
        let empty = ValidatorChain::new();
        assert!(empty.is_empty());
        assert!(empty.validate_with(&msg(), &builtin).is_ok());
        assert_eq!(builtin.calls.load(Ordering::SeqCst), 1);
    }

    /// Chains nest; the inner chain's validators run at its registration slot.
    #[test]
    fn test_nested_chains() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut inner = ValidatorChain::new();
        inner.register_fn(recorder(&log, "inner", false));

        let mut outer = ValidatorChain::new();
        outer.register_fn(recorder(&log, "before", false));
        outer.register(Arc::new(inner));
        outer.register_fn(recorder(&log, "after", false));

        assert_eq!(outer.len(), 3);
        assert!(outer.validate(&msg()).is_ok());
        assert_eq!(*log.lock().unwrap(), ["before", "inner", "after"]);
    }
}
