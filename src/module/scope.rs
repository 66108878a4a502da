//! Per-thread decode scope.
//!
//! serde's `Deserialize` has no side channel for the registry or for typed
//! errors. The scope carries both:
//! - a stack of active registries, pushed by `ModuleRegistry::in_scope`
//!   and `ModuleRegistry::from_slice`
//! - the last typed failure raised inside a serde impl, so the caller that
//!   sees the resulting `serde_json::Error` can recover the `ConfigError`

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

use crate::error::ConfigError;
use crate::module::ModuleRegistry;

thread_local! {
    static REGISTRIES: RefCell<Vec<ModuleRegistry>> = const { RefCell::new(Vec::new()) };
    static FAILURE: RefCell<Option<(String, ConfigError)>> = const { RefCell::new(None) };
}

/// Pops the registry pushed by [`enter`] when dropped.
pub(crate) struct ScopeGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        REGISTRIES.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub(crate) fn enter(registry: &ModuleRegistry) -> ScopeGuard {
    REGISTRIES.with(|stack| stack.borrow_mut().push(registry.clone()));
    ScopeGuard {
        _not_send: PhantomData,
    }
}

/// The innermost active registry, or the global one.
pub(crate) fn current() -> ModuleRegistry {
    REGISTRIES
        .with(|stack| stack.borrow().last().cloned())
        .unwrap_or_else(|| ModuleRegistry::global().clone())
}

pub(crate) fn clear_failure() {
    FAILURE.with(|slot| slot.borrow_mut().take());
}

/// Stash `err` and return a serde deserialization error carrying its message.
pub(crate) fn raise_de<E: serde::de::Error>(err: ConfigError) -> E {
    E::custom(stash(err))
}

/// Stash `err` and return a serde serialization error carrying its message.
pub(crate) fn raise_ser<E: serde::ser::Error>(err: ConfigError) -> E {
    E::custom(stash(err))
}

/// Re-raise a deserialization error with context added to its typed failure.
///
/// Errors that did not come from a stashed failure pass through unchanged.
pub(crate) fn rewrap<E: serde::de::Error>(err: E, wrap: impl FnOnce(ConfigError) -> ConfigError) -> E {
    match take_failure(&err) {
        Some(failure) => raise_de(wrap(failure)),
        None => err,
    }
}

fn stash(err: ConfigError) -> String {
    let message = err.to_string();
    FAILURE.with(|slot| *slot.borrow_mut() = Some((message.clone(), err)));
    message
}

/// Take the stashed failure if `err` was produced from it.
///
/// serde_json appends the position to custom messages, so the stashed message
/// must be a prefix of the rendered error.
pub(crate) fn take_failure(err: &impl fmt::Display) -> Option<ConfigError> {
    let rendered = err.to_string();
    FAILURE.with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.as_ref() {
            Some((message, _)) if rendered.starts_with(message.as_str()) => {
                slot.take().map(|(_, failure)| failure)
            }
            _ => None,
        }
    })
}
