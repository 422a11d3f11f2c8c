//! Thread-local provider stacks behind the context hooks
//!
//! Rendering is single-threaded, so a provider scope lives on the current
//! thread. Scopes nest; the innermost one wins.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread::LocalKey;

pub(crate) struct ScopeStack<T> {
    frames: RefCell<Vec<Rc<T>>>,
}

impl<T> ScopeStack<T> {
    pub(crate) const fn new() -> Self {
        Self {
            frames: RefCell::new(Vec::new()),
        }
    }
}

struct Guard<T: 'static>(&'static LocalKey<ScopeStack<T>>);

impl<T: 'static> Drop for Guard<T> {
    fn drop(&mut self) {
        // Pop even when the scoped closure panicked
        let _ = self.0.try_with(|stack| stack.frames.borrow_mut().pop());
    }
}

/// Run `f` with `value` as the innermost scope on `key`
pub(crate) fn enter<T: 'static, R>(
    key: &'static LocalKey<ScopeStack<T>>,
    value: Rc<T>,
    f: impl FnOnce() -> R,
) -> R {
    key.with(|stack| stack.frames.borrow_mut().push(value));
    let _guard = Guard(key);
    f()
}

/// Innermost scope on `key`, if any
pub(crate) fn current<T: 'static>(key: &'static LocalKey<ScopeStack<T>>) -> Option<Rc<T>> {
    key.with(|stack| stack.frames.borrow().last().cloned())
}
