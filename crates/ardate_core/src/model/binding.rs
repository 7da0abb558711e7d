//! Dirty-notification binding between a value and its owning record.
//!
//! # Responsibility
//! - Remember which (owner, attribute) pair a value reports mutations to.
//! - Deliver exactly one notification per `fire()`.
//!
//! # Invariants
//! - At most one owner per binding; `attach` replaces the previous one.
//! - The owner is held weakly and is never kept alive by the binding.
//! - A dropped owner turns `fire()` into a no-op.

use log::trace;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

/// Owner boundary: a record that wants to hear about mutated attributes.
pub trait DirtyTracker {
    /// Called synchronously once per mutating call on a bound value.
    fn flag_dirty(&self, attribute: &str);
}

/// Optional, revocable association to one (owner, attribute) pair.
#[derive(Default)]
pub struct DirtyBinding {
    target: Option<BindingTarget>,
}

struct BindingTarget {
    owner: Weak<dyn DirtyTracker>,
    attribute: String,
}

impl DirtyBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a binding, replacing any existing one.
    pub fn attach<T>(&mut self, owner: &Rc<T>, attribute: impl Into<String>)
    where
        T: DirtyTracker + 'static,
    {
        let owner: Weak<T> = Rc::downgrade(owner);
        let owner: Weak<dyn DirtyTracker> = owner;
        self.target = Some(BindingTarget {
            owner,
            attribute: attribute.into(),
        });
    }

    /// Clears the binding.
    pub fn detach(&mut self) {
        self.target = None;
    }

    /// Bound attribute name, even if the owner has since been dropped.
    pub fn attribute(&self) -> Option<&str> {
        self.target
            .as_ref()
            .map(|target| target.attribute.as_str())
    }

    /// Whether a binding exists and its owner is still alive.
    pub fn is_attached(&self) -> bool {
        self.target
            .as_ref()
            .is_some_and(|target| target.owner.strong_count() > 0)
    }

    /// Notifies the owner, if any.
    pub fn fire(&self) {
        let Some(target) = self.target.as_ref() else {
            return;
        };
        match target.owner.upgrade() {
            Some(owner) => {
                trace!(
                    "event=flag_dirty module=model status=ok attribute={}",
                    target.attribute
                );
                owner.flag_dirty(&target.attribute);
            }
            None => {
                trace!(
                    "event=flag_dirty module=model status=skipped reason=owner_dropped attribute={}",
                    target.attribute
                );
            }
        }
    }
}

impl Debug for DirtyBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirtyBinding")
            .field("attribute", &self.attribute())
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{DirtyBinding, DirtyTracker};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl DirtyTracker for Recorder {
        fn flag_dirty(&self, attribute: &str) {
            self.calls.borrow_mut().push(attribute.to_string());
        }
    }

    #[test]
    fn fire_without_binding_is_noop() {
        let binding = DirtyBinding::new();
        assert!(!binding.is_attached());
        assert_eq!(binding.attribute(), None);
        binding.fire();
    }

    #[test]
    fn fire_notifies_owner_once_with_attribute() {
        let owner = Rc::new(Recorder::default());
        let mut binding = DirtyBinding::new();
        binding.attach(&owner, "created_at");

        binding.fire();
        assert_eq!(*owner.calls.borrow(), vec!["created_at".to_string()]);
    }

    #[test]
    fn attach_replaces_previous_owner() {
        let first = Rc::new(Recorder::default());
        let second = Rc::new(Recorder::default());
        let mut binding = DirtyBinding::new();
        binding.attach(&first, "a");
        binding.attach(&second, "b");

        binding.fire();
        assert!(first.calls.borrow().is_empty());
        assert_eq!(*second.calls.borrow(), vec!["b".to_string()]);
    }

    #[test]
    fn binding_does_not_keep_owner_alive() {
        let owner = Rc::new(Recorder::default());
        let mut binding = DirtyBinding::new();
        binding.attach(&owner, "updated_at");
        assert_eq!(Rc::strong_count(&owner), 1);

        drop(owner);
        assert!(!binding.is_attached());
        assert_eq!(binding.attribute(), Some("updated_at"));
        binding.fire();
    }

    #[test]
    fn detach_revokes_notification() {
        let owner = Rc::new(Recorder::default());
        let mut binding = DirtyBinding::new();
        binding.attach(&owner, "due_on");
        binding.detach();

        binding.fire();
        assert!(owner.calls.borrow().is_empty());
    }
}
