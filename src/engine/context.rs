//! Context Chain - Type-keyed, lexically scoped values.
//!
//! A [`Contexts`] is a persistent singly linked list. Providing a value
//! never mutates an existing chain; it returns a new head pointing at the
//! old one:
//!
//! ```text
//! outer = Empty.provide(vec![1, 2, 3])      Provider(Vec<i32>) ─▶ Empty
//! inner = outer.provide(vec![3, 2, 1])      Provider(Vec<i32>) ─▶ Provider(Vec<i32>) ─▶ Empty
//! ```
//!
//! Every node captures the chain it was built with, so a nested provider
//! only shadows the type for nodes built inside it.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};

struct Provider {
    type_id: TypeId,
    type_name: &'static str,
    value: Rc<dyn Any>,
    parent: Contexts,
}

/// Immutable chain of context providers.
#[derive(Clone, Default)]
pub struct Contexts(Option<Rc<Provider>>);

impl Contexts {
    /// The root chain. Matches nothing.
    pub fn empty() -> Self {
        Self(None)
    }

    /// A new chain whose head provides `value` for type `T`.
    pub fn provide<T: 'static>(&self, value: T) -> Self {
        Self(Some(Rc::new(Provider {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: Rc::new(value),
            parent: self.clone(),
        })))
    }

    /// Innermost value provided for `T`, if any.
    pub fn get<T: 'static>(&self) -> Option<Rc<T>> {
        let wanted = TypeId::of::<T>();
        let mut current = self.0.as_ref();
        while let Some(provider) = current {
            if provider.type_id == wanted {
                return Rc::clone(&provider.value).downcast::<T>().ok();
            }
            current = provider.parent.0.as_ref();
        }
        None
    }

    /// Innermost value provided for `T`, or [`Error::MissingContext`] with a
    /// default message.
    pub fn lookup<T: 'static>(&self) -> Result<Rc<T>> {
        let type_name = std::any::type_name::<T>();
        self.lookup_or(format!("no context of type `{type_name}` was provided"))
    }

    /// Innermost value provided for `T`, or [`Error::MissingContext`]
    /// carrying `message`.
    pub fn lookup_or<T: 'static>(&self, message: impl Into<String>) -> Result<Rc<T>> {
        self.get::<T>().ok_or_else(|| {
            let type_name = std::any::type_name::<T>();
            tracing::debug!(type_name, "context lookup missed");
            Error::MissingContext {
                type_name,
                message: message.into(),
            }
        })
    }

    /// Number of providers in the chain.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.0.as_ref();
        while let Some(provider) = current {
            depth += 1;
            current = provider.parent.0.as_ref();
        }
        depth
    }
}

impl fmt::Debug for Contexts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut current = self.0.as_ref();
        while let Some(provider) = current {
            list.entry(&provider.type_name);
            current = provider.parent.0.as_ref();
        }
        list.finish()
    }
}
