//! Component trait and the allocator capability table
//!
//! Components are stored type-erased and keyed by a type *name*, so scene data
//! can attach them without knowing Rust types. Content code registers one
//! [`ComponentAllocator`] per name at startup; the store calls it to build a
//! value from structured data and again to dispose of it.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::marker::PhantomData;

/// A Rust type that can live in the component store
pub trait Component: Any {
    /// Name the type is registered and looked up under
    const NAME: &'static str;
}

/// Builds and disposes of components of one named type
pub trait ComponentAllocator {
    /// Build a component from structured data; `Err` carries a human-readable reason
    fn allocate(&self, data: &Value) -> Result<Box<dyn Any>, String>;

    /// Dispose of a component previously returned by `allocate`
    fn deallocate(&self, component: Box<dyn Any>) {
        drop(component);
    }
}

/// Allocator for any component that deserializes from JSON-like data
pub struct SerdeAllocator<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> SerdeAllocator<T> {
    /// Create the allocator
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for SerdeAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component + DeserializeOwned> ComponentAllocator for SerdeAllocator<T> {
    fn allocate(&self, data: &Value) -> Result<Box<dyn Any>, String> {
        let component: T = serde_json::from_value(data.clone()).map_err(|e| e.to_string())?;
        Ok(Box::new(component))
    }
}

/// Allocator built from a pair of closures
pub struct FnAllocator<A, D> {
    allocate: A,
    deallocate: D,
}

impl<A, D> FnAllocator<A, D>
where
    A: Fn(&Value) -> Result<Box<dyn Any>, String>,
    D: Fn(Box<dyn Any>),
{
    /// Wrap an allocate/deallocate closure pair
    pub const fn new(allocate: A, deallocate: D) -> Self {
        Self {
            allocate,
            deallocate,
        }
    }
}

impl<A, D> ComponentAllocator for FnAllocator<A, D>
where
    A: Fn(&Value) -> Result<Box<dyn Any>, String>,
    D: Fn(Box<dyn Any>),
{
    fn allocate(&self, data: &Value) -> Result<Box<dyn Any>, String> {
        (self.allocate)(data)
    }

    fn deallocate(&self, component: Box<dyn Any>) {
        (self.deallocate)(component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Health {
        hp: i32,
    }

    impl Component for Health {
        const NAME: &'static str = "health";
    }

    #[test]
    fn test_serde_allocator() {
        let allocator = SerdeAllocator::<Health>::new();
        let value = allocator.allocate(&json!({ "hp": 5 })).unwrap();
        assert_eq!(value.downcast_ref::<Health>(), Some(&Health { hp: 5 }));
    }

    #[test]
    fn test_serde_allocator_rejects_bad_data() {
        let allocator = SerdeAllocator::<Health>::new();
        assert!(allocator.allocate(&json!({ "hp": "lots" })).is_err());
    }

    #[test]
    fn test_fn_allocator_deallocates() {
        let freed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&freed);
        let allocator = FnAllocator::new(
            |data: &Value| Ok(Box::new(data.as_i64().unwrap_or(0)) as Box<dyn Any>),
            move |_component| counter.set(counter.get() + 1),
        );
        let value = allocator.allocate(&json!(3)).unwrap();
        assert_eq!(value.downcast_ref::<i64>(), Some(&3));
        allocator.deallocate(value);
        assert_eq!(freed.get(), 1);
    }
}
