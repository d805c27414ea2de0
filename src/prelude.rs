//! Traits which, typically, may be imported without concern: `use argot::prelude::*`.

pub use crate::check::Check;
pub use crate::format::Format;

/// Behaviour for multiple (0 to many) items T to be collected together.
// Needs to be imported in order to implement a custom `Collectable`.
pub trait Collectable<T> {
    /// Add a value to this `Collectable`.
    fn add(&mut self, item: T);
}

/// Behaviour for key/value pairs to be inserted together.
// Needs to be imported in order to implement a custom `Associative`.
pub trait Associative<K, V> {
    /// Insert a key/value pair into this `Associative`.
    fn put(&mut self, key: K, value: V);
}
