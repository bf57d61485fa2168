//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attribute values.
/// An order line is one: `{ product, 3 units, 1000 }` equals any other line with
/// the same product, quantity and price, regardless of which order holds it.
///
/// To "modify" a value object, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
