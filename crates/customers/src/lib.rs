//! Customers domain module.
//!
//! Only the customer record itself lives here; orders reference customers by
//! embedding the record that was looked up when the order was placed.

pub mod customer;

pub use customer::Customer;
