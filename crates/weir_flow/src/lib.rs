//! Record-processing chain framework.
//!
//! A chain is an ordered sequence of processing units sharing one mutable
//! [`Record`]. Links may be stateful [`Unit`] objects, plain callables, or
//! nested sub-chains. Processing runs links in order until one reports
//! [`Outcome::Stopped`], which halts the whole chain.

#![warn(missing_docs)]

pub mod chain;
pub mod record;
pub mod unit;
pub mod value;

pub use chain::{Chain, Link};
pub use record::Record;
pub use unit::{FlowResult, Outcome, Unit, UnitError};
pub use value::Value;
