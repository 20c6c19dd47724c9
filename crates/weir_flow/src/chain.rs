//! Ordered chains of processing links.

use crate::record::Record;
use crate::unit::{FlowResult, Outcome, Unit};

/// A boxed plain-callable link.
pub type FuncLink = Box<dyn FnMut(&mut Record) -> FlowResult<Outcome>>;

/// One element of a chain.
///
/// The three kinds mirror what a chain may contain: a nested sub-chain, a
/// stateful unit with introspectable configuration, or a plain callable.
pub enum Link {
    /// A nested sub-chain, processed as a whole.
    Chain(Chain),
    /// A stateful processing unit.
    Unit {
        /// Concrete type name, captured at insertion.
        type_name: &'static str,
        /// The unit itself.
        unit: Box<dyn Unit>,
    },
    /// A plain callable.
    Func {
        /// Caller-supplied representation; for a partially-applied callable
        /// this should name the underlying callable and its bound arguments.
        repr: String,
        /// The callable itself.
        func: FuncLink,
    },
}

/// An ordered pipeline of processing links sharing one mutable record.
///
/// Links run in insertion order. The first link to report
/// [`Outcome::Stopped`] (including one inside a nested sub-chain) halts
/// the whole chain for that record.
#[derive(Default)]
pub struct Chain {
    links: Vec<Link>,
}

impl Chain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stateful unit, capturing its concrete type name.
    pub fn push_unit<U: Unit + 'static>(&mut self, unit: U) {
        self.links.push(Link::Unit {
            type_name: std::any::type_name::<U>(),
            unit: Box::new(unit),
        });
    }

    /// Appends a nested sub-chain.
    pub fn push_chain(&mut self, chain: Chain) {
        self.links.push(Link::Chain(chain));
    }

    /// Appends a plain callable with its representation.
    pub fn push_fn<F>(&mut self, repr: impl Into<String>, func: F)
    where
        F: FnMut(&mut Record) -> FlowResult<Outcome> + 'static,
    {
        self.links.push(Link::Func {
            repr: repr.into(),
            func: Box::new(func),
        });
    }

    /// Returns the number of top-level links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if the chain has no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns the links for inspection (fingerprinting).
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Processes the record through every link in order.
    ///
    /// Stops at the first [`Outcome::Stopped`] and reports it; unit errors
    /// propagate unmodified.
    pub fn process(&mut self, record: &mut Record) -> FlowResult<Outcome> {
        for link in &mut self.links {
            let outcome = match link {
                Link::Chain(chain) => chain.process(record)?,
                Link::Unit { unit, .. } => unit.process(record)?,
                Link::Func { func, .. } => func(record)?,
            };
            if outcome.is_stopped() {
                return Ok(Outcome::Stopped);
            }
        }
        Ok(Outcome::Completed)
    }
}
