//! The processing unit trait and chain outcome types.

use crate::record::Record;
use crate::value::Value;

/// The standard result type for chain processing operations.
pub type FlowResult<T> = Result<T, UnitError>;

/// How a chain (or a single unit) finished processing a record.
///
/// `Stopped` is a first-class outcome, not an error: a unit reporting it
/// intentionally halts the rest of the chain for this record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All processing ran to completion.
    Completed,
    /// Processing was intentionally halted before the end of the chain.
    Stopped,
}

impl Outcome {
    /// Returns `true` for [`Outcome::Stopped`].
    pub fn is_stopped(self) -> bool {
        matches!(self, Outcome::Stopped)
    }
}

/// A processing failure raised by a unit.
///
/// Distinct from [`Outcome::Stopped`]: an error means the unit could not do
/// its work, and it propagates to the caller unmodified.
#[derive(Debug, thiserror::Error)]
#[error("unit {unit} failed: {source}")]
pub struct UnitError {
    /// Name of the failing unit.
    pub unit: String,
    /// The underlying failure.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl UnitError {
    /// Creates a new unit error.
    pub fn new(
        unit: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            unit: unit.into(),
            source: source.into(),
        }
    }
}

/// A stateful processing unit of a chain.
///
/// Implementors mutate the shared record in [`Unit::process`] and describe
/// their configuration through the introspection methods, which the cache
/// uses to derive a structural fingerprint of the chain.
pub trait Unit {
    /// Processes the record in place.
    ///
    /// Returning [`Outcome::Stopped`] halts the enclosing chain for this
    /// record; returning an error aborts processing entirely.
    fn process(&mut self, record: &mut Record) -> FlowResult<Outcome>;

    /// An instance name distinguishing otherwise-identical units.
    fn name(&self) -> Option<&str> {
        None
    }

    /// A structural dump of the unit's configuration state.
    ///
    /// Map keys are walked in sorted order when hashing, so two units with
    /// the same configuration produce the same contribution regardless of
    /// construction order. Units with no configuration return `Value::Null`.
    fn state(&self) -> Value {
        Value::Null
    }

    /// Path of the source file defining this unit, usually `Some(file!())`.
    ///
    /// Used to resolve the newest source modification time across a chain.
    /// `None` leaves the unit out of the modification-time scan.
    fn source_path(&self) -> Option<&'static str> {
        None
    }
}
