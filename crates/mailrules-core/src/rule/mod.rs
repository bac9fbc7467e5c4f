//! Rule model: conditions, combinators and actions.
//!
//! Field, predicate and action names from a rule source are resolved into the
//! closed enums of this module once, when rules are loaded. Nothing downstream
//! dispatches on strings.

mod model;
mod validation;

pub use model::{Action, ActionKind, Combinator, Condition, Field, Predicate, Rule};
pub use validation::{ValidationError, ValidationErrorKind};

pub(crate) use model::normalize_text;
