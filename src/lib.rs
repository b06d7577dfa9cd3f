//! Build arithmetic expression trees out of constants and named variables,
//! then render or evaluate them.
//!
//! Variables are shared by reference, so giving a variable a value after it
//! has been used in an [`Expression`] changes the result of evaluating that
//! expression without needing to rebuild anything. Everything is built on
//! `Rc`, so none of these types can be sent across threads.

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod error;
mod expression;
mod node;
pub mod number;
mod term;

pub use error::{ExpressionError, Result, Side};
pub use expression::{Expression, Operand};
pub use node::{BinaryOperation, Node};
pub use number::{IntoNumber, Number, NumberKind};
pub use term::Term;
