use smol_str::SmolStr;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// A convenient alias for results produced by this crate.
pub type Result<T, E = ExpressionError> = std::result::Result<T, E>;

/// Which child of an operation node an error came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Everything that can go wrong while building or evaluating an
/// [`Expression`](crate::Expression).
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// The value handed to us isn't an integer or floating point number.
    InvalidValueKind { type_name: SmolStr },
    /// Evaluation reached a variable which hasn't been given a value.
    UnboundVariable { label: SmolStr },
    /// Two distinct variables would end up sharing the same name.
    DuplicateVariable { name: SmolStr },
    /// [`Operand::Root`](crate::Operand::Root) was used (or an empty
    /// expression was passed as an operand) while there is no root yet.
    EmptyRootReference,
    /// Both operands referred to the current root.
    InvalidOperands,
    /// One of an operation's children couldn't be evaluated.
    Operand {
        side: Side,
        inner: Box<ExpressionError>,
    },
    /// Evaluating a whole expression failed.
    Evaluation {
        expression: String,
        inner: Box<ExpressionError>,
    },
}

impl ExpressionError {
    /// Strip away any context and get the error which actually caused the
    /// failure.
    pub fn root_cause(&self) -> &ExpressionError {
        match self {
            ExpressionError::Operand { inner, .. }
            | ExpressionError::Evaluation { inner, .. } => inner.root_cause(),
            other => other,
        }
    }
}

impl Display for ExpressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionError::InvalidValueKind { type_name } => {
                write!(f, "\"{}\" is not a supported numeric type", type_name)
            },
            ExpressionError::UnboundVariable { label } => {
                write!(f, "the variable \"{}\" has no value", label)
            },
            ExpressionError::DuplicateVariable { name } => {
                write!(f, "the variable \"{}\" is already defined", name)
            },
            ExpressionError::EmptyRootReference => write!(
                f,
                "referred to the current root, but the expression is empty"
            ),
            ExpressionError::InvalidOperands => {
                write!(f, "at most one operand may refer to the current root")
            },
            ExpressionError::Operand { side, inner } => {
                write!(f, "{} operand evaluation failed: {}", side, inner)
            },
            ExpressionError::Evaluation { expression, inner } => {
                write!(f, "unable to evaluate {}: {}", expression, inner)
            },
        }
    }
}

impl Error for ExpressionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExpressionError::Operand { inner, .. }
            | ExpressionError::Evaluation { inner, .. } => Some(&**inner),
            _ => None,
        }
    }
}
