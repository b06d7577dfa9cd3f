use crate::{
    error::{ExpressionError, Result, Side},
    term::Term,
};
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Sub},
    rc::Rc,
};

/// A node in the expression tree.
///
/// Children are reference counted because the same sub-tree (and the same
/// [`Term`]s) may be shared between several expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Term(Term),
    /// An operation involving two operands.
    Binary {
        left: Rc<Node>,
        right: Rc<Node>,
        op: BinaryOperation,
    },
}

/// An operation that can be applied to two arguments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
    Plus,
    Minus,
    Times,
    Divide,
}

impl BinaryOperation {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperation::Plus => "+",
            BinaryOperation::Minus => "-",
            BinaryOperation::Times => "*",
            BinaryOperation::Divide => "/",
        }
    }

    /// Apply the operation. Dividing by zero gives you infinity or NaN, the
    /// same as any other floating point division.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOperation::Plus => left + right,
            BinaryOperation::Minus => left - right,
            BinaryOperation::Times => left * right,
            BinaryOperation::Divide => left / right,
        }
    }
}

impl Display for BinaryOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Node {
    /// Create an operation node from two operands.
    pub fn binary<L, R>(op: BinaryOperation, left: L, right: R) -> Self
    where
        L: Into<Rc<Node>>,
        R: Into<Rc<Node>>,
    {
        Node::Binary {
            left: left.into(),
            right: right.into(),
            op,
        }
    }

    pub fn evaluate(&self) -> Result<f64> {
        match self {
            Node::Term(term) => term.evaluate(),
            Node::Binary { left, right, op } => {
                let left = left.evaluate().map_err(|e| operand(Side::Left, e))?;
                let right =
                    right.evaluate().map_err(|e| operand(Side::Right, e))?;

                Ok(op.apply(left, right))
            },
        }
    }

    pub fn render(&self) -> String { self.to_string() }

    /// Every variable used by this node, in the order they appear.
    ///
    /// Variables used more than once are only reported the first time.
    pub fn variables(&self) -> Vec<Term> {
        let mut variables = Vec::new();
        self.collect_variables(&mut variables);
        variables
    }

    fn collect_variables(&self, variables: &mut Vec<Term>) {
        match self {
            Node::Term(term) => {
                if term.is_variable() && !variables.contains(term) {
                    variables.push(term.clone());
                }
            },
            Node::Binary { left, right, .. } => {
                left.collect_variables(variables);
                right.collect_variables(variables);
            },
        }
    }
}

fn operand(side: Side, inner: ExpressionError) -> ExpressionError {
    ExpressionError::Operand {
        side,
        inner: Box::new(inner),
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Node::Term(term) => write!(f, "{}", term),
            Node::Binary { left, right, op } => {
                write!(f, "({} {} {})", left, op, right)
            },
        }
    }
}

impl From<Term> for Node {
    fn from(term: Term) -> Node { Node::Term(term) }
}

impl From<Term> for Rc<Node> {
    fn from(term: Term) -> Rc<Node> { Rc::new(Node::Term(term)) }
}

// operator overloads make it easy to build standalone operation nodes.

impl<R: Into<Rc<Node>>> Add<R> for Node {
    type Output = Node;

    fn add(self, rhs: R) -> Node {
        Node::binary(BinaryOperation::Plus, self, rhs)
    }
}

impl<R: Into<Rc<Node>>> Sub<R> for Node {
    type Output = Node;

    fn sub(self, rhs: R) -> Node {
        Node::binary(BinaryOperation::Minus, self, rhs)
    }
}

impl<R: Into<Rc<Node>>> Mul<R> for Node {
    type Output = Node;

    fn mul(self, rhs: R) -> Node {
        Node::binary(BinaryOperation::Times, self, rhs)
    }
}

impl<R: Into<Rc<Node>>> Div<R> for Node {
    type Output = Node;

    fn div(self, rhs: R) -> Node {
        Node::binary(BinaryOperation::Divide, self, rhs)
    }
}
