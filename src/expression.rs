use crate::{
    error::{ExpressionError, Result},
    node::{BinaryOperation, Node},
    number::IntoNumber,
    term::Term,
};
use log::{debug, trace};
use smol_str::SmolStr;
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// A builder which incrementally grows an expression tree by grafting new
/// operations onto its current root.
///
/// # Examples
///
/// ```rust
/// use arith_expr::{Expression, Operand};
///
/// let mut expr = Expression::new();
/// let one = expr.new_constant(1, 0)?;
/// let pi = expr.new_constant(3.14, 2)?;
///
/// expr.add_addition(one, pi)?;
/// assert_eq!(expr.render(), "(1 + 3.14)");
///
/// let x = expr.new_variable("x", 0)?;
/// expr.add_multiplication(Operand::Root, x.clone())?;
/// assert_eq!(expr.render(), "((1 + 3.14) * x)");
/// assert!(expr.evaluate().is_err());
///
/// x.set_value(2)?;
/// assert_eq!(expr.render(), "((1 + 3.14) * 2)");
/// assert!((expr.evaluate()? - 8.28).abs() < 1e-9);
/// # Ok::<(), arith_expr::ExpressionError>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct Expression {
    root: Option<Rc<Node>>,
    variables: HashMap<SmolStr, Term>,
}

/// One side of an operation being added to an [`Expression`].
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    /// Whatever the expression's root currently is.
    Root,
    Term(Term),
    Node(Rc<Node>),
    /// Another expression's root. Its variables get merged in too.
    Expression(&'a Expression),
}

impl<'a> Operand<'a> {
    fn is_root(&self) -> bool { matches!(self, Operand::Root) }
}

impl Expression {
    pub fn new() -> Self { Expression::default() }

    /// Create an anonymous constant. Constants aren't tracked by the
    /// expression.
    pub fn new_constant<N: IntoNumber>(
        &self,
        value: N,
        precision: i32,
    ) -> Result<Term> {
        Term::constant(value, precision)
    }

    /// Declare a new, unbound variable.
    pub fn new_variable<S: Into<SmolStr>>(
        &mut self,
        label: S,
        precision: i32,
    ) -> Result<Term> {
        let label = label.into();

        if self.variables.contains_key(&label) {
            return Err(ExpressionError::DuplicateVariable { name: label });
        }

        debug!("Declaring the \"{}\" variable", label);
        let term = Term::variable(label.clone(), precision);
        self.variables.insert(label, term.clone());

        Ok(term)
    }

    pub fn add_addition<'o, L, R>(&mut self, left: L, right: R) -> Result<()>
    where
        L: Into<Operand<'o>>,
        R: Into<Operand<'o>>,
    {
        self.add_operation(BinaryOperation::Plus, left, right)
    }

    pub fn add_subtraction<'o, L, R>(
        &mut self,
        left: L,
        right: R,
    ) -> Result<()>
    where
        L: Into<Operand<'o>>,
        R: Into<Operand<'o>>,
    {
        self.add_operation(BinaryOperation::Minus, left, right)
    }

    pub fn add_multiplication<'o, L, R>(
        &mut self,
        left: L,
        right: R,
    ) -> Result<()>
    where
        L: Into<Operand<'o>>,
        R: Into<Operand<'o>>,
    {
        self.add_operation(BinaryOperation::Times, left, right)
    }

    pub fn add_division<'o, L, R>(&mut self, left: L, right: R) -> Result<()>
    where
        L: Into<Operand<'o>>,
        R: Into<Operand<'o>>,
    {
        self.add_operation(BinaryOperation::Divide, left, right)
    }

    /// Replace the root with a new operation node.
    ///
    /// Either operand may be [`Operand::Root`] to refer to the current root.
    /// When an operand is another [`Expression`], its variables are merged
    /// into this one. If anything goes wrong the expression is left exactly
    /// as it was.
    pub fn add_operation<'o, L, R>(
        &mut self,
        op: BinaryOperation,
        left: L,
        right: R,
    ) -> Result<()>
    where
        L: Into<Operand<'o>>,
        R: Into<Operand<'o>>,
    {
        let left = left.into();
        let right = right.into();

        if self.root.is_none() && (left.is_root() || right.is_root()) {
            return Err(ExpressionError::EmptyRootReference);
        }
        if left.is_root() && right.is_root() {
            return Err(ExpressionError::InvalidOperands);
        }

        let left_node = self.resolve(&left)?;
        let right_node = self.resolve(&right)?;
        let staged = self.stage_variables(&[&left, &right])?;

        // nothing can fail from here on
        self.variables.extend(staged);
        let node = Node::Binary {
            left: left_node,
            right: right_node,
            op,
        };
        debug!("Grafted a new root, {}", node);
        self.root = Some(Rc::new(node));

        Ok(())
    }

    fn resolve(&self, operand: &Operand<'_>) -> Result<Rc<Node>> {
        match operand {
            Operand::Root => self.root.clone(),
            Operand::Term(term) => Some(Rc::new(Node::Term(term.clone()))),
            Operand::Node(node) => Some(Rc::clone(node)),
            Operand::Expression(other) => other.root.clone(),
        }
        .ok_or(ExpressionError::EmptyRootReference)
    }

    /// Work out which variables need to be added to make the operands'
    /// variables available, without touching our own variables.
    fn stage_variables(
        &self,
        operands: &[&Operand<'_>],
    ) -> Result<HashMap<SmolStr, Term>> {
        let mut staged: HashMap<SmolStr, Term> = HashMap::new();

        for operand in operands {
            let other = match operand {
                Operand::Expression(other) => other,
                _ => continue,
            };

            for (name, term) in &other.variables {
                let existing =
                    self.variables.get(name).or_else(|| staged.get(name));

                match existing {
                    Some(existing) if existing.ptr_eq(term) => {
                        trace!("\"{}\" is already shared", name);
                    },
                    Some(_) => {
                        return Err(ExpressionError::DuplicateVariable {
                            name: name.clone(),
                        });
                    },
                    None => {
                        trace!("Staging the \"{}\" variable", name);
                        staged.insert(name.clone(), term.clone());
                    },
                }
            }
        }

        Ok(staged)
    }

    /// The expression's text form, empty if no operations have been added
    /// yet.
    pub fn render(&self) -> String { self.to_string() }

    pub fn evaluate(&self) -> Result<f64> {
        let root = self
            .root
            .as_ref()
            .ok_or(ExpressionError::EmptyRootReference)?;

        root.evaluate().map_err(|e| ExpressionError::Evaluation {
            expression: root.render(),
            inner: Box::new(e),
        })
    }

    pub fn is_empty(&self) -> bool { self.root.is_none() }

    pub fn root(&self) -> Option<&Rc<Node>> { self.root.as_ref() }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Term> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Term)> + '_ {
        self.variables
            .iter()
            .map(|(name, term)| (name.as_str(), term))
    }

    /// All known variables that don't have a value yet, sorted by name.
    pub fn unbound_variables(&self) -> Vec<&Term> {
        let mut unbound: Vec<_> = self
            .variables
            .iter()
            .filter(|(_, term)| !term.is_set())
            .collect();
        unbound.sort_by(|(left, _), (right, _)| left.cmp(right));

        unbound.into_iter().map(|(_, term)| term).collect()
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{}", root),
            None => Ok(()),
        }
    }
}

impl<'a> From<Term> for Operand<'a> {
    fn from(term: Term) -> Operand<'a> { Operand::Term(term) }
}

impl<'a> From<&Term> for Operand<'a> {
    fn from(term: &Term) -> Operand<'a> { Operand::Term(term.clone()) }
}

impl<'a> From<Node> for Operand<'a> {
    fn from(node: Node) -> Operand<'a> { Operand::Node(Rc::new(node)) }
}

impl<'a> From<Rc<Node>> for Operand<'a> {
    fn from(node: Rc<Node>) -> Operand<'a> { Operand::Node(node) }
}

impl<'a> From<&'a Expression> for Operand<'a> {
    fn from(expr: &'a Expression) -> Operand<'a> { Operand::Expression(expr) }
}

/// `None` refers to the current root.
impl<'a, T: Into<Operand<'a>>> From<Option<T>> for Operand<'a> {
    fn from(operand: Option<T>) -> Operand<'a> {
        match operand {
            Some(operand) => operand.into(),
            None => Operand::Root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_log::test;

    #[test]
    fn new_expressions_are_empty() {
        let expr = Expression::new();

        assert!(expr.is_empty());
        assert_eq!(expr.render(), "");
        assert_eq!(
            expr.evaluate().unwrap_err(),
            ExpressionError::EmptyRootReference
        );
    }

    #[test]
    fn constants_are_not_registered() {
        let expr = Expression::new();

        let c = expr.new_constant(5, 0).unwrap();

        assert_eq!(c.render(), "5");
        assert_eq!(expr.variables().count(), 0);
    }

    #[test]
    fn declare_the_same_variable_twice() {
        let mut expr = Expression::new();
        let x = expr.new_variable("x", 0).unwrap();

        let got = expr.new_variable("x", 2).unwrap_err();

        assert_eq!(
            got,
            ExpressionError::DuplicateVariable { name: "x".into() }
        );
        assert!(expr.variable("x").unwrap().ptr_eq(&x));
    }

    #[test]
    fn referring_to_an_empty_root() {
        let mut expr = Expression::new();
        let c = expr.new_constant(1, 0).unwrap();

        let got = expr.add_addition(Operand::Root, c.clone()).unwrap_err();
        assert_eq!(got, ExpressionError::EmptyRootReference);

        let got = expr.add_addition(c, Operand::Root).unwrap_err();
        assert_eq!(got, ExpressionError::EmptyRootReference);

        let got = expr
            .add_addition(Operand::Root, Operand::Root)
            .unwrap_err();
        assert_eq!(got, ExpressionError::EmptyRootReference);
        assert!(expr.is_empty());
    }

    #[test]
    fn both_operands_cant_be_the_root() {
        let mut expr = Expression::new();
        let a = expr.new_constant(1, 0).unwrap();
        let b = expr.new_constant(2, 0).unwrap();
        expr.add_addition(a, b).unwrap();

        let got = expr.add_addition(None::<Term>, None::<Term>).unwrap_err();

        assert_eq!(got, ExpressionError::InvalidOperands);
        assert_eq!(expr.render(), "(1 + 2)");
    }

    #[test]
    fn graft_onto_either_side_of_the_root() {
        let mut expr = Expression::new();
        let a = expr.new_constant(1, 0).unwrap();
        let b = expr.new_constant(2, 0).unwrap();
        let c = expr.new_constant(3, 0).unwrap();
        let d = expr.new_constant(4, 0).unwrap();

        expr.add_addition(a, b).unwrap();
        expr.add_multiplication(Operand::Root, c).unwrap();
        expr.add_division(d, Operand::Root).unwrap();

        assert_eq!(expr.render(), "(4 / ((1 + 2) * 3))");
        assert_relative_eq!(expr.evaluate().unwrap(), 4.0 / 9.0);
    }

    #[test]
    fn standalone_nodes_can_be_used_as_operands() {
        let mut expr = Expression::new();
        let x = expr.new_variable("x", 0).unwrap();
        let two = expr.new_constant(2, 0).unwrap();
        let node = Node::from(x.clone()) * two.clone();

        expr.add_subtraction(node, &two).unwrap();
        x.set_value(5).unwrap();

        assert_eq!(expr.render(), "((5 * 2) - 2)");
        assert_eq!(expr.evaluate().unwrap(), 8.0);
    }

    #[test]
    fn evaluation_errors_include_the_whole_expression() {
        let mut expr = Expression::new();
        let x = expr.new_variable("x", 0).unwrap();
        let one = expr.new_constant(1, 0).unwrap();
        expr.add_addition(one, x).unwrap();

        let got = expr.evaluate().unwrap_err();

        match &got {
            ExpressionError::Evaluation { expression, .. } => {
                assert_eq!(expression, "(1 + x)")
            },
            other => panic!("Unexpected error: {:?}", other),
        }
        assert_eq!(
            got.root_cause(),
            &ExpressionError::UnboundVariable { label: "x".into() }
        );
        assert!(got.to_string().contains("right operand evaluation failed"));
    }

    #[test]
    fn merge_expressions_with_distinct_variables() {
        let mut first = Expression::new();
        let x = first.new_variable("x", 0).unwrap();
        let one = first.new_constant(1, 0).unwrap();
        first.add_addition(x.clone(), one).unwrap();

        let mut second = Expression::new();
        let y = second.new_variable("y", 0).unwrap();
        let two = second.new_constant(2, 0).unwrap();
        second.add_multiplication(y.clone(), two).unwrap();

        first.add_division(Operand::Root, &second).unwrap();

        assert_eq!(first.render(), "((x + 1) / (y * 2))");
        assert!(first.variable("y").unwrap().ptr_eq(&y));
        let unbound: Vec<_> =
            first.unbound_variables().iter().map(|t| t.label()).collect();
        assert_eq!(unbound, vec![SmolStr::from("x"), SmolStr::from("y")]);

        x.set_value(3).unwrap();
        y.set_value(1).unwrap();
        assert_eq!(first.evaluate().unwrap(), 2.0);
    }

    #[test]
    fn merging_the_same_variable_instance_is_fine() {
        let mut first = Expression::new();
        let x = first.new_variable("x", 0).unwrap();
        let one = first.new_constant(1, 0).unwrap();
        first.add_addition(x.clone(), one).unwrap();

        let mut second = Expression::new();
        second.add_operation(BinaryOperation::Times, &first, &x).unwrap();

        let mut combined = Expression::new();
        combined.add_subtraction(&second, &first).unwrap();

        assert_eq!(combined.render(), "(((x + 1) * x) - (x + 1))");
        assert!(combined.variable("x").unwrap().ptr_eq(&x));
        x.set_value(2).unwrap();
        assert_eq!(combined.evaluate().unwrap(), 3.0);
    }

    #[test]
    fn merging_a_different_variable_with_the_same_name_fails() {
        let mut first = Expression::new();
        let x = first.new_variable("x", 0).unwrap();
        let one = first.new_constant(1, 0).unwrap();
        first.add_addition(x, one).unwrap();

        let mut second = Expression::new();
        let other_x = second.new_variable("x", 0).unwrap();
        let two = second.new_constant(2, 0).unwrap();
        second.add_addition(other_x, two).unwrap();

        let got = first
            .add_multiplication(Operand::Root, &second)
            .unwrap_err();

        assert_eq!(
            got,
            ExpressionError::DuplicateVariable { name: "x".into() }
        );
        assert_eq!(first.render(), "(x + 1)");
    }

    #[test]
    fn failed_merges_leave_the_variables_alone() {
        let mut left = Expression::new();
        let a = left.new_variable("a", 0).unwrap();
        let x = left.new_variable("x", 0).unwrap();
        left.add_addition(a, x).unwrap();

        let mut right = Expression::new();
        let b = right.new_variable("b", 0).unwrap();
        let other_x = right.new_variable("x", 0).unwrap();
        right.add_addition(b, other_x).unwrap();

        let mut expr = Expression::new();
        let got = expr.add_multiplication(&left, &right).unwrap_err();

        assert_eq!(
            got,
            ExpressionError::DuplicateVariable { name: "x".into() }
        );
        assert!(expr.is_empty());
        assert_eq!(expr.variables().count(), 0);
    }

    #[test]
    fn empty_expressions_cant_be_used_as_operands() {
        let mut expr = Expression::new();
        let c = expr.new_constant(1, 0).unwrap();
        let empty = Expression::new();

        let got = expr.add_addition(c, &empty).unwrap_err();

        assert_eq!(got, ExpressionError::EmptyRootReference);
        assert!(expr.is_empty());
    }
}
