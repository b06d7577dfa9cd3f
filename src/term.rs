use crate::{
    error::{ExpressionError, Result},
    number::{self, IntoNumber},
};
use smol_str::SmolStr;
use std::{
    cell::RefCell,
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// A leaf in the expression tree, either a constant or a (possibly unbound)
/// variable.
///
/// A [`Term`] is a cheap handle. Cloning it gives you another reference to
/// the same underlying value, so giving a variable a value will be seen by
/// every expression that uses it.
///
/// Terms use `Rc` internally and can't be sent to another thread.
#[derive(Debug, Clone)]
pub struct Term(Rc<RefCell<TermState>>);

#[derive(Debug)]
struct TermState {
    label: SmolStr,
    value: f64,
    is_set: bool,
    precision: usize,
}

impl Term {
    /// Create a term which already has a value.
    pub fn constant<N: IntoNumber>(value: N, precision: i32) -> Result<Self> {
        let number = value.into_number()?;

        Ok(Term::from_state(TermState {
            label: SmolStr::default(),
            value: number.value(),
            is_set: true,
            precision: number::clamp_precision(precision),
        }))
    }

    /// Create a variable which doesn't have a value yet.
    ///
    /// This doesn't register the variable anywhere, you probably want
    /// [`Expression::new_variable()`](crate::Expression::new_variable).
    pub fn variable<S: Into<SmolStr>>(label: S, precision: i32) -> Self {
        Term::from_state(TermState {
            label: label.into(),
            value: 0.0,
            is_set: false,
            precision: number::clamp_precision(precision),
        })
    }

    fn from_state(state: TermState) -> Self {
        Term(Rc::new(RefCell::new(state)))
    }

    /// Give this term a value, displaying it with the default precision for
    /// that sort of number (0 for integers, 2 for floats).
    pub fn set_value<N: IntoNumber>(&self, value: N) -> Result<()> {
        let number = value.into_number()?;
        self.store(number.value(), number.default_precision());
        Ok(())
    }

    /// Give this term a value which should be displayed with a particular
    /// number of fractional digits.
    pub fn set_value_with_precision<N: IntoNumber>(
        &self,
        value: N,
        precision: i32,
    ) -> Result<()> {
        let number = value.into_number()?;
        self.store(number.value(), number::clamp_precision(precision));
        Ok(())
    }

    fn store(&self, value: f64, precision: usize) {
        let mut state = self.0.borrow_mut();
        state.value = value;
        state.is_set = true;
        state.precision = precision;
    }

    /// Forget the term's value. The old value is kept around, it just won't
    /// be used until the term is set again.
    pub fn unset_value(&self) { self.0.borrow_mut().is_set = false; }

    pub fn evaluate(&self) -> Result<f64> {
        let state = self.0.borrow();

        if state.is_set {
            Ok(state.value)
        } else {
            Err(ExpressionError::UnboundVariable {
                label: state.label.clone(),
            })
        }
    }

    pub fn render(&self) -> String { self.to_string() }

    /// The variable's name, empty for constants.
    pub fn label(&self) -> SmolStr { self.0.borrow().label.clone() }

    pub fn value(&self) -> Option<f64> {
        let state = self.0.borrow();

        if state.is_set {
            Some(state.value)
        } else {
            None
        }
    }

    pub fn is_set(&self) -> bool { self.0.borrow().is_set }

    pub fn is_variable(&self) -> bool { !self.0.borrow().label.is_empty() }

    pub fn precision(&self) -> usize { self.0.borrow().precision }

    /// Do these two handles refer to the same term?
    pub fn ptr_eq(&self, other: &Term) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.0.borrow();

        if state.is_set {
            write!(f, "{:.*}", state.precision, state.value)
        } else {
            write!(f, "{}", state.label)
        }
    }
}

/// Terms are equal when they are the same instance.
impl PartialEq for Term {
    fn eq(&self, other: &Term) -> bool { self.ptr_eq(other) }
}
