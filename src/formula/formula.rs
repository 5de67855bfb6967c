use std::{fmt::Display, rc::Rc};

/// A shared reference to a formula node.
///
/// Sub-formulas may be shared by several parents;
/// algorithms walking formulas use the node address as its identity.
pub type FormulaRef = Rc<Formula>;

/// The kind of a quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Universal quantifier
    Forall,
    /// Existential quantifier
    Exists,
}

/// A boolean formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// A constant.
    Const(bool),
    /// A free boolean variable, given by its name.
    Var(String),
    /// A negation.
    Not(FormulaRef),
    /// A conjunction; an empty conjunction is true.
    And(Vec<FormulaRef>),
    /// A disjunction; an empty disjunction is false.
    Or(Vec<FormulaRef>),
    /// An implication.
    Implies(FormulaRef, FormulaRef),
    /// An equivalence.
    Iff(FormulaRef, FormulaRef),
    /// An exclusive disjunction.
    Xor(FormulaRef, FormulaRef),
    /// An if-then-else.
    Ite(FormulaRef, FormulaRef, FormulaRef),
    /// A quantified formula over boolean variables.
    Quantified(Quantifier, Vec<String>, FormulaRef),
    /// A variable bound by an enclosing quantifier.
    Bound(String),
}

impl Formula {
    /// Builds a free variable.
    pub fn var<S>(name: S) -> FormulaRef
    where
        S: Into<String>,
    {
        Rc::new(Formula::Var(name.into()))
    }

    /// Builds a constant.
    pub fn constant(b: bool) -> FormulaRef {
        Rc::new(Formula::Const(b))
    }

    /// Builds the negation of a formula.
    pub fn not(f: FormulaRef) -> FormulaRef {
        Rc::new(Formula::Not(f))
    }

    /// Builds a conjunction.
    pub fn and(fs: Vec<FormulaRef>) -> FormulaRef {
        Rc::new(Formula::And(fs))
    }

    /// Builds a disjunction.
    pub fn or(fs: Vec<FormulaRef>) -> FormulaRef {
        Rc::new(Formula::Or(fs))
    }

    /// Builds an implication.
    pub fn implies(premise: FormulaRef, conclusion: FormulaRef) -> FormulaRef {
        Rc::new(Formula::Implies(premise, conclusion))
    }

    /// Builds an equivalence.
    pub fn iff(left: FormulaRef, right: FormulaRef) -> FormulaRef {
        Rc::new(Formula::Iff(left, right))
    }

    /// Builds an exclusive disjunction.
    pub fn xor(left: FormulaRef, right: FormulaRef) -> FormulaRef {
        Rc::new(Formula::Xor(left, right))
    }

    /// Builds an if-then-else.
    pub fn ite(cond: FormulaRef, then: FormulaRef, otherwise: FormulaRef) -> FormulaRef {
        Rc::new(Formula::Ite(cond, then, otherwise))
    }

    /// Returns the direct sub-formulas of this formula.
    pub fn children(&self) -> Vec<&FormulaRef> {
        match self {
            Formula::Const(_) | Formula::Var(_) | Formula::Bound(_) => vec![],
            Formula::Not(f) | Formula::Quantified(_, _, f) => vec![f],
            Formula::And(fs) | Formula::Or(fs) => fs.iter().collect(),
            Formula::Implies(a, b) | Formula::Iff(a, b) | Formula::Xor(a, b) => vec![a, b],
            Formula::Ite(a, b, c) => vec![a, b, c],
        }
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let write_app = |f: &mut std::fmt::Formatter<'_>, op: &str, args: &[&FormulaRef]| {
            write!(f, "({}", op)?;
            for a in args {
                write!(f, " {}", a)?;
            }
            write!(f, ")")
        };
        match self {
            Formula::Const(b) => write!(f, "{}", b),
            Formula::Var(name) | Formula::Bound(name) => write!(f, "{}", name),
            Formula::Not(_) => write_app(f, "not", &self.children()),
            Formula::And(fs) if fs.is_empty() => write!(f, "true"),
            Formula::And(_) => write_app(f, "and", &self.children()),
            Formula::Or(fs) if fs.is_empty() => write!(f, "false"),
            Formula::Or(_) => write_app(f, "or", &self.children()),
            Formula::Implies(_, _) => write_app(f, "=>", &self.children()),
            Formula::Iff(_, _) => write_app(f, "=", &self.children()),
            Formula::Xor(_, _) => write_app(f, "xor", &self.children()),
            Formula::Ite(_, _, _) => write_app(f, "ite", &self.children()),
            Formula::Quantified(q, names, body) => {
                let q = match q {
                    Quantifier::Forall => "forall",
                    Quantifier::Exists => "exists",
                };
                let bindings = names
                    .iter()
                    .map(|n| format!("({} Bool)", n))
                    .collect::<Vec<String>>()
                    .join(" ");
                write!(f, "({} ({}) {})", q, bindings, body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let a = Formula::var("el1");
        let b = Formula::var("e2");
        let f = Formula::implies(a.clone(), Formula::not(Formula::or(vec![b, a])));
        assert_eq!("(=> el1 (not (or e2 el1)))", f.to_string());
    }

    #[test]
    fn test_display_empty_connectives() {
        assert_eq!("true", Formula::and(vec![]).to_string());
        assert_eq!("false", Formula::or(vec![]).to_string());
    }

    #[test]
    fn test_display_quantifier() {
        let f = Rc::new(Formula::Quantified(
            Quantifier::Exists,
            vec!["x".to_string()],
            Formula::or(vec![
                Rc::new(Formula::Bound("x".to_string())),
                Formula::var("el1"),
            ]),
        ));
        assert_eq!("(exists ((x Bool)) (or x el1))", f.to_string());
    }

    #[test]
    fn test_children() {
        let f = Formula::ite(
            Formula::var("a"),
            Formula::var("b"),
            Formula::constant(false),
        );
        assert_eq!(3, f.children().len());
        assert!(Formula::var("a").children().is_empty());
    }
}
