use super::CoverInstance;
use crate::{
    formula::{Formula, FormulaRef},
    sat::{Literal, OptimizationOracle, SolvingSession},
    utils::CoverError,
};
use std::{collections::HashMap, rc::Rc};

/// The translation of a [`CoverInstance`] into CNF.
///
/// Named variables are mapped to solver variables in the order they are met;
/// the subformulas that cannot be flattened into clauses are given auxiliary variables (Tseitin encoding).
/// Auxiliary variables only encode the implication from the variable to the subformula it names,
/// in the polarity the subformula occurs with (Plaisted-Greenbaum), which preserves satisfiability
/// and the set of models when projected on named variables.
///
/// Subformulas reached more than once, and the complex operands of equivalences, exclusive disjunctions
/// and if-then-else terms, are always named, so the size of the CNF stays linear in the size of the formula DAG.
/// Clauses, implications, negations of disjunctions and equivalences between named variables
/// produce no auxiliary variables at all.
///
/// # Example
///
/// ```
/// # use escover::events::{Event, EventStructure};
/// # use escover::encodings::{CnfEncoding, CoverInstance};
/// let structure = EventStructure::new_with_events(vec![
///     Event::new(1, vec![], vec![]),
///     Event::new(2, vec![1], vec![]),
/// ]).unwrap();
/// let instance = CoverInstance::from_event_structure(&structure);
/// let encoding = CnfEncoding::new(&instance).unwrap();
/// assert_eq!(2, encoding.n_vars());
/// assert_eq!(1, encoding.clauses().len());
/// ```
#[derive(Debug, Clone)]
pub struct CnfEncoding {
    clauses: Vec<Vec<Literal>>,
    leaf_literals: Vec<Literal>,
    var_ids: HashMap<String, usize>,
    var_names: Vec<String>,
    n_vars: usize,
}

impl CnfEncoding {
    /// Translates an instance into CNF.
    ///
    /// Quantified formulas are not supported and lead to an [`CoverError::UnsupportedExpression`] error.
    pub fn new(instance: &CoverInstance) -> Result<Self, CoverError> {
        let mut builder = CnfBuilder::default();
        builder.count_occurrences(instance.constraints().iter());
        for assertion in instance.constraints().iter() {
            builder.assert_under(vec![], assertion, true)?;
        }
        let leaf_literals = instance
            .leaf_vars()
            .iter()
            .map(|v| builder.named_literal(&v.name()))
            .collect();
        Ok(Self {
            clauses: builder.clauses,
            leaf_literals,
            var_ids: builder.var_ids,
            var_names: builder.var_names,
            n_vars: builder.n_vars,
        })
    }

    /// Returns the clauses.
    pub fn clauses(&self) -> &[Vec<Literal>] {
        &self.clauses
    }

    /// Returns the literals of the leaf variables, in the order of the instance.
    pub fn leaf_literals(&self) -> &[Literal] {
        &self.leaf_literals
    }

    /// Returns the number of variables, including the auxiliary ones.
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Returns the number of variables bound to a name.
    pub fn n_named_vars(&self) -> usize {
        self.var_names.len()
    }

    /// Returns the names of the named variables, in the order they were met.
    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    /// Returns the positive literal of a named variable, if the name occurs in the instance.
    pub fn named_literal(&self, name: &str) -> Option<Literal> {
        self.var_ids.get(name).map(|v| Literal::from(*v as isize))
    }

    /// Adds the clauses to a solving session, in its current scope.
    pub fn load_into_session(&self, session: &mut SolvingSession) {
        session.reserve(self.n_vars);
        self.clauses
            .iter()
            .for_each(|cl| session.add_clause(cl.clone()));
    }

    /// Adds the clauses to an optimization oracle as hard clauses.
    pub fn load_into_oracle(&self, oracle: &mut dyn OptimizationOracle) {
        oracle.reserve(self.n_vars);
        self.clauses
            .iter()
            .for_each(|cl| oracle.add_hard_clause(cl.clone()));
    }
}

#[derive(Default)]
struct CnfBuilder {
    clauses: Vec<Vec<Literal>>,
    var_ids: HashMap<String, usize>,
    var_names: Vec<String>,
    n_vars: usize,
    aux_literals: HashMap<(*const Formula, bool), Literal>,
    occurrences: HashMap<*const Formula, usize>,
}

enum Flattened {
    Const(bool),
    Lit(Literal),
    Complex(FormulaRef, bool),
}

impl CnfBuilder {
    fn named_literal(&mut self, name: &str) -> Literal {
        if let Some(v) = self.var_ids.get(name) {
            return Literal::from(*v as isize);
        }
        let v = self.new_var();
        self.var_ids.insert(name.to_string(), v);
        self.var_names.push(name.to_string());
        Literal::from(v as isize)
    }

    fn new_var(&mut self) -> usize {
        self.n_vars += 1;
        self.n_vars
    }

    fn add_clause(&mut self, cl: Vec<Literal>) {
        if cl.iter().any(|l| cl.contains(&l.negate())) {
            return;
        }
        self.clauses.push(cl);
    }

    // Counts the parents of each node of the DAG; roots count as one occurrence per assertion.
    fn count_occurrences<'a>(&mut self, roots: impl Iterator<Item = &'a FormulaRef>) {
        let mut to_visit = Vec::new();
        for root in roots {
            if self.increment_occurrences(root) == 1 {
                to_visit.push(root.clone());
            }
        }
        while let Some(f) = to_visit.pop() {
            for child in f.children() {
                if self.increment_occurrences(child) == 1 {
                    to_visit.push(child.clone());
                }
            }
        }
    }

    fn increment_occurrences(&mut self, f: &FormulaRef) -> usize {
        let n = self.occurrences.entry(Rc::as_ptr(f)).or_insert(0);
        *n += 1;
        *n
    }

    fn is_shared(&self, f: &FormulaRef) -> bool {
        self.occurrences
            .get(&Rc::as_ptr(f))
            .map(|n| *n > 1)
            .unwrap_or(false)
    }

    // Adds clauses stating that the disjunction of `prefix` and `f` (or `not f`) holds.
    fn assert_under(
        &mut self,
        mut prefix: Vec<Literal>,
        f: &FormulaRef,
        positive: bool,
    ) -> Result<(), CoverError> {
        if self.is_shared(f) && is_complex(f) {
            let aux = self.aux_literal(f, positive)?;
            prefix.push(aux);
            self.add_clause(prefix);
            return Ok(());
        }
        self.expand(prefix, f, positive)
    }

    fn expand(&mut self, prefix: Vec<Literal>, f: &FormulaRef, positive: bool) -> Result<(), CoverError> {
        match (f.as_ref(), positive) {
            (Formula::Const(_), _) | (Formula::Var(_), _) => {
                self.assert_disjunction(prefix, vec![(f.clone(), positive)], true)
            }
            (Formula::Not(g), _) => self.assert_under(prefix, g, !positive),
            (Formula::And(fs), true) | (Formula::Or(fs), false) => {
                for g in fs {
                    self.assert_under(prefix.clone(), g, positive)?;
                }
                Ok(())
            }
            (Formula::And(fs), false) | (Formula::Or(fs), true) => {
                let disjuncts = fs.iter().map(|g| (g.clone(), positive)).collect();
                self.assert_disjunction(prefix, disjuncts, true)
            }
            (Formula::Implies(a, b), true) => {
                self.assert_disjunction(prefix, vec![(a.clone(), false), (b.clone(), true)], true)
            }
            (Formula::Implies(a, b), false) => {
                self.assert_under(prefix.clone(), a, true)?;
                self.assert_under(prefix, b, false)
            }
            (Formula::Iff(a, b), true) | (Formula::Xor(a, b), false) => {
                self.assert_disjunction(prefix.clone(), vec![(a.clone(), false), (b.clone(), true)], false)?;
                self.assert_disjunction(prefix, vec![(a.clone(), true), (b.clone(), false)], false)
            }
            (Formula::Iff(a, b), false) | (Formula::Xor(a, b), true) => {
                self.assert_disjunction(prefix.clone(), vec![(a.clone(), true), (b.clone(), true)], false)?;
                self.assert_disjunction(prefix, vec![(a.clone(), false), (b.clone(), false)], false)
            }
            (Formula::Ite(c, t, e), _) => {
                self.assert_disjunction(prefix.clone(), vec![(c.clone(), false), (t.clone(), positive)], false)?;
                self.assert_disjunction(prefix, vec![(c.clone(), true), (e.clone(), positive)], false)
            }
            (Formula::Quantified(_, _, _), _) | (Formula::Bound(_), _) => {
                Err(CoverError::UnsupportedExpression(f.to_string()))
            }
        }
    }

    // Adds clauses stating that the disjunction of `prefix` and the (possibly negated) formulas holds.
    // When `inline_first` is set, the first complex formula is handled recursively;
    // all the other ones are named by auxiliary variables.
    fn assert_disjunction(
        &mut self,
        mut prefix: Vec<Literal>,
        disjuncts: Vec<(FormulaRef, bool)>,
        inline_first: bool,
    ) -> Result<(), CoverError> {
        let mut deferred = None;
        for (g, positive) in disjuncts {
            match self.flatten(&g, positive) {
                Flattened::Const(true) => return Ok(()),
                Flattened::Const(false) => {}
                Flattened::Lit(l) => prefix.push(l),
                Flattened::Complex(h, p) => {
                    if inline_first && deferred.is_none() {
                        deferred = Some((h, p));
                    } else {
                        let aux = self.aux_literal(&h, p)?;
                        prefix.push(aux);
                    }
                }
            }
        }
        match deferred {
            Some((h, p)) => self.assert_under(prefix, &h, p),
            None => {
                self.add_clause(prefix);
                Ok(())
            }
        }
    }

    fn flatten(&mut self, f: &FormulaRef, positive: bool) -> Flattened {
        match f.as_ref() {
            Formula::Const(b) => Flattened::Const(*b == positive),
            Formula::Var(name) => {
                let l = self.named_literal(name);
                Flattened::Lit(if positive { l } else { l.negate() })
            }
            Formula::Not(g) => self.flatten(g, !positive),
            Formula::And(fs) if fs.is_empty() => Flattened::Const(positive),
            Formula::Or(fs) if fs.is_empty() => Flattened::Const(!positive),
            _ => Flattened::Complex(f.clone(), positive),
        }
    }

    // Returns a fresh literal implying the formula (or its negation).
    fn aux_literal(&mut self, f: &FormulaRef, positive: bool) -> Result<Literal, CoverError> {
        let key = (Rc::as_ptr(f), positive);
        if let Some(l) = self.aux_literals.get(&key) {
            return Ok(*l);
        }
        let aux = Literal::from(self.new_var() as isize);
        self.expand(vec![aux.negate()], f, positive)?;
        self.aux_literals.insert(key, aux);
        Ok(aux)
    }
}

fn is_complex(f: &FormulaRef) -> bool {
    !matches!(
        f.as_ref(),
        Formula::Const(_) | Formula::Var(_) | Formula::Not(_) | Formula::Bound(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{Event, EventStructure},
        formula::{ConstraintSystem, EventVar},
        sat::{self, SolvingResult},
    };

    fn encode(assertions: Vec<FormulaRef>, leaves: Vec<EventVar>) -> CnfEncoding {
        let mut system = ConstraintSystem::default();
        assertions.into_iter().for_each(|a| system.assert(a));
        CnfEncoding::new(&CoverInstance::new(system, leaves)).unwrap()
    }

    fn n_models(encoding: &CnfEncoding) -> usize {
        let n = encoding.n_named_vars();
        (0..1usize << n)
            .filter(|bits| {
                let named = (0..n).map(|i| bits & (1 << i) != 0).collect::<Vec<bool>>();
                is_extendable(encoding, &named)
            })
            .count()
    }

    // values are given in the order of `var_names`
    fn is_extendable(encoding: &CnfEncoding, named: &[bool]) -> bool {
        let mut session = SolvingSession::new(sat::default_solver());
        encoding.load_into_session(&mut session);
        let assumptions = named
            .iter()
            .zip(encoding.var_names())
            .map(|(b, name)| {
                let l = encoding.named_literal(name).unwrap();
                if *b {
                    l
                } else {
                    l.negate()
                }
            })
            .collect::<Vec<Literal>>();
        matches!(
            session.solve_under_assumptions(&assumptions),
            SolvingResult::Satisfiable(_)
        )
    }

    #[test]
    fn test_event_structure_needs_no_aux_vars() {
        let structure = EventStructure::new_with_events(vec![
            Event::new(1, vec![], vec![]),
            Event::new(2, vec![1], vec![]),
            Event::new(3, vec![1], vec![2]),
        ])
        .unwrap();
        let encoding = CnfEncoding::new(&CoverInstance::from_event_structure(&structure)).unwrap();
        assert_eq!(3, encoding.n_vars());
        assert_eq!(3, encoding.n_named_vars());
        assert_eq!(3, encoding.clauses().len());
        // models: {}, {1}, {1, 2}, {1, 3}
        assert_eq!(4, n_models(&encoding));
    }

    #[test]
    fn test_leaf_literals() {
        let encoding = encode(
            vec![Formula::implies(Formula::var("el2"), Formula::var("e1"))],
            vec![EventVar::new(2, true), EventVar::new(5, true)],
        );
        assert_eq!(vec![Literal::from(1), Literal::from(3)], encoding.leaf_literals());
        assert_eq!(3, encoding.n_vars());
    }

    #[test]
    fn test_constants() {
        let encoding = encode(
            vec![
                Formula::or(vec![Formula::constant(true), Formula::var("a")]),
                Formula::or(vec![Formula::constant(false), Formula::var("b")]),
            ],
            vec![],
        );
        assert_eq!(vec![vec![Literal::from(1)]], encoding.clauses());
    }

    #[test]
    fn test_false_assertion() {
        let encoding = encode(vec![Formula::constant(false)], vec![]);
        assert_eq!(vec![Vec::<Literal>::new()], encoding.clauses());
    }

    #[test]
    fn test_xor() {
        let encoding = encode(
            vec![Formula::xor(Formula::var("a"), Formula::var("b"))],
            vec![],
        );
        assert_eq!(2, n_models(&encoding));
        assert!(is_extendable(&encoding, &[true, false]));
        assert!(!is_extendable(&encoding, &[true, true]));
    }

    #[test]
    fn test_ite() {
        let encoding = encode(
            vec![Formula::ite(
                Formula::var("c"),
                Formula::var("t"),
                Formula::var("e"),
            )],
            vec![],
        );
        assert_eq!(4, n_models(&encoding));
        assert!(is_extendable(&encoding, &[true, true, false]));
        assert!(!is_extendable(&encoding, &[true, false, true]));
    }

    #[test]
    fn test_nested_disjunction_uses_aux_vars() {
        let a = Formula::var("a");
        let b = Formula::var("b");
        let c = Formula::var("c");
        let d = Formula::var("d");
        let encoding = encode(
            vec![Formula::or(vec![
                Formula::and(vec![a, b]),
                Formula::and(vec![c, d]),
            ])],
            vec![],
        );
        assert_eq!(4, encoding.n_named_vars());
        assert_eq!(5, encoding.n_vars());
        assert_eq!(7, n_models(&encoding));
    }

    #[test]
    fn test_shared_subformula_is_named_once() {
        let shared = Formula::and(vec![Formula::var("a"), Formula::var("b")]);
        let other = Formula::and(vec![Formula::var("c"), Formula::var("d")]);
        let encoding = encode(
            vec![
                Formula::or(vec![other.clone(), shared.clone()]),
                Formula::or(vec![other, shared]),
            ],
            vec![],
        );
        assert_eq!(6, encoding.n_vars());
        assert_eq!(7, n_models(&encoding));
    }

    fn xor_chain(depth: usize) -> FormulaRef {
        (1..=depth).fold(Formula::var("el1"), |f, i| {
            Formula::xor(f, Formula::var(format!("e{}", i)))
        })
    }

    #[test]
    fn test_xor_chain_is_linear() {
        let encoding = encode(vec![xor_chain(30)], vec![]);
        assert_eq!(31, encoding.n_named_vars());
        assert!(encoding.n_vars() <= 31 + 2 * 30);
        assert!(encoding.clauses().len() <= 4 * 30);
    }

    #[test]
    fn test_xor_chain_models() {
        let encoding = encode(vec![xor_chain(3)], vec![]);
        assert_eq!(8, n_models(&encoding));
        assert!(is_extendable(&encoding, &[true, false, false, false]));
        assert!(!is_extendable(&encoding, &[true, true, false, false]));
    }

    #[test]
    fn test_shared_nested_conjunctions_are_linear() {
        let mut f = Formula::or(vec![Formula::var("a"), Formula::var("b")]);
        for _ in 0..30 {
            f = Formula::and(vec![f.clone(), f]);
        }
        let encoding = encode(vec![Formula::or(vec![f, Formula::var("c")])], vec![]);
        assert!(encoding.n_vars() <= 3 + 31);
        assert!(encoding.clauses().len() <= 3 * 31);
        assert_eq!(7, n_models(&encoding));
    }

    #[test]
    fn test_quantifier_is_unsupported() {
        let mut system = ConstraintSystem::default();
        system.assert(std::rc::Rc::new(Formula::Quantified(
            crate::formula::Quantifier::Forall,
            vec!["x".to_string()],
            std::rc::Rc::new(Formula::Bound("x".to_string())),
        )));
        assert!(matches!(
            CnfEncoding::new(&CoverInstance::new(system, vec![])),
            Err(CoverError::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn test_load_into_oracle_reserves_vars() {
        let encoding = encode(vec![], vec![EventVar::new(1, true)]);
        let mut oracle = sat::default_optimization_oracle();
        encoding.load_into_oracle(oracle.as_mut());
        oracle.push();
        oracle.add_hard_clause(vec![encoding.leaf_literals()[0]]);
        let model = match oracle.optimize() {
            sat::OptimizationResult::Solved(m) => m,
            r => panic!("unexpected result {:?}", r),
        };
        assert!(model.satisfies(encoding.leaf_literals()[0]));
        oracle.pop();
    }
}
