use super::{specs::warn_all, InstanceReader, WarningHandler};
use crate::{
    formula::{ConstraintSystem, Formula, FormulaRef, Quantifier},
    utils::InputFormatError,
};
use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    io::Read,
    iter::Peekable,
    rc::Rc,
    str::Chars,
};

/// A reader for constraint systems written in the boolean fragment of SMT-LIB 2.
///
/// The supported commands are `declare-const`, `declare-fun` (for constants), `assert`,
/// `check-sat`, `exit`, `set-info`, `set-logic` and `set-option`.
/// Declared symbols must be of sort `Bool`.
///
/// Terms are built from `true`, `false`, declared symbols and the functions
/// `not`, `and`, `or`, `=>`, `=`, `xor`, `distinct` and `ite`;
/// `let` bindings, `forall` and `exists` quantifiers over `Bool` variables and `!` annotations are allowed too.
///
/// The returned constraint system is made of the asserted terms.
///
/// # Example
///
/// ```
/// # use escover::io::{InstanceReader, SmtLibReader};
/// let input = r#"
/// (declare-const el1 Bool)
/// (declare-const el2 Bool)
/// (assert (not (and el1 el2)))
/// (check-sat)
/// "#;
/// let system = SmtLibReader::default().read(&mut input.as_bytes()).unwrap();
/// assert_eq!(1, system.len());
/// ```
#[derive(Default)]
pub struct SmtLibReader {
    warning_handlers: Vec<WarningHandler>,
}

impl InstanceReader<ConstraintSystem> for SmtLibReader {
    fn read(&self, reader: &mut dyn Read) -> Result<ConstraintSystem> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .context("while reading the SMT-LIB input")?;
        let commands = SExprParser::new(&content)
            .parse_all()
            .context("while parsing the SMT-LIB input")?;
        let mut interpreter = Interpreter::default();
        for command in commands.iter() {
            let context = || format!("while interpreting the command at line {}", command.line);
            match interpreter.interpret(command).with_context(context)? {
                CommandOutcome::Continue => {}
                CommandOutcome::Warn(w) => warn_all(&self.warning_handlers, command.line, w),
                CommandOutcome::Exit => break,
            }
        }
        Ok(interpreter.system)
    }

    fn add_warning_handler(&mut self, h: WarningHandler) {
        self.warning_handlers.push(h);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SExprKind {
    Atom(String),
    Str(String),
    List(Vec<SExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SExpr {
    kind: SExprKind,
    line: usize,
    column: usize,
}

impl SExpr {
    fn error<S>(&self, reason: S) -> InputFormatError
    where
        S: Into<String>,
    {
        InputFormatError::new(self.line, self.column, reason)
    }

    fn as_atom(&self) -> Option<&str> {
        match &self.kind {
            SExprKind::Atom(s) => Some(s),
            _ => None,
        }
    }

    fn as_list(&self) -> Option<&[SExpr]> {
        match &self.kind {
            SExprKind::List(l) => Some(l),
            _ => None,
        }
    }
}

struct SExprParser<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !"()\";|".contains(c)
}

impl<'a> SExprParser<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            chars: content.chars().peekable(),
            line: 1,
            column: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_blanks_and_comments(&mut self) {
        while let Some(c) = self.chars.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if *c == ';' {
                while !matches!(self.bump(), None | Some('\n')) {}
            } else {
                break;
            }
        }
    }

    fn parse_all(mut self) -> Result<Vec<SExpr>, InputFormatError> {
        let mut exprs = vec![];
        loop {
            self.skip_blanks_and_comments();
            if self.chars.peek().is_none() {
                return Ok(exprs);
            }
            let expr = self.parse_expr()?;
            if expr.as_list().is_none() {
                return Err(expr.error("expected a command"));
            }
            exprs.push(expr);
        }
    }

    fn parse_expr(&mut self) -> Result<SExpr, InputFormatError> {
        self.skip_blanks_and_comments();
        let (line, column) = (self.line, self.column + 1);
        let error = |reason: &str| InputFormatError::new(line, column, reason);
        let kind = match self.bump() {
            None => return Err(InputFormatError::new(0, 0, "unexpected end of input")),
            Some(')') => return Err(error(r#"unexpected ")""#)),
            Some('(') => {
                let mut items = vec![];
                loop {
                    self.skip_blanks_and_comments();
                    match self.chars.peek() {
                        None => return Err(error("unclosed parenthesis")),
                        Some(')') => {
                            self.bump();
                            break;
                        }
                        Some(_) => items.push(self.parse_expr()?),
                    }
                }
                SExprKind::List(items)
            }
            Some('"') => {
                let mut value = String::new();
                loop {
                    match self.bump() {
                        None => return Err(error("unterminated string literal")),
                        Some('"') if self.chars.peek() == Some(&'"') => {
                            self.bump();
                            value.push('"');
                        }
                        Some('"') => break,
                        Some(c) => value.push(c),
                    }
                }
                SExprKind::Str(value)
            }
            Some('|') => {
                let mut value = String::new();
                loop {
                    match self.bump() {
                        None => return Err(error("unterminated quoted symbol")),
                        Some('|') => break,
                        Some(c) => value.push(c),
                    }
                }
                SExprKind::Atom(value)
            }
            Some(c) => {
                let mut value = c.to_string();
                while let Some(c) = self.chars.peek().copied() {
                    if !is_symbol_char(c) {
                        break;
                    }
                    value.push(c);
                    self.bump();
                }
                SExprKind::Atom(value)
            }
        };
        Ok(SExpr { kind, line, column })
    }
}

enum CommandOutcome {
    Continue,
    Warn(String),
    Exit,
}

#[derive(Clone)]
enum Binding {
    Term(FormulaRef),
    Bound,
}

#[derive(Default)]
struct Interpreter {
    system: ConstraintSystem,
    declared: HashMap<String, FormulaRef>,
    scopes: Vec<HashMap<String, Binding>>,
}

fn expect_bool_sort(sort: &SExpr) -> Result<(), InputFormatError> {
    match sort.as_atom() {
        Some("Bool") => Ok(()),
        _ => Err(sort.error("only the Bool sort is supported")),
    }
}

fn expect_n_args(expr: &SExpr, args: &[SExpr], n: usize) -> Result<(), InputFormatError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(expr.error(format!("expected {} arguments, got {}", n, args.len())))
    }
}

fn expect_min_args(expr: &SExpr, args: &[SExpr], n: usize) -> Result<(), InputFormatError> {
    if args.len() >= n {
        Ok(())
    } else {
        Err(expr.error(format!(
            "expected at least {} arguments, got {}",
            n,
            args.len()
        )))
    }
}

impl Interpreter {
    fn interpret(&mut self, command: &SExpr) -> Result<CommandOutcome, InputFormatError> {
        let items = command.as_list().unwrap_or(&[]);
        let (head, args) = match items.split_first() {
            Some((h, a)) => (h, a),
            None => return Err(command.error("empty command")),
        };
        match head.as_atom() {
            Some("set-info") | Some("set-option") => Ok(CommandOutcome::Continue),
            Some("set-logic") => match args.first().and_then(|a| a.as_atom()) {
                Some("QF_UF") | Some("UF") | Some("ALL") | Some("CORE") => {
                    Ok(CommandOutcome::Continue)
                }
                Some(l) => Ok(CommandOutcome::Warn(format!(
                    r#"logic "{}" may involve unsupported theories"#,
                    l
                ))),
                None => Err(command.error("missing logic name")),
            },
            Some("declare-const") => {
                expect_n_args(command, args, 2)?;
                expect_bool_sort(&args[1])?;
                self.declare(&args[0])
            }
            Some("declare-fun") => {
                expect_n_args(command, args, 3)?;
                if args[1].as_list().map_or(true, |l| !l.is_empty()) {
                    return Err(args[1].error("only constants (functions without parameters) are supported"));
                }
                expect_bool_sort(&args[2])?;
                self.declare(&args[0])
            }
            Some("assert") => {
                expect_n_args(command, args, 1)?;
                let term = self.term(&args[0])?;
                self.system.assert(term);
                Ok(CommandOutcome::Continue)
            }
            Some("check-sat") => Ok(CommandOutcome::Continue),
            Some("exit") => Ok(CommandOutcome::Exit),
            Some(c) => Err(head.error(format!(r#"unsupported command "{}""#, c))),
            None => Err(head.error("expected a command name")),
        }
    }

    fn declare(&mut self, name_expr: &SExpr) -> Result<CommandOutcome, InputFormatError> {
        let name = name_expr
            .as_atom()
            .ok_or_else(|| name_expr.error("expected a symbol"))?;
        if self.declared.contains_key(name) {
            return Err(name_expr.error(format!(r#"symbol "{}" is already declared"#, name)));
        }
        self.declared.insert(name.to_string(), Formula::var(name));
        Ok(CommandOutcome::Continue)
    }

    fn lookup(&self, name: &str) -> Option<FormulaRef> {
        for scope in self.scopes.iter().rev() {
            match scope.get(name) {
                Some(Binding::Term(f)) => return Some(Rc::clone(f)),
                Some(Binding::Bound) => return Some(Rc::new(Formula::Bound(name.to_string()))),
                None => {}
            }
        }
        self.declared.get(name).cloned()
    }

    fn term(&mut self, expr: &SExpr) -> Result<FormulaRef, InputFormatError> {
        match &expr.kind {
            SExprKind::Atom(s) if s == "true" => Ok(Formula::constant(true)),
            SExprKind::Atom(s) if s == "false" => Ok(Formula::constant(false)),
            SExprKind::Atom(s) => self
                .lookup(s)
                .ok_or_else(|| expr.error(format!(r#"undeclared symbol "{}""#, s))),
            SExprKind::Str(_) => Err(expr.error("expected a boolean term, got a string")),
            SExprKind::List(items) => {
                let (head, args) = items
                    .split_first()
                    .ok_or_else(|| expr.error("empty term"))?;
                let function = head
                    .as_atom()
                    .ok_or_else(|| head.error("expected a function name"))?;
                self.application(expr, function, args)
            }
        }
    }

    fn terms(&mut self, args: &[SExpr]) -> Result<Vec<FormulaRef>, InputFormatError> {
        args.iter().map(|a| self.term(a)).collect()
    }

    fn application(
        &mut self,
        expr: &SExpr,
        function: &str,
        args: &[SExpr],
    ) -> Result<FormulaRef, InputFormatError> {
        match function {
            "not" => {
                expect_n_args(expr, args, 1)?;
                Ok(Formula::not(self.term(&args[0])?))
            }
            "and" => {
                expect_min_args(expr, args, 1)?;
                Ok(Formula::and(self.terms(args)?))
            }
            "or" => {
                expect_min_args(expr, args, 1)?;
                Ok(Formula::or(self.terms(args)?))
            }
            "=>" => {
                expect_min_args(expr, args, 2)?;
                let mut terms = self.terms(args)?;
                let mut result = terms.pop().unwrap_or_else(|| Formula::constant(true));
                while let Some(premise) = terms.pop() {
                    result = Formula::implies(premise, result);
                }
                Ok(result)
            }
            "=" => {
                expect_min_args(expr, args, 2)?;
                let terms = self.terms(args)?;
                let mut equalities = terms
                    .windows(2)
                    .map(|w| Formula::iff(Rc::clone(&w[0]), Rc::clone(&w[1])))
                    .collect::<Vec<FormulaRef>>();
                if equalities.len() == 1 {
                    Ok(equalities.remove(0))
                } else {
                    Ok(Formula::and(equalities))
                }
            }
            "xor" => {
                expect_min_args(expr, args, 2)?;
                let terms = self.terms(args)?;
                let mut iter = terms.into_iter();
                let first = iter.next().unwrap_or_else(|| Formula::constant(false));
                Ok(iter.fold(first, Formula::xor))
            }
            "distinct" => {
                expect_min_args(expr, args, 2)?;
                let terms = self.terms(args)?;
                let mut pairs = vec![];
                for (i, t1) in terms.iter().enumerate() {
                    for t2 in terms[i + 1..].iter() {
                        pairs.push(Formula::xor(Rc::clone(t1), Rc::clone(t2)));
                    }
                }
                if pairs.len() == 1 {
                    Ok(pairs.remove(0))
                } else {
                    Ok(Formula::and(pairs))
                }
            }
            "ite" => {
                expect_n_args(expr, args, 3)?;
                let mut terms = self.terms(args)?.into_iter();
                match (terms.next(), terms.next(), terms.next()) {
                    (Some(c), Some(t), Some(e)) => Ok(Formula::ite(c, t, e)),
                    _ => Err(expr.error("expected 3 arguments")),
                }
            }
            "let" => {
                expect_n_args(expr, args, 2)?;
                let bindings = args[0]
                    .as_list()
                    .ok_or_else(|| args[0].error("expected a list of bindings"))?;
                let mut scope = HashMap::new();
                for binding in bindings {
                    let (name, value) = match binding.as_list() {
                        Some([name, value]) => (name, value),
                        _ => return Err(binding.error("expected a binding (name term)")),
                    };
                    let name = name
                        .as_atom()
                        .ok_or_else(|| name.error("expected a symbol"))?;
                    scope.insert(name.to_string(), Binding::Term(self.term(value)?));
                }
                self.scoped_term(scope, &args[1])
            }
            "forall" | "exists" => {
                expect_n_args(expr, args, 2)?;
                let sorted_vars = args[0]
                    .as_list()
                    .filter(|l| !l.is_empty())
                    .ok_or_else(|| args[0].error("expected a non-empty list of sorted variables"))?;
                let mut names = vec![];
                for sorted_var in sorted_vars {
                    let (name, sort) = match sorted_var.as_list() {
                        Some([name, sort]) => (name, sort),
                        _ => return Err(sorted_var.error("expected a sorted variable (name sort)")),
                    };
                    expect_bool_sort(sort)?;
                    let name = name
                        .as_atom()
                        .ok_or_else(|| name.error("expected a symbol"))?;
                    names.push(name.to_string());
                }
                let scope = names
                    .iter()
                    .map(|n| (n.clone(), Binding::Bound))
                    .collect();
                let body = self.scoped_term(scope, &args[1])?;
                let quantifier = if function == "forall" {
                    Quantifier::Forall
                } else {
                    Quantifier::Exists
                };
                Ok(Rc::new(Formula::Quantified(quantifier, names, body)))
            }
            "!" => {
                expect_min_args(expr, args, 1)?;
                self.term(&args[0])
            }
            _ => Err(expr.error(format!(r#"unsupported function "{}""#, function))),
        }
    }

    fn scoped_term(
        &mut self,
        scope: HashMap<String, Binding>,
        body: &SExpr,
    ) -> Result<FormulaRef, InputFormatError> {
        self.scopes.push(scope);
        let result = self.term(body);
        self.scopes.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula;

    fn read(s: &str) -> Result<ConstraintSystem> {
        SmtLibReader::default().read(&mut s.as_bytes())
    }

    fn format_error(s: &str) -> InputFormatError {
        read(s)
            .unwrap_err()
            .chain()
            .find_map(|e| e.downcast_ref::<InputFormatError>())
            .cloned()
            .unwrap()
    }

    fn assertions(s: &str) -> Vec<String> {
        read(s).unwrap().iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_commands() {
        let input = r#"
        ; a comment
        (set-info :status sat)
        (set-option :produce-models true)
        (set-logic QF_UF)
        (declare-const el1 Bool)
        (declare-fun e2 () Bool)
        (assert (=> el1 e2)) ; trailing comment
        (check-sat)
        (exit)
        (assert false)
        "#;
        assert_eq!(vec!["(=> el1 e2)"], assertions(input));
    }

    #[test]
    fn test_connectives() {
        let input = r#"
        (declare-const a Bool)
        (declare-const b Bool)
        (declare-const c Bool)
        (assert (and (not a) (or b c) true))
        (assert (=> a b c))
        (assert (= a b c))
        (assert (xor a b c))
        (assert (distinct a b))
        (assert (ite a b false))
        "#;
        assert_eq!(
            vec![
                "(and (not a) (or b c) true)",
                "(=> a (=> b c))",
                "(and (= a b) (= b c))",
                "(xor (xor a b) c)",
                "(xor a b)",
                "(ite a b false)",
            ],
            assertions(input)
        );
    }

    #[test]
    fn test_let_and_annotations() {
        let input = r#"
        (declare-const a Bool)
        (declare-const b Bool)
        (assert (let ((x (and a b)) (a b)) (! (or x a) :named n)))
        "#;
        assert_eq!(vec!["(or (and a b) b)"], assertions(input));
    }

    #[test]
    fn test_let_shares_bound_terms() {
        let input = r#"
        (declare-const el1 Bool)
        (assert (let ((x (not el1))) (and x x)))
        "#;
        let system = read(input).unwrap();
        let first = system.iter().next().unwrap().clone();
        match first.as_ref() {
            Formula::And(fs) => assert!(Rc::ptr_eq(&fs[0], &fs[1])),
            _ => panic!(),
        };
    }

    #[test]
    fn test_quantifier() {
        let input = r#"
        (declare-const el1 Bool)
        (assert (exists ((x Bool)) (or x el1)))
        "#;
        assert_eq!(vec!["(exists ((x Bool)) (or x el1))"], assertions(input));
    }

    #[test]
    fn test_quoted_symbols_and_strings() {
        let input = r#"
        (set-info :source "a ""quoted"" (source)")
        (declare-const |el 1| Bool)
        (assert |el 1|)
        "#;
        assert_eq!(vec!["el 1"], assertions(input));
    }

    #[test]
    fn test_shared_declared_variables() {
        let input = r#"
        (declare-const el3 Bool)
        (declare-const el1 Bool)
        (assert (or el3 el1))
        (assert (not el3))
        "#;
        let system = read(input).unwrap();
        let vars = formula::extract_leaf_vars(&system).unwrap();
        assert_eq!(
            vec![1, 3],
            vars.iter().map(|v| v.event_id()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_undeclared_symbol() {
        let e = format_error("(declare-const a Bool)\n(assert (and a b))");
        assert_eq!(2, e.line());
        assert_eq!(16, e.column());
    }

    #[test]
    fn test_non_bool_sort() {
        let e = format_error("(declare-const a Int)");
        assert_eq!(1, e.line());
        assert_eq!(18, e.column());
    }

    #[test]
    fn test_function_with_parameters() {
        let e = format_error("(declare-fun f (Bool) Bool)");
        assert_eq!(16, e.column());
    }

    #[test]
    fn test_unknown_command() {
        let e = format_error("(push 1)");
        assert_eq!(2, e.column());
    }

    #[test]
    fn test_unknown_function() {
        let e = format_error("(declare-const a Bool)\n(assert (f a))");
        assert_eq!(2, e.line());
        assert_eq!(9, e.column());
    }

    #[test]
    fn test_duplicate_declaration() {
        let e = format_error("(declare-const a Bool)\n(declare-const a Bool)");
        assert_eq!(2, e.line());
    }

    #[test]
    fn test_unclosed_parenthesis() {
        let e = format_error("(declare-const a Bool)\n  (assert a");
        assert_eq!(2, e.line());
        assert_eq!(3, e.column());
    }

    #[test]
    fn test_unexpected_closing_parenthesis() {
        let e = format_error("(check-sat))");
        assert_eq!(12, e.column());
    }

    #[test]
    fn test_wrong_arity() {
        let e = format_error("(declare-const a Bool)\n(assert (not a a))");
        assert_eq!(9, e.column());
    }

    #[test]
    fn test_atom_command() {
        assert_eq!(1, format_error("check-sat").column());
    }

    #[test]
    fn test_unsupported_logic_warning() {
        let warnings = std::rc::Rc::new(std::cell::RefCell::new(vec![]));
        let warnings_clone = Rc::clone(&warnings);
        let mut reader = SmtLibReader::default();
        reader.add_warning_handler(Box::new(move |l, _| warnings_clone.borrow_mut().push(l)));
        reader
            .read(&mut "\n(set-logic QF_LIA)".as_bytes())
            .unwrap();
        assert_eq!(vec![2], *warnings.borrow());
    }
}
