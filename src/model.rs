//! Solver-agnostic constraint model.
//!
//! The timetable domain is declared once over this IR; a backend (see
//! `solver.rs`) translates it for a concrete engine. Reified relations are
//! always posted in both implication directions — a solver has no notion
//! of a default truth value, so `A => B` without `!A => !B` leaves the
//! derived variable floating.

/// Handle of a boolean decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolVar(pub(crate) usize);

/// Handle of a bounded integer decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntVar(pub(crate) usize);

/// A boolean variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lit {
    Pos(BoolVar),
    Neg(BoolVar),
}

impl BoolVar {
    pub fn lit(self) -> Lit {
        Lit::Pos(self)
    }

    pub fn negated(self) -> Lit {
        Lit::Neg(self)
    }
}

impl From<BoolVar> for Lit {
    fn from(v: BoolVar) -> Lit {
        Lit::Pos(v)
    }
}

impl std::ops::Not for BoolVar {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit::Neg(self)
    }
}

impl std::ops::Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        match self {
            Lit::Pos(v) => Lit::Neg(v),
            Lit::Neg(v) => Lit::Pos(v),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Term {
    Bool(BoolVar),
    Int(IntVar),
}

/// An integer-valued affine expression over model variables.
#[derive(Debug, Clone, Default)]
pub struct Expr {
    pub(crate) terms: Vec<(i64, Term)>,
    pub(crate) constant: i64,
}

impl Expr {
    pub fn constant(value: i64) -> Expr {
        Expr {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn from_bool(v: BoolVar) -> Expr {
        let mut e = Expr::default();
        e.add_bool(1, v);
        e
    }

    pub fn from_int(v: IntVar) -> Expr {
        let mut e = Expr::default();
        e.add_int(1, v);
        e
    }

    pub fn sum_bools(vars: impl IntoIterator<Item = BoolVar>) -> Expr {
        let mut e = Expr::default();
        for v in vars {
            e.add_bool(1, v);
        }
        e
    }

    pub fn add_bool(&mut self, coeff: i64, v: BoolVar) -> &mut Expr {
        self.terms.push((coeff, Term::Bool(v)));
        self
    }

    pub fn add_int(&mut self, coeff: i64, v: IntVar) -> &mut Expr {
        self.terms.push((coeff, Term::Int(v)));
        self
    }

    pub fn add_const(&mut self, value: i64) -> &mut Expr {
        self.constant += value;
        self
    }

    /// A literal as a 0/1 expression: `x` or `1 - x`.
    pub fn add_lit(&mut self, coeff: i64, lit: Lit) -> &mut Expr {
        match lit {
            Lit::Pos(v) => {
                self.add_bool(coeff, v);
            }
            Lit::Neg(v) => {
                self.add_bool(-coeff, v);
                self.add_const(coeff);
            }
        }
        self
    }

    pub fn from_lit(lit: Lit) -> Expr {
        let mut e = Expr::default();
        e.add_lit(1, lit);
        e
    }

    /// Value of the expression under a complete assignment.
    pub fn eval(&self, binding: &Binding) -> i64 {
        let mut total = self.constant;
        for &(coeff, term) in &self.terms {
            let v = match term {
                Term::Bool(b) => i64::from(binding.bool_value(b)),
                Term::Int(i) => binding.int_value(i),
            };
            total += coeff * v;
        }
        total
    }

    /// Interval the expression can take given the variable domains.
    pub(crate) fn bounds(&self, model: &Model) -> (i64, i64) {
        let mut lo = self.constant;
        let mut hi = self.constant;
        for &(coeff, term) in &self.terms {
            let (tlo, thi) = match term {
                Term::Bool(_) => (0, 1),
                Term::Int(i) => model.int_domains[i.0],
            };
            if coeff >= 0 {
                lo += coeff * tlo;
                hi += coeff * thi;
            } else {
                lo += coeff * thi;
                hi += coeff * tlo;
            }
        }
        (lo, hi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cmp {
    Eq,
    Le,
    Ge,
}

/// Constraints the IR can express. Linear covers every boolean clause
/// through literal expressions; the rest carry structure a backend may
/// have a native encoding for.
#[derive(Debug, Clone)]
pub(crate) enum Constraint {
    /// `expr cmp 0`, active only while every enforcement literal holds.
    Linear {
        expr: Expr,
        cmp: Cmp,
        enforce: Vec<Lit>,
    },
    /// `a != b`, active only while every enforcement literal holds.
    NotEqual { a: Expr, b: Expr, enforce: Vec<Lit> },
    /// The variable tuple must equal one of the listed rows.
    Table {
        vars: Vec<IntVar>,
        rows: Vec<Vec<i64>>,
    },
    /// `target == of * of`.
    Square { target: IntVar, of: IntVar },
}

/// Complete assignment of every declared variable, as returned by a
/// backend. Pure data: decoding it has no effect on the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub(crate) bools: Vec<bool>,
    pub(crate) ints: Vec<i64>,
}

impl Binding {
    pub fn bool_value(&self, v: BoolVar) -> bool {
        self.bools[v.0]
    }

    pub fn int_value(&self, v: IntVar) -> i64 {
        self.ints[v.0]
    }

    pub fn lit_value(&self, lit: Lit) -> bool {
        match lit {
            Lit::Pos(v) => self.bool_value(v),
            Lit::Neg(v) => !self.bool_value(v),
        }
    }
}

/// The declarative model: variables, constraints and a minimization
/// objective. Built once per run and never mutated by the solver.
#[derive(Debug, Default)]
pub struct Model {
    n_bools: usize,
    int_domains: Vec<(i64, i64)>,
    constraints: Vec<Constraint>,
    objective: Expr,
}

impl Model {
    pub fn new() -> Model {
        Model::default()
    }

    pub fn new_bool(&mut self) -> BoolVar {
        self.n_bools += 1;
        BoolVar(self.n_bools - 1)
    }

    pub fn new_int(&mut self, lb: i64, ub: i64) -> IntVar {
        debug_assert!(lb <= ub);
        self.int_domains.push((lb, ub));
        IntVar(self.int_domains.len() - 1)
    }

    pub fn int_domain(&self, v: IntVar) -> (i64, i64) {
        self.int_domains[v.0]
    }

    pub fn add_linear(&mut self, expr: Expr, cmp: Cmp, rhs: i64) {
        self.add_linear_enforced(expr, cmp, rhs, &[]);
    }

    pub(crate) fn add_linear_enforced(&mut self, mut expr: Expr, cmp: Cmp, rhs: i64, enforce: &[Lit]) {
        expr.constant -= rhs;
        self.constraints.push(Constraint::Linear {
            expr,
            cmp,
            enforce: enforce.to_vec(),
        });
    }

    pub fn add_eq(&mut self, expr: Expr, rhs: i64) {
        self.add_linear(expr, Cmp::Eq, rhs);
    }

    pub fn add_le(&mut self, expr: Expr, rhs: i64) {
        self.add_linear(expr, Cmp::Le, rhs);
    }

    pub fn add_ge(&mut self, expr: Expr, rhs: i64) {
        self.add_linear(expr, Cmp::Ge, rhs);
    }

    pub fn add_eq_if(&mut self, expr: Expr, rhs: i64, enforce: &[Lit]) {
        self.add_linear_enforced(expr, Cmp::Eq, rhs, enforce);
    }

    pub fn add_le_if(&mut self, expr: Expr, rhs: i64, enforce: &[Lit]) {
        self.add_linear_enforced(expr, Cmp::Le, rhs, enforce);
    }

    pub fn add_ge_if(&mut self, expr: Expr, rhs: i64, enforce: &[Lit]) {
        self.add_linear_enforced(expr, Cmp::Ge, rhs, enforce);
    }

    pub fn add_not_equal_if(&mut self, a: Expr, b: Expr, enforce: &[Lit]) {
        self.constraints.push(Constraint::NotEqual {
            a,
            b,
            enforce: enforce.to_vec(),
        });
    }

    pub fn add_table(&mut self, vars: Vec<IntVar>, rows: Vec<Vec<i64>>) {
        debug_assert!(rows.iter().all(|row| row.len() == vars.len()));
        self.constraints.push(Constraint::Table { vars, rows });
    }

    pub fn add_square(&mut self, target: IntVar, of: IntVar) {
        self.constraints.push(Constraint::Square { target, of });
    }

    pub fn add_all_different(&mut self, vars: &[IntVar]) {
        for (i, &a) in vars.iter().enumerate() {
            for &b in &vars[i + 1..] {
                self.add_not_equal_if(Expr::from_int(a), Expr::from_int(b), &[]);
            }
        }
    }

    /// At least one literal holds while every enforcement literal holds.
    pub fn add_or_if(&mut self, lits: &[Lit], enforce: &[Lit]) {
        let mut expr = Expr::default();
        for &lit in lits {
            expr.add_lit(1, lit);
        }
        self.add_linear_enforced(expr, Cmp::Ge, 1, enforce);
    }

    /// Every literal holds while every enforcement literal holds.
    pub fn add_and_if(&mut self, lits: &[Lit], enforce: &[Lit]) {
        for &lit in lits {
            self.add_linear_enforced(Expr::from_lit(lit), Cmp::Ge, 1, enforce);
        }
    }

    pub fn add_implication(&mut self, cond: Lit, then: Lit) {
        self.add_and_if(&[then], &[cond]);
    }

    /// Ties `hit` to the conjunction of `lits`, both directions.
    pub fn link_and(&mut self, hit: BoolVar, lits: &[Lit]) {
        self.add_and_if(lits, &[hit.lit()]);
        let negs: Vec<Lit> = lits.iter().map(|&l| !l).collect();
        self.add_or_if(&negs, &[hit.negated()]);
    }

    /// Ties `hit` to the disjunction of `lits`, both directions.
    pub fn link_or(&mut self, hit: BoolVar, lits: &[Lit]) {
        self.add_or_if(lits, &[hit.lit()]);
        let negs: Vec<Lit> = lits.iter().map(|&l| !l).collect();
        self.add_and_if(&negs, &[hit.negated()]);
    }

    pub fn reify_and(&mut self, lits: &[Lit]) -> BoolVar {
        let hit = self.new_bool();
        self.link_and(hit, lits);
        hit
    }

    pub fn reify_or(&mut self, lits: &[Lit]) -> BoolVar {
        let hit = self.new_bool();
        self.link_or(hit, lits);
        hit
    }

    /// Ties `hit` to "the count is positive": `hit => expr >= 1`,
    /// `!hit => expr == 0`. `expr` must be a non-negative count.
    pub fn link_count_positive(&mut self, hit: BoolVar, expr: Expr) {
        self.add_ge_if(expr.clone(), 1, &[hit.lit()]);
        self.add_eq_if(expr, 0, &[hit.negated()]);
    }

    pub fn reify_count_positive(&mut self, expr: Expr) -> BoolVar {
        let hit = self.new_bool();
        self.link_count_positive(hit, expr);
        hit
    }

    /// Ties `hit` to "the count is exactly one": `hit => expr == 1`,
    /// `!hit => expr == 0`. Pins the count to {0, 1} as a side effect.
    pub fn link_count_one_or_zero(&mut self, hit: BoolVar, expr: Expr) {
        self.add_eq_if(expr.clone(), 1, &[hit.lit()]);
        self.add_eq_if(expr, 0, &[hit.negated()]);
    }

    /// Ties `hit` to `var == value`, both directions.
    pub fn link_int_eq(&mut self, hit: BoolVar, var: IntVar, value: i64) {
        self.add_eq_if(Expr::from_int(var), value, &[hit.lit()]);
        self.add_not_equal_if(
            Expr::from_int(var),
            Expr::constant(value),
            &[hit.negated()],
        );
    }

    /// Posts `quotient == dividend div divisor` (floor division of a
    /// non-negative dividend by a positive constant) by introducing the
    /// remainder.
    pub fn add_div_const(&mut self, quotient: IntVar, dividend: Expr, divisor: i64) {
        debug_assert!(divisor > 0);
        let rem = self.new_int(0, divisor - 1);
        let mut expr = dividend;
        expr.add_int(-divisor, quotient);
        expr.add_int(-1, rem);
        self.add_eq(expr, 0);
    }

    pub fn set_objective(&mut self, objective: Expr) {
        self.objective = objective;
    }

    pub fn objective(&self) -> &Expr {
        &self.objective
    }

    pub(crate) fn bool_count(&self) -> usize {
        self.n_bools
    }

    pub(crate) fn int_count(&self) -> usize {
        self.int_domains.len()
    }

    pub(crate) fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn stats(&self) -> (usize, usize, usize) {
        (self.n_bools, self.int_domains.len(), self.constraints.len())
    }
}
