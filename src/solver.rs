//! Solver boundary: the model goes in, a status plus a total value
//! binding comes out, optionally through a stream of improving
//! incumbents.
//!
//! The callback contract: the backend invokes `on_incumbent`
//! synchronously on its own thread for each strictly better solution it
//! is willing to report, at least once on success. The callback must
//! return promptly and must not touch the backend; decoding works on the
//! delivered binding alone. This crate's shipped backend lowers the model
//! to a mixed-integer program and solves it with HiGHS through `good_lp`;
//! lacking an incumbent stream there, it delivers exactly one terminal
//! incumbent.

use crate::model::{Binding, Cmp, Constraint, Expr, IntVar, Lit, Model, Term};
use good_lp::{
    default_solver, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable,
};
use log::{info, trace};
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// A solution, with no optimality proof (time limit hit).
    Feasible,
    /// The hard constraints cannot all hold. Terminal for this input.
    Infeasible,
    /// The search ended without any solution or verdict.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Wall-clock bound for the whole search. On expiry the best
    /// incumbent found so far is used.
    pub time_limit: Option<Duration>,
    /// Pin threads and seed for reproducible runs.
    pub deterministic: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            time_limit: None,
            deterministic: true,
        }
    }
}

/// One improving solution reported mid-search.
#[derive(Debug)]
pub struct Incumbent<'a> {
    pub binding: &'a Binding,
    pub objective: i64,
    pub sequence: u32,
}

#[derive(Debug)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub binding: Option<Binding>,
    pub objective: Option<i64>,
    pub wall_time: Duration,
    /// Whatever the backend can say about a failure.
    pub diagnostic: Option<String>,
}

/// The external solving engine, as seen from the model side.
pub trait Solve {
    fn solve(
        &self,
        model: &Model,
        options: &SolveOptions,
        on_incumbent: &mut dyn FnMut(&Incumbent<'_>),
    ) -> SolveOutcome;
}

/// MILP backend over `good_lp` with the HiGHS solver.
///
/// Reified constraints become big-M rows sized from the expression
/// bounds, table constraints become row-selector binaries, and squares
/// are value-encoded over the (small) integer domains.
pub struct HighsBackend;

enum Aux {
    None,
    /// `lt`/`gt` pair of a disequality.
    Pair(Variable, Variable),
    /// Row selectors of a table constraint.
    Rows(Vec<Variable>),
    /// Value indicators of a squared variable.
    Values(Vec<Variable>),
}

fn difference(a: &Expr, b: &Expr) -> Expr {
    let mut d = a.clone();
    for &(coeff, term) in &b.terms {
        d.terms.push((-coeff, term));
    }
    d.constant -= b.constant;
    d
}

impl Solve for HighsBackend {
    fn solve(
        &self,
        model: &Model,
        options: &SolveOptions,
        on_incumbent: &mut dyn FnMut(&Incumbent<'_>),
    ) -> SolveOutcome {
        let start = Instant::now();

        let mut vars = variables!();
        let bools: Vec<Variable> = (0..model.bool_count())
            .map(|_| vars.add(variable().binary()))
            .collect();
        let ints: Vec<Variable> = (0..model.int_count())
            .map(|i| {
                let (lb, ub) = model.int_domain(IntVar(i));
                vars.add(variable().integer().min(lb as f64).max(ub as f64))
            })
            .collect();

        // Auxiliary variables first: the variable pool is closed once the
        // objective is attached.
        let aux: Vec<Aux> = model
            .constraints()
            .iter()
            .map(|constraint| match constraint {
                Constraint::Linear { .. } => Aux::None,
                Constraint::NotEqual { .. } => {
                    Aux::Pair(vars.add(variable().binary()), vars.add(variable().binary()))
                }
                Constraint::Table { rows, .. } => Aux::Rows(
                    (0..rows.len())
                        .map(|_| vars.add(variable().binary()))
                        .collect(),
                ),
                Constraint::Square { of, .. } => {
                    let (lb, ub) = model.int_domain(*of);
                    Aux::Values((lb..=ub).map(|_| vars.add(variable().binary())).collect())
                }
            })
            .collect();

        let to_expression = |expr: &Expr| -> Expression {
            let mut out = Expression::from(expr.constant as f64);
            for &(coeff, term) in &expr.terms {
                let v = match term {
                    Term::Bool(b) => bools[b.0],
                    Term::Int(i) => ints[i.0],
                };
                out = out + (coeff as f64) * v;
            }
            out
        };
        // Count of enforcement literals currently false; zero exactly
        // when the guarded constraint must hold.
        let slack = |enforce: &[Lit]| -> Expression {
            let mut out = Expression::from(0.0);
            for &lit in enforce {
                match lit {
                    Lit::Pos(b) => out = out + (Expression::from(1.0) - 1.0 * bools[b.0]),
                    Lit::Neg(b) => out = out + 1.0 * bools[b.0],
                }
            }
            out
        };

        let objective = to_expression(model.objective());
        let mut prob = vars.minimise(objective).using(default_solver);
        prob = prob.set_option("log_to_console", "false");
        if options.deterministic {
            prob = prob.set_option("threads", 1).set_option("random_seed", 1234);
        }
        if let Some(limit) = options.time_limit {
            prob = prob.set_option("time_limit", limit.as_secs_f64());
        }

        for (constraint, aux) in model.constraints().iter().zip(&aux) {
            match (constraint, aux) {
                (Constraint::Linear { expr, cmp, enforce }, Aux::None) => {
                    let (lo, hi) = expr.bounds(model);
                    let e = to_expression(expr);
                    if matches!(cmp, Cmp::Le | Cmp::Eq) {
                        let m = hi.max(0) as f64;
                        prob.add_constraint((e.clone() - m * slack(enforce)).leq(0.0));
                    }
                    if matches!(cmp, Cmp::Ge | Cmp::Eq) {
                        let m = lo.min(0) as f64;
                        prob.add_constraint((e - m * slack(enforce)).geq(0.0));
                    }
                }
                (Constraint::NotEqual { a, b, enforce }, Aux::Pair(lt, gt)) => {
                    let d = difference(a, b);
                    let (dlo, dhi) = d.bounds(model);
                    let e = to_expression(&d);
                    // lt => a - b <= -1, gt => a - b >= 1, and one of the
                    // two must hold whenever the guard does.
                    if dhi > -1 {
                        let m = (dhi + 1) as f64;
                        prob.add_constraint((e.clone() + m * *lt).leq(dhi as f64));
                    }
                    if dlo < 1 {
                        let m = (1 - dlo) as f64;
                        prob.add_constraint((e - m * *gt).geq(dlo as f64));
                    }
                    prob.add_constraint((1.0 * *lt + 1.0 * *gt + slack(enforce)).geq(1.0));
                }
                (Constraint::Table { vars: tuple, rows }, Aux::Rows(selectors)) => {
                    let mut pick = Expression::from(0.0);
                    for y in selectors {
                        pick = pick + 1.0 * *y;
                    }
                    prob.add_constraint(pick.eq(1.0));
                    for (i, &var) in tuple.iter().enumerate() {
                        let mut value = Expression::from(0.0);
                        for (row, y) in rows.iter().zip(selectors) {
                            value = value + (row[i] as f64) * *y;
                        }
                        prob.add_constraint((value - 1.0 * ints[var.0]).eq(0.0));
                    }
                }
                (Constraint::Square { target, of }, Aux::Values(indicators)) => {
                    let (lb, _) = model.int_domain(*of);
                    let mut pick = Expression::from(0.0);
                    let mut value = Expression::from(0.0);
                    let mut squared = Expression::from(0.0);
                    for (offset, y) in indicators.iter().enumerate() {
                        let v = lb + offset as i64;
                        pick = pick + 1.0 * *y;
                        value = value + (v as f64) * *y;
                        squared = squared + ((v * v) as f64) * *y;
                    }
                    prob.add_constraint(pick.eq(1.0));
                    prob.add_constraint((value - 1.0 * ints[of.0]).eq(0.0));
                    prob.add_constraint((squared - 1.0 * ints[target.0]).eq(0.0));
                }
                _ => unreachable!("constraint and auxiliary plan always line up"),
            }
        }

        let (n_bools, n_ints, n_constraints) = model.stats();
        info!(
            "handing model to HiGHS: {} booleans, {} integers, {} constraints",
            n_bools, n_ints, n_constraints
        );

        match prob.solve() {
            Ok(solution) => {
                let binding = Binding {
                    bools: bools.iter().map(|v| solution.value(*v) > 0.5).collect(),
                    ints: ints
                        .iter()
                        .map(|v| solution.value(*v).round() as i64)
                        .collect(),
                };
                let objective = model.objective().eval(&binding);
                trace!("incumbent with objective {objective}");
                on_incumbent(&Incumbent {
                    binding: &binding,
                    objective,
                    sequence: 1,
                });
                // good_lp exposes no MIP gap: a bounded run may stop at a
                // feasible incumbent, an unbounded run ends optimal.
                let status = if options.time_limit.is_some() {
                    SolveStatus::Feasible
                } else {
                    SolveStatus::Optimal
                };
                SolveOutcome {
                    status,
                    binding: Some(binding),
                    objective: Some(objective),
                    wall_time: start.elapsed(),
                    diagnostic: None,
                }
            }
            Err(ResolutionError::Infeasible) => SolveOutcome {
                status: SolveStatus::Infeasible,
                binding: None,
                objective: None,
                wall_time: start.elapsed(),
                diagnostic: Some("solver proved the constraints unsatisfiable".into()),
            },
            Err(other) => SolveOutcome {
                status: SolveStatus::Unknown,
                binding: None,
                objective: None,
                wall_time: start.elapsed(),
                diagnostic: Some(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Expr;

    fn run(model: &Model) -> SolveOutcome {
        HighsBackend.solve(model, &SolveOptions::default(), &mut |_| {})
    }

    #[test]
    fn enforced_equality_only_binds_under_its_literal() {
        let mut model = Model::new();
        let b = model.new_bool();
        let x = model.new_int(0, 10);
        model.add_eq_if(Expr::from_int(x), 5, &[b.lit()]);
        model.add_eq(Expr::from_bool(b), 0);
        model.set_objective(Expr::from_int(x));
        let outcome = run(&model);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.binding.unwrap().int_value(x), 0);

        let mut model = Model::new();
        let b = model.new_bool();
        let x = model.new_int(0, 10);
        model.add_eq_if(Expr::from_int(x), 5, &[b.lit()]);
        model.add_eq(Expr::from_bool(b), 1);
        model.set_objective(Expr::from_int(x));
        let outcome = run(&model);
        assert_eq!(outcome.binding.unwrap().int_value(x), 5);
    }

    #[test]
    fn disequality_pushes_off_the_forbidden_value() {
        let mut model = Model::new();
        let x = model.new_int(0, 2);
        let y = model.new_int(0, 2);
        model.add_eq(Expr::from_int(x), 1);
        model.add_not_equal_if(Expr::from_int(x), Expr::from_int(y), &[]);
        model.set_objective(Expr::from_int(y));
        let outcome = run(&model);
        assert_eq!(outcome.binding.unwrap().int_value(y), 0);

        let mut model = Model::new();
        let x = model.new_int(1, 1);
        let y = model.new_int(1, 1);
        model.add_not_equal_if(Expr::from_int(x), Expr::from_int(y), &[]);
        let outcome = run(&model);
        assert_eq!(outcome.status, SolveStatus::Infeasible);
    }

    #[test]
    fn table_restricts_to_listed_rows() {
        let mut model = Model::new();
        let x = model.new_int(0, 2);
        let y = model.new_int(0, 2);
        model.add_table(vec![x, y], vec![vec![0, 2], vec![2, 0], vec![2, 2]]);
        let mut total = Expr::from_int(x);
        total.add_int(1, y);
        model.set_objective(total);
        let outcome = run(&model);
        let binding = outcome.binding.unwrap();
        let pair = (binding.int_value(x), binding.int_value(y));
        assert!(pair == (0, 2) || pair == (2, 0));
    }

    #[test]
    fn square_matches_value_encoding_on_negative_domains() {
        let mut model = Model::new();
        let x = model.new_int(-3, 3);
        let sq = model.new_int(0, 9);
        model.add_square(sq, x);
        model.add_eq(Expr::from_int(x), -2);
        let outcome = run(&model);
        assert_eq!(outcome.binding.unwrap().int_value(sq), 4);
    }

    #[test]
    fn reified_count_agrees_with_the_count() {
        let mut model = Model::new();
        let a = model.new_bool();
        let b = model.new_bool();
        let hit = model.reify_count_positive(Expr::sum_bools([a, b]));
        model.add_eq(Expr::from_bool(a), 1);
        let outcome = run(&model);
        let binding = outcome.binding.unwrap();
        assert!(binding.bool_value(hit));

        let mut model = Model::new();
        let a = model.new_bool();
        let b = model.new_bool();
        let hit = model.reify_count_positive(Expr::sum_bools([a, b]));
        model.add_eq(Expr::from_bool(a), 0);
        model.add_eq(Expr::from_bool(b), 0);
        let outcome = run(&model);
        assert!(!outcome.binding.unwrap().bool_value(hit));
    }

    #[test]
    fn incumbent_callback_fires_on_success() {
        let mut model = Model::new();
        let x = model.new_int(3, 7);
        model.set_objective(Expr::from_int(x));
        let mut seen = Vec::new();
        let outcome = HighsBackend.solve(&model, &SolveOptions::default(), &mut |incumbent| {
            seen.push(incumbent.objective);
        });
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(seen, vec![3]);
        assert_eq!(outcome.objective, Some(3));
    }
}
