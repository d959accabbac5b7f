//! Weekly class-and-teacher timetable solver for a dance school.
//!
//! The pipeline turns a normalized preference table into a declarative
//! constraint model (decision variables, derived relations, hard rules,
//! a weighted soft objective), hands it to an external solver behind the
//! [`solver::Solve`] trait and decodes the answer into a schedule plus an
//! explained penalty ledger.

pub mod constraints;
pub mod data;
pub mod error;
pub mod model;
pub mod network;
pub mod penalties;
pub mod report;
pub mod server;
pub mod solver;

use log::info;

pub use data::{Problem, TimetableInput};
pub use error::{ConfigError, ScheduleError};
pub use report::TimetableOutput;
pub use solver::{HighsBackend, Solve, SolveOptions, SolveStatus};

/// Solves one timetable with the shipped HiGHS backend.
pub fn solve(
    input: TimetableInput,
    options: &SolveOptions,
) -> Result<TimetableOutput, ScheduleError> {
    solve_with(input, options, &HighsBackend, |_| {})
}

/// Solves one timetable against any backend, reporting each improving
/// incumbent as a fully decoded snapshot. The callback runs on the
/// solver's thread and must return promptly.
pub fn solve_with(
    input: TimetableInput,
    options: &SolveOptions,
    backend: &dyn Solve,
    mut on_incumbent: impl FnMut(&TimetableOutput),
) -> Result<TimetableOutput, ScheduleError> {
    let problem = Problem::new(input)?;
    let mut model = model::Model::new();
    let net = network::Network::build(&problem, &mut model);
    constraints::post(&problem, &net, &mut model);
    let penalties = penalties::compose(&problem, &net, &mut model);
    model.set_objective(penalties.objective());

    let outcome = backend.solve(&model, options, &mut |incumbent| {
        info!(
            "incumbent #{} with objective {}",
            incumbent.sequence, incumbent.objective
        );
        let snapshot = report::build_output(
            &problem,
            &net,
            &penalties,
            incumbent.binding,
            SolveStatus::Feasible,
            0,
        );
        on_incumbent(&snapshot);
    });

    match outcome.status {
        SolveStatus::Optimal | SolveStatus::Feasible => {
            let binding = outcome
                .binding
                .expect("a solution status always carries a binding");
            info!(
                "solved with status {:?} in {:.2?}",
                outcome.status, outcome.wall_time
            );
            Ok(report::build_output(
                &problem,
                &net,
                &penalties,
                &binding,
                outcome.status,
                outcome.wall_time.as_millis() as u64,
            ))
        }
        SolveStatus::Infeasible => Err(ScheduleError::Infeasible(
            outcome
                .diagnostic
                .unwrap_or_else(|| "no diagnostic from the solver".into()),
        )),
        SolveStatus::Unknown => Err(ScheduleError::Unknown(
            outcome
                .diagnostic
                .unwrap_or_else(|| "no diagnostic from the solver".into()),
        )),
    }
}
