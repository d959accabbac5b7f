use anyhow::Context;
use timetable_solver::solver::SolveOptions;
use timetable_solver::{report, server, TimetableInput};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // A file argument solves once and prints; no argument serves HTTP.
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading preference table {path}"))?;
            let input: TimetableInput =
                serde_json::from_str(&raw).context("parsing preference table")?;
            let output = timetable_solver::solve(input, &SolveOptions::default())?;
            print!("{}", report::render_text(&output));
        }
        None => server::run_server().await,
    }

    Ok(())
}
