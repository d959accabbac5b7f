use crate::data::TimetableInput;
use crate::error::ScheduleError;
use crate::report::TimetableOutput;
use crate::solver::SolveOptions;
use axum::{http::StatusCode, routing::post, Json, Router};

async fn solve_handler(
    Json(input): Json<TimetableInput>,
) -> Result<Json<TimetableOutput>, (StatusCode, String)> {
    match crate::solve(input, &SolveOptions::default()) {
        Ok(output) => Ok(Json(output)),
        Err(e @ ScheduleError::Config(_)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e @ ScheduleError::Infeasible(_)) => {
            Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

pub async fn run_server() {
    let app = Router::new().route("/v1/timetable/solve", post(solve_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .expect("bind 127.0.0.1:8080");

    println!("Server running at http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
