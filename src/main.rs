use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match labscope_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Labscope failed to start");
            eprintln!("labscope: {e}");
            ExitCode::FAILURE
        }
    }
}
