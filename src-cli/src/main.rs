use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match piiscan_cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("piiscan: {e:#}");
            ExitCode::FAILURE
        }
    }
}
