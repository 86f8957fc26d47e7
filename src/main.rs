use std::process::ExitCode;

use amber_agent::AgentError;
use amber_agent::error::EXIT_FAILURE;

fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    match amber_agent::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let agent_error = err.downcast_ref::<AgentError>();
            match agent_error {
                Some(e @ AgentError::NoConfidentMatch { .. }) => {
                    eprintln!("{}", e);
                    eprintln!("Try a different keyword, or lower --min-score.");
                }
                _ => eprintln!("Error: {:#}", err),
            }
            let code = agent_error.map(AgentError::exit_code).unwrap_or(EXIT_FAILURE);
            ExitCode::from(code as u8)
        }
    }
}
