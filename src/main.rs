//! `ai-processor`: read one JSON request from stdin, print the generated text.

use ai_processor::observability::init_tracing;
use ai_processor::{router, ClientConfig, HttpClientFactory, InputError};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let mut input = Vec::new();
    if let Err(err) = tokio::io::stdin().read_to_end(&mut input).await {
        println!("{}", InputError::Read(err));
        return ExitCode::FAILURE;
    }

    let factory = HttpClientFactory::new(ClientConfig::from_env());
    let outcome = router::run(&input, &factory).await;

    println!("{}", outcome.output);
    if outcome.is_fatal() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
