use clap::Parser;
use campusgate_shell::BoxError;
mod args;
fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).init();
    let args = args::Args::parse();
    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().thread_name(env!("CARGO_PKG_NAME")).build()?;
    rt.block_on(async move {
        match args.config {
            args::Config::File(path) => campusgate_shell::startup_file(path).await,
        }
    })
}
