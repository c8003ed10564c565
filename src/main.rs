use clap::Parser;
use unet_seg::application::experiment::SpecError;
use unet_seg::cli::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("unet_seg=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = cli.run() {
        eprintln!("Error: {err:#}");
        // Configuration mistakes (missing experiment dir, bad specs.json,
        // unknown loss name) get their own exit code so scripts can tell
        // them apart from mid-training failures.
        let code = if err.downcast_ref::<SpecError>().is_some() { 2 } else { 1 };
        std::process::exit(code);
    }
}
