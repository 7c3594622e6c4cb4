use uniqdice::cli::{Args, Command, SimulateCommand};

fn main() {
    // logs go to stderr; stdout is just the summary
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::new(pico_args::Arguments::from_env());

    match SimulateCommand::try_from_cli_args(args).and_then(SimulateCommand::run) {
        Ok(output) => {
            println!("{}", output);
            if let Some(metrics) = &output.metrics {
                eprintln!("\n{}", metrics.to_table());
            }
        }
        Err(err) => {
            eprintln!("error: {}", err);
            eprintln!("Try 'uniqdice --help' for more information.");
            std::process::exit(1);
        }
    }
}
