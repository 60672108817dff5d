//=========================================================================
// boxfall
//
// Command line entry point: parse arguments, set up logging, resolve the
// configuration and hand over to the engine.
//
//=========================================================================

use std::process;

use boxfall::config::{parse_args, CliCommand, USAGE};
use boxfall::logging::{init_logging, LoggingConfig};
use boxfall::EngineBuilder;

fn main() {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(CliCommand::Run(options)) => options,
        Ok(CliCommand::Help) => {
            println!("{}", USAGE);
            return;
        }
        Err(e) => {
            eprintln!("boxfall: {}\n\n{}", e, USAGE);
            process::exit(2);
        }
    };

    init_logging(LoggingConfig::with_level(options.log_level));

    let config = match options.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("boxfall: {}", e);
            process::exit(2);
        }
    };

    EngineBuilder::new(config).build().run();
}
