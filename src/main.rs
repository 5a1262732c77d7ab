mod cli;

use action_recorder::config::Config;
use clap::Parser;
use cli::{Args, Command};
use std::sync::Arc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let config_path = args.config.as_deref();

    if let Command::Config { action } = args.command {
        let config = Config::load(config_path).map_err(|e| e.to_string())?;
        return cli::handle_config_action(action, &config, config_path);
    }

    // If --config is specified, require the file to exist
    if let Some(path) = config_path {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }
    }
    let config = Config::load(config_path).map_err(|e| e.to_string())?;

    match args.command {
        Command::Record {
            no_keyboard,
            max_events,
            scroll,
        } => {
            let recorder = cli::build_recorder(&config, args.dir, no_keyboard, max_events, scroll)?;
            cli::run_record(
                Arc::new(recorder),
                &config.capture.stop_key,
                &config.capture.pause_key,
            )
        }
        Command::List => {
            let recorder = cli::build_recorder(&config, args.dir, false, None, None)?;
            cli::run_list(&recorder)
        }
        Command::Replay {
            id,
            no_precision,
            loops,
            skip,
        } => {
            let recorder = cli::build_recorder(&config, args.dir, false, None, None)?;
            let precision = config.replay.precision && !no_precision;
            cli::run_replay(Arc::new(recorder), &id, precision, loops, skip)
        }
        Command::Delete { ids } => {
            let recorder = cli::build_recorder(&config, args.dir, false, None, None)?;
            cli::run_delete(&recorder, &ids)
        }
        Command::Export { ids, output } => {
            let recorder = cli::build_recorder(&config, args.dir, false, None, None)?;
            cli::run_export(&recorder, &ids, output.as_deref())
        }
        Command::Import { file } => {
            let recorder = cli::build_recorder(&config, args.dir, false, None, None)?;
            cli::run_import(&recorder, &file)
        }
        Command::Config { .. } => Ok(()),
    }
}
