//! rpgtracker - tabletop RPG combat tracker
//!
//! Loads the saved encounter, applies one command, saves the collections it
//! touched and prints the result.

use std::process::ExitCode;

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use rpgtracker::cli::{parse_args, Args, Command};
use rpgtracker::combat::{GameRng, Outcome};
use rpgtracker::headless::run_script_file;
use rpgtracker::persistence::SaveDir;
use rpgtracker::CombatLogEventType;
use rpgtracker::settings::TrackerSettings;
use rpgtracker::view::EncounterView;

fn main() -> ExitCode {
    let args = parse_args();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(args: Args) -> Result<(), String> {
    let settings = TrackerSettings::load(&args.settings);
    let command = args.command.unwrap_or(Command::Show);

    match &command {
        Command::Run { script, output } => {
            run_script_file(script, output.as_deref())?;
            return Ok(());
        }
        Command::InitSettings => {
            settings.save(&args.settings).map_err(|e| e.to_string())?;
            println!("Settings written to {}", args.settings.display());
            return Ok(());
        }
        _ => {}
    }

    let save_dir = SaveDir::new(args.save_dir.unwrap_or_else(|| settings.save_dir.clone()));
    debug!("Using save directory {:?}", save_dir.root());

    let mut encounter = save_dir.load_encounter().with_rules(settings.gate_rules());
    if let Command::Start { seed: Some(seed), .. } = &command {
        encounter = encounter.with_rng(GameRng::from_seed(*seed));
    }

    if let Some(intent) = command.to_intent(&settings) {
        let applied = encounter.apply(intent).map_err(|e| e.to_string())?;
        save_dir
            .save_touched(&encounter, applied.touched)
            .map_err(|e| e.to_string())?;

        if let Outcome::Rejected(rejection) = &applied.outcome {
            println!("! {}", rejection);
        }
        for entry in &encounter.log().entries {
            if entry.event_type != CombatLogEventType::Rejected {
                println!("* {}", entry.message);
            }
        }
    }

    print!("{}", EncounterView::build(&encounter));
    Ok(())
}
