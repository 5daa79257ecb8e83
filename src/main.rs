use rand::SeedableRng;
use rand::rngs::StdRng;
use semantic_guess::cli::{CliInterface, parse_cli};
use semantic_guess::config::{Settings, default_settings_path};
use semantic_guess::tui::TuiInterface;
use semantic_guess::{Engine, GameError, GenrePools, VectorTable, game_loop, logging};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_cli();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &semantic_guess::cli::Cli) -> Result<(), GameError> {
    let settings = match cli.settings_path.clone().or_else(default_settings_path) {
        Some(path) => Settings::load(&path),
        None => Settings::default(),
    };

    println!("Loading word vectors from {} ...", cli.model_path.display());
    let provider = VectorTable::load(&cli.model_path, cli.vocabulary_limit)?;
    println!("Loaded {} words.", provider.len());
    let pools = GenrePools::load_from_dir(&cli.data_dir)?;

    let engine = Engine::new(&provider, &pools);
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if cli.tui {
        let mut interface = TuiInterface::new()?;
        game_loop(&engine, &settings, &mut interface, &mut rng);
        interface.cleanup()?;
    } else {
        println!("\nFind the hidden word from how close your guesses are in meaning!");
        let mut interface = CliInterface::new(io::stdin().lock());
        game_loop(&engine, &settings, &mut interface, &mut rng);
    }
    Ok(())
}
