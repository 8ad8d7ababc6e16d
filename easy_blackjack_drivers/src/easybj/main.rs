use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use easy_blackjack::{
    to_currency, AutoPlayer, Bankroll, CardSource, Player, RandomShoe, RecordingShoe,
    StackedShoe,
};
use easy_blackjack_drivers::{
    load_config,
    manual::ManualPlayer,
    session::{play_session, TableOutput},
    CommandLineArgs, Settings, ShoeSettings,
};
use log::info;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CommandLineArgs::parse();
    let config = load_config(args.config.as_deref()).context("cannot load configuration")?;
    let settings = args.resolve(config)?;
    info!("settings: {:?}", settings);

    match &settings.shoe {
        ShoeSettings::File(path) => {
            let mut shoe = StackedShoe::from_file(path)
                .with_context(|| format!("cannot open shoe file {}", path.display()))?;
            play(&mut shoe, &settings)
        }
        ShoeSettings::Random { seed, record: None } => {
            play(&mut RandomShoe::new(*seed), &settings)
        }
        ShoeSettings::Random {
            seed,
            record: Some(path),
        } => {
            let mut shoe = RecordingShoe::new(RandomShoe::new(*seed));
            let played = play(&mut shoe, &settings);
            shoe.write_to(path)
                .with_context(|| format!("cannot record shoe to {}", path.display()))?;
            played
        }
    }
}

fn play<S: CardSource>(source: &mut S, settings: &Settings) -> Result<()> {
    match &settings.auto {
        Some(auto) => {
            let table = auto
                .strategy
                .load()
                .with_context(|| format!("cannot load strategy {}", auto.strategy))?;
            let mut player =
                AutoPlayer::new(table, auto.hands).with_fallback(auto.fallback_action);
            let mut output = TableOutput::new(io::stdout(), auto.silent);
            play_session(source, settings.base_bet, &mut player, &mut output)?;
            print_statistics(player.bankroll());
            println!("Player Advantage: {:.2}%", player.bankroll().advantage());
        }
        None => {
            let mut player = ManualPlayer::new(io::stdin().lock(), io::stdout());
            let mut output = TableOutput::new(io::stdout(), false);
            play_session(source, settings.base_bet, &mut player, &mut output)?;
            print_statistics(player.bankroll());
        }
    }
    Ok(())
}

fn print_statistics(bankroll: &Bankroll) {
    println!("Hands Played: {}", bankroll.hands_played());
    println!("Final Balance: {}", to_currency(bankroll.balance()));
}
