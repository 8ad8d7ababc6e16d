use std::{fmt, io::Write};

use easy_blackjack::{
    play_round, to_currency, Bankroll, CardSource, Player, RoundError, RoundEventHandler,
    RoundSummary,
};
use log::warn;

/// Prints every finished round, unless silent.
pub struct TableOutput<W> {
    output: W,
    silent: bool,
}

impl<W: Write> TableOutput<W> {
    pub fn new(output: W, silent: bool) -> Self {
        TableOutput { output, silent }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn show_balance(&mut self, bankroll: &Bankroll) {
        self.say(format_args!(
            "Current Balance: {}\n\n",
            to_currency(bankroll.balance())
        ));
    }

    fn say(&mut self, args: fmt::Arguments) {
        if self.silent {
            return;
        }
        if let Err(err) = self.output.write_fmt(args) {
            warn!("cannot write round output: {}", err);
        }
    }
}

impl<W: Write> RoundEventHandler for TableOutput<W> {
    fn on_finish(&mut self, summary: &RoundSummary) {
        self.say(format_args!("{}\n", summary));
    }
}

/// Plays rounds until the player wants to stop. At least one round is played.
pub fn play_session<S, P, W>(
    source: &mut S,
    base_bet: f64,
    player: &mut P,
    output: &mut TableOutput<W>,
) -> Result<(), RoundError>
where
    S: CardSource + ?Sized,
    P: Player + ?Sized,
    W: Write,
{
    loop {
        play_round(source, base_bet, player, output)?;
        output.show_balance(player.bankroll());
        if !player.play_again() {
            return Ok(());
        }
    }
}
