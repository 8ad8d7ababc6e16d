//! Interactive play on a console.

use std::{
    fmt,
    io::{BufRead, Write},
};

use easy_blackjack::{Action, ActionSet, BalanceSink, Bankroll, Hand, Player};
use log::warn;

/// Asks a human for every decision, reading answers from `input` and writing
/// the table and the prompts to `output`.
pub struct ManualPlayer<R, W> {
    input: R,
    output: W,
    bankroll: Bankroll,
}

impl<R: BufRead, W: Write> ManualPlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ManualPlayer {
            input,
            output,
            bankroll: Bankroll::new(),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, args: fmt::Arguments) {
        let result = self
            .output
            .write_fmt(args)
            .and_then(|_| self.output.flush());
        if let Err(err) = result {
            warn!("cannot write to the console: {}", err);
        }
    }

    /// Next line of input, `None` at end of input.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(err) => {
                warn!("cannot read from the console: {}", err);
                None
            }
        }
    }
}

/// `Stand (S) Hit (H) Double (D): ` for the given actions.
pub fn prompt_for(legal: ActionSet) -> String {
    let choices: Vec<String> = legal
        .iter()
        .map(|action| format!("{:?} ({})", action, action.letter()))
        .collect();
    format!("{}: ", choices.join(" "))
}

impl<R: BufRead, W: Write> BalanceSink for ManualPlayer<R, W> {
    fn update_balance(&mut self, amount: f64) {
        self.bankroll.update_balance(amount);
    }
}

impl<R: BufRead, W: Write> Player for ManualPlayer<R, W> {
    fn decide(&mut self, hand: &Hand, dealer_upcard: &Hand, legal: ActionSet) -> Action {
        self.say(format_args!("Dealer: {}\nPlayer: {}\n", dealer_upcard, hand));
        let prompt = prompt_for(legal);
        loop {
            self.say(format_args!("{}", prompt));
            let Some(line) = self.read_line() else {
                // Out of input: stand if possible so the round can finish.
                return legal.iter().next().unwrap_or(Action::Stand);
            };
            let chosen = line
                .trim()
                .chars()
                .next()
                .and_then(Action::from_letter)
                .filter(|action| legal.contains(*action));
            if let Some(action) = chosen {
                return action;
            }
        }
    }

    fn play_again(&mut self) -> bool {
        self.say(format_args!("Press Any Key to Continue, (Q to Quit): "));
        match self.read_line() {
            Some(line) => !line.trim_start().to_ascii_uppercase().starts_with('Q'),
            None => false,
        }
    }

    fn bankroll(&self) -> &Bankroll {
        &self.bankroll
    }
}
