//! Terminal collaborator: prompts on the writer, reads answers line by line and
//! keeps asking until an answer is usable.

use crate::render::{Prompt, Renderer, Style};
use blackjack::{Action, BetResponse, HandView, Player, Question, Result, TableEvent, TableIo};
use std::io::{self, BufRead, Write};

pub struct ConsoleIo<R, W> {
    input: R,
    output: W,
    renderer: Renderer,
}

impl<R: BufRead, W: Write> ConsoleIo<R, W> {
    pub fn new(input: R, output: W, renderer: Renderer) -> Self {
        Self {
            input,
            output,
            renderer,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Ends the last prompt line after input runs out.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.renderer.style() != Style::Json {
            writeln!(self.output)?;
        }
        self.output.flush()
    }

    fn ask(&mut self, prompt: &Prompt) -> Result<String> {
        let text = self.renderer.prompt(prompt).map_err(io::Error::from)?;
        if self.renderer.style() == Style::Json {
            writeln!(self.output, "{text}")?;
        } else {
            write!(self.output, "{text}")?;
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", self.renderer.notice(text))?;
        Ok(())
    }
}

pub fn parse_count(input: &str, min: usize, max: usize) -> std::result::Result<usize, &'static str> {
    let count: usize = input.parse().map_err(|_| "That's not a valid number.")?;
    if count > max {
        Err("The table can't hold that many players!")
    } else if count < min {
        Err("At least one player required.")
    } else {
        Ok(count)
    }
}

/// "leave" or a whole amount no larger than the bankroll. Zero also means leave.
pub fn parse_bet(input: &str, bankroll: f64) -> std::result::Result<BetResponse, &'static str> {
    if input.eq_ignore_ascii_case("leave") {
        return Ok(BetResponse::Leave);
    }
    let amount: u64 = input.parse().map_err(|_| "Invalid bet.")?;
    if amount as f64 > bankroll {
        return Err("Insufficient funds.");
    }
    Ok(BetResponse::Bet(amount))
}

pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

pub fn parse_action(input: &str, legal: &[Action]) -> Option<Action> {
    input
        .parse::<Action>()
        .ok()
        .filter(|action| legal.contains(action))
}

impl<R: BufRead, W: Write> TableIo for ConsoleIo<R, W> {
    fn request_player_count(&mut self, min: usize, max: usize) -> Result<usize> {
        loop {
            let answer = self.ask(&Prompt::PlayerCount { min, max })?;
            match parse_count(&answer, min, max) {
                Ok(count) => return Ok(count),
                Err(reason) => self.say(reason)?,
            }
        }
    }

    fn request_player_name(&mut self, seat: usize) -> Result<String> {
        self.ask(&Prompt::PlayerName { seat })
    }

    fn request_bet(&mut self, player: &Player) -> Result<BetResponse> {
        loop {
            let answer = self.ask(&Prompt::Bet {
                player: &player.name,
                bankroll: player.bankroll,
            })?;
            match parse_bet(&answer, player.bankroll) {
                Ok(bet) => return Ok(bet),
                Err(reason) => self.say(reason)?,
            }
        }
    }

    fn request_yes_no(&mut self, question: &Question) -> Result<bool> {
        loop {
            let answer = self.ask(&Prompt::YesNo { question })?;
            match parse_yes_no(&answer) {
                Some(yes) => return Ok(yes),
                None => self.say("Please answer yes or no.")?,
            }
        }
    }

    fn request_action(&mut self, hand: &HandView, legal: &[Action]) -> Result<Action> {
        loop {
            let answer = self.ask(&Prompt::Action { hand, legal })?;
            match parse_action(&answer, legal) {
                Some(action) => return Ok(action),
                None => self.say("Invalid option.")?,
            }
        }
    }

    fn notify(&mut self, event: TableEvent) -> Result<()> {
        let text = self.renderer.event(&event).map_err(io::Error::from)?;
        writeln!(self.output, "{text}")?;
        Ok(())
    }
}
