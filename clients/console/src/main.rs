mod console;
mod render;

use blackjack::{GameState, TableRules};
use clap::Parser;
use console::ConsoleIo;
use render::{Renderer, Style};
use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "blackjack-table", about = "Multiplayer blackjack at the console")]
struct Cli {
    /// JSON file with table rules; the flags below override it
    #[arg(long, env = "BLACKJACK_RULES")]
    rules: Option<PathBuf>,

    #[arg(long, env = "BLACKJACK_CASINO")]
    casino: Option<String>,

    /// Decks shuffled into the shoe on each top-up
    #[arg(long, env = "BLACKJACK_DECKS")]
    decks: Option<u8>,

    #[arg(long, env = "BLACKJACK_MAX_PLAYERS")]
    max_players: Option<usize>,

    /// Maximum hands per player through splitting
    #[arg(long, env = "BLACKJACK_MAX_HANDS")]
    max_hands: Option<usize>,

    /// Starting bankroll and rebuy amount
    #[arg(long, env = "BLACKJACK_BUY_IN")]
    buy_in: Option<f64>,

    #[arg(long, env = "BLACKJACK_SURRENDER", action = clap::ArgAction::Set)]
    surrender: Option<bool>,

    /// Allow drawing to split aces
    #[arg(long, env = "BLACKJACK_HIT_SPLIT_ACES", action = clap::ArgAction::Set)]
    hit_split_aces: Option<bool>,

    /// Seed for a reproducible shoe
    #[arg(long, env = "BLACKJACK_SEED")]
    seed: Option<u64>,

    /// Emit events and prompts as JSON lines
    #[arg(long)]
    json: bool,

    #[arg(long, env = "NO_COLOR")]
    no_color: bool,
}

impl Cli {
    fn table_rules(&self) -> Result<TableRules, Box<dyn Error>> {
        let mut rules = match &self.rules {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => TableRules::default(),
        };
        if let Some(casino) = &self.casino {
            rules.casino_name = casino.clone();
        }
        if let Some(decks) = self.decks {
            rules.decks = decks;
        }
        if let Some(max_players) = self.max_players {
            rules.max_players = max_players;
        }
        if let Some(max_hands) = self.max_hands {
            rules.max_hands = max_hands;
        }
        if let Some(buy_in) = self.buy_in {
            rules.buy_in = buy_in;
        }
        if let Some(surrender) = self.surrender {
            rules.surrender_allowed = surrender;
        }
        if let Some(hit_split_aces) = self.hit_split_aces {
            rules.hit_split_aces = hit_split_aces;
        }
        rules.validate()?;
        Ok(rules)
    }

    fn style(&self, terminal: bool) -> Style {
        if self.json {
            Style::Json
        } else if self.no_color || !terminal {
            Style::Plain
        } else {
            Style::Color
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let rules = cli.table_rules()?;
    log::info!("table rules: {rules:?}");

    let mut game = GameState::with_seed(rules, cli.seed)?;
    let stdout = io::stdout();
    let renderer = Renderer::new(cli.style(stdout.is_terminal()));
    let mut console = ConsoleIo::new(io::stdin().lock(), stdout.lock(), renderer);

    match game.run(&mut console) {
        Ok(rounds) => {
            log::info!("table closed after {rounds} rounds");
            Ok(())
        }
        Err(blackjack::Error::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
            log::info!("input closed, leaving the table");
            console.finish()?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
