#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Card Defence simulation.

mod effect_transfer;
mod simulation;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use card_defence_core::{CardType, Direction, TileCoord};
use card_defence_system_effects::CardData;
use card_defence_world::{BoardLayout, TileGraph};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::{
    effect_transfer::EffectTransfer,
    simulation::{serpentine_board, PlannedPlay, Simulation, SimulationConfig},
};

const DEFAULT_COLUMNS: u32 = 8;
const DEFAULT_ROWS: u32 = 6;
const DEFAULT_TILE_LENGTH: f32 = 1.0;

/// Command-line arguments for the Card Defence simulation.
#[derive(Debug, Parser)]
#[command(name = "card-defence", about = "Runs a headless Card Defence simulation.")]
struct CliArgs {
    /// Board layout JSON; a serpentine board is generated when omitted.
    #[arg(long, value_name = "PATH")]
    board: Option<PathBuf>,
    /// JSON list of planned card plays.
    #[arg(long, value_name = "PATH")]
    cards: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Ticks between enemy spawns; 0 disables spawning.
    #[arg(long, default_value_t = 60)]
    spawn_every: u64,
    /// Tile enemies enter the board on, as `x,y`.
    #[arg(long, value_name = "X,Y", value_parser = parse_tile, default_value = "0,0")]
    spawn: TileCoord,
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log: String,
    /// Effect transfer string played before the first tick.
    #[arg(long, value_name = "TRANSFER")]
    effect: Option<String>,
    /// Origin tile of the `--effect` activation, as `x,y`.
    #[arg(long, value_name = "X,Y", value_parser = parse_tile, default_value = "0,0")]
    origin: TileCoord,
    /// Facing of the `--effect` activation.
    #[arg(long, value_enum, default_value_t = Facing::North)]
    facing: Facing,
    /// Prints the transfer string of every effect in the deck and exits.
    #[arg(long)]
    export_effects: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Facing {
    North,
    East,
    South,
    West,
}

impl From<Facing> for Direction {
    fn from(facing: Facing) -> Self {
        match facing {
            Facing::North => Direction::North,
            Facing::East => Direction::East,
            Facing::South => Direction::South,
            Facing::West => Direction::West,
        }
    }
}

/// Entry point for the Card Defence command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log)?;

    let deck = match &args.cards {
        Some(path) => load_deck(path)?,
        None => Vec::new(),
    };

    if args.export_effects {
        for play in &deck {
            for effect in &play.card.effects {
                let title = &play.card.title;
                let line = EffectTransfer::new(effect.clone())
                    .encode()
                    .with_context(|| format!("failed to encode effect of '{title}'"))?;
                println!("{line}");
            }
        }
        return Ok(());
    }

    let graph = load_board(args.board.as_deref())?;
    if !graph.contains(args.spawn) {
        bail!("spawn tile {} is not on the board", args.spawn);
    }

    let config = SimulationConfig {
        ticks: args.ticks,
        spawn_every: args.spawn_every,
        spawn_tile: args.spawn,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(graph, config);

    if let Some(transfer) = &args.effect {
        let decoded = EffectTransfer::decode(transfer).context("failed to decode --effect")?;
        simulation.schedule(PlannedPlay {
            tick: 0,
            origin: args.origin,
            facing: args.facing.into(),
            target: None,
            card: CardData {
                title: "Transferred effect".to_owned(),
                card_type: CardType::Spell,
                effects: vec![decoded.effect],
                ..CardData::default()
            },
        });
    }

    for play in deck {
        let rules = play.card.description(None);
        tracing::debug!(
            title = %play.card.title,
            tick = play.tick,
            rules = %rules.trim_end(),
            "scheduled card"
        );
        simulation.schedule(play);
    }

    let summary = simulation.run();
    println!("{summary}");
    Ok(())
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .with_context(|| format!("invalid log filter '{default_filter}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!(error))
        .context("failed to install tracing subscriber")
}

fn load_board(path: Option<&Path>) -> Result<TileGraph> {
    let layout = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read board {}", path.display()))?;
            serde_json::from_str::<BoardLayout>(&text)
                .with_context(|| format!("failed to parse board {}", path.display()))?
        }
        None => serpentine_board(DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_TILE_LENGTH),
    };
    TileGraph::from_layout(&layout).context("board layout is not a valid tile graph")
}

fn load_deck(path: &Path) -> Result<Vec<PlannedPlay>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read cards {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse cards {}", path.display()))
}

fn parse_tile(value: &str) -> Result<TileCoord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{value}'"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid column '{x}': {error}"))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid row '{y}': {error}"))?;
    Ok(TileCoord::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tile_arguments() {
        assert_eq!(parse_tile("3,-1"), Ok(TileCoord::new(3, -1)));
        assert_eq!(parse_tile(" 2 , 4 "), Ok(TileCoord::new(2, 4)));
        assert!(parse_tile("3").is_err());
        assert!(parse_tile("a,1").is_err());
    }

    #[test]
    fn default_board_is_a_valid_graph() {
        let graph = load_board(None).expect("board");

        assert_eq!(graph.len(), (DEFAULT_COLUMNS * DEFAULT_ROWS) as usize);
    }

    #[test]
    fn arguments_parse_with_defaults() {
        let args = CliArgs::try_parse_from(["card-defence", "--ticks", "10", "--facing", "west"])
            .expect("args");

        assert_eq!(args.ticks, 10);
        assert_eq!(args.spawn_every, 60);
        assert_eq!(args.spawn, TileCoord::new(0, 0));
        assert_eq!(Direction::from(args.facing), Direction::West);
        assert!(!args.export_effects);
    }
}
