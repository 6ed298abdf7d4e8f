//! Solve the classic 8-node Jobstmann game for both objectives.
//!
//! Run with:
//! ```bash
//! cargo run --example jobstmann -- --dot
//! ```

use std::collections::BTreeSet;

use clap::Parser;

use gamegraph::dot::{to_dot, DotConfig};
use gamegraph::graphify::explicit_graph;
use gamegraph::model::{Next, TransitionSystem};
use gamegraph::solver::Solver;
use gamegraph::types::Player;
use gamegraph::zielonka::{SureWinReach, SureWinSafe};

#[derive(Parser)]
struct Args {
    /// Print the game graph in DOT format.
    #[arg(long)]
    dot: bool,
}

struct JobstmannGame {
    final_states: BTreeSet<i64>,
}

impl TransitionSystem for JobstmannGame {
    type State = i64;
    type Action = (i64, i64);

    fn states(&self) -> Vec<i64> {
        (0..8).collect()
    }

    fn actions(&self) -> Vec<(i64, i64)> {
        vec![
            (0, 1),
            (0, 3),
            (1, 0),
            (1, 2),
            (1, 4),
            (2, 2),
            (2, 4),
            (3, 0),
            (3, 4),
            (3, 5),
            (4, 1),
            (4, 3),
            (5, 3),
            (5, 6),
            (6, 6),
            (6, 7),
            (7, 0),
            (7, 3),
        ]
    }

    fn delta(&self, state: &i64, action: &(i64, i64)) -> Next<i64> {
        if *state == action.0 {
            Next::One(action.1)
        } else {
            Next::None
        }
    }

    fn turn(&self, state: &i64) -> Option<Player> {
        Some(if [0, 4, 6].contains(state) {
            Player::P1
        } else {
            Player::P2
        })
    }

    fn is_final(&self, state: &i64) -> Option<bool> {
        Some(self.final_states.contains(state))
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Args::parse();

    let game = JobstmannGame {
        final_states: BTreeSet::from([3, 4]),
    };
    let graph = explicit_graph(&game, false)?;
    println!("Expanded game: {}", graph);

    if args.dot {
        let config = DotConfig {
            node_labels: vec!["turn".to_string()],
            edge_labels: vec!["input".to_string()],
            ..DotConfig::default()
        };
        println!("{}", to_dot(&graph, &config)?);
    }

    let mut reach = SureWinReach::with_final_property(&graph, Player::P1)?;
    reach.solve()?;
    println!(
        "Reach {{3, 4}}: win1 = {:?}, win2 = {:?}",
        reach.winning_region(Player::P1)?,
        reach.winning_region(Player::P2)?
    );
    for uid in reach.winning_region(Player::P1)? {
        if let Some(edge) = reach.strategy_edge(uid)? {
            println!("  strategy at {}: -> {}", uid, edge.dst);
        }
    }

    let safety = JobstmannGame {
        final_states: BTreeSet::from([1, 2, 5]),
    };
    let graph2 = explicit_graph(&safety, false)?;
    let mut safe = SureWinSafe::with_final_property(&graph2, Player::P2)?;
    safe.solve()?;
    println!(
        "Stay in {{1, 2, 5}}: win1 = {:?}, win2 = {:?}",
        safe.winning_region(Player::P1)?,
        safe.winning_region(Player::P2)?
    );

    Ok(())
}
