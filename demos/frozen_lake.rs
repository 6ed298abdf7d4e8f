//! A slippery gridworld MDP: reach the goal without falling into a hole.
//!
//! Moving on ice may veer sideways, so almost-sure winning demands a
//! route where no possible slip ends in a hole; positive winning only
//! needs some lucky path. Run with:
//! ```bash
//! cargo run --example frozen_lake -- --width 4 --height 4
//! ```

use clap::Parser;

use gamegraph::graph::GraphView;
use gamegraph::graphify::explicit_graph;
use gamegraph::mdp::{AlmostSureWinReach, PositiveWinReach};
use gamegraph::model::{Next, TransitionSystem};
use gamegraph::solver::Solver;

#[derive(Parser)]
struct Args {
    #[arg(long, default_value_t = 4)]
    width: i64,
    #[arg(long, default_value_t = 4)]
    height: i64,
}

struct FrozenLake {
    width: i64,
    height: i64,
    holes: Vec<(i64, i64)>,
    goal: (i64, i64),
}

impl FrozenLake {
    fn in_bounds(&self, cell: (i64, i64)) -> bool {
        cell.0 >= 0 && cell.0 < self.width && cell.1 >= 0 && cell.1 < self.height
    }

    fn is_terminal(&self, cell: (i64, i64)) -> bool {
        self.holes.contains(&cell) || cell == self.goal
    }

    /// The cell actually reached when moving from `cell` by `step`,
    /// staying in place at walls.
    fn slide(&self, cell: (i64, i64), step: (i64, i64)) -> (i64, i64) {
        let next = (cell.0 + step.0, cell.1 + step.1);
        if self.in_bounds(next) {
            next
        } else {
            cell
        }
    }
}

impl TransitionSystem for FrozenLake {
    type State = (i64, i64);
    type Action = &'static str;

    fn states(&self) -> Vec<(i64, i64)> {
        (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| (x, y)))
            .collect()
    }

    fn actions(&self) -> Vec<&'static str> {
        vec!["up", "down", "left", "right"]
    }

    fn delta(&self, state: &(i64, i64), action: &&'static str) -> Next<(i64, i64)> {
        if self.is_terminal(*state) {
            return Next::One(*state);
        }

        // Intended direction plus the two perpendicular slips.
        let (step, slips) = match *action {
            "up" => ((0, 1), [(-1, 0), (1, 0)]),
            "down" => ((0, -1), [(-1, 0), (1, 0)]),
            "left" => ((-1, 0), [(0, -1), (0, 1)]),
            "right" => ((1, 0), [(0, -1), (0, 1)]),
            _ => return Next::None,
        };

        let mut outcomes = vec![self.slide(*state, step)];
        for slip in slips {
            let outcome = self.slide(*state, slip);
            if !outcomes.contains(&outcome) {
                outcomes.push(outcome);
            }
        }
        Next::Many(outcomes)
    }

    fn init_state(&self) -> Option<(i64, i64)> {
        Some((0, 0))
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn is_final(&self, state: &(i64, i64)) -> Option<bool> {
        Some(*state == self.goal)
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
    let lake = FrozenLake {
        width: args.width,
        height: args.height,
        holes: vec![(1, 1), (3, 2)],
        goal: (args.width - 1, args.height - 1),
    };

    let graph = explicit_graph(&lake, true)?;
    println!("Expanded lake: {}", graph);

    let mut almost_sure = AlmostSureWinReach::with_final_property(&graph)?;
    almost_sure.solve()?;
    let mut positive = PositiveWinReach::with_final_property(&graph)?;
    positive.solve()?;

    println!("cell -> almost-sure / positive:");
    for uid in graph.nodes() {
        let state = graph.node_prop("state", uid)?;
        println!(
            "  {}: {} / {}",
            state,
            almost_sure.is_winning(uid)?,
            positive.is_winning(uid)?
        );
    }

    Ok(())
}
