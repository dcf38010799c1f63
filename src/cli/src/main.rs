#![warn(clippy::pedantic)]

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use cli::{Session, Status};
use color_eyre::{
    eyre::{bail, eyre},
    owo_colors::OwoColorize,
};
use cube_core::{
    Face, FaceletState, Stage,
    facelet::{FACELET_COUNT, facelet_index},
};
use env_logger::TimestampPrecision;
use log::{LevelFilter, info};
use stage_solver::{SolverConfig, StageSolver};

/// Guides a 3x3 cube through the seven beginner stages
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Solver limits, in TOML format
    #[arg(long, short = 'c', value_name = "SOLVER_CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shuffle a cube, then solve it one stage at a time
    Walkthrough {
        /// Seed for the shuffle; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Number of quarter turns in the shuffle
        #[arg(long, default_value_t = 25)]
        turns: usize,
    },
    /// Find the moves for a single stage of a facelet string
    Step {
        /// Stage number, from 1 to 7
        #[arg(long, short, value_parser = clap::value_parser!(u8).range(1..=7))]
        stage: u8,
        /// 54 facelets in U R F D L B order
        state: String,
        /// Solved state to compare against; built from the centers when omitted.
        /// A reference that is not one color per face makes the cross search
        /// run without its distance table, which can take minutes
        #[arg(long)]
        reference: Option<String>,
    },
    /// Solve a facelet string in one go
    Solve {
        /// 54 facelets in U R F D L B order
        state: String,
        /// Solved state to compare against; built from the centers when omitted
        #[arg(long)]
        reference: Option<String>,
    },
    /// Print a random shuffle and the state it leads to
    Scramble {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 25)]
        turns: usize,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let config = match &cli.config {
        Some(path) => SolverConfig::from_toml_file(path)?,
        None => SolverConfig::default(),
    };

    match cli.command {
        Commands::Walkthrough { seed, turns } => walkthrough(config, seed, turns),
        Commands::Step {
            stage,
            state,
            reference,
        } => {
            let stage = Stage::from_index(usize::from(stage - 1))
                .ok_or_else(|| eyre!("No stage {stage}"))?;
            let (state, solver) = load(&state, reference.as_deref(), config)?;
            let solution = solver.solve(stage, &state)?;
            print_stage(stage);
            if solution.is_empty() {
                println!("{}", Status::StepAlreadySolved.yellow());
            } else {
                println!("{}", solution.green());
            }
            if let Some(notice) = solver.notice(stage, &state, &solution) {
                println!("{}", notice.yellow());
            }
            Ok(())
        }
        Commands::Solve { state, reference } => {
            let (state, solver) = load(&state, reference.as_deref(), config)?;
            let solution = solver.solve_full(&state)?;
            if solution.is_empty() {
                println!("{}", Status::AlreadySolved.yellow());
            } else {
                println!("{} ({} moves)", solution.green(), solution.len());
            }
            Ok(())
        }
        Commands::Scramble { seed, turns } => {
            let mut session = Session::new(config)?;
            let scramble = session.shuffle(turns, &mut rng(seed));
            session.play_queue()?;
            let state = session.state()?;
            println!("{}", scramble.bold());
            println!("{state}");
            print_net(&state);
            Ok(())
        }
    }
}

fn rng(seed: Option<u64>) -> fastrand::Rng {
    seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed)
}

/// Parses a state and builds a solver for it. Without an explicit reference
/// the solved cube is the one whose faces all match their centers.
fn load(
    state: &str,
    reference: Option<&str>,
    config: SolverConfig,
) -> color_eyre::Result<(FaceletState, StageSolver)> {
    let state: FaceletState = state.parse()?;
    let reference = match reference {
        Some(reference) => reference.parse()?,
        None => {
            let mut facelets = [0; FACELET_COUNT];
            for face in Face::ALL {
                for position in 0..9 {
                    facelets[facelet_index(face, position)] = state.center(face);
                }
            }
            FaceletState::from_bytes(facelets)?
        }
    };
    Ok((state, StageSolver::new(reference, config)))
}

fn walkthrough(config: SolverConfig, seed: Option<u64>, turns: usize) -> color_eyre::Result<()> {
    let mut session = Session::new(config)?;
    let scramble = session.shuffle(turns, &mut rng(seed));
    session.play_queue()?;
    println!("{} {}", "Shuffle:".bold(), scramble);
    print_net(&session.state()?);

    loop {
        let stage = session.stage();
        print_stage(stage);
        println!("  {} {}", "Algorithm:".dimmed(), session.shown_algorithm());

        let Some(solution) = session.request_step()? else {
            bail!("{}", session.status());
        };
        if solution.is_empty() {
            println!("  {}", session.status().yellow());
            if stage.is_final() {
                break;
            }
            session.next_stage();
            continue;
        }

        println!("  {} {}", "Moves:".dimmed(), solution.green());
        session.play_queue()?;
        if let Status::Notice(notice) = session.status() {
            println!("  {}", notice.yellow());
        }
        if stage.is_final() {
            break;
        }
        if session.stage() == stage {
            bail!("{stage} is still open after its moves");
        }
    }

    let state = session.state()?;
    if !session.solver().oracle().is_solved(&state) {
        bail!("The walkthrough ended on an unsolved cube");
    }
    info!("Walkthrough finished");
    println!("{}", "Solved!".green().bold());
    Ok(())
}

fn print_stage(stage: Stage) {
    println!(
        "{} {}",
        format!("Step {}/{}: {}", stage.index() + 1, Stage::ALL.len(), stage.title()).bold(),
        format!("({})", stage.goal()).dimmed()
    );
}

fn sticker(symbol: u8) -> String {
    let cell = "  ";
    match symbol {
        b'W' => cell.on_white().to_string(),
        b'R' => cell.on_red().to_string(),
        b'G' => cell.on_green().to_string(),
        b'Y' => cell.on_yellow().to_string(),
        b'O' => cell.on_truecolor(255, 140, 0).to_string(),
        b'B' => cell.on_blue().to_string(),
        other => format!("{} ", char::from(other)),
    }
}

/// Prints the cube unfolded, with U above and D below the L F R B band.
fn print_net(state: &FaceletState) {
    let row = |face: Face, r: usize| -> String {
        (0..3).map(|c| sticker(state.at(face, r * 3 + c))).collect()
    };
    for r in 0..3 {
        println!("{:6}{}", "", row(Face::U, r));
    }
    for r in 0..3 {
        let band: String = [Face::L, Face::F, Face::R, Face::B]
            .into_iter()
            .map(|face| row(face, r))
            .collect();
        println!("{band}");
    }
    for r in 0..3 {
        println!("{:6}{}", "", row(Face::D, r));
    }
}

#[cfg(test)]
mod tests {
    use cli::LatticeCube;

    use super::*;

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn reference_follows_the_centers() {
        let solved = LatticeCube::default().state().unwrap();
        let (_, solver) = load(&solved.to_string(), None, SolverConfig::default()).unwrap();
        assert!(solver.oracle().is_solved(&solved));
    }
}
