//! One learner's walk through the stages: a physical cube, the current
//! stage, moves waiting to be played and the status line.

use std::{collections::VecDeque, fmt};

use cube_core::{Algorithm, Face, FaceletState, Indeterminate, Stage, Token, Turn, reference};
use log::{debug, info, warn};
use stage_solver::{Notice, SolverConfig, StageSolver};
use thiserror::Error;

use crate::lattice::LatticeCube;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The cube is mid-turn: {0}")]
    Unsettled(#[from] Indeterminate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    Searching,
    Queued(usize),
    StepAlreadySolved,
    CouldNotIsolate,
    SolverFailed,
    AlreadySolved,
    Notice(Notice),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => write!(f, "Ready"),
            Status::Searching => write!(f, "Searching..."),
            Status::Queued(n) => write!(f, "Queued {n}"),
            Status::StepAlreadySolved => write!(f, "Step already solved. Use Next to continue."),
            Status::CouldNotIsolate => write!(f, "Could not isolate this step. Try again."),
            Status::SolverFailed => write!(f, "Solver failed"),
            Status::AlreadySolved => write!(f, "Already solved"),
            Status::Notice(notice) => write!(f, "{notice}"),
        }
    }
}

pub struct Session {
    cube: LatticeCube,
    solver: StageSolver,
    stage: Stage,
    queue: VecDeque<Token>,
    /// Set while a guided step's moves are queued.
    pending_advance: Option<Stage>,
    pending_notice: Option<Notice>,
    /// The sequence last found for each stage, shown instead of the fixed
    /// algorithm.
    overrides: [Option<Algorithm>; 7],
    status: Status,
}

impl Session {
    /// Starts on a solved cube, capturing it as the solved reference unless
    /// one exists already.
    ///
    /// # Errors
    ///
    /// Fails when the cube cannot be read.
    pub fn new(config: SolverConfig) -> Result<Self, SessionError> {
        let cube = LatticeCube::default();
        let reference = reference::capture_if_unset(cube.state()?);
        Ok(Self {
            cube,
            solver: StageSolver::new(reference, config),
            stage: Stage::Cross,
            queue: VecDeque::new(),
            pending_advance: None,
            pending_notice: None,
            overrides: Default::default(),
            status: Status::Ready,
        })
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn solver(&self) -> &StageSolver {
        &self.solver
    }

    /// The algorithm to show for the current stage.
    #[must_use]
    pub fn shown_algorithm(&self) -> String {
        self.overrides[self.stage.index()]
            .as_ref()
            .map_or_else(|| self.stage.algorithm().to_owned(), ToString::to_string)
    }

    /// # Errors
    ///
    /// Fails while the cube is mid-turn.
    pub fn state(&self) -> Result<FaceletState, Indeterminate> {
        self.cube.state()
    }

    /// Queues `turns` random quarter turns, never turning one face twice in a
    /// row, and returns them.
    pub fn shuffle(&mut self, turns: usize, rng: &mut fastrand::Rng) -> Algorithm {
        self.pending_notice = None;
        let mut out = Algorithm::default();
        let mut last: Option<Face> = None;
        for _ in 0..turns {
            let face = loop {
                let face = Face::ALL[rng.usize(..Face::ALL.len())];
                if Some(face) != last {
                    break face;
                }
            };
            last = Some(face);
            let turn = if rng.f32() > 0.7 {
                Turn::CounterClockwise
            } else {
                Turn::Clockwise
            };
            out.push(Token::new(face, turn));
        }
        info!("Shuffling with {out}");
        self.enqueue(out.iter());
        out
    }

    fn enqueue(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.queue.extend(tokens);
        self.status = Status::Queued(self.queue.len());
    }

    /// Finds the moves for the current stage and queues them. Moves still
    /// waiting are played first. `None` means no strategy could isolate the
    /// stage.
    ///
    /// # Errors
    ///
    /// Fails when the cube cannot be read.
    pub fn request_step(&mut self) -> Result<Option<Algorithm>, SessionError> {
        if !self.queue.is_empty() {
            self.play_queue()?;
        }
        self.status = Status::Searching;
        self.pending_notice = None;
        let state = self.cube.state()?;

        let solution = match self.solver.solve(self.stage, &state) {
            Ok(solution) => solution,
            Err(err) => {
                warn!("{err}");
                self.status = Status::CouldNotIsolate;
                return Ok(None);
            }
        };
        if solution.is_empty() {
            self.status = Status::StepAlreadySolved;
            return Ok(Some(solution));
        }

        self.pending_notice = self.solver.notice(self.stage, &state, &solution);
        self.overrides[self.stage.index()] = Some(solution.clone());
        self.pending_advance = Some(self.stage);
        self.enqueue(solution.iter());
        Ok(Some(solution))
    }

    /// Plays every queued move, then moves on to the next stage if a guided
    /// step finished its own.
    ///
    /// # Errors
    ///
    /// Fails when the settled cube cannot be read.
    pub fn play_queue(&mut self) -> Result<(), SessionError> {
        while let Some(token) = self.queue.pop_front() {
            debug!("Turning {token}");
            self.cube.apply(token);
        }
        self.status = Status::Ready;

        if let Some(stage) = self.pending_advance.take() {
            let state = self.cube.state()?;
            if self.solver.oracle().solved_through(stage, &state) {
                if let Some(next) = stage.next() {
                    self.stage = next;
                }
            }
        }
        if let Some(notice) = self.pending_notice.take() {
            self.status = Status::Notice(notice);
        }
        Ok(())
    }

    /// Queues a full solution once waiting moves are played. `None` means the
    /// full solver failed.
    ///
    /// # Errors
    ///
    /// Fails when the cube cannot be read.
    pub fn solve_all(&mut self) -> Result<Option<Algorithm>, SessionError> {
        if !self.queue.is_empty() {
            self.play_queue()?;
        }
        self.pending_notice = None;
        self.pending_advance = None;
        let state = self.cube.state()?;
        match self.solver.solve_full(&state) {
            Ok(solution) if solution.is_empty() => {
                self.status = Status::AlreadySolved;
                Ok(Some(solution))
            }
            Ok(solution) => {
                self.enqueue(solution.iter());
                Ok(Some(solution))
            }
            Err(err) => {
                warn!("{err}");
                self.status = Status::SolverFailed;
                Ok(None)
            }
        }
    }

    /// Puts a fresh solved cube down and captures it as the new reference.
    ///
    /// # Errors
    ///
    /// Fails when the cube cannot be read.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.cube = LatticeCube::default();
        self.queue.clear();
        self.pending_advance = None;
        self.pending_notice = None;
        self.overrides = Default::default();
        self.stage = Stage::Cross;
        self.status = Status::Ready;

        let state = self.cube.state()?;
        reference::recapture(state);
        self.solver = StageSolver::new(state, self.solver.config().clone());
        Ok(())
    }

    pub fn next_stage(&mut self) -> Stage {
        if let Some(next) = self.stage.next() {
            self.stage = next;
        }
        self.stage
    }

    pub fn prev_stage(&mut self) -> Stage {
        if let Some(prev) = self.stage.prev() {
            self.stage = prev;
        }
        self.stage
    }
}
