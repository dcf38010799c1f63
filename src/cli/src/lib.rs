#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]

pub mod lattice;
pub mod session;

pub use lattice::LatticeCube;
pub use session::{Session, SessionError, Status};
