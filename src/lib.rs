#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bitboard;
mod board;
mod common;
mod config;
mod identity;
mod layout;
pub mod protocol;
pub mod session;
mod ship;

#[cfg(feature = "std")]
pub mod announcer;
#[cfg(feature = "std")]
pub mod channel;
#[cfg(feature = "std")]
pub mod duel;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod node;
#[cfg(feature = "std")]
pub mod observer;

pub use bitboard::{BitBoard, BitBoardError, CellMask, SetBits};
pub use board::*;
pub use common::*;
pub use config::*;
pub use identity::Tag;
pub use layout::{BoardLayout, ShipTuple};
pub use protocol::{DecodeError, EncodeError, Envelope, Message};
pub use session::{
    Disposition, Effect, GameState, IgnoreReason, Received, Rejection, Session, SessionError,
    SessionSnapshot, Standing,
};
pub use ship::*;

#[cfg(feature = "std")]
pub use announcer::Announcer;
#[cfg(feature = "std")]
pub use channel::{AirChannel, Channel, InMemoryMedium, LineChannel};
#[cfg(feature = "std")]
pub use duel::{run_duel, DuelReport};
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use node::{Intent, NodeHandle, SessionNode};
#[cfg(feature = "std")]
pub use observer::{LogObserver, Observer};
