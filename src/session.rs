//! Session and gameplay state machine.
//!
//! A [`Session`] owns everything one peer knows about a game: its tag, the
//! game id, the lifecycle state, the fleet, the opponent's board and both shot
//! sets. Every input (user intent, inbound channel text, announcer tick) is
//! handled by one method call that validates first and then commits, so a
//! rejected input never leaves a partial update behind. Outputs are returned
//! as [`Effect`]s for the driver to carry out; the session itself performs no
//! I/O.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use log::{debug, info, warn};
use rand::Rng;

use crate::bitboard::CellMask;
use crate::board::{Fleet, OpponentBoard};
use crate::common::{BoardError, Coord, GuessResult, LogKind};
use crate::config::BOARD_SIZE;
use crate::identity::Tag;
use crate::layout::BoardLayout;
use crate::protocol::{DecodeError, EncodeError, Envelope, Message};
use crate::ship::{Orientation, ShipId};

/// Lifecycle of a session.
///
/// `WaitingForBoard` and `GameOver` are defined for display and future rules;
/// no current transition enters them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GameState {
    Setup,
    Ready,
    Joining,
    SharingBoard,
    WaitingForBoard,
    Playing,
    GameOver,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Setup => "SETUP",
            GameState::Ready => "READY",
            GameState::Joining => "JOINING",
            GameState::SharingBoard => "SHARING_BOARD",
            GameState::WaitingForBoard => "WAITING_FOR_BOARD",
            GameState::Playing => "PLAYING",
            GameState::GameOver => "GAME_OVER",
        }
    }

    fn accepts_board(&self) -> bool {
        matches!(
            self,
            GameState::Joining | GameState::SharingBoard | GameState::WaitingForBoard
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side effects requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Transmit this text on the channel.
    Send(String),
    /// Begin periodic discovery announcements.
    StartAnnouncer,
    /// Cancel the discovery announcer.
    StopAnnouncer,
    /// Report to the observer sink.
    Notify { kind: LogKind, text: String },
}

impl Effect {
    fn notify(kind: LogKind, text: impl Into<String>) -> Self {
        Effect::Notify {
            kind,
            text: text.into(),
        }
    }
}

/// Why a well-formed message was dropped without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Our own transmission looped back.
    SelfLoop,
    /// Addressed to a different game id.
    ForeignGame,
    /// Not meaningful in the current state.
    UnexpectedInState(GameState),
}

/// Why an inbound text could not be used at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Malformed(DecodeError),
    /// Board message decoded but does not describe a legal fleet.
    InvalidBoard(BoardError),
}

/// What happened to one inbound text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Applied,
    Ignored(IgnoreReason),
    Rejected(Rejection),
    /// Relevant, but a local step failed; nothing was committed.
    Failed(SessionError),
}

/// Result of feeding one inbound text to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub disposition: Disposition,
    pub effects: Vec<Effect>,
}

impl Received {
    fn applied(effects: Vec<Effect>) -> Self {
        Self {
            disposition: Disposition::Applied,
            effects,
        }
    }

    fn ignored(reason: IgnoreReason, effects: Vec<Effect>) -> Self {
        Self {
            disposition: Disposition::Ignored(reason),
            effects,
        }
    }

    fn rejected(rejection: Rejection, effects: Vec<Effect>) -> Self {
        Self {
            disposition: Disposition::Rejected(rejection),
            effects,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.disposition == Disposition::Applied
    }
}

/// Errors surfaced to the caller of a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The channel could not acquire its audio resources.
    ChannelInit(String),
    /// Fleet placement is invalid or incomplete.
    Placement(BoardError),
    WrongState {
        expected: GameState,
        actual: GameState,
    },
    NotYourTurn,
    AlreadyFired(Coord),
    OffBoard(Coord),
    Encode(EncodeError),
}

impl From<BoardError> for SessionError {
    fn from(err: BoardError) -> Self {
        SessionError::Placement(err)
    }
}

impl From<EncodeError> for SessionError {
    fn from(err: EncodeError) -> Self {
        SessionError::Encode(err)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::ChannelInit(reason) => {
                write!(f, "Failed to initialize channel: {}", reason)
            }
            SessionError::Placement(e) => write!(f, "Placement error: {}", e),
            SessionError::WrongState { expected, actual } => {
                write!(f, "Operation requires {}, session is {}", expected, actual)
            }
            SessionError::NotYourTurn => write!(f, "Not your turn"),
            SessionError::AlreadyFired(c) => write!(f, "Already fired at {}", c),
            SessionError::OffBoard(c) => write!(f, "Target {} is off the board", c),
            SessionError::Encode(e) => write!(f, "Encode error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SessionError {}

/// Hit tallies for display. Observational only; no state change follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct Standing {
    pub hits_scored: usize,
    pub hits_taken: usize,
    pub opponent_fleet_destroyed: bool,
    pub own_fleet_destroyed: bool,
}

/// Point-in-time copy of the observable session for UIs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct SessionSnapshot {
    pub user: Tag,
    pub game_id: Option<Tag>,
    pub state: GameState,
    pub is_host: bool,
    pub my_turn: bool,
    pub opponent_layout: Option<BoardLayout>,
    pub shots_fired: Vec<(Coord, GuessResult)>,
    pub shots_received: Vec<(Coord, GuessResult)>,
    pub standing: Standing,
}

/// One peer's view of a game.
#[derive(Debug, Clone)]
pub struct Session {
    user: Tag,
    game_id: Option<Tag>,
    state: GameState,
    is_host: bool,
    board_shared: bool,
    my_turn: bool,
    fleet: Fleet,
    opponent: Option<OpponentBoard>,
    shots_fired: BTreeMap<Coord, GuessResult>,
    shots_received: BTreeMap<Coord, GuessResult>,
}

impl Session {
    /// Fresh session in `SETUP` with an unplaced fleet.
    pub fn new(user: Tag) -> Self {
        Self::with_fleet(user, Fleet::new())
    }

    pub fn with_fleet(user: Tag, fleet: Fleet) -> Self {
        Self {
            user,
            game_id: None,
            state: GameState::Setup,
            is_host: false,
            board_shared: false,
            my_turn: false,
            fleet,
            opponent: None,
            shots_fired: BTreeMap::new(),
            shots_received: BTreeMap::new(),
        }
    }

    pub fn user(&self) -> Tag {
        self.user
    }

    pub fn game_id(&self) -> Option<Tag> {
        self.game_id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn my_turn(&self) -> bool {
        self.my_turn
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn opponent_board(&self) -> Option<&OpponentBoard> {
        self.opponent.as_ref()
    }

    pub fn shots_fired(&self) -> impl Iterator<Item = Coord> + '_ {
        self.shots_fired.keys().copied()
    }

    pub fn shots_received(&self) -> impl Iterator<Item = Coord> + '_ {
        self.shots_received.keys().copied()
    }

    /// Locally evaluated outcome of our shot at `coord`, if fired.
    pub fn shot_result(&self, coord: Coord) -> Option<GuessResult> {
        self.shots_fired.get(&coord).copied()
    }

    /// What an opponent shot at `coord` struck, if received.
    pub fn received_result(&self, coord: Coord) -> Option<GuessResult> {
        self.shots_received.get(&coord).copied()
    }

    pub fn standing(&self) -> Standing {
        let fired = fired_mask(&self.shots_fired);
        Standing {
            hits_scored: self.shots_fired.values().filter(|r| r.is_hit()).count(),
            hits_taken: self.shots_received.values().filter(|r| r.is_hit()).count(),
            opponent_fleet_destroyed: self
                .opponent
                .as_ref()
                .is_some_and(|o| o.all_sunk(&fired)),
            own_fleet_destroyed: self.fleet.all_sunk(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user,
            game_id: self.game_id,
            state: self.state,
            is_host: self.is_host,
            my_turn: self.my_turn,
            opponent_layout: self.opponent.as_ref().map(|o| o.layout().clone()),
            shots_fired: self.shots_fired.iter().map(|(c, r)| (*c, *r)).collect(),
            shots_received: self.shots_received.iter().map(|(c, r)| (*c, *r)).collect(),
            standing: self.standing(),
        }
    }

    fn require(&self, expected: GameState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::WrongState {
                expected,
                actual: self.state,
            })
        }
    }

    fn transition(&mut self, to: GameState, effects: &mut Vec<Effect>) {
        info!("[Session {}] {} -> {}", self.user, self.state, to);
        effects.push(Effect::notify(
            LogKind::State,
            format!("State: {} -> {}", self.state, to),
        ));
        self.state = to;
    }

    fn envelope(&self, message: Message) -> Result<String, SessionError> {
        Ok(Envelope::new(self.user, message).encode()?)
    }

    fn board_message(&self, game_id: Tag) -> Result<String, SessionError> {
        let layout = self.fleet.layout()?;
        self.envelope(Message::Board { game_id, layout })
    }

    /// Move one ship. Only allowed before the game starts.
    pub fn place_ship(
        &mut self,
        id: ShipId,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Result<(), SessionError> {
        self.require(GameState::Setup)?;
        self.fleet.place(id, row, col, orientation)?;
        Ok(())
    }

    /// Scatter the whole fleet at random. Only allowed before the game starts.
    pub fn randomize_fleet<R: Rng>(
        &mut self,
        rng: &mut R,
        attempts: usize,
    ) -> Result<(), SessionError> {
        self.require(GameState::Setup)?;
        self.fleet.randomize(rng, attempts)?;
        Ok(())
    }

    /// Host a game under `game_id` and start announcing it.
    pub fn start_new_game(&mut self, game_id: Tag) -> Result<Vec<Effect>, SessionError> {
        self.require(GameState::Setup)?;
        if !self.fleet.all_placed() {
            return Err(SessionError::Placement(BoardError::ShipsUnplaced));
        }
        let mut effects = Vec::new();
        self.game_id = Some(game_id);
        self.is_host = true;
        self.transition(GameState::Ready, &mut effects);
        effects.push(Effect::StartAnnouncer);
        effects.push(Effect::notify(
            LogKind::Info,
            format!("Hosting game {}", game_id),
        ));
        Ok(effects)
    }

    /// Wait for someone else's announcement without hosting.
    pub fn join_game(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.require(GameState::Setup)?;
        if !self.fleet.all_placed() {
            return Err(SessionError::Placement(BoardError::ShipsUnplaced));
        }
        let mut effects = Vec::new();
        self.is_host = false;
        self.transition(GameState::Ready, &mut effects);
        effects.push(Effect::notify(LogKind::Info, "Listening for games"));
        Ok(effects)
    }

    /// One announcer period elapsed.
    pub fn announce_tick(&mut self) -> Vec<Effect> {
        match (self.state, self.is_host, self.game_id) {
            (GameState::Ready, true, Some(game_id)) => {
                match self.envelope(Message::Announce { game_id }) {
                    Ok(text) => {
                        debug!("[Session {}] announcing {}", self.user, game_id);
                        vec![Effect::Send(text)]
                    }
                    Err(e) => vec![Effect::notify(LogKind::Error, format!("{}", e))],
                }
            }
            _ => vec![Effect::StopAnnouncer],
        }
    }

    /// Fire at column `x`, row `y`.
    ///
    /// Rejected without any change unless it is our turn in `PLAYING` and the
    /// cell has not been fired at before.
    pub fn fire_at(&mut self, x: u8, y: u8) -> Result<Vec<Effect>, SessionError> {
        self.require(GameState::Playing)?;
        if !self.my_turn {
            return Err(SessionError::NotYourTurn);
        }
        let coord = Coord::new(x, y);
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return Err(SessionError::OffBoard(coord));
        }
        if self.shots_fired.contains_key(&coord) {
            return Err(SessionError::AlreadyFired(coord));
        }
        let game_id = self.game_id.ok_or(SessionError::WrongState {
            expected: GameState::Playing,
            actual: self.state,
        })?;
        let text = self.envelope(Message::Fire { game_id, x, y })?;

        let mut fired = fired_mask(&self.shots_fired);
        // In range, checked above.
        let _ = fired.set(coord.row(), coord.col());
        let result = match &self.opponent {
            Some(board) => board.evaluate(coord.row(), coord.col(), &fired),
            None => GuessResult::Miss,
        };
        self.shots_fired.insert(coord, result);
        self.my_turn = false;
        info!("[Session {}] fired at {}: {:?}", self.user, coord, result);
        Ok(vec![
            Effect::Send(text),
            Effect::notify(
                LogKind::Outbound,
                format!("Fired at {}: {}", coord, describe(result)),
            ),
        ])
    }

    /// Feed one text heard on the channel.
    pub fn receive(&mut self, text: &str) -> Received {
        let envelope = match Envelope::decode(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!("[Session {}] discarding {:?}: {}", self.user, text, e);
                return Received::rejected(Rejection::Malformed(e), Vec::new());
            }
        };
        if envelope.sender == self.user {
            return Received::ignored(IgnoreReason::SelfLoop, Vec::new());
        }
        let body = text.get(3..).unwrap_or_default();
        let mut effects = vec![Effect::notify(
            LogKind::Inbound,
            format!("Received message: {}", body),
        )];
        let outcome = match envelope.message {
            Message::Announce { game_id } => self.on_announce(game_id, &mut effects),
            Message::Join { game_id } => self.on_join(game_id, &mut effects),
            Message::Board { game_id, layout } => self.on_board(game_id, layout, &mut effects),
            Message::Fire { game_id, x, y } => self.on_fire(game_id, Coord::new(x, y), &mut effects),
        };
        match outcome {
            Disposition::Applied => Received::applied(effects),
            Disposition::Ignored(reason) => {
                debug!("[Session {}] ignoring {:?}: {:?}", self.user, body, reason);
                Received::ignored(reason, effects)
            }
            Disposition::Rejected(rejection) => {
                warn!("[Session {}] rejecting {:?}: {:?}", self.user, body, rejection);
                Received::rejected(rejection, effects)
            }
            Disposition::Failed(err) => {
                warn!("[Session {}] failed to handle {:?}: {}", self.user, body, err);
                effects.push(Effect::notify(LogKind::Error, format!("{}", err)));
                Received {
                    disposition: Disposition::Failed(err),
                    effects,
                }
            }
        }
    }

    fn matches_game(&self, game_id: Tag) -> bool {
        self.game_id == Some(game_id)
    }

    fn on_announce(&mut self, game_id: Tag, effects: &mut Vec<Effect>) -> Disposition {
        if self.state != GameState::Ready {
            return Disposition::Ignored(IgnoreReason::UnexpectedInState(self.state));
        }
        let join = match self.envelope(Message::Join { game_id }) {
            Ok(text) => text,
            Err(e) => return Disposition::Failed(e),
        };
        if self.is_host {
            effects.push(Effect::StopAnnouncer);
        }
        self.game_id = Some(game_id);
        self.is_host = false;
        effects.push(Effect::Send(join));
        effects.push(Effect::notify(
            LogKind::Info,
            format!("Joining game: {}", game_id),
        ));
        self.transition(GameState::Joining, effects);
        Disposition::Applied
    }

    fn on_join(&mut self, game_id: Tag, effects: &mut Vec<Effect>) -> Disposition {
        if self.state != GameState::Ready {
            return Disposition::Ignored(IgnoreReason::UnexpectedInState(self.state));
        }
        if !self.matches_game(game_id) {
            return Disposition::Ignored(IgnoreReason::ForeignGame);
        }
        let board = match self.board_message(game_id) {
            Ok(text) => text,
            Err(e) => return Disposition::Failed(e),
        };
        effects.push(Effect::StopAnnouncer);
        self.transition(GameState::SharingBoard, effects);
        effects.push(Effect::Send(board));
        self.board_shared = true;
        effects.push(Effect::notify(
            LogKind::Info,
            "Player joined, sharing board",
        ));
        Disposition::Applied
    }

    fn on_board(
        &mut self,
        game_id: Tag,
        layout: BoardLayout,
        effects: &mut Vec<Effect>,
    ) -> Disposition {
        if !self.matches_game(game_id) {
            return Disposition::Ignored(IgnoreReason::ForeignGame);
        }
        if !self.state.accepts_board() {
            return Disposition::Ignored(IgnoreReason::UnexpectedInState(self.state));
        }
        let opponent = match OpponentBoard::from_layout(layout) {
            Ok(board) => board,
            Err(e) => return Disposition::Rejected(Rejection::InvalidBoard(e)),
        };
        let reply = if self.board_shared {
            None
        } else {
            match self.board_message(game_id) {
                Ok(text) => Some(text),
                Err(e) => return Disposition::Failed(e),
            }
        };
        self.opponent = Some(opponent);
        match reply {
            Some(text) => {
                effects.push(Effect::Send(text));
                self.board_shared = true;
                self.my_turn = false;
            }
            None => self.my_turn = true,
        }
        effects.push(Effect::notify(
            LogKind::Info,
            "Received board details, starting game",
        ));
        self.transition(GameState::Playing, effects);
        Disposition::Applied
    }

    fn on_fire(&mut self, game_id: Tag, coord: Coord, effects: &mut Vec<Effect>) -> Disposition {
        if !self.matches_game(game_id) {
            return Disposition::Ignored(IgnoreReason::ForeignGame);
        }
        if self.state != GameState::Playing {
            return Disposition::Ignored(IgnoreReason::UnexpectedInState(self.state));
        }
        let was_destroyed = self.fleet.all_sunk();
        let result = match self.fleet.receive_shot(coord.row(), coord.col()) {
            Ok(result) => result,
            Err(e) => return Disposition::Rejected(Rejection::InvalidBoard(e)),
        };
        self.shots_received.entry(coord).or_insert(result);
        self.my_turn = true;
        info!("[Session {}] incoming fire at {}: {:?}", self.user, coord, result);
        effects.push(Effect::notify(
            LogKind::Info,
            format!("Incoming fire at {}: {}", coord, describe(result)),
        ));
        if !was_destroyed && self.fleet.all_sunk() {
            effects.push(Effect::notify(LogKind::Info, "Every ship in your fleet has been hit"));
        }
        Disposition::Applied
    }
}

fn fired_mask(shots: &BTreeMap<Coord, GuessResult>) -> CellMask {
    let mut mask = CellMask::new();
    for coord in shots.keys() {
        let _ = mask.set(coord.row(), coord.col());
    }
    mask
}

fn describe(result: GuessResult) -> String {
    match result {
        GuessResult::Hit => String::from("hit"),
        GuessResult::Miss => String::from("miss"),
        GuessResult::Sink(name) => format!("sunk {}", name),
    }
}
