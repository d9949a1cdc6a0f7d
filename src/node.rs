#![cfg(feature = "std")]

//! Single-writer event loop around a [`Session`].
//!
//! Channel input, announcer ticks and user intents are serialized through one
//! `select!`, so the session is only ever touched from the task running
//! [`SessionNode::run`]. Callers talk to it through a cloneable [`NodeHandle`].

use rand::rngs::SmallRng;
use tokio::sync::{mpsc, oneshot};

use crate::announcer::Announcer;
use crate::channel::Channel;
use crate::common::LogKind;
use crate::config::NodeConfig;
use crate::identity::Tag;
use crate::observer::Observer;
use crate::session::{Disposition, Effect, Session, SessionError, SessionSnapshot};
use crate::ship::{Orientation, ShipId};

const COMMAND_BUFFER: usize = 32;

/// A user action delivered to the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    PlaceShip {
        id: ShipId,
        row: usize,
        col: usize,
        orientation: Orientation,
    },
    RandomizeFleet,
    StartNewGame,
    JoinGame,
    /// Column `x`, row `y`.
    Fire { x: u8, y: u8 },
    Shutdown,
}

enum Command {
    Intent(Intent, oneshot::Sender<Result<(), SessionError>>),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

enum Event {
    Heard(anyhow::Result<String>),
    Tick,
    Command(Option<Command>),
}

/// Cloneable front door to a running [`SessionNode`].
#[derive(Clone)]
pub struct NodeHandle {
    tx: mpsc::Sender<Command>,
}

impl NodeHandle {
    /// Deliver an intent and wait for the session's verdict.
    ///
    /// Session refusals come back as a [`SessionError`] inside the
    /// `anyhow::Error` and can be recovered with `downcast_ref`.
    pub async fn submit(&self, intent: Intent) -> anyhow::Result<()> {
        let (reply, verdict) = oneshot::channel();
        self.tx
            .send(Command::Intent(intent, reply))
            .await
            .map_err(|_| anyhow::anyhow!("Node has stopped"))?;
        let outcome = verdict
            .await
            .map_err(|_| anyhow::anyhow!("Node dropped the request"))?;
        outcome?;
        Ok(())
    }

    pub async fn place_ship(
        &self,
        id: ShipId,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> anyhow::Result<()> {
        self.submit(Intent::PlaceShip {
            id,
            row,
            col,
            orientation,
        })
        .await
    }

    pub async fn randomize_fleet(&self) -> anyhow::Result<()> {
        self.submit(Intent::RandomizeFleet).await
    }

    pub async fn start_new_game(&self) -> anyhow::Result<()> {
        self.submit(Intent::StartNewGame).await
    }

    pub async fn join_game(&self) -> anyhow::Result<()> {
        self.submit(Intent::JoinGame).await
    }

    pub async fn fire_at(&self, x: u8, y: u8) -> anyhow::Result<()> {
        self.submit(Intent::Fire { x, y }).await
    }

    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.submit(Intent::Shutdown).await
    }

    pub async fn snapshot(&self) -> anyhow::Result<SessionSnapshot> {
        let (reply, snapshot) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply))
            .await
            .map_err(|_| anyhow::anyhow!("Node has stopped"))?;
        snapshot
            .await
            .map_err(|_| anyhow::anyhow!("Node dropped the request"))
    }
}

/// Owns one session plus everything it needs to run: the channel, the
/// observer sink, the announcer and a random source.
pub struct SessionNode<C: Channel, O: Observer> {
    session: Session,
    channel: C,
    observer: O,
    announcer: Announcer,
    commands: mpsc::Receiver<Command>,
    rng: SmallRng,
    config: NodeConfig,
}

impl<C: Channel, O: Observer> SessionNode<C, O> {
    /// Draw a user tag and scatter the fleet, leaving the session in `SETUP`.
    pub fn new(
        channel: C,
        observer: O,
        config: NodeConfig,
        mut rng: SmallRng,
    ) -> Result<(Self, NodeHandle), SessionError> {
        let mut session = Session::new(Tag::random(&mut rng));
        session.randomize_fleet(&mut rng, config.placement_attempts)?;
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let node = Self {
            session,
            channel,
            observer,
            announcer: Announcer::new(config.announce_interval),
            commands,
            rng,
            config,
        };
        Ok((node, NodeHandle { tx }))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drive the session until shutdown, then release the channel and hand
    /// the final session back.
    ///
    /// A channel that fails to initialize aborts with
    /// [`SessionError::ChannelInit`] before anything is sent.
    pub async fn run(mut self) -> anyhow::Result<Session> {
        if let Err(e) = self.channel.initialize().await {
            let err = SessionError::ChannelInit(e.to_string());
            log::warn!("[SessionNode {}] {}", self.session.user(), err);
            self.observer.on_message(&err.to_string(), LogKind::Error);
            return Err(err.into());
        }
        log::info!(
            "[SessionNode {}] channel ready, state {}",
            self.session.user(),
            self.session.state()
        );

        let outcome = self.event_loop().await;
        self.announcer.stop();
        if let Err(e) = self.channel.teardown().await {
            log::warn!("[SessionNode {}] teardown failed: {}", self.session.user(), e);
        }
        outcome.map(|()| self.session)
    }

    async fn event_loop(&mut self) -> anyhow::Result<()> {
        loop {
            let event = tokio::select! {
                heard = self.channel.recv() => Event::Heard(heard),
                _ = self.announcer.tick() => Event::Tick,
                command = self.commands.recv() => Event::Command(command),
            };
            match event {
                Event::Heard(Ok(text)) => {
                    let received = self.session.receive(&text);
                    if let Disposition::Applied = received.disposition {
                        log::debug!("[SessionNode {}] applied {:?}", self.session.user(), text);
                    }
                    self.apply(received.effects).await;
                }
                Event::Heard(Err(e)) => {
                    log::warn!("[SessionNode {}] channel failed: {}", self.session.user(), e);
                    self.observer
                        .on_message(&format!("Channel failed: {}", e), LogKind::Error);
                    return Err(e);
                }
                Event::Tick => {
                    let effects = self.session.announce_tick();
                    self.apply(effects).await;
                }
                Event::Command(None) => {
                    log::debug!("[SessionNode {}] all handles dropped", self.session.user());
                    return Ok(());
                }
                Event::Command(Some(Command::Snapshot(reply))) => {
                    let _ = reply.send(self.session.snapshot());
                }
                Event::Command(Some(Command::Intent(Intent::Shutdown, reply))) => {
                    let _ = reply.send(Ok(()));
                    return Ok(());
                }
                Event::Command(Some(Command::Intent(intent, reply))) => {
                    let outcome = self.on_intent(intent).await;
                    if let Err(e) = &outcome {
                        self.observer.on_message(&e.to_string(), LogKind::Error);
                    }
                    let _ = reply.send(outcome);
                }
            }
        }
    }

    async fn on_intent(&mut self, intent: Intent) -> Result<(), SessionError> {
        let effects = match intent {
            Intent::PlaceShip {
                id,
                row,
                col,
                orientation,
            } => {
                self.session.place_ship(id, row, col, orientation)?;
                Vec::new()
            }
            Intent::RandomizeFleet => {
                self.session
                    .randomize_fleet(&mut self.rng, self.config.placement_attempts)?;
                Vec::new()
            }
            Intent::StartNewGame => {
                let game_id = Tag::random(&mut self.rng);
                self.session.start_new_game(game_id)?
            }
            Intent::JoinGame => self.session.join_game()?,
            Intent::Fire { x, y } => self.session.fire_at(x, y)?,
            Intent::Shutdown => Vec::new(),
        };
        self.apply(effects).await;
        Ok(())
    }

    /// Carry out effects in order. Sends are best effort: a failed send is
    /// reported but the session keeps its committed state.
    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(text) => {
                    if let Err(e) = self.channel.send(&text).await {
                        log::warn!("[SessionNode {}] send failed: {}", self.session.user(), e);
                        self.observer
                            .on_message(&format!("Send failed: {}", e), LogKind::Error);
                    } else {
                        log::debug!("[SessionNode {}] sent {}", self.session.user(), text);
                    }
                }
                Effect::StartAnnouncer => self.announcer.start(),
                Effect::StopAnnouncer => self.announcer.stop(),
                Effect::Notify { kind, text } => self.observer.on_message(&text, kind),
            }
        }
    }
}
