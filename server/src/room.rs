use std::collections::HashMap;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use log::{debug, info, warn};

use tickstate_shared::{Engine, Schema, Tree};

use crate::{
    client::{Client, ClientStatus},
    ClientKey, RoomConfig, RoomError,
};

/// Game logic plugged into a [`Room`].
pub trait Actions {
    type Action: Send;

    /// Runs once, when the room is created
    fn on_deploy(&mut self, _engine: &mut Engine) {}

    /// Applies one queued action at the start of a tick
    fn apply(&mut self, engine: &mut Engine, action: Self::Action);

    /// Runs every tick after all queued actions are applied
    fn on_tick(&mut self, _engine: &mut Engine) {}
}

/// What one call to [`Room::tick`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Number of actions applied
    pub actions: usize,
    /// Number of top-level elements in the published diff
    pub elements: usize,
    /// Clients that received the diff
    pub recipients: usize,
    /// Clients that received a snapshot and were promoted to connected
    pub promoted: Vec<ClientKey>,
    /// Clients disconnected because their outbox was full
    pub dropped: Vec<ClientKey>,
}

/// One engine instance and the clients syncing with it.
///
/// Everything runs on the caller's thread: actions are only applied, and the
/// engine only assembled and committed, inside [`Room::tick`]. Other threads
/// reach the room through the bounded queue of [`Room::action_sender`].
pub struct Room<A: Actions> {
    config: RoomConfig,
    engine: Engine,
    actions: A,
    sender: Sender<A::Action>,
    receiver: Receiver<A::Action>,
    clients: HashMap<ClientKey, Client>,
    next_client: u64,
    tick: u64,
}

impl<A: Actions> Room<A> {
    pub fn new(schema: Schema, config: RoomConfig, mut actions: A) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(config.inbound_capacity.max(1));
        let mut engine = Engine::with_config(schema, config.engine.clone());
        actions.on_deploy(&mut engine);
        info!("Room: Deployed");

        Self {
            config,
            engine,
            actions,
            sender,
            receiver,
            clients: HashMap::new(),
            next_client: 0,
            tick: 0,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn actions(&self) -> &A {
        &self.actions
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    // Actions

    /// A handle other threads can queue actions through
    pub fn action_sender(&self) -> Sender<A::Action> {
        self.sender.clone()
    }

    /// Queues an action for the next tick without blocking
    pub fn try_submit(&self, action: A::Action) -> Result<(), RoomError> {
        self.sender.try_send(action).map_err(|error| match error {
            TrySendError::Full(_) => RoomError::InboundFull,
            TrySendError::Disconnected(_) => RoomError::InboundClosed,
        })
    }

    // Clients

    /// Registers a client. It receives a full snapshot at the end of the next
    /// tick and every diff after that.
    pub fn connect(&mut self) -> ClientKey {
        let key = ClientKey::new(self.next_client);
        self.next_client += 1;
        self.clients
            .insert(key, Client::new(self.config.outbound_capacity));
        info!("Room: Client {:?} connected", key);
        key
    }

    pub fn disconnect(&mut self, key: &ClientKey) -> Result<(), RoomError> {
        match self.clients.remove(key) {
            Some(_) => {
                info!("Room: Client {:?} disconnected", key);
                Ok(())
            }
            None => Err(RoomError::UnknownClient(*key)),
        }
    }

    pub fn client_keys(&self) -> impl Iterator<Item = &ClientKey> {
        self.clients.keys()
    }

    pub fn is_connected(&self, key: &ClientKey) -> bool {
        self.clients
            .get(key)
            .is_some_and(|client| client.status == ClientStatus::Connected)
    }

    pub fn pending_frames(&self, key: &ClientKey) -> Result<usize, RoomError> {
        self.clients
            .get(key)
            .map(Client::pending)
            .ok_or(RoomError::UnknownClient(*key))
    }

    /// Takes every frame waiting for one client, oldest first
    pub fn drain_outbox(&mut self, key: &ClientKey) -> Result<Vec<Vec<u8>>, RoomError> {
        self.clients
            .get_mut(key)
            .map(Client::drain)
            .ok_or(RoomError::UnknownClient(*key))
    }

    // Tick

    /// Runs one tick: apply queued actions, run the frame callback, publish
    /// the diff, commit, then answer incoming clients with a snapshot.
    ///
    /// The engine is committed even when encoding the diff fails; the error
    /// is returned after the tick completed.
    pub fn tick(&mut self) -> Result<TickReport, RoomError> {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..Default::default()
        };

        report.actions = self.process_actions();
        self.actions.on_tick(&mut self.engine);

        self.engine.walk();
        let diff = self.engine.assemble(false);
        report.elements = diff.len();
        let published = self.publish(&diff, &mut report);

        self.engine.commit();

        let answered = self.answer_incoming(&mut report);

        debug!(
            "Room: Tick {} applied {} actions, published {} elements to {} clients",
            report.tick, report.actions, report.elements, report.recipients
        );
        published?;
        answered?;
        Ok(report)
    }

    fn process_actions(&mut self) -> usize {
        let mut applied = 0;
        while applied < self.config.inbound_capacity.max(1) {
            match self.receiver.try_recv() {
                Ok(action) => {
                    self.actions.apply(&mut self.engine, action);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    fn publish(&mut self, diff: &Tree, report: &mut TickReport) -> Result<(), RoomError> {
        if diff.is_empty() {
            return Ok(());
        }
        let frame = serde_json::to_vec(diff)?;

        let mut keys: Vec<ClientKey> = self
            .clients
            .iter()
            .filter(|(_, client)| client.status == ClientStatus::Connected)
            .map(|(key, _)| *key)
            .collect();

        // shuffle order of clients in order to avoid priority among them
        fastrand::shuffle(&mut keys);

        for key in keys {
            self.send(key, frame.clone(), report);
        }
        Ok(())
    }

    fn answer_incoming(&mut self, report: &mut TickReport) -> Result<(), RoomError> {
        let mut keys: Vec<ClientKey> = self
            .clients
            .iter()
            .filter(|(_, client)| client.status == ClientStatus::Incoming)
            .map(|(key, _)| *key)
            .collect();
        if keys.is_empty() {
            return Ok(());
        }
        keys.sort();

        self.engine.walk();
        let snapshot = self.engine.assemble(true);
        let frame = serde_json::to_vec(&snapshot)?;

        for key in keys {
            if !self.send(key, frame.clone(), report) {
                continue;
            }
            if let Some(client) = self.clients.get_mut(&key) {
                client.status = ClientStatus::Connected;
            }
            report.promoted.push(key);
        }
        Ok(())
    }

    /// Queues a frame for one client, dropping the client when its outbox is
    /// full
    fn send(&mut self, key: ClientKey, frame: Vec<u8>, report: &mut TickReport) -> bool {
        let Some(client) = self.clients.get_mut(&key) else {
            return false;
        };
        if client.push(frame) {
            if client.status == ClientStatus::Connected {
                report.recipients += 1;
            }
            return true;
        }
        self.clients.remove(&key);
        warn!("Room: Client {:?} dropped, outbox is full", key);
        report.dropped.push(key);
        false
    }
}
