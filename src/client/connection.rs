use crate::messaging::OutboundCommand;
use crate::types::{RealtimeError, Result};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Instructions from the client to its session driver
#[derive(Debug)]
pub(crate) enum SessionCommand {
    Emit(OutboundCommand),
    Close,
}

/// The single live session of a client
pub(crate) struct ActiveConnection {
    generation: u64,
    commands: mpsc::Sender<SessionCommand>,
    driver: JoinHandle<()>,
}

impl ActiveConnection {
    /// Stops the driver. A connected session is asked to close gracefully;
    /// one still handshaking or waiting to retry is aborted, which drops its
    /// transport immediately.
    pub(crate) fn close(self, state: ConnectionState) {
        if state != ConnectionState::Connected {
            tracing::debug!("Aborting session driver in {:?} state", state);
            self.driver.abort();
            return;
        }
        if self.commands.try_send(SessionCommand::Close).is_err() {
            tracing::debug!("Session driver unreachable, aborting it");
            self.driver.abort();
        }
    }
}

struct Slot {
    active: Option<ActiveConnection>,
    state: ConnectionState,
    next_generation: u64,
    joined: BTreeSet<String>,
}

/// Owns the connection handle and its state.
///
/// Every session driver is tagged with a generation; updates from a driver
/// that is no longer the active one (because `disconnect()` already took it)
/// are ignored.
pub struct ConnectionManager {
    slot: Mutex<Slot>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                active: None,
                state: ConnectionState::Disconnected,
                next_generation: 0,
                joined: BTreeSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gets the current connection state
    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Checks if currently connected
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Whether a session exists (connecting, connected or waiting to retry)
    pub fn is_active(&self) -> bool {
        self.lock().active.is_some()
    }

    /// Spawns a session driver unless one is already active. Returns `false`
    /// when the call was a no-op.
    pub(crate) fn start<F, Fut>(&self, runtime: &Handle, buffer: usize, make_driver: F) -> bool
    where
        F: FnOnce(u64, mpsc::Receiver<SessionCommand>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.lock();
        if slot.active.is_some() {
            return false;
        }

        let generation = slot.next_generation;
        slot.next_generation += 1;

        let (commands, receiver) = mpsc::channel(buffer);
        let driver = runtime.spawn(make_driver(generation, receiver));

        slot.active = Some(ActiveConnection {
            generation,
            commands,
            driver,
        });
        slot.state = ConnectionState::Connecting;
        true
    }

    /// Detaches the active session. Returns it with the state it was in, and
    /// forgets joined conversations.
    pub(crate) fn take(&self) -> Option<(ActiveConnection, ConnectionState)> {
        let mut slot = self.lock();
        let active = slot.active.take()?;
        let previous = slot.state;
        slot.state = ConnectionState::Disconnected;
        slot.joined.clear();
        Some((active, previous))
    }

    /// Sets the state on behalf of driver `generation`. Returns `false` if
    /// that driver is no longer the active one.
    pub(crate) fn set_state(&self, generation: u64, state: ConnectionState) -> bool {
        let mut slot = self.lock();
        match &slot.active {
            Some(active) if active.generation == generation => {
                slot.state = state;
                true
            }
            _ => false,
        }
    }

    /// Called by driver `generation` when it stops for good
    pub(crate) fn finish(&self, generation: u64) {
        let mut slot = self.lock();
        if slot
            .active
            .as_ref()
            .is_some_and(|active| active.generation == generation)
        {
            slot.active = None;
            slot.state = ConnectionState::Disconnected;
        }
    }

    /// Queues a command for the driver if connected
    pub(crate) fn send(&self, command: OutboundCommand) -> Result<()> {
        let mut slot = self.lock();
        if slot.state != ConnectionState::Connected {
            return Err(RealtimeError::NotConnected);
        }
        let Some(active) = slot.active.as_ref() else {
            return Err(RealtimeError::NotConnected);
        };

        let joined_change = match &command {
            OutboundCommand::JoinConversation { conversation_id } => {
                Some((conversation_id.clone(), true))
            }
            OutboundCommand::LeaveConversation { conversation_id } => {
                Some((conversation_id.clone(), false))
            }
            _ => None,
        };

        active
            .commands
            .try_send(SessionCommand::Emit(command))
            .map_err(|e| RealtimeError::Connection(format!("command not queued: {}", e)))?;

        match joined_change {
            Some((id, true)) => {
                slot.joined.insert(id);
            }
            Some((id, false)) => {
                slot.joined.remove(&id);
            }
            None => {}
        }
        Ok(())
    }

    /// Conversations to re-join after a reconnect
    pub(crate) fn joined(&self) -> Vec<String> {
        self.lock().joined.iter().cloned().collect()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
