use super::RealtimeClientOptions;
use super::connection::{ConnectionManager, ConnectionState, SessionCommand};
use crate::infrastructure::{HeartbeatMonitor, Timer};
use crate::messaging::{MessageRouter, OutboundCommand};
use crate::protocol::{EnginePacket, PacketType, SocketPacket};
use crate::registry::Registries;
use crate::transport::{self, EngineLink};
use crate::types::{AuthPayload, ConnectInfo, DisconnectReason, RealtimeError, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

enum LinkOutcome {
    /// `disconnect()` asked us to stop
    ClosedByClient,
    /// The connection went away on its own
    Dropped(DisconnectReason),
}

/// Drives one logical connection: handshake, inbound dispatch, outbound
/// commands and the reconnection policy. Runs as a single task, so inbound
/// events are delivered in arrival order.
pub(crate) struct Session {
    generation: u64,
    endpoint: url::Url,
    options: RealtimeClientOptions,
    auth: AuthPayload,
    connection: Arc<ConnectionManager>,
    registries: Arc<Registries>,
    router: MessageRouter,
    commands: mpsc::Receiver<SessionCommand>,
}

impl Session {
    pub(crate) fn new(
        generation: u64,
        endpoint: url::Url,
        options: RealtimeClientOptions,
        auth: AuthPayload,
        connection: Arc<ConnectionManager>,
        registries: Arc<Registries>,
        commands: mpsc::Receiver<SessionCommand>,
    ) -> Self {
        let router = MessageRouter::new(Arc::clone(&registries));
        Self {
            generation,
            endpoint,
            options,
            auth,
            connection,
            registries,
            router,
            commands,
        }
    }

    pub(crate) async fn run(mut self) {
        self.run_until_stopped().await;
        self.connection.finish(self.generation);
        tracing::debug!("Session driver #{} finished", self.generation);
    }

    async fn run_until_stopped(&mut self) {
        let mut timer = Timer::new(
            self.options.reconnection_attempts,
            Duration::from_millis(self.options.reconnection_delay),
        );

        loop {
            if !self
                .connection
                .set_state(self.generation, ConnectionState::Connecting)
            {
                return;
            }

            tracing::info!("Connecting to {}{}", self.endpoint, self.options.namespace);
            match self.establish().await {
                Ok((link, info)) => {
                    timer.reset();
                    if !self
                        .connection
                        .set_state(self.generation, ConnectionState::Connected)
                    {
                        self.close_link(link).await;
                        return;
                    }
                    tracing::info!(
                        "Connected to namespace {} over {} (sid={:?})",
                        self.options.namespace,
                        link.kind,
                        info.sid
                    );

                    let rejoined = self.rejoin(&link).await;
                    let outcome = match rejoined {
                        Ok(()) => {
                            self.registries.connect.emit(&info);
                            self.drive(link).await
                        }
                        Err(e) => {
                            tracing::error!("Failed to re-join conversations: {}", e);
                            LinkOutcome::Dropped(DisconnectReason::TransportError)
                        }
                    };

                    match outcome {
                        LinkOutcome::ClosedByClient => return,
                        LinkOutcome::Dropped(reason) => {
                            if !self.lose_connection(reason) {
                                return;
                            }
                            if reason == DisconnectReason::ServerDisconnect {
                                tracing::info!("Server closed the session, not reconnecting");
                                return;
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Connection error: {}", e),
            }

            if !self.options.reconnection {
                return;
            }
            let Some(delay) = timer.next_delay() else {
                tracing::error!(
                    "Giving up after {} reconnection attempts",
                    timer.attempts()
                );
                return;
            };

            self.connection
                .set_state(self.generation, ConnectionState::Disconnected);
            tracing::info!(
                "Reconnecting in {:?} (attempt {}/{})",
                delay,
                timer.attempts(),
                self.options.reconnection_attempts
            );
            if self.wait(delay).await {
                return;
            }
        }
    }

    /// Marks the connection lost and tells subscribers. Returns `false` if
    /// this driver was already superseded.
    fn lose_connection(&self, reason: DisconnectReason) -> bool {
        if !self
            .connection
            .set_state(self.generation, ConnectionState::Disconnected)
        {
            return false;
        }
        tracing::warn!("Disconnected: {}", reason);
        self.registries.disconnect.emit(&reason);
        true
    }

    /// Opens a transport and joins the namespace. The configured timeout
    /// applies to each transport and to the namespace ack.
    async fn establish(&self) -> Result<(EngineLink, ConnectInfo)> {
        let timeout = Duration::from_millis(self.options.timeout);
        let mut link = transport::open_preferred(
            &self.endpoint,
            &self.options.path,
            &self.options.transports,
            self.options.command_buffer,
            timeout,
        )
        .await?;

        let info = tokio::time::timeout(timeout, self.join_namespace(&mut link))
            .await
            .map_err(|_| RealtimeError::Timeout)??;
        Ok((link, info))
    }

    async fn join_namespace(&self, link: &mut EngineLink) -> Result<ConnectInfo> {
        let auth = serde_json::to_value(&self.auth)?;
        let connect = SocketPacket::connect(&self.options.namespace, Some(auth));
        link.send(EnginePacket::Message(connect.encode()?)).await?;

        loop {
            let Some(packet) = link.inbound.recv().await else {
                return Err(RealtimeError::Connection(
                    "transport closed during handshake".to_string(),
                ));
            };

            match packet {
                EnginePacket::Ping(data) => link.send(EnginePacket::Pong(data)).await?,
                EnginePacket::Message(raw) => {
                    let packet = SocketPacket::decode(&raw)?;
                    if packet.namespace != self.options.namespace {
                        continue;
                    }
                    match packet.kind {
                        PacketType::Connect => {
                            let sid = packet
                                .data
                                .as_ref()
                                .and_then(|data| data.get("sid"))
                                .and_then(Value::as_str)
                                .map(str::to_string);
                            return Ok(ConnectInfo { sid });
                        }
                        PacketType::ConnectError => {
                            let message = packet
                                .data
                                .as_ref()
                                .and_then(|data| data.get("message"))
                                .and_then(Value::as_str)
                                .unwrap_or("connection refused");
                            return Err(RealtimeError::ConnectError(message.to_string()));
                        }
                        other => {
                            tracing::debug!("Ignoring {:?} packet before namespace ack", other);
                        }
                    }
                }
                EnginePacket::Close => {
                    return Err(RealtimeError::Connection(
                        "server closed during handshake".to_string(),
                    ));
                }
                _ => {}
            }
        }
    }

    async fn rejoin(&self, link: &EngineLink) -> Result<()> {
        for conversation_id in self.connection.joined() {
            tracing::debug!("Re-joining conversation {}", conversation_id);
            self.emit(link, &OutboundCommand::JoinConversation { conversation_id })
                .await?;
        }
        Ok(())
    }

    /// Pumps one established link until it closes
    async fn drive(&mut self, mut link: EngineLink) -> LinkOutcome {
        let mut heartbeat = HeartbeatMonitor::new(link.open.heartbeat_deadline());

        loop {
            tokio::select! {
                packet = link.inbound.recv() => {
                    let Some(packet) = packet else {
                        return LinkOutcome::Dropped(DisconnectReason::TransportClose);
                    };
                    heartbeat.record_activity();

                    match packet {
                        EnginePacket::Ping(data) => {
                            if link.send(EnginePacket::Pong(data)).await.is_err() {
                                return LinkOutcome::Dropped(DisconnectReason::TransportError);
                            }
                        }
                        EnginePacket::Message(raw) => {
                            if let Some(reason) = self.handle_message(&raw) {
                                return LinkOutcome::Dropped(reason);
                            }
                        }
                        EnginePacket::Close => {
                            return LinkOutcome::Dropped(DisconnectReason::TransportClose);
                        }
                        _ => {}
                    }
                }
                command = self.commands.recv() => {
                    match command {
                        Some(SessionCommand::Emit(command)) => {
                            if let Err(e) = self.emit(&link, &command).await {
                                tracing::error!("Failed to emit '{}': {}", command, e);
                                return LinkOutcome::Dropped(DisconnectReason::TransportError);
                            }
                        }
                        Some(SessionCommand::Close) | None => {
                            self.close_link(link).await;
                            return LinkOutcome::ClosedByClient;
                        }
                    }
                }
                _ = tokio::time::sleep_until(heartbeat.expires_at()) => {
                    return LinkOutcome::Dropped(DisconnectReason::PingTimeout);
                }
            }
        }
    }

    /// Handles one Socket.IO packet. Returns a reason if the server ended
    /// the session.
    fn handle_message(&self, raw: &str) -> Option<DisconnectReason> {
        let packet = match SocketPacket::decode(raw) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("Failed to parse socket packet: {} - Raw: {}", e, raw);
                return None;
            }
        };

        if packet.namespace != self.options.namespace {
            tracing::debug!("Ignoring packet for namespace {}", packet.namespace);
            return None;
        }

        match packet.kind {
            PacketType::Event => match packet.as_event() {
                Some((name, args)) => self.router.route_raw(name, args),
                None => tracing::warn!("Malformed event packet: {}", raw),
            },
            PacketType::Disconnect => return Some(DisconnectReason::ServerDisconnect),
            other => tracing::debug!("Ignoring {:?} packet", other),
        }
        None
    }

    async fn emit(&self, link: &EngineLink, command: &OutboundCommand) -> Result<()> {
        let packet = SocketPacket::event(
            &self.options.namespace,
            command.event_name(),
            command.payload()?,
        );
        tracing::debug!("Emitting {}", command);
        link.send(EnginePacket::Message(packet.encode()?)).await
    }

    async fn close_link(&self, link: EngineLink) {
        let disconnect = SocketPacket::disconnect(&self.options.namespace);
        match disconnect.encode() {
            Ok(raw) => {
                let _ = link.send(EnginePacket::Message(raw)).await;
            }
            Err(e) => tracing::debug!("Failed to encode disconnect packet: {}", e),
        }
        let _ = link.send(EnginePacket::Close).await;
        tracing::info!("Closed {} transport", link.kind);
    }

    /// Sleeps between attempts. Returns `true` if the client asked us to
    /// stop meanwhile.
    async fn wait(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Emit(command)) => {
                        tracing::debug!("Dropping '{}' while reconnecting", command);
                    }
                    Some(SessionCommand::Close) | None => return true,
                },
            }
        }
    }
}
