#[cfg(target_os = "espidf")]
use super::broadcast::{Broadcaster, ClientId, FrameSink, SharedHub, WsEvent, WsEventHandler};
#[cfg(target_os = "espidf")]
use crate::config::ServerConfig;
#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    http::server::{
        ws::{EspHttpWsConnection, EspHttpWsDetachedSender},
        Configuration, EspHttpServer,
    },
    sys::EspError,
    ws::FrameType,
};
#[cfg(target_os = "espidf")]
use log::{debug, info};

/// Inbound frames longer than this get the session closed.
#[cfg(target_os = "espidf")]
const MAX_INBOUND_FRAME: usize = 512;

/// Error types related to the WebSocket server.
#[derive(Debug)]
pub enum ServerError {
    HandlerRegistrationError,
    StartingError,
}

/// WebSocket server broadcasting text frames to every connected client.
///
/// The underlying http server runs on its own task, so connects, disconnects and
/// inbound frames are handled there and `process_events` has nothing left to do.
#[cfg(target_os = "espidf")]
pub struct WsBroadcastServer<H: WsEventHandler + 'static> {
    _server: EspHttpServer<'static>,
    hub: SharedHub<EspHttpWsDetachedSender, H>,
}

#[cfg(target_os = "espidf")]
impl<H: WsEventHandler + 'static> WsBroadcastServer<H> {
    /// Starts listening on `config.port` and accepts WebSocket upgrades on `config.path`.
    ///
    /// # Errors
    ///
    /// - `ServerError::StartingError`: If the http server could not be started.
    /// - `ServerError::HandlerRegistrationError`: If the WebSocket handler could not be registered.
    pub fn start(config: &ServerConfig, handler: H) -> Result<Self, ServerError> {
        let mut server = EspHttpServer::new(&Configuration {
            http_port: config.port,
            ..Default::default()
        })
        .map_err(|_| ServerError::StartingError)?;

        let hub = SharedHub::new(handler);
        let handler_hub = hub.clone();
        server
            .ws_handler(config.path.as_str(), move |ws| handle_session(&handler_hub, ws))
            .map_err(|_| ServerError::HandlerRegistrationError)?;

        info!("WebSocket server listening on port {}", config.port);
        Ok(WsBroadcastServer {
            _server: server,
            hub,
        })
    }
}

#[cfg(target_os = "espidf")]
impl<H: WsEventHandler + 'static> Broadcaster for WsBroadcastServer<H> {
    fn broadcast_text(&mut self, text: &str) -> usize {
        self.hub.broadcast_text(text)
    }
}

#[cfg(target_os = "espidf")]
impl FrameSink for EspHttpWsDetachedSender {
    type Error = EspError;

    fn send_text(&mut self, text: &str) -> Result<(), EspError> {
        self.send(FrameType::Text(false), text.as_bytes())
    }
}

#[cfg(target_os = "espidf")]
fn handle_session<H: WsEventHandler>(
    hub: &SharedHub<EspHttpWsDetachedSender, H>,
    ws: &mut EspHttpWsConnection,
) -> Result<(), EspError> {
    let client: ClientId = ws.session();
    if ws.is_new() {
        let sender = ws.create_detached_sender()?;
        hub.lock().connect(client, sender);
        return Ok(());
    }
    if ws.is_closed() {
        hub.lock().disconnect(client);
        return Ok(());
    }

    let (frame_type, len) = ws.recv(&mut [])?;
    if len > MAX_INBOUND_FRAME {
        debug!("Client {client} sent a {len} byte frame, closing");
        return ws.send(FrameType::Close, &[]);
    }
    let mut buf = [0u8; MAX_INBOUND_FRAME];
    // The length query already consumed an empty frame.
    let (frame_type, len) = if len == 0 {
        (frame_type, 0)
    } else {
        ws.recv(&mut buf)?
    };

    let event = match frame_type {
        FrameType::Text(_) => WsEvent::inbound(true, &buf, len),
        FrameType::Binary(_) => WsEvent::inbound(false, &buf, len),
        _ => WsEvent::Control,
    };
    hub.lock().dispatch(client, event);
    Ok(())
}
