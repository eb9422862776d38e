use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

/// Session id the socket server hands out per connection.
pub type ClientId = i32;

/// A connected client frames can be pushed to.
pub trait FrameSink {
    type Error;

    fn send_text(&mut self, text: &str) -> Result<(), Self::Error>;
}

/// Something inbound on one client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsEvent<'a> {
    Connected,
    Disconnected,
    Text(&'a str),
    Binary(&'a [u8]),
    Control,
}

impl<'a> WsEvent<'a> {
    /// Event for an inbound data frame of `len` bytes received into `buf`.
    /// A `len` past the end of `buf` is clamped to it. Text that is not valid
    /// UTF-8 is passed on as binary.
    pub fn inbound(text: bool, buf: &'a [u8], len: usize) -> Self {
        let payload = buf.get(..len).unwrap_or(buf);
        if !text {
            return WsEvent::Binary(payload);
        }
        match std::str::from_utf8(payload) {
            Ok(text) => WsEvent::Text(text.trim_end_matches('\0')),
            Err(_) => WsEvent::Binary(payload),
        }
    }
}

/// Callback for client events. Handlers run on the socket server task.
pub trait WsEventHandler: Send + Sync {
    fn on_event(&self, client: ClientId, event: WsEvent<'_>);
}

/// The registered callback: clients have nothing to say to the grip ball yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventHandler;

impl WsEventHandler for NoopEventHandler {
    fn on_event(&self, _client: ClientId, _event: WsEvent<'_>) {}
}

/// What the sampling loop needs from the socket server.
pub trait Broadcaster {
    /// Lets the server service pending client I/O before a frame is sampled.
    fn process_events(&mut self) {}

    /// Sends `text` to every connected client. Returns how many were reached.
    fn broadcast_text(&mut self, text: &str) -> usize;
}

/// Set of connected clients plus the event callback.
///
/// Connection bookkeeping happens here regardless of the handler, so the handler
/// only ever observes events.
pub struct WsHub<T, H> {
    clients: Vec<(ClientId, T)>,
    handler: H,
}

impl<T: FrameSink, H: WsEventHandler> WsHub<T, H> {
    pub fn new(handler: H) -> Self {
        WsHub {
            clients: Vec::new(),
            handler,
        }
    }

    /// Registers a client. A reused session id replaces the stale sink.
    pub fn connect(&mut self, client: ClientId, sink: T) {
        self.clients.retain(|(id, _)| *id != client);
        self.clients.push((client, sink));
        debug!("Client {client} connected, {} total", self.clients.len());
        self.handler.on_event(client, WsEvent::Connected);
    }

    pub fn disconnect(&mut self, client: ClientId) {
        self.clients.retain(|(id, _)| *id != client);
        debug!("Client {client} disconnected, {} left", self.clients.len());
        self.handler.on_event(client, WsEvent::Disconnected);
    }

    pub fn dispatch(&self, client: ClientId, event: WsEvent<'_>) {
        self.handler.on_event(client, event);
    }

    fn drop_clients(&mut self, failed: &[ClientId]) {
        self.clients.retain(|(id, _)| !failed.contains(id));
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Client set shared between the socket server task and the sampling loop.
pub struct SharedHub<T, H>(Arc<Mutex<WsHub<T, H>>>);

impl<T, H> Clone for SharedHub<T, H> {
    fn clone(&self) -> Self {
        SharedHub(Arc::clone(&self.0))
    }
}

impl<T: FrameSink + Clone, H: WsEventHandler> SharedHub<T, H> {
    pub fn new(handler: H) -> Self {
        SharedHub(Arc::new(Mutex::new(WsHub::new(handler))))
    }

    /// A panic while holding the lock leaves the client list usable, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, WsHub<T, H>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fans `text` out to all clients. Clients whose send fails are gone and get dropped.
    ///
    /// A send may wait on the task that also handles connects and inbound frames,
    /// so the lock is released while sending to copies of the sinks.
    pub fn broadcast_text(&self, text: &str) -> usize {
        let mut clients = self.lock().clients.clone();
        let failed: Vec<ClientId> = clients
            .iter_mut()
            .filter_map(|(id, sink)| match sink.send_text(text) {
                Ok(()) => None,
                Err(_) => {
                    debug!("Dropping client {id}, send failed");
                    Some(*id)
                }
            })
            .collect();
        if !failed.is_empty() {
            self.lock().drop_clients(&failed);
        }
        clients.len() - failed.len()
    }
}

#[cfg(test)]
mod test {
    use std::{
        cell::RefCell,
        rc::Rc,
        sync::{
            atomic::{AtomicUsize, Ordering},
            mpsc,
        },
        thread,
        time::Duration,
    };

    use super::*;

    type Inbox = Rc<RefCell<Vec<String>>>;

    #[derive(Clone)]
    struct FakeClient {
        inbox: Inbox,
        alive: bool,
    }

    impl FakeClient {
        fn new() -> (Self, Inbox) {
            let inbox = Inbox::default();
            let client = FakeClient {
                inbox: inbox.clone(),
                alive: true,
            };
            (client, inbox)
        }

        fn dead() -> Self {
            FakeClient {
                inbox: Inbox::default(),
                alive: false,
            }
        }
    }

    impl FrameSink for FakeClient {
        type Error = ();

        fn send_text(&mut self, text: &str) -> Result<(), ()> {
            if !self.alive {
                return Err(());
            }
            self.inbox.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    /// Hands every send to a server task and waits until that task has run it.
    #[derive(Clone)]
    struct QueuedClient {
        server_task: mpsc::Sender<mpsc::Sender<()>>,
    }

    impl FrameSink for QueuedClient {
        type Error = ();

        fn send_text(&mut self, _text: &str) -> Result<(), ()> {
            let (done, finished) = mpsc::channel();
            self.server_task.send(done).map_err(|_| ())?;
            finished
                .recv_timeout(Duration::from_secs(2))
                .map_err(|_| ())
        }
    }

    #[derive(Default, Clone)]
    struct CountingHandler {
        seen: Arc<AtomicUsize>,
    }

    impl WsEventHandler for CountingHandler {
        fn on_event(&self, _client: ClientId, _event: WsEvent<'_>) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test0_every_client_gets_the_same_frame() {
        let hub = SharedHub::new(NoopEventHandler);
        let inboxes: Vec<Inbox> = (0..3)
            .map(|id| {
                let (client, inbox) = FakeClient::new();
                hub.lock().connect(id, client);
                inbox
            })
            .collect();

        assert_eq!(hub.broadcast_text("120,340,0,4095"), 3);

        for inbox in inboxes {
            assert_eq!(*inbox.borrow(), vec!["120,340,0,4095".to_string()]);
        }
    }

    #[test]
    fn test1_broadcast_without_clients_reaches_nobody() {
        let hub: SharedHub<FakeClient, _> = SharedHub::new(NoopEventHandler);
        assert_eq!(hub.broadcast_text("1,2,3,4"), 0);
        assert!(hub.lock().is_empty());
    }

    #[test]
    fn test2_failed_clients_are_dropped() {
        let hub = SharedHub::new(NoopEventHandler);
        let (alive, inbox) = FakeClient::new();
        hub.lock().connect(1, alive);
        hub.lock().connect(2, FakeClient::dead());

        assert_eq!(hub.broadcast_text("1,2,3,4"), 1);
        assert_eq!(hub.lock().len(), 1);
        assert_eq!(hub.broadcast_text("5,6,7,8"), 1);
        assert_eq!(inbox.borrow().len(), 2);
    }

    #[test]
    fn test3_disconnect_removes_only_that_client() {
        let hub = SharedHub::new(NoopEventHandler);
        let (first, first_inbox) = FakeClient::new();
        let (second, second_inbox) = FakeClient::new();
        hub.lock().connect(7, first);
        hub.lock().connect(8, second);

        hub.lock().disconnect(7);
        hub.broadcast_text("0,0,0,0");

        assert!(first_inbox.borrow().is_empty());
        assert_eq!(second_inbox.borrow().len(), 1);
    }

    #[test]
    fn test4_reused_session_id_replaces_stale_client() {
        let hub = SharedHub::new(NoopEventHandler);
        let (stale, stale_inbox) = FakeClient::new();
        let (fresh, fresh_inbox) = FakeClient::new();
        hub.lock().connect(3, stale);
        hub.lock().connect(3, fresh);

        assert_eq!(hub.broadcast_text("9,9,9,9"), 1);
        assert!(stale_inbox.borrow().is_empty());
        assert_eq!(fresh_inbox.borrow().len(), 1);
    }

    #[test]
    fn test5_inbound_events_do_not_change_the_client_set() {
        let hub = SharedHub::new(NoopEventHandler);
        let (client, inbox) = FakeClient::new();
        hub.lock().connect(1, client);

        hub.lock().dispatch(1, WsEvent::Text("reset"));
        hub.lock().dispatch(1, WsEvent::Binary(&[0xde, 0xad]));
        hub.lock().dispatch(1, WsEvent::Control);
        hub.lock().dispatch(42, WsEvent::Text("unknown client"));

        assert_eq!(hub.lock().len(), 1);
        assert!(inbox.borrow().is_empty());
        assert_eq!(hub.broadcast_text("1,1,1,1"), 1);
    }

    #[test]
    fn test6_handler_sees_connects_disconnects_and_frames() {
        let handler = CountingHandler::default();
        let mut hub: WsHub<FakeClient, _> = WsHub::new(handler.clone());
        let (client, _inbox) = FakeClient::new();

        hub.connect(1, client);
        hub.dispatch(1, WsEvent::Text("hello"));
        hub.disconnect(1);

        assert_eq!(handler.seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test7_server_task_can_take_the_hub_while_a_broadcast_waits_on_it() {
        let (queue, jobs) = mpsc::channel::<mpsc::Sender<()>>();
        let hub = SharedHub::new(NoopEventHandler);
        hub.lock().connect(
            1,
            QueuedClient {
                server_task: queue.clone(),
            },
        );

        let task_hub = hub.clone();
        let server_task = thread::spawn(move || {
            let done = jobs.recv().unwrap();
            task_hub.lock().dispatch(1, WsEvent::Text("ping"));
            task_hub.lock().connect(2, QueuedClient { server_task: queue });
            done.send(()).unwrap();
        });

        assert_eq!(hub.broadcast_text("1,2,3,4"), 1);
        server_task.join().unwrap();
        assert_eq!(hub.lock().len(), 2);
    }

    #[test]
    fn test8_inbound_frames_become_events() {
        let mut buf = [0u8; 8];
        assert_eq!(WsEvent::inbound(true, &buf, 0), WsEvent::Text(""));
        assert_eq!(WsEvent::inbound(false, &buf, 0), WsEvent::Binary(&[]));

        buf[..3].copy_from_slice(b"hi\0");
        assert_eq!(WsEvent::inbound(true, &buf, 3), WsEvent::Text("hi"));

        buf[..2].copy_from_slice(&[0xff, 0xfe]);
        assert_eq!(WsEvent::inbound(true, &buf, 2), WsEvent::Binary(&[0xff, 0xfe]));
    }

    #[test]
    fn test9_reported_length_past_the_buffer_is_clamped() {
        let buf = [b'a'; 4];
        assert_eq!(WsEvent::inbound(true, &buf, 600), WsEvent::Text("aaaa"));
        assert_eq!(WsEvent::inbound(false, &buf, 600), WsEvent::Binary(&buf));
    }
}
