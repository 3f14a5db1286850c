use {
    super::Auth,
    crate::{
        auction::api::process_bid,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::StoreNew,
    },
    anyhow::{
        anyhow,
        Result,
    },
    axum::{
        extract::{
            ws::{
                Message,
                WebSocket,
            },
            State,
            WebSocketUpgrade,
        },
        response::IntoResponse,
    },
    drivebid_api_types::{
        auction::{
            AuctionId,
            AuctionStatusUpdate,
        },
        bid::{
            BidAccepted,
            BidCreate,
            BidResult,
        },
        ws::{
            APIResponse,
            ClientMessage,
            ClientRequest,
            ServerResultMessage,
            ServerResultResponse,
            ServerUpdateResponse,
        },
    },
    futures::{
        stream::{
            SplitSink,
            SplitStream,
        },
        SinkExt,
        StreamExt,
    },
    std::{
        collections::HashSet,
        future::Future,
        sync::{
            atomic::{
                AtomicUsize,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    tokio::sync::{
        broadcast,
        Semaphore,
    },
    tracing::{
        instrument,
        Instrument,
    },
};

pub struct WsState {
    subscriber_counter:     AtomicUsize,
    pub broadcast_sender:   broadcast::Sender<UpdateEvent>,
    pub broadcast_receiver: broadcast::Receiver<UpdateEvent>,
}

impl WsState {
    pub fn new(broadcast_channel_size: usize) -> Self {
        let (broadcast_sender, broadcast_receiver) = broadcast::channel(broadcast_channel_size);
        Self {
            subscriber_counter: AtomicUsize::new(0),
            broadcast_sender,
            broadcast_receiver,
        }
    }

    pub fn get_new_subscriber_id(&self) -> SubscriberId {
        self.subscriber_counter.fetch_add(1, Ordering::SeqCst)
    }
}

/// Events fanned out to auction room subscribers. Each event belongs to
/// exactly one auction's room.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateEvent {
    BidAccepted(BidAccepted),
    AuctionStatusUpdate(AuctionStatusUpdate),
}

impl UpdateEvent {
    pub fn auction_id(&self) -> AuctionId {
        match self {
            UpdateEvent::BidAccepted(bid) => bid.auction_id,
            UpdateEvent::AuctionStatusUpdate(update) => update.id,
        }
    }
}

pub type SubscriberId = usize;

#[derive(Debug, Clone)]
struct DeferredResponse {
    response:          ServerResultResponse,
    auction_id_to_add: Option<AuctionId>,
}

pub async fn ws_route_handler(
    auth: Auth,
    ws: WebSocketUpgrade,
    State(store): State<Arc<StoreNew>>,
) -> impl IntoResponse {
    let subscriber_id = store.store.ws.get_new_subscriber_id();
    ws.on_upgrade(move |socket| websocket_handler(socket, store, subscriber_id, auth))
}

async fn websocket_handler(
    stream: WebSocket,
    state: Arc<StoreNew>,
    subscriber_id: SubscriberId,
    auth: Auth,
) {
    let (sender, receiver) = stream.split();
    let new_receiver = state.store.ws.broadcast_receiver.resubscribe();
    let mut subscriber =
        Subscriber::new(subscriber_id, state, new_receiver, receiver, sender, auth);
    subscriber.run().await;
}

/// Subscriber is an actor that handles a single websocket connection. It
/// holds the connection's room memberships, listens to the broadcast channel
/// and forwards the events of subscribed auctions to the client.
pub struct Subscriber {
    id:                  SubscriberId,
    closed:              bool,
    store:               Arc<StoreNew>,
    notify_receiver:     broadcast::Receiver<UpdateEvent>,
    receiver:            SplitStream<WebSocket>,
    sender:              SplitSink<WebSocket, Message>,
    auction_ids:         HashSet<AuctionId>,
    ping_interval:       tokio::time::Interval,
    exit_check_interval: tokio::time::Interval,
    responded_to_ping:   bool,
    auth:                Auth,
    active_requests:     Arc<Semaphore>,
    response_sender:     broadcast::Sender<DeferredResponse>,
    response_receiver:   broadcast::Receiver<DeferredResponse>,
}

const PING_INTERVAL_DURATION: Duration = Duration::from_secs(30);

const MAX_ACTIVE_REQUESTS: usize = 50;

fn ok_response(id: String) -> ServerResultResponse {
    ServerResultResponse {
        id:     Some(id),
        result: ServerResultMessage::Success(None),
    }
}

impl Subscriber {
    pub fn new(
        id: SubscriberId,
        store: Arc<StoreNew>,
        notify_receiver: broadcast::Receiver<UpdateEvent>,
        receiver: SplitStream<WebSocket>,
        sender: SplitSink<WebSocket, Message>,
        auth: Auth,
    ) -> Self {
        let (response_sender, response_receiver) = broadcast::channel(100);
        Self {
            id,
            closed: false,
            store,
            notify_receiver,
            receiver,
            sender,
            auction_ids: HashSet::new(),
            ping_interval: tokio::time::interval(PING_INTERVAL_DURATION),
            exit_check_interval: tokio::time::interval(EXIT_CHECK_INTERVAL),
            responded_to_ping: true, // We start with true so we don't close the connection immediately
            auth,
            active_requests: Arc::new(Semaphore::new(MAX_ACTIVE_REQUESTS)),
            response_sender,
            response_receiver,
        }
    }

    pub async fn run(&mut self) {
        while !self.closed {
            if let Err(e) = self.handle_next().await {
                tracing::debug!(subscriber = self.id, error = ?e, "Error Handling Subscriber Message.");
                break;
            }
        }
    }

    async fn handle_next(&mut self) -> Result<()> {
        tokio::select! {
            maybe_update_event = self.notify_receiver.recv() => {
                match maybe_update_event {
                    // A lagged receiver has lost events; the connection is
                    // dropped rather than let it fall further behind.
                    Ok(event) => self.handle_update(event).await,
                    Err(e) => Err(anyhow!("Error receiving update event: {:?}", e)),
                }
            },
            maybe_message_or_err = self.receiver.next() => {
                self.handle_client_message(
                    maybe_message_or_err.ok_or(anyhow!("Client channel is closed"))??
                ).await
            },
            response_received = self.response_receiver.recv() => {
                match response_received {
                    Ok(DeferredResponse { response, auction_id_to_add }) => {
                        if let Some(auction_id) = auction_id_to_add {
                            self.auction_ids.insert(auction_id);
                        }
                        self.sender.send(serde_json::to_string(&response)?.into()).await?;
                    }
                    Err(e) => {
                        tracing::warn!(
                            subscriber = self.id,
                            error = ?e,
                            "Error Handling Subscriber Response Message."
                        );
                    }
                }
                Ok(())
            },
            _ = self.ping_interval.tick() => {
                if !self.responded_to_ping {
                    return Err(anyhow!("Subscriber did not respond to ping. Closing connection."));
                }
                self.responded_to_ping = false;
                self.sender.send(Message::Ping(vec![])).await?;
                Ok(())
            },
            _ = self.exit_check_interval.tick() => {
                if SHOULD_EXIT.load(Ordering::Acquire) {
                    self.sender.close().await?;
                    self.closed = true;
                    return Err(anyhow!("Application is shutting down. Closing connection."));
                }
                Ok(())
            }
        }
    }

    #[instrument(skip_all, fields(subscriber = self.id, name))]
    async fn handle_update(&mut self, event: UpdateEvent) -> Result<()> {
        if !self.auction_ids.contains(&event.auction_id()) {
            // Irrelevant update
            return Ok(());
        }
        let message = match event {
            UpdateEvent::BidAccepted(bid) => {
                tracing::Span::current().record("name", "bid_accepted");
                serde_json::to_string(&ServerUpdateResponse::BidAccepted { bid })?
            }
            UpdateEvent::AuctionStatusUpdate(update) => {
                tracing::Span::current().record("name", "auction_status_update");
                serde_json::to_string(&ServerUpdateResponse::AuctionStatusUpdate { update })?
            }
        };
        self.sender.send(message.into()).await?;
        Ok(())
    }

    async fn handle_subscribe(&mut self, message_id: String, auction_ids: Vec<AuctionId>) {
        let available: HashSet<AuctionId> = self
            .store
            .auction_service
            .get_auctions()
            .await
            .iter()
            .map(|auction| auction.id)
            .collect();
        let not_found: Vec<&AuctionId> = auction_ids
            .iter()
            .filter(|auction_id| !available.contains(auction_id))
            .collect();
        // If a single auction id is not found, we don't subscribe to any of
        // the asked correct auction ids and return an error to be more
        // explicit and clear.
        let resp = if !not_found.is_empty() {
            ServerResultResponse {
                id:     Some(message_id),
                result: ServerResultMessage::Err(format!(
                    "Auction(s) with id(s) {:?} not found",
                    not_found
                )),
            }
        } else {
            self.auction_ids.extend(auction_ids);
            ok_response(message_id)
        };
        Self::send_response(
            &self.response_sender,
            DeferredResponse {
                response:          resp,
                auction_id_to_add: None,
            },
        );
    }

    async fn handle_unsubscribe(&mut self, message_id: String, auction_ids: Vec<AuctionId>) {
        self.auction_ids
            .retain(|auction_id| !auction_ids.contains(auction_id));
        Self::send_response(
            &self.response_sender,
            DeferredResponse {
                response:          ok_response(message_id),
                auction_id_to_add: None,
            },
        );
    }

    fn send_response(
        response_sender: &broadcast::Sender<DeferredResponse>,
        deferred_response: DeferredResponse,
    ) {
        if let Err(e) = response_sender.send(deferred_response) {
            tracing::warn!(error = ?e, "Error sending response to subscriber");
        }
    }

    async fn spawn_deferred(
        &mut self,
        fut: impl Future<Output = DeferredResponse> + Send + 'static,
    ) {
        let permit = self
            .active_requests
            .clone()
            .acquire_owned()
            .await
            .expect("Semaphore should not be closed");
        let response_sender = self.response_sender.clone();
        self.store.task_tracker.spawn(
            async move {
                let resp = fut.await;
                Self::send_response(&response_sender, resp);
                drop(permit);
            }
            .in_current_span(),
        );
    }

    async fn handle_post_bid(&mut self, message_id: String, bid: BidCreate) {
        let (auth, store) = (self.auth.clone(), self.store.clone());
        self.spawn_deferred(async move {
            match process_bid(auth, store, bid).await {
                Ok(bid_result) => DeferredResponse {
                    // An accepted bid implicitly joins the auction's room so
                    // the bidder sees being outbid.
                    auction_id_to_add: match &bid_result {
                        BidResult::Accepted { auction_id, .. } => Some(*auction_id),
                        BidResult::Rejected { .. } => None,
                    },
                    response:          ServerResultResponse {
                        id:     Some(message_id),
                        result: ServerResultMessage::Success(Some(APIResponse::BidResult(
                            bid_result,
                        ))),
                    },
                },
                Err(e) => DeferredResponse {
                    response:          ServerResultResponse {
                        id:     Some(message_id),
                        result: ServerResultMessage::Err(e.to_status_and_message().1),
                    },
                    auction_id_to_add: None,
                },
            }
        })
        .await;
    }

    #[instrument(skip_all, fields(subscriber = self.id, name))]
    async fn handle_client_message(&mut self, message: Message) -> Result<()> {
        let maybe_client_message = match message {
            Message::Close(_) => {
                // Closing the connection. When the Subscriber struct is
                // dropped its room memberships vanish with it; no shared
                // state needs cleaning up. Send the close message to
                // gracefully shut down the connection, otherwise the client
                // might get an abnormal Websocket closure error.
                tracing::Span::current().record("name", "close");
                self.sender.close().await?;
                self.closed = true;
                return Ok(());
            }
            Message::Text(text) => serde_json::from_str::<ClientRequest>(&text),
            Message::Binary(data) => serde_json::from_slice::<ClientRequest>(&data),
            Message::Ping(_) => {
                // Axum will send Pong automatically
                tracing::Span::current().record("name", "ping");
                return Ok(());
            }
            Message::Pong(_) => {
                tracing::Span::current().record("name", "pong");
                self.responded_to_ping = true;
                return Ok(());
            }
        };

        match maybe_client_message {
            Err(e) => {
                Self::send_response(
                    &self.response_sender,
                    DeferredResponse {
                        response:          ServerResultResponse {
                            id:     None,
                            result: ServerResultMessage::Err(e.to_string()),
                        },
                        auction_id_to_add: None,
                    },
                );
            }
            Ok(ClientRequest { msg, id }) => match msg {
                ClientMessage::Subscribe { auction_ids } => {
                    tracing::Span::current().record("name", "subscribe");
                    self.handle_subscribe(id, auction_ids).await
                }
                ClientMessage::Unsubscribe { auction_ids } => {
                    tracing::Span::current().record("name", "unsubscribe");
                    self.handle_unsubscribe(id, auction_ids).await
                }
                ClientMessage::PostBid { bid } => {
                    tracing::Span::current().record("name", "post_bid");
                    self.handle_post_bid(id, bid).await
                }
            },
        };

        Ok(())
    }
}
