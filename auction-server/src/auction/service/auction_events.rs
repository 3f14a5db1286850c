use {
    super::Service,
    crate::{
        api::ws::UpdateEvent,
        auction::entities,
    },
    futures::Stream,
    tokio::sync::broadcast,
};

impl Service {
    /// Lazy, restartable event sequence for one auction, for in-process
    /// consumers such as the notification pipeline. Attaching only sees
    /// events published afterwards; a lagging consumer skips what it missed
    /// instead of stalling the hub.
    pub fn auction_events(
        &self,
        auction_id: entities::AuctionId,
    ) -> impl Stream<Item = UpdateEvent> {
        let mut receiver = self.event_sender.subscribe();
        async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if event.auction_id() == auction_id {
                            yield event;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            skipped,
                            auction_id = auction_id.to_string(),
                            "Auction event stream lagged"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::{
            entities::AuctionStatus,
            repository::MockDatabase,
            service::tests::make_auction,
        },
        drivebid_api_types::auction::AuctionStatusUpdate,
        futures::StreamExt,
        time::macros::datetime,
        uuid::Uuid,
    };

    fn status_update(auction: &entities::Auction) -> UpdateEvent {
        UpdateEvent::AuctionStatusUpdate(AuctionStatusUpdate {
            id:                auction.id,
            status:            auction.status.into(),
            winner_id:         None,
            approval_deadline: None,
            fee:               None,
        })
    }

    #[tokio::test]
    async fn test_stream_only_yields_the_requested_auction() {
        let service = Service::new_with_mocks(MockDatabase::new());
        let auction = make_auction(
            AuctionStatus::Open,
            datetime!(2026-05-01 12:00:00 UTC),
            datetime!(2026-05-01 12:10:00 UTC),
        );
        let other = make_auction(
            AuctionStatus::Open,
            datetime!(2026-05-01 12:00:00 UTC),
            datetime!(2026-05-01 12:10:00 UTC),
        );

        let mut stream = Box::pin(service.auction_events(auction.id));
        service.emit(status_update(&other));
        service.emit(status_update(&auction));

        let event = stream.next().await.unwrap();
        assert_eq!(event.auction_id(), auction.id);
    }

    #[tokio::test]
    async fn test_attaching_late_misses_earlier_events() {
        let service = Service::new_with_mocks(MockDatabase::new());
        let auction = make_auction(
            AuctionStatus::Open,
            datetime!(2026-05-01 12:00:00 UTC),
            datetime!(2026-05-01 12:10:00 UTC),
        );

        // Emitted before anyone attached: nobody buffers it.
        let _ = service.event_sender.send(status_update(&auction));

        let mut stream = Box::pin(service.auction_events(auction.id));
        let mut marker = status_update(&auction);
        if let UpdateEvent::AuctionStatusUpdate(update) = &mut marker {
            update.winner_id = Some(Uuid::new_v4());
        }
        service.emit(marker.clone());

        let event = stream.next().await.unwrap();
        assert_eq!(event, marker);
    }
}
