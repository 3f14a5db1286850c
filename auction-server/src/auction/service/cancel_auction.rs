use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

pub struct CancelAuctionInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// Administrative cancellation. Only auctions that have not yet closed
    /// can be cancelled; the state is terminal.
    #[tracing::instrument(skip_all, fields(auction_id))]
    pub async fn cancel_auction(
        &self,
        input: CancelAuctionInput,
    ) -> Result<entities::Auction, RestError> {
        tracing::Span::current().record("auction_id", input.auction_id.to_string());
        let auction_lock = self.repo.get_or_create_auction_lock(input.auction_id).await;
        let _guard = auction_lock.lock().await;

        let auction = self
            .repo
            .get_in_memory_auction_by_id(input.auction_id)
            .await
            .ok_or(RestError::AuctionNotFound)?;
        if !matches!(
            auction.status,
            entities::AuctionStatus::Scheduled | entities::AuctionStatus::Open
        ) {
            return Err(RestError::BadParameters(
                "Only scheduled or open auctions can be cancelled".to_string(),
            ));
        }

        let mut next = auction.clone();
        next.status = entities::AuctionStatus::Cancelled;
        let is_updated = self
            .repo
            .update_auction_status(&next, auction.status)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    auction_id = auction.id.to_string(),
                    "Failed to cancel auction"
                );
                RestError::TemporarilyUnavailable
            })?;
        if !is_updated {
            return Err(RestError::BadParameters(
                "Only scheduled or open auctions can be cancelled".to_string(),
            ));
        }
        self.emit_status_update(&next);
        self.repo.remove_in_memory_auction(&next.id).await;
        self.repo.remove_auction_lock(&next.id).await;
        Ok(next)
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
        time::macros::datetime,
    };

    #[tokio::test]
    async fn test_open_auction_can_be_cancelled() {
        let mut db = MockDatabase::new();
        db.expect_update_auction_status().returning(|_, _| Ok(true));
        let service = Service::new_with_mocks(db);
        let auction = make_auction(
            AuctionStatus::Open,
            datetime!(2026-05-01 12:00:00 UTC),
            datetime!(2026-05-01 12:10:00 UTC),
        );
        service.seed_auction(auction.clone()).await;

        let cancelled = service
            .cancel_auction(CancelAuctionInput {
                auction_id: auction.id,
            })
            .await
            .unwrap();
        assert_eq!(cancelled.status, AuctionStatus::Cancelled);
        assert!(service
            .repo
            .get_in_memory_auction_by_id(auction.id)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_pending_auction_cannot_be_cancelled() {
        let service = Service::new_with_mocks(MockDatabase::new());
        let auction = make_auction(
            AuctionStatus::PendingApproval,
            datetime!(2026-05-01 12:00:00 UTC),
            datetime!(2026-05-01 12:10:00 UTC),
        );
        service.seed_auction(auction.clone()).await;

        let result = service
            .cancel_auction(CancelAuctionInput {
                auction_id: auction.id,
            })
            .await;
        assert!(matches!(result, Err(RestError::BadParameters(_))));
    }
}
