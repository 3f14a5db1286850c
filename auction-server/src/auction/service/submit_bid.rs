use {
    super::Service,
    crate::{
        api::{
            ws::UpdateEvent,
            RestError,
        },
        auction::entities,
    },
    drivebid_api_types::bid::BidAccepted,
};

pub struct SubmitBidInput {
    pub bid_create: entities::BidCreate,
}

impl Service {
    /// Resolves a bid submission to a typed accept/reject outcome.
    ///
    /// The whole submission runs while holding the auction's serialization
    /// unit, so two submissions for the same auction can never both observe
    /// the same stale highest bid; submissions for different auctions do not
    /// contend.
    #[tracing::instrument(skip_all, fields(auction_id, bid_id, outcome))]
    pub async fn submit_bid(
        &self,
        input: SubmitBidInput,
    ) -> Result<entities::SubmitBidOutcome, RestError> {
        let bid_create = input.bid_create;
        tracing::Span::current().record("auction_id", bid_create.auction_id.to_string());

        let auction_lock = self
            .repo
            .get_or_create_auction_lock(bid_create.auction_id)
            .await;
        let _guard = auction_lock.lock().await;

        let Some(auction) = self
            .repo
            .get_in_memory_auction_by_id(bid_create.auction_id)
            .await
        else {
            // No auction row to reference, so no audit record either.
            tracing::Span::current().record("outcome", "rejected");
            return Ok(entities::SubmitBidOutcome::Rejected {
                reason:              entities::BidRejectionReason::AuctionNotFound,
                current_highest_bid: None,
            });
        };

        if let Err(reason) = Self::verify_bid(&auction, &bid_create) {
            return self.reject_bid(&auction, &bid_create, reason).await;
        }
        if !self.eligibility.is_eligible(bid_create.bidder_id).await? {
            return self
                .reject_bid(
                    &auction,
                    &bid_create,
                    entities::BidRejectionReason::BidderNotEligible,
                )
                .await;
        }

        let bid = entities::Bid::new(&bid_create, entities::BidStatus::Accepted);
        let mut updated = auction;
        updated.highest = Some(entities::HighestBid {
            bid_id:    bid.id,
            bidder_id: bid.bidder_id,
            amount:    bid.amount,
        });
        self.repo.add_accepted_bid(&bid, &updated).await?;
        tracing::Span::current().record("bid_id", bid.id.to_string());
        tracing::Span::current().record("outcome", "accepted");

        self.emit(UpdateEvent::BidAccepted(BidAccepted {
            auction_id: bid.auction_id,
            amount:     bid.amount,
            bidder_ref: bid.bidder_id,
            placed_at:  bid.placed_at,
        }));
        Ok(entities::SubmitBidOutcome::Accepted(bid))
    }

    async fn reject_bid(
        &self,
        auction: &entities::Auction,
        bid_create: &entities::BidCreate,
        reason: entities::BidRejectionReason,
    ) -> Result<entities::SubmitBidOutcome, RestError> {
        let bid = entities::Bid::new(bid_create, entities::BidStatus::Rejected(reason));
        self.repo.add_rejected_bid(&bid).await?;
        tracing::Span::current().record("outcome", "rejected");
        tracing::debug!(reason = ?reason, bid_id = bid.id.to_string(), "Bid rejected");
        Ok(entities::SubmitBidOutcome::Rejected {
            reason,
            current_highest_bid: auction.highest_amount(),
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::{
            entities::{
                AuctionStatus,
                BidRejectionReason,
                SubmitBidOutcome,
            },
            repository::MockDatabase,
            service::{
                tests::make_auction,
                verification::MockEligibilityCheck,
            },
        },
        rust_decimal::Decimal,
        rust_decimal_macros::dec,
        time::macros::datetime,
        uuid::Uuid,
    };

    fn open_auction() -> entities::Auction {
        make_auction(
            AuctionStatus::Open,
            datetime!(2026-05-01 12:00:00 UTC),
            datetime!(2026-05-01 12:10:00 UTC),
        )
    }

    fn bid_create(auction: &entities::Auction, amount: Decimal) -> entities::BidCreate {
        entities::BidCreate {
            auction_id: auction.id,
            bidder_id: Uuid::new_v4(),
            amount,
            initiation_time: datetime!(2026-05-01 12:01:00 UTC),
        }
    }

    #[tokio::test]
    async fn test_first_bid_is_accepted_and_updates_highest() {
        let mut db = MockDatabase::new();
        db.expect_add_accepted_bid().times(1).returning(|_, _| Ok(()));
        let service = Service::new_with_mocks(db);
        let auction = open_auction();
        service.seed_auction(auction.clone()).await;
        let mut events = service.subscribe_events();

        let outcome = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(&auction, dec!(1000)),
            })
            .await
            .unwrap();

        let bid = match outcome {
            SubmitBidOutcome::Accepted(bid) => bid,
            other => panic!("Expected accepted bid, got {:?}", other),
        };
        assert_eq!(bid.amount, dec!(1000));

        let stored = service
            .repo
            .get_in_memory_auction_by_id(auction.id)
            .await
            .unwrap();
        assert_eq!(stored.highest_amount(), Some(dec!(1000)));

        match events.try_recv().unwrap() {
            UpdateEvent::BidAccepted(accepted) => {
                assert_eq!(accepted.auction_id, auction.id);
                assert_eq!(accepted.amount, dec!(1000));
            }
            other => panic!("Expected bid accepted event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_auction_is_rejected_without_audit_row() {
        // No database expectations: nothing may be written.
        let service = Service::new_with_mocks(MockDatabase::new());
        let auction = open_auction();

        let outcome = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(&auction, dec!(1000)),
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SubmitBidOutcome::Rejected {
                reason:              BidRejectionReason::AuctionNotFound,
                current_highest_bid: None,
            },
        );
    }

    #[tokio::test]
    async fn test_low_bid_is_rejected_with_current_highest() {
        let mut db = MockDatabase::new();
        db.expect_add_bid().times(1).returning(|_| Ok(()));
        let service = Service::new_with_mocks(db);
        let mut auction = open_auction();
        auction.highest = Some(entities::HighestBid {
            bid_id:    Uuid::new_v4(),
            bidder_id: Uuid::new_v4(),
            amount:    dec!(500),
        });
        service.seed_auction(auction.clone()).await;

        let outcome = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(&auction, dec!(500)),
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SubmitBidOutcome::Rejected {
                reason:              BidRejectionReason::BidTooLow,
                current_highest_bid: Some(dec!(500)),
            },
        );
    }

    #[tokio::test]
    async fn test_seller_cannot_bid_on_own_auction() {
        let mut db = MockDatabase::new();
        db.expect_add_bid().times(1).returning(|_| Ok(()));
        let service = Service::new_with_mocks(db);
        let auction = open_auction();
        service.seed_auction(auction.clone()).await;

        let mut create = bid_create(&auction, dec!(1000));
        create.bidder_id = auction.seller_id;
        let outcome = service
            .submit_bid(SubmitBidInput { bid_create: create })
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            SubmitBidOutcome::Rejected {
                reason: BidRejectionReason::SelfBid,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_ineligible_bidder_is_rejected() {
        let mut db = MockDatabase::new();
        db.expect_add_bid().times(1).returning(|_| Ok(()));
        let mut eligibility = MockEligibilityCheck::new();
        eligibility.expect_is_eligible().returning(|_| Ok(false));
        let service = Service::new_with_mocks_and_eligibility(db, eligibility);
        let auction = open_auction();
        service.seed_auction(auction.clone()).await;

        let outcome = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(&auction, dec!(1000)),
            })
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            SubmitBidOutcome::Rejected {
                reason: BidRejectionReason::BidderNotEligible,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_without_state_change() {
        let mut db = MockDatabase::new();
        db.expect_add_accepted_bid()
            .times(1)
            .returning(|_, _| Err(RestError::TemporarilyUnavailable));
        let service = Service::new_with_mocks(db);
        let auction = open_auction();
        service.seed_auction(auction.clone()).await;

        let result = service
            .submit_bid(SubmitBidInput {
                bid_create: bid_create(&auction, dec!(1000)),
            })
            .await;

        assert!(result.is_err());
        let stored = service
            .repo
            .get_in_memory_auction_by_id(auction.id)
            .await
            .unwrap();
        assert_eq!(stored.highest_amount(), None);
    }

    #[tokio::test]
    async fn test_equal_concurrent_bids_accept_exactly_one() {
        let mut db = MockDatabase::new();
        db.expect_add_accepted_bid().times(1).returning(|_, _| Ok(()));
        db.expect_add_bid().times(1).returning(|_| Ok(()));
        let service = Service::new_with_mocks(db);
        let mut auction = open_auction();
        auction.highest = Some(entities::HighestBid {
            bid_id:    Uuid::new_v4(),
            bidder_id: Uuid::new_v4(),
            amount:    dec!(500),
        });
        service.seed_auction(auction.clone()).await;

        let first = tokio::spawn({
            let (service, create) = (service.clone(), bid_create(&auction, dec!(600)));
            async move { service.submit_bid(SubmitBidInput { bid_create: create }).await }
        });
        let second = tokio::spawn({
            let (service, create) = (service.clone(), bid_create(&auction, dec!(600)));
            async move { service.submit_bid(SubmitBidInput { bid_create: create }).await }
        });
        let outcomes = [
            first.await.unwrap().unwrap(),
            second.await.unwrap().unwrap(),
        ];

        let accepted = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, SubmitBidOutcome::Accepted(_)))
            .count();
        assert_eq!(accepted, 1);
        assert!(outcomes.iter().any(|outcome| matches!(
            outcome,
            SubmitBidOutcome::Rejected {
                reason: BidRejectionReason::BidTooLow,
                current_highest_bid: Some(highest),
            } if *highest == dec!(600)
        )));

        let stored = service
            .repo
            .get_in_memory_auction_by_id(auction.id)
            .await
            .unwrap();
        assert_eq!(stored.highest_amount(), Some(dec!(600)));
    }
}
