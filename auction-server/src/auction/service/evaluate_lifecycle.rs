use {
    super::Service,
    crate::{
        auction::entities,
        kernel::deadline::compute_approval_deadline,
    },
    time::OffsetDateTime,
};

pub struct EvaluateLifecycleInput {
    pub auction_id: entities::AuctionId,
    pub now:        OffsetDateTime,
}

impl Service {
    /// Walks the auction through every transition due at `now`, holding the
    /// auction's serialization unit so bid acceptance cannot interleave with
    /// a close. Transitions go through the status-guarded update, so
    /// re-evaluating an auction already in its target state changes nothing
    /// and emits nothing.
    #[tracing::instrument(skip_all, fields(auction_id))]
    pub async fn evaluate_lifecycle(&self, input: EvaluateLifecycleInput) -> anyhow::Result<()> {
        tracing::Span::current().record("auction_id", input.auction_id.to_string());
        let auction_lock = self.repo.get_or_create_auction_lock(input.auction_id).await;
        let _guard = auction_lock.lock().await;

        let Some(mut auction) = self
            .repo
            .get_in_memory_auction_by_id(input.auction_id)
            .await
        else {
            return Ok(());
        };

        while let Some(next) = self.next_state(&auction, input.now) {
            let is_updated = self.repo.update_auction_status(&next, auction.status).await?;
            if is_updated {
                tracing::info!(
                    auction_id = next.id.to_string(),
                    status = ?next.status,
                    "Auction transitioned"
                );
                self.emit_status_update(&next);
            }
            auction = next;
        }

        if auction.status.is_terminal() {
            self.repo.remove_in_memory_auction(&auction.id).await;
            self.repo.remove_auction_lock(&auction.id).await;
        }
        Ok(())
    }

    /// The next time-due transition from the auction's current state, or
    /// None when the auction should stay where it is.
    fn next_state(
        &self,
        auction: &entities::Auction,
        now: OffsetDateTime,
    ) -> Option<entities::Auction> {
        let mut next = auction.clone();
        match auction.status {
            entities::AuctionStatus::Scheduled => {
                if now < auction.start_time {
                    return None;
                }
                next.status = entities::AuctionStatus::Open;
            }
            entities::AuctionStatus::Open => {
                if now < auction.end_time {
                    return None;
                }
                next.status = entities::AuctionStatus::Closed;
                // Computed exactly once, at the close transition.
                next.approval_deadline = Some(compute_approval_deadline(
                    auction.end_time,
                    self.config.approval_window,
                ));
            }
            entities::AuctionStatus::Closed => match &auction.highest {
                Some(highest) => {
                    next.status = entities::AuctionStatus::PendingApproval;
                    next.winner_id = Some(highest.bidder_id);
                }
                None => {
                    next.status = entities::AuctionStatus::Expired;
                }
            },
            entities::AuctionStatus::PendingApproval => {
                let deadline = auction.approval_deadline?;
                if now < deadline {
                    return None;
                }
                // The sale lapsed: no fallback to the next-highest bidder.
                next.status = entities::AuctionStatus::Expired;
                next.winner_id = None;
            }
            entities::AuctionStatus::Settled
            | entities::AuctionStatus::Expired
            | entities::AuctionStatus::Cancelled => return None,
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            api::ws::UpdateEvent,
            auction::{
                entities::AuctionStatus,
                repository::MockDatabase,
                service::tests::make_auction,
            },
            kernel::deadline::DEFAULT_APPROVAL_WINDOW,
        },
        drivebid_api_types::auction as auction_api,
        rust_decimal_macros::dec,
        time::macros::datetime,
        uuid::Uuid,
    };

    const START: time::OffsetDateTime = datetime!(2026-05-01 12:00:00 UTC);
    const END: time::OffsetDateTime = datetime!(2026-05-01 12:10:00 UTC);

    fn db_applying_all_updates() -> MockDatabase {
        let mut db = MockDatabase::new();
        db.expect_update_auction_status().returning(|_, _| Ok(true));
        db
    }

    fn with_highest(mut auction: entities::Auction, amount: rust_decimal::Decimal) -> entities::Auction {
        auction.highest = Some(entities::HighestBid {
            bid_id: Uuid::new_v4(),
            bidder_id: Uuid::new_v4(),
            amount,
        });
        auction
    }

    #[tokio::test]
    async fn test_scheduled_opens_at_start_time() {
        let service = Service::new_with_mocks(db_applying_all_updates());
        let auction = make_auction(AuctionStatus::Scheduled, START, END);
        service.seed_auction(auction.clone()).await;

        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now:        START,
            })
            .await
            .unwrap();

        let stored = service
            .repo
            .get_in_memory_auction_by_id(auction.id)
            .await
            .unwrap();
        assert_eq!(stored.status, AuctionStatus::Open);
    }

    #[tokio::test]
    async fn test_scheduled_stays_scheduled_before_start_time() {
        // No update expectations: nothing may be written.
        let service = Service::new_with_mocks(MockDatabase::new());
        let auction = make_auction(AuctionStatus::Scheduled, START, END);
        service.seed_auction(auction.clone()).await;
        let mut events = service.subscribe_events();

        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now:        datetime!(2026-05-01 11:59:59 UTC),
            })
            .await
            .unwrap();

        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_close_with_winner_goes_pending_with_deadline() {
        let service = Service::new_with_mocks(db_applying_all_updates());
        let auction = with_highest(make_auction(AuctionStatus::Open, START, END), dec!(1000));
        let winner_id = auction.highest.as_ref().unwrap().bidder_id;
        service.seed_auction(auction.clone()).await;
        let mut events = service.subscribe_events();

        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now:        END,
            })
            .await
            .unwrap();

        let stored = service
            .repo
            .get_in_memory_auction_by_id(auction.id)
            .await
            .unwrap();
        assert_eq!(stored.status, AuctionStatus::PendingApproval);
        assert_eq!(stored.winner_id, Some(winner_id));
        assert_eq!(
            stored.approval_deadline,
            Some(END + DEFAULT_APPROVAL_WINDOW),
        );

        // One event per applied transition: closed, then pending approval.
        let statuses: Vec<auction_api::AuctionStatus> = (0..2)
            .map(|_| match events.try_recv().unwrap() {
                UpdateEvent::AuctionStatusUpdate(update) => update.status,
                other => panic!("Expected status update, got {:?}", other),
            })
            .collect();
        assert_eq!(
            statuses,
            vec![
                auction_api::AuctionStatus::Closed,
                auction_api::AuctionStatus::PendingApproval,
            ],
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_close_without_bids_expires_with_no_winner() {
        let service = Service::new_with_mocks(db_applying_all_updates());
        let auction = make_auction(AuctionStatus::Open, START, END);
        service.seed_auction(auction.clone()).await;
        let mut events = service.subscribe_events();

        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now:        END,
            })
            .await
            .unwrap();

        // Terminal: evicted from the projection, lock reclaimed.
        assert!(service
            .repo
            .get_in_memory_auction_by_id(auction.id)
            .await
            .is_none());

        let mut last_status = None;
        while let Ok(event) = events.try_recv() {
            if let UpdateEvent::AuctionStatusUpdate(update) = event {
                assert_eq!(update.winner_id, None);
                last_status = Some(update.status);
            }
        }
        assert_eq!(last_status, Some(auction_api::AuctionStatus::Expired));
    }

    #[tokio::test]
    async fn test_unapproved_pending_expires_at_deadline() {
        let service = Service::new_with_mocks(db_applying_all_updates());
        let mut auction = with_highest(
            make_auction(AuctionStatus::PendingApproval, START, END),
            dec!(1000),
        );
        auction.winner_id = Some(auction.highest.as_ref().unwrap().bidder_id);
        auction.approval_deadline = Some(END + DEFAULT_APPROVAL_WINDOW);
        service.seed_auction(auction.clone()).await;
        let mut events = service.subscribe_events();

        // A tick just before the deadline does nothing.
        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now:        END + DEFAULT_APPROVAL_WINDOW - std::time::Duration::from_secs(1),
            })
            .await
            .unwrap();
        assert!(events.try_recv().is_err());

        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now:        END + DEFAULT_APPROVAL_WINDOW,
            })
            .await
            .unwrap();

        match events.try_recv().unwrap() {
            UpdateEvent::AuctionStatusUpdate(update) => {
                assert_eq!(update.status, auction_api::AuctionStatus::Expired);
                assert_eq!(update.winner_id, None);
            }
            other => panic!("Expected status update, got {:?}", other),
        }
        assert!(service
            .repo
            .get_in_memory_auction_by_id(auction.id)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_reevaluation_is_idempotent() {
        // The guarded update reports no change the second time around.
        let mut db = MockDatabase::new();
        let mut applied = false;
        db.expect_update_auction_status().returning(move |_, _| {
            let first = !applied;
            applied = true;
            Ok(first)
        });
        let service = Service::new_with_mocks(db);
        let auction = make_auction(AuctionStatus::Scheduled, START, END);
        service.seed_auction(auction.clone()).await;
        let mut events = service.subscribe_events();

        let now = datetime!(2026-05-01 12:00:30 UTC);
        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now,
            })
            .await
            .unwrap();
        assert!(events.try_recv().is_ok());
        assert!(events.try_recv().is_err());

        // Force the projection back to the already-applied state; the
        // guarded update rejects the replay and no event is emitted.
        service.seed_auction(auction.clone()).await;
        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now,
            })
            .await
            .unwrap();
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_end_to_end_open_bid_close_approve() {
        let mut db = db_applying_all_updates();
        db.expect_add_accepted_bid().returning(|_, _| Ok(()));
        let service = Service::new_with_mocks(db);
        let auction = make_auction(AuctionStatus::Scheduled, START, END);
        service.seed_auction(auction.clone()).await;

        // T0: the auction opens with no bids.
        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now:        START,
            })
            .await
            .unwrap();

        // T0 + 1min: a bid of 1000 is accepted.
        let outcome = service
            .submit_bid(super::super::submit_bid::SubmitBidInput {
                bid_create: entities::BidCreate {
                    auction_id:      auction.id,
                    bidder_id:       Uuid::new_v4(),
                    amount:          dec!(1000),
                    initiation_time: START + std::time::Duration::from_secs(60),
                },
            })
            .await
            .unwrap();
        let winner_id = match outcome {
            entities::SubmitBidOutcome::Accepted(bid) => bid.bidder_id,
            other => panic!("Expected accepted bid, got {:?}", other),
        };

        // endTime passes: closed, then immediately pending approval.
        service
            .evaluate_lifecycle(EvaluateLifecycleInput {
                auction_id: auction.id,
                now:        END,
            })
            .await
            .unwrap();
        let stored = service
            .repo
            .get_in_memory_auction_by_id(auction.id)
            .await
            .unwrap();
        assert_eq!(stored.status, AuctionStatus::PendingApproval);
        assert_eq!(stored.winner_id, Some(winner_id));
        assert_eq!(stored.approval_deadline, Some(END + DEFAULT_APPROVAL_WINDOW));

        // An hour later the seller approves; the fee is computed at that
        // instant, which is past the offer cutover, so the standard rate
        // applies.
        let settled = service
            .record_approval(super::super::record_approval::RecordApprovalInput {
                auction_id:    auction.id,
                approver_id:   auction.seller_id,
                decision:      entities::ApprovalDecision::Approve,
                decision_time: END + std::time::Duration::from_secs(3600),
            })
            .await
            .unwrap();
        assert_eq!(settled.status, AuctionStatus::Settled);
        assert_eq!(settled.settlement.unwrap().fee, dec!(40.00));
    }
}
