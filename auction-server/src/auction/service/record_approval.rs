use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::UserId,
    },
    time::OffsetDateTime,
};

pub struct RecordApprovalInput {
    pub auction_id:    entities::AuctionId,
    pub approver_id:   UserId,
    pub decision:      entities::ApprovalDecision,
    pub decision_time: OffsetDateTime,
}

impl Service {
    /// Records the seller's decision on a pending sale. Approval settles the
    /// sale and fixes the fee using the decision instant as the reference
    /// date; rejection ends the auction with no sale and no fallback to the
    /// next-highest bidder.
    #[tracing::instrument(skip_all, fields(auction_id, decision))]
    pub async fn record_approval(
        &self,
        input: RecordApprovalInput,
    ) -> Result<entities::Auction, RestError> {
        tracing::Span::current().record("auction_id", input.auction_id.to_string());
        tracing::Span::current().record("decision", format!("{:?}", input.decision).as_str());

        let auction_lock = self.repo.get_or_create_auction_lock(input.auction_id).await;
        let _guard = auction_lock.lock().await;

        let auction = self
            .repo
            .get_in_memory_auction_by_id(input.auction_id)
            .await
            .ok_or(RestError::AuctionNotFound)?;
        if auction.seller_id != input.approver_id {
            return Err(RestError::Forbidden);
        }
        if auction.status != entities::AuctionStatus::PendingApproval {
            return Err(RestError::BadParameters(
                "Auction is not awaiting seller approval".to_string(),
            ));
        }
        let deadline = auction.approval_deadline.ok_or_else(|| {
            tracing::error!(
                auction_id = auction.id.to_string(),
                "Pending auction has no approval deadline"
            );
            RestError::TemporarilyUnavailable
        })?;
        if input.decision_time >= deadline {
            return Err(RestError::BadParameters(
                "The approval deadline has passed".to_string(),
            ));
        }

        let mut next = auction.clone();
        match input.decision {
            entities::ApprovalDecision::Approve => {
                let highest = auction.highest.as_ref().ok_or_else(|| {
                    tracing::error!(
                        auction_id = auction.id.to_string(),
                        "Pending auction has no highest bid"
                    );
                    RestError::TemporarilyUnavailable
                })?;
                next.status = entities::AuctionStatus::Settled;
                next.settlement = Some(entities::Settlement {
                    fee:        self
                        .config
                        .fee_schedule
                        .compute_fee(highest.amount, input.decision_time),
                    settled_at: input.decision_time,
                });
            }
            entities::ApprovalDecision::Reject => {
                next.status = entities::AuctionStatus::Expired;
                next.winner_id = None;
            }
        }

        let is_updated = self
            .repo
            .update_auction_status(&next, auction.status)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    auction_id = auction.id.to_string(),
                    "Failed to record approval decision"
                );
                RestError::TemporarilyUnavailable
            })?;
        if !is_updated {
            return Err(RestError::BadParameters(
                "Auction is not awaiting seller approval".to_string(),
            ));
        }
        self.emit_status_update(&next);
        self.repo.remove_in_memory_auction(&next.id).await;
        self.repo.remove_auction_lock(&next.id).await;
        Ok(next)
    }
}
