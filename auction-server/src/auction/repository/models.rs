#[cfg(test)]
use mockall::automock;
use {
    super::entities,
    crate::{
        api::RestError,
        kernel::db::DB,
    },
    axum::async_trait,
    rust_decimal::Decimal,
    std::fmt::Debug,
    time::OffsetDateTime,
    uuid::Uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "auction_status", rename_all = "snake_case")]
pub enum AuctionStatus {
    Scheduled,
    Open,
    Closed,
    PendingApproval,
    Settled,
    Expired,
    Cancelled,
}

impl From<entities::AuctionStatus> for AuctionStatus {
    fn from(status: entities::AuctionStatus) -> Self {
        match status {
            entities::AuctionStatus::Scheduled => Self::Scheduled,
            entities::AuctionStatus::Open => Self::Open,
            entities::AuctionStatus::Closed => Self::Closed,
            entities::AuctionStatus::PendingApproval => Self::PendingApproval,
            entities::AuctionStatus::Settled => Self::Settled,
            entities::AuctionStatus::Expired => Self::Expired,
            entities::AuctionStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<AuctionStatus> for entities::AuctionStatus {
    fn from(status: AuctionStatus) -> Self {
        match status {
            AuctionStatus::Scheduled => Self::Scheduled,
            AuctionStatus::Open => Self::Open,
            AuctionStatus::Closed => Self::Closed,
            AuctionStatus::PendingApproval => Self::PendingApproval,
            AuctionStatus::Settled => Self::Settled,
            AuctionStatus::Expired => Self::Expired,
            AuctionStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Auction {
    pub id:                 Uuid,
    pub vehicle_id:         Uuid,
    pub seller_id:          Uuid,
    pub creation_time:      OffsetDateTime,
    pub start_time:         OffsetDateTime,
    pub end_time:           OffsetDateTime,
    pub status:             AuctionStatus,
    pub highest_bid_id:     Option<Uuid>,
    pub highest_bidder_id:  Option<Uuid>,
    pub highest_bid_amount: Option<Decimal>,
    pub winner_id:          Option<Uuid>,
    pub approval_deadline:  Option<OffsetDateTime>,
    pub fee:                Option<Decimal>,
    pub settlement_time:    Option<OffsetDateTime>,
}

impl Auction {
    pub fn new(auction: &entities::Auction) -> Self {
        Self {
            id:                 auction.id,
            vehicle_id:         auction.vehicle_id,
            seller_id:          auction.seller_id,
            creation_time:      auction.creation_time,
            start_time:         auction.start_time,
            end_time:           auction.end_time,
            status:             auction.status.into(),
            highest_bid_id:     auction.highest.as_ref().map(|h| h.bid_id),
            highest_bidder_id:  auction.highest.as_ref().map(|h| h.bidder_id),
            highest_bid_amount: auction.highest.as_ref().map(|h| h.amount),
            winner_id:          auction.winner_id,
            approval_deadline:  auction.approval_deadline,
            fee:                auction.settlement.as_ref().map(|s| s.fee),
            settlement_time:    auction.settlement.as_ref().map(|s| s.settled_at),
        }
    }

    pub fn get_auction_entity(&self) -> anyhow::Result<entities::Auction> {
        let highest = match (
            self.highest_bid_id,
            self.highest_bidder_id,
            self.highest_bid_amount,
        ) {
            (Some(bid_id), Some(bidder_id), Some(amount)) => Some(entities::HighestBid {
                bid_id,
                bidder_id,
                amount,
            }),
            (None, None, None) => None,
            _ => anyhow::bail!("Inconsistent highest bid columns for auction {}", self.id),
        };
        let settlement = match (self.fee, self.settlement_time) {
            (Some(fee), Some(settled_at)) => Some(entities::Settlement { fee, settled_at }),
            (None, None) => None,
            _ => anyhow::bail!("Inconsistent settlement columns for auction {}", self.id),
        };
        Ok(entities::Auction {
            id: self.id,
            vehicle_id: self.vehicle_id,
            seller_id: self.seller_id,
            creation_time: self.creation_time,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status.into(),
            highest,
            winner_id: self.winner_id,
            approval_deadline: self.approval_deadline,
            settlement,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "bid_status", rename_all = "snake_case")]
pub enum BidStatus {
    Accepted,
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "bid_rejection_reason", rename_all = "snake_case")]
pub enum BidRejectionReason {
    AuctionNotFound,
    AuctionNotOpen,
    OutsideBidWindow,
    BidTooLow,
    SelfBid,
    BidderNotEligible,
}

impl From<entities::BidRejectionReason> for BidRejectionReason {
    fn from(reason: entities::BidRejectionReason) -> Self {
        match reason {
            entities::BidRejectionReason::AuctionNotFound => Self::AuctionNotFound,
            entities::BidRejectionReason::AuctionNotOpen => Self::AuctionNotOpen,
            entities::BidRejectionReason::OutsideBidWindow => Self::OutsideBidWindow,
            entities::BidRejectionReason::BidTooLow => Self::BidTooLow,
            entities::BidRejectionReason::SelfBid => Self::SelfBid,
            entities::BidRejectionReason::BidderNotEligible => Self::BidderNotEligible,
        }
    }
}

impl From<BidRejectionReason> for entities::BidRejectionReason {
    fn from(reason: BidRejectionReason) -> Self {
        match reason {
            BidRejectionReason::AuctionNotFound => Self::AuctionNotFound,
            BidRejectionReason::AuctionNotOpen => Self::AuctionNotOpen,
            BidRejectionReason::OutsideBidWindow => Self::OutsideBidWindow,
            BidRejectionReason::BidTooLow => Self::BidTooLow,
            BidRejectionReason::SelfBid => Self::SelfBid,
            BidRejectionReason::BidderNotEligible => Self::BidderNotEligible,
        }
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Bid {
    pub id:               Uuid,
    pub auction_id:       Uuid,
    pub bidder_id:        Uuid,
    pub amount:           Decimal,
    pub status:           BidStatus,
    pub rejection_reason: Option<BidRejectionReason>,
    pub placed_at:        OffsetDateTime,
}

impl Bid {
    pub fn new(bid: &entities::Bid) -> Self {
        let (status, rejection_reason) = match bid.status {
            entities::BidStatus::Accepted => (BidStatus::Accepted, None),
            entities::BidStatus::Rejected(reason) => (BidStatus::Rejected, Some(reason.into())),
        };
        Self {
            id: bid.id,
            auction_id: bid.auction_id,
            bidder_id: bid.bidder_id,
            amount: bid.amount,
            status,
            rejection_reason,
            placed_at: bid.placed_at,
        }
    }

    pub fn get_bid_entity(&self) -> anyhow::Result<entities::Bid> {
        let status = match (self.status, self.rejection_reason) {
            (BidStatus::Accepted, None) => entities::BidStatus::Accepted,
            (BidStatus::Rejected, Some(reason)) => entities::BidStatus::Rejected(reason.into()),
            _ => anyhow::bail!("Inconsistent status columns for bid {}", self.id),
        };
        Ok(entities::Bid {
            id: self.id,
            auction_id: self.auction_id,
            bidder_id: self.bidder_id,
            amount: self.amount,
            placed_at: self.placed_at,
            status,
        })
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    async fn add_auction(&self, auction: &entities::Auction) -> Result<(), RestError>;
    async fn add_bid(&self, bid: &Bid) -> Result<(), RestError>;
    async fn add_accepted_bid(
        &self,
        bid: &Bid,
        auction: &entities::Auction,
    ) -> Result<(), RestError>;
    async fn get_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<Option<Auction>, RestError>;
    async fn get_bids(&self, auction_id: entities::AuctionId) -> Result<Vec<Bid>, RestError>;
    async fn get_active_auctions(&self) -> anyhow::Result<Vec<Auction>>;
    async fn get_accepted_bids(
        &self,
        auction_id: entities::AuctionId,
    ) -> anyhow::Result<Vec<Bid>>;
    async fn update_auction_status(
        &self,
        auction: &entities::Auction,
        from: entities::AuctionStatus,
    ) -> anyhow::Result<bool>;
}

#[async_trait]
impl Database for DB {
    async fn add_auction(&self, auction: &entities::Auction) -> Result<(), RestError> {
        let model = Auction::new(auction);
        sqlx::query(
            "INSERT INTO auction (id, vehicle_id, seller_id, creation_time, start_time, end_time, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(model.id)
        .bind(model.vehicle_id)
        .bind(model.seller_id)
        .bind(model.creation_time)
        .bind(model.start_time)
        .bind(model.end_time)
        .bind(model.status)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::error!(error = e.to_string(), auction_id = ?auction.id, "DB: Failed to insert auction");
            RestError::TemporarilyUnavailable
        })?;
        Ok(())
    }

    async fn add_bid(&self, bid: &Bid) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO bid (id, auction_id, bidder_id, amount, status, rejection_reason, placed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(bid.id)
        .bind(bid.auction_id)
        .bind(bid.bidder_id)
        .bind(bid.amount)
        .bind(bid.status)
        .bind(bid.rejection_reason)
        .bind(bid.placed_at)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to insert bid");
            RestError::TemporarilyUnavailable
        })?;
        Ok(())
    }

    async fn add_accepted_bid(
        &self,
        bid: &Bid,
        auction: &entities::Auction,
    ) -> Result<(), RestError> {
        let mut tx = self.begin().await.map_err(|e| {
            tracing::error!(error = e.to_string(), "DB: Failed to begin transaction");
            RestError::TemporarilyUnavailable
        })?;
        sqlx::query(
            "INSERT INTO bid (id, auction_id, bidder_id, amount, status, rejection_reason, placed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(bid.id)
        .bind(bid.auction_id)
        .bind(bid.bidder_id)
        .bind(bid.amount)
        .bind(bid.status)
        .bind(bid.rejection_reason)
        .bind(bid.placed_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to insert accepted bid");
            RestError::TemporarilyUnavailable
        })?;
        sqlx::query(
            "UPDATE auction SET highest_bid_id = $2, highest_bidder_id = $3, highest_bid_amount = $4 \
             WHERE id = $1",
        )
        .bind(auction.id)
        .bind(bid.id)
        .bind(bid.bidder_id)
        .bind(bid.amount)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = e.to_string(), auction_id = ?auction.id, "DB: Failed to update highest bid");
            RestError::TemporarilyUnavailable
        })?;
        tx.commit().await.map_err(|e| {
            tracing::error!(error = e.to_string(), "DB: Failed to commit accepted bid");
            RestError::TemporarilyUnavailable
        })?;
        Ok(())
    }

    async fn get_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<Option<Auction>, RestError> {
        sqlx::query_as("SELECT * FROM auction WHERE id = $1")
            .bind(auction_id)
            .fetch_optional(self)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    auction_id = auction_id.to_string(),
                    "DB: Failed to get auction"
                );
                RestError::TemporarilyUnavailable
            })
    }

    async fn get_bids(&self, auction_id: entities::AuctionId) -> Result<Vec<Bid>, RestError> {
        sqlx::query_as("SELECT * FROM bid WHERE auction_id = $1 ORDER BY placed_at ASC")
            .bind(auction_id)
            .fetch_all(self)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    auction_id = auction_id.to_string(),
                    "DB: Failed to get bids"
                );
                RestError::TemporarilyUnavailable
            })
    }

    async fn get_active_auctions(&self) -> anyhow::Result<Vec<Auction>> {
        let auctions = sqlx::query_as(
            "SELECT * FROM auction WHERE status NOT IN ('settled', 'expired', 'cancelled')",
        )
        .fetch_all(self)
        .await?;
        Ok(auctions)
    }

    async fn get_accepted_bids(
        &self,
        auction_id: entities::AuctionId,
    ) -> anyhow::Result<Vec<Bid>> {
        let bids = sqlx::query_as(
            "SELECT * FROM bid WHERE auction_id = $1 AND status = 'accepted' ORDER BY placed_at ASC",
        )
        .bind(auction_id)
        .fetch_all(self)
        .await?;
        Ok(bids)
    }

    async fn update_auction_status(
        &self,
        auction: &entities::Auction,
        from: entities::AuctionStatus,
    ) -> anyhow::Result<bool> {
        let model = Auction::new(auction);
        let result = sqlx::query(
            "UPDATE auction SET status = $2, winner_id = $3, approval_deadline = $4, fee = $5, settlement_time = $6 \
             WHERE id = $1 AND status = $7",
        )
        .bind(model.id)
        .bind(model.status)
        .bind(model.winner_id)
        .bind(model.approval_deadline)
        .bind(model.fee)
        .bind(model.settlement_time)
        .bind(AuctionStatus::from(from))
        .execute(self)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
