use {
    super::bid::BidId,
    crate::kernel::entities::{
        UserId,
        VehicleId,
    },
    rust_decimal::Decimal,
    std::sync::Arc,
    time::OffsetDateTime,
    tokio::sync::Mutex,
    uuid::Uuid,
};

pub type AuctionId = Uuid;
pub type AuctionLock = Arc<Mutex<()>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuctionStatus {
    Scheduled,
    Open,
    Closed,
    PendingApproval,
    Settled,
    Expired,
    Cancelled,
}

impl AuctionStatus {
    /// Terminal states are never left and their auctions are evicted from
    /// the projection.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Expired | Self::Cancelled)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

/// The current highest accepted bid of an auction. Monotonically
/// non-decreasing in amount while the auction is open.
#[derive(Clone, Debug, PartialEq)]
pub struct HighestBid {
    pub bid_id:    BidId,
    pub bidder_id: UserId,
    pub amount:    Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settlement {
    pub fee:        Decimal,
    pub settled_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Auction {
    pub id:                AuctionId,
    pub vehicle_id:        VehicleId,
    pub seller_id:         UserId,
    pub creation_time:     OffsetDateTime,
    pub start_time:        OffsetDateTime,
    pub end_time:          OffsetDateTime,
    pub status:            AuctionStatus,
    pub highest:           Option<HighestBid>,
    pub winner_id:         Option<UserId>,
    pub approval_deadline: Option<OffsetDateTime>,
    pub settlement:        Option<Settlement>,
}

impl Auction {
    pub fn new(
        vehicle_id: VehicleId,
        seller_id: UserId,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
        creation_time: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            seller_id,
            creation_time,
            start_time,
            end_time,
            status: AuctionStatus::Scheduled,
            highest: None,
            winner_id: None,
            approval_deadline: None,
            settlement: None,
        }
    }

    /// Bids are only accepted within `[start_time, end_time)`.
    pub fn bidding_window_contains(&self, now: OffsetDateTime) -> bool {
        self.start_time <= now && now < self.end_time
    }

    pub fn highest_amount(&self) -> Option<Decimal> {
        self.highest.as_ref().map(|highest| highest.amount)
    }
}
