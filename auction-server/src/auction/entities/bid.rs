use {
    super::AuctionId,
    crate::kernel::entities::UserId,
    rust_decimal::Decimal,
    time::OffsetDateTime,
    uuid::Uuid,
};

pub type BidId = Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BidRejectionReason {
    AuctionNotFound,
    AuctionNotOpen,
    OutsideBidWindow,
    BidTooLow,
    SelfBid,
    BidderNotEligible,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BidStatus {
    Accepted,
    Rejected(BidRejectionReason),
}

/// A bid as recorded in the ledger. Bids are append-only: they are created
/// accepted or rejected and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub id:         BidId,
    pub auction_id: AuctionId,
    pub bidder_id:  UserId,
    pub amount:     Decimal,
    pub placed_at:  OffsetDateTime,
    pub status:     BidStatus,
}

#[derive(Clone, Debug)]
pub struct BidCreate {
    pub auction_id:      AuctionId,
    pub bidder_id:       UserId,
    pub amount:          Decimal,
    pub initiation_time: OffsetDateTime,
}

impl Bid {
    pub fn new(bid_create: &BidCreate, status: BidStatus) -> Self {
        Self {
            id:         BidId::new_v4(),
            auction_id: bid_create.auction_id,
            bidder_id:  bid_create.bidder_id,
            amount:     bid_create.amount,
            placed_at:  bid_create.initiation_time,
            status,
        }
    }
}

/// Outcome of a bid submission. Rejections are normal business outcomes and
/// carry the highest bid the submission lost against.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitBidOutcome {
    Accepted(Bid),
    Rejected {
        reason:              BidRejectionReason,
        current_highest_bid: Option<Decimal>,
    },
}
