use {
    crate::{
        auction::AuctionId,
        UserId,
    },
    rust_decimal::Decimal,
    serde::{
        Deserialize,
        Serialize,
    },
    strum::Display,
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type BidId = Uuid;

/// Why a bid submission was turned down.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BidRejectionReason {
    AuctionNotFound,
    AuctionNotOpen,
    OutsideBidWindow,
    BidTooLow,
    SelfBid,
    BidderNotEligible,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Accepted,
    Rejected,
}

/// Bid submission payload used over the websocket, where the auction id is
/// part of the message rather than the route.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct BidCreate {
    #[schema(example = "b88c4b4b-7a05-4b76-8b82-6a4bfc2c1b30", value_type = String)]
    pub auction_id: AuctionId,
    /// Offered amount, must strictly exceed the current highest bid.
    #[schema(example = "1000.00", value_type = String)]
    pub amount:     Decimal,
}

/// Bid submission payload for the REST route, where the auction id comes
/// from the path.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct SubmitBid {
    #[schema(example = "1000.00", value_type = String)]
    pub amount: Decimal,
}

/// Outcome of a bid submission. A rejection is a normal, machine-readable
/// outcome rather than an error; it carries the highest bid the submission
/// lost against so the client can immediately re-offer.
#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
#[serde(tag = "status")]
pub enum BidResult {
    #[serde(rename = "accepted")]
    Accepted {
        #[schema(example = "f47ac10b-58cc-4372-a567-0e02b2c3d479", value_type = String)]
        id:         BidId,
        #[schema(example = "b88c4b4b-7a05-4b76-8b82-6a4bfc2c1b30", value_type = String)]
        auction_id: AuctionId,
        #[schema(example = "1000.00", value_type = String)]
        amount:     Decimal,
        #[schema(example = "2026-05-01T12:01:00Z", value_type = String)]
        #[serde(with = "time::serde::rfc3339")]
        placed_at:  OffsetDateTime,
    },
    #[serde(rename = "rejected")]
    Rejected {
        reason:              BidRejectionReason,
        #[schema(example = "1000.00", value_type = Option<String>)]
        current_highest_bid: Option<Decimal>,
    },
}

/// A bid as recorded in the audit trail. Rejected bids are retained with
/// their rejection reason.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct Bid {
    #[schema(example = "f47ac10b-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:               BidId,
    #[schema(example = "b88c4b4b-7a05-4b76-8b82-6a4bfc2c1b30", value_type = String)]
    pub auction_id:       AuctionId,
    #[schema(example = "1f2a3b4c-5d6e-4f70-8192-a3b4c5d6e7f8", value_type = String)]
    pub bidder_id:        UserId,
    #[schema(example = "1000.00", value_type = String)]
    pub amount:           Decimal,
    #[schema(example = "2026-05-01T12:01:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub placed_at:        OffsetDateTime,
    pub status:           BidStatus,
    pub rejection_reason: Option<BidRejectionReason>,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug)]
pub struct Bids {
    pub items: Vec<Bid>,
}

/// Broadcast to auction room subscribers when a bid is accepted.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct BidAccepted {
    #[schema(example = "b88c4b4b-7a05-4b76-8b82-6a4bfc2c1b30", value_type = String)]
    pub auction_id: AuctionId,
    #[schema(example = "1000.00", value_type = String)]
    pub amount:     Decimal,
    /// Reference to the bidder, for display purposes only.
    #[schema(example = "1f2a3b4c-5d6e-4f70-8192-a3b4c5d6e7f8", value_type = String)]
    pub bidder_ref: UserId,
    #[schema(example = "2026-05-01T12:01:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub placed_at:  OffsetDateTime,
}
