use {
    crate::{
        UserId,
        VehicleId,
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

pub type AuctionId = Uuid;

/// Lifecycle state of an auction.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuctionStatus {
    Scheduled,
    Open,
    Closed,
    PendingApproval,
    Settled,
    Expired,
    Cancelled,
}

/// Whole-unit breakdown of the time left until a deadline.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRemaining {
    #[schema(example = 6)]
    pub days:       u64,
    #[schema(example = 23)]
    pub hours:      u8,
    #[schema(example = 59)]
    pub minutes:    u8,
    pub is_overdue: bool,
}

/// Settlement fee transparency payload. Both rates are always computed so
/// clients can show what the fee would be on either side of the offer cutover.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct FeeDetails {
    #[schema(example = "25.00", value_type = String)]
    pub offer_fee:      Decimal,
    #[schema(example = "40.00", value_type = String)]
    pub standard_fee:   Decimal,
    pub is_offer_valid: bool,
    #[schema(example = "0.025", value_type = String)]
    pub offer_rate:     Decimal,
    #[schema(example = "0.04", value_type = String)]
    pub standard_rate:  Decimal,
    #[schema(example = "2026-03-31T23:59:59Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub offer_end_date: OffsetDateTime,
}

/// Seller-approval details exposed while an auction is pending approval.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct ApprovalDetails {
    #[schema(example = "2026-05-08T12:00:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub deadline:       OffsetDateTime,
    pub time_remaining: TimeRemaining,
    pub fee_details:    FeeDetails,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug)]
pub struct Auction {
    /// The unique id of the auction.
    #[schema(example = "b88c4b4b-7a05-4b76-8b82-6a4bfc2c1b30", value_type = String)]
    pub id:                AuctionId,
    /// The vehicle being sold.
    #[schema(example = "6d1e5c53-6c69-4f43-9f3b-0d3a0f8b3c1d", value_type = String)]
    pub vehicle_id:        VehicleId,
    /// The seller who owns the vehicle.
    #[schema(example = "1f2a3b4c-5d6e-4f70-8192-a3b4c5d6e7f8", value_type = String)]
    pub seller_id:         UserId,
    #[schema(example = "2026-05-01T12:00:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub start_time:        OffsetDateTime,
    #[schema(example = "2026-05-01T12:10:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:          OffsetDateTime,
    pub status:            AuctionStatus,
    /// The current highest accepted bid amount, if any bid was accepted.
    #[schema(example = "1000.00", value_type = Option<String>)]
    pub highest_bid:       Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub highest_bidder_id: Option<UserId>,
    /// Set when the auction entered pending approval.
    #[schema(value_type = Option<String>)]
    pub winner_id:         Option<UserId>,
    /// Settlement fee, set once the sale settled.
    #[schema(example = "25.00", value_type = Option<String>)]
    pub fee:               Option<Decimal>,
    /// Present only while the auction is pending seller approval.
    pub approval:          Option<ApprovalDetails>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct CreateAuction {
    #[schema(example = "6d1e5c53-6c69-4f43-9f3b-0d3a0f8b3c1d", value_type = String)]
    pub vehicle_id: VehicleId,
    #[schema(example = "1f2a3b4c-5d6e-4f70-8192-a3b4c5d6e7f8", value_type = String)]
    pub seller_id:  UserId,
    #[schema(example = "2026-05-01T12:00:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[schema(example = "2026-05-01T12:10:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:   OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct ApprovalRequest {
    pub decision: ApprovalDecision,
}

/// Broadcast to auction room subscribers on every applied lifecycle
/// transition.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct AuctionStatusUpdate {
    #[schema(example = "b88c4b4b-7a05-4b76-8b82-6a4bfc2c1b30", value_type = String)]
    pub id:                AuctionId,
    pub status:            AuctionStatus,
    #[schema(value_type = Option<String>)]
    pub winner_id:         Option<UserId>,
    #[schema(value_type = Option<String>)]
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub approval_deadline: Option<OffsetDateTime>,
    #[schema(example = "25.00", value_type = Option<String>)]
    pub fee:               Option<Decimal>,
}
