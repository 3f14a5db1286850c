use {
    super::{
        entities,
        service::{
            add_auction::AddAuctionInput,
            cancel_auction::CancelAuctionInput,
            get_auction_by_id::GetAuctionByIdInput,
            get_bids::GetBidsInput,
            record_approval::RecordApprovalInput,
            submit_bid::SubmitBidInput,
        },
    },
    crate::{
        api::{
            Auth,
            RestError,
        },
        kernel::{
            deadline,
            fees,
        },
        state::StoreNew,
    },
    axum::{
        extract::{
            Path,
            State,
        },
        Json,
    },
    drivebid_api_types::{
        auction::{
            ApprovalDecision,
            ApprovalDetails,
            ApprovalRequest,
            Auction,
            AuctionId,
            AuctionStatus,
            CreateAuction,
            TimeRemaining,
        },
        bid::{
            Bid,
            BidCreate,
            BidRejectionReason,
            BidResult,
            BidStatus,
            Bids,
            SubmitBid,
        },
        ErrorBodyResponse,
    },
    rust_decimal::Decimal,
    std::sync::Arc,
    time::OffsetDateTime,
};

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

impl From<deadline::TimeRemaining> for TimeRemaining {
    fn from(remaining: deadline::TimeRemaining) -> Self {
        Self {
            days:       remaining.days,
            hours:      remaining.hours,
            minutes:    remaining.minutes,
            is_overdue: remaining.is_overdue,
        }
    }
}

impl From<fees::FeeDetails> for drivebid_api_types::auction::FeeDetails {
    fn from(details: fees::FeeDetails) -> Self {
        Self {
            offer_fee:      details.offer_fee,
            standard_fee:   details.standard_fee,
            is_offer_valid: details.is_offer_valid,
            offer_rate:     details.offer_rate,
            standard_rate:  details.standard_rate,
            offer_end_date: details.offer_end_date,
        }
    }
}

impl From<ApprovalDecision> for entities::ApprovalDecision {
    fn from(decision: ApprovalDecision) -> Self {
        match decision {
            ApprovalDecision::Approve => Self::Approve,
            ApprovalDecision::Reject => Self::Reject,
        }
    }
}

impl From<entities::SubmitBidOutcome> for BidResult {
    fn from(outcome: entities::SubmitBidOutcome) -> Self {
        match outcome {
            entities::SubmitBidOutcome::Accepted(bid) => BidResult::Accepted {
                id:         bid.id,
                auction_id: bid.auction_id,
                amount:     bid.amount,
                placed_at:  bid.placed_at,
            },
            entities::SubmitBidOutcome::Rejected {
                reason,
                current_highest_bid,
            } => BidResult::Rejected {
                reason: reason.into(),
                current_highest_bid,
            },
        }
    }
}

impl From<entities::Bid> for Bid {
    fn from(bid: entities::Bid) -> Self {
        let (status, rejection_reason) = match bid.status {
            entities::BidStatus::Accepted => (BidStatus::Accepted, None),
            entities::BidStatus::Rejected(reason) => (BidStatus::Rejected, Some(reason.into())),
        };
        Self {
            id: bid.id,
            auction_id: bid.auction_id,
            bidder_id: bid.bidder_id,
            amount: bid.amount,
            placed_at: bid.placed_at,
            status,
            rejection_reason,
        }
    }
}

/// While an auction awaits seller approval, the response carries the
/// deadline countdown and the fee transparency payload.
fn to_auction_response(
    auction: &entities::Auction,
    fee_schedule: &fees::FeeSchedule,
    now: OffsetDateTime,
) -> Auction {
    let approval = match (auction.status, auction.approval_deadline, &auction.highest) {
        (entities::AuctionStatus::PendingApproval, Some(approval_deadline), Some(highest)) => {
            Some(ApprovalDetails {
                deadline:       approval_deadline,
                time_remaining: deadline::time_remaining(approval_deadline, now).into(),
                fee_details:    fee_schedule.fee_details(highest.amount, now).into(),
            })
        }
        _ => None,
    };
    Auction {
        id: auction.id,
        vehicle_id: auction.vehicle_id,
        seller_id: auction.seller_id,
        start_time: auction.start_time,
        end_time: auction.end_time,
        status: auction.status.into(),
        highest_bid: auction.highest_amount(),
        highest_bidder_id: auction.highest.as_ref().map(|highest| highest.bidder_id),
        winner_id: auction.winner_id,
        fee: auction.settlement.as_ref().map(|settlement| settlement.fee),
        approval,
    }
}

/// Register a scheduled auction for an approved vehicle listing.
#[utoipa::path(post, path = "/v1/auctions", request_body = CreateAuction, responses(
    (status = 200, description = "Auction was created successfully", body = Auction),
    (status = 400, response = ErrorBodyResponse),
),)]
pub async fn post_auction(
    auth: Auth,
    State(store): State<Arc<StoreNew>>,
    Json(params): Json<CreateAuction>,
) -> Result<Json<Auction>, RestError> {
    auth.require_admin()?;
    let auction = store
        .auction_service
        .add_auction(AddAuctionInput {
            vehicle_id: params.vehicle_id,
            seller_id:  params.seller_id,
            start_time: params.start_time,
            end_time:   params.end_time,
        })
        .await?;
    Ok(Json(to_auction_response(
        &auction,
        store.auction_service.fee_schedule(),
        OffsetDateTime::now_utc(),
    )))
}

/// List all auctions that have not yet reached a terminal state.
#[utoipa::path(get, path = "/v1/auctions", responses(
    (status = 200, description = "Active auctions", body = Vec<Auction>),
),)]
pub async fn get_auctions(State(store): State<Arc<StoreNew>>) -> Json<Vec<Auction>> {
    let now = OffsetDateTime::now_utc();
    let fee_schedule = store.auction_service.fee_schedule();
    Json(
        store
            .auction_service
            .get_auctions()
            .await
            .iter()
            .map(|auction| to_auction_response(auction, fee_schedule, now))
            .collect(),
    )
}

/// Query one auction, terminal ones included.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}",
    params(("auction_id" = String, description = "Auction id to query for")),
    responses(
    (status = 200, description = "The auction", body = Auction),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn get_auction(
    State(store): State<Arc<StoreNew>>,
    Path(auction_id): Path<AuctionId>,
) -> Result<Json<Auction>, RestError> {
    let auction = store
        .auction_service
        .get_auction_by_id(GetAuctionByIdInput { auction_id })
        .await?;
    Ok(Json(to_auction_response(
        &auction,
        store.auction_service.fee_schedule(),
        OffsetDateTime::now_utc(),
    )))
}

/// Bid on an open auction.
///
/// The outcome is returned synchronously: either the accepted bid or a
/// machine-readable rejection carrying the highest bid to beat.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/bids",
    params(("auction_id" = String, description = "Auction id to bid on")),
    request_body = SubmitBid,
    responses(
    (status = 200, description = "Outcome of the submission", body = BidResult),
    (status = 400, response = ErrorBodyResponse),
    (status = 401, description = "No bidder credential", body = ErrorBodyResponse),
),)]
pub async fn post_bid(
    auth: Auth,
    State(store): State<Arc<StoreNew>>,
    Path(auction_id): Path<AuctionId>,
    Json(params): Json<SubmitBid>,
) -> Result<Json<BidResult>, RestError> {
    let bid_result = process_bid(
        auth,
        store,
        BidCreate {
            auction_id,
            amount: params.amount,
        },
    )
    .await?;
    Ok(Json(bid_result))
}

/// Shared by the REST route and the websocket `post_bid` message.
pub async fn process_bid(
    auth: Auth,
    store: Arc<StoreNew>,
    bid: BidCreate,
) -> Result<BidResult, RestError> {
    let bidder_id = auth.require_user()?;
    if bid.amount <= Decimal::ZERO {
        return Err(RestError::BadParameters(
            "Bid amount must be positive".to_string(),
        ));
    }
    let outcome = store
        .auction_service
        .submit_bid(SubmitBidInput {
            bid_create: entities::BidCreate {
                auction_id: bid.auction_id,
                bidder_id,
                amount: bid.amount,
                initiation_time: OffsetDateTime::now_utc(),
            },
        })
        .await?;
    Ok(outcome.into())
}

/// Full audit trail of an auction's bids, rejected ones included.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}/bids",
    params(("auction_id" = String, description = "Auction id to query for")),
    responses(
    (status = 200, description = "All recorded bids", body = Bids),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn get_auction_bids(
    auth: Auth,
    State(store): State<Arc<StoreNew>>,
    Path(auction_id): Path<AuctionId>,
) -> Result<Json<Bids>, RestError> {
    auth.require_admin()?;
    let bids = store
        .auction_service
        .get_bids(GetBidsInput { auction_id })
        .await?;
    Ok(Json(Bids {
        items: bids.into_iter().map(|bid| bid.into()).collect(),
    }))
}

/// Record the seller's decision on a pending sale.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/approval",
    params(("auction_id" = String, description = "Auction id to decide on")),
    request_body = ApprovalRequest,
    responses(
    (status = 200, description = "The auction after the decision", body = Auction),
    (status = 400, response = ErrorBodyResponse),
    (status = 403, description = "Only the seller may decide", body = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn post_approval(
    auth: Auth,
    State(store): State<Arc<StoreNew>>,
    Path(auction_id): Path<AuctionId>,
    Json(params): Json<ApprovalRequest>,
) -> Result<Json<Auction>, RestError> {
    let approver_id = auth.require_user()?;
    let auction = store
        .auction_service
        .record_approval(RecordApprovalInput {
            auction_id,
            approver_id,
            decision: params.decision.into(),
            decision_time: OffsetDateTime::now_utc(),
        })
        .await?;
    Ok(Json(to_auction_response(
        &auction,
        store.auction_service.fee_schedule(),
        OffsetDateTime::now_utc(),
    )))
}

/// Cancel a scheduled or open auction.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/cancel",
    params(("auction_id" = String, description = "Auction id to cancel")),
    responses(
    (status = 200, description = "The cancelled auction", body = Auction),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn post_cancel(
    auth: Auth,
    State(store): State<Arc<StoreNew>>,
    Path(auction_id): Path<AuctionId>,
) -> Result<Json<Auction>, RestError> {
    auth.require_admin()?;
    let auction = store
        .auction_service
        .cancel_auction(CancelAuctionInput { auction_id })
        .await?;
    Ok(Json(to_auction_response(
        &auction,
        store.auction_service.fee_schedule(),
        OffsetDateTime::now_utc(),
    )))
}
