#[cfg(test)]
use mockall::automock;
use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::UserId,
    },
    axum::async_trait,
};

/// Eligibility policy collaborator, consulted as a bid precondition gate.
/// The policy itself lives outside the engine.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EligibilityCheck: Send + Sync + 'static {
    async fn is_eligible(&self, bidder_id: UserId) -> Result<bool, RestError>;
}

/// Stand-in policy that admits every bidder.
#[derive(Debug, Default)]
pub struct AllowAllEligibility;

#[async_trait]
impl EligibilityCheck for AllowAllEligibility {
    async fn is_eligible(&self, _bidder_id: UserId) -> Result<bool, RestError> {
        Ok(true)
    }
}

impl Service {
    /// Local bid preconditions, checked in order with the first failure
    /// winning. The eligibility gate needs a collaborator and is applied
    /// separately by the submit path, after these checks pass.
    pub fn verify_bid(
        auction: &entities::Auction,
        bid_create: &entities::BidCreate,
    ) -> Result<(), entities::BidRejectionReason> {
        if auction.status != entities::AuctionStatus::Open {
            return Err(entities::BidRejectionReason::AuctionNotOpen);
        }
        if !auction.bidding_window_contains(bid_create.initiation_time) {
            return Err(entities::BidRejectionReason::OutsideBidWindow);
        }
        if let Some(highest) = auction.highest_amount() {
            // Ties lose: a bid must strictly exceed the current highest.
            if bid_create.amount <= highest {
                return Err(entities::BidRejectionReason::BidTooLow);
            }
        }
        if bid_create.bidder_id == auction.seller_id {
            return Err(entities::BidRejectionReason::SelfBid);
        }
        Ok(())
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
            },
            service::tests::make_auction,
        },
        rust_decimal_macros::dec,
        time::macros::datetime,
        uuid::Uuid,
    };

    fn make_bid_create(auction: &entities::Auction) -> entities::BidCreate {
        entities::BidCreate {
            auction_id:      auction.id,
            bidder_id:       Uuid::new_v4(),
            amount:          dec!(1000),
            initiation_time: datetime!(2026-05-01 12:01:00 UTC),
        }
    }

    fn open_auction() -> entities::Auction {
        make_auction(
            AuctionStatus::Open,
            datetime!(2026-05-01 12:00:00 UTC),
            datetime!(2026-05-01 12:10:00 UTC),
        )
    }

    #[test]
    fn test_verify_bid_accepts_valid_bid() {
        let auction = open_auction();
        assert_eq!(Service::verify_bid(&auction, &make_bid_create(&auction)), Ok(()));
    }

    #[test]
    fn test_verify_bid_rejects_non_open_auction() {
        for status in [
            AuctionStatus::Scheduled,
            AuctionStatus::Closed,
            AuctionStatus::PendingApproval,
            AuctionStatus::Settled,
            AuctionStatus::Expired,
            AuctionStatus::Cancelled,
        ] {
            let mut auction = open_auction();
            auction.status = status;
            assert_eq!(
                Service::verify_bid(&auction, &make_bid_create(&auction)),
                Err(BidRejectionReason::AuctionNotOpen),
            );
        }
    }

    #[test]
    fn test_verify_bid_rejects_outside_window() {
        let auction = open_auction();
        let mut before = make_bid_create(&auction);
        before.initiation_time = datetime!(2026-05-01 11:59:59 UTC);
        assert_eq!(
            Service::verify_bid(&auction, &before),
            Err(BidRejectionReason::OutsideBidWindow),
        );

        // The window is half open: the end instant itself is already out.
        let mut at_end = make_bid_create(&auction);
        at_end.initiation_time = datetime!(2026-05-01 12:10:00 UTC);
        assert_eq!(
            Service::verify_bid(&auction, &at_end),
            Err(BidRejectionReason::OutsideBidWindow),
        );
    }

    #[test]
    fn test_verify_bid_rejects_equal_and_lower_amounts() {
        let mut auction = open_auction();
        auction.highest = Some(entities::HighestBid {
            bid_id:    Uuid::new_v4(),
            bidder_id: Uuid::new_v4(),
            amount:    dec!(1000),
        });

        let equal = make_bid_create(&auction);
        assert_eq!(
            Service::verify_bid(&auction, &equal),
            Err(BidRejectionReason::BidTooLow),
        );

        let mut lower = make_bid_create(&auction);
        lower.amount = dec!(999.99);
        assert_eq!(
            Service::verify_bid(&auction, &lower),
            Err(BidRejectionReason::BidTooLow),
        );

        let mut higher = make_bid_create(&auction);
        higher.amount = dec!(1000.01);
        assert_eq!(Service::verify_bid(&auction, &higher), Ok(()));
    }

    #[test]
    fn test_verify_bid_rejects_seller_bidding_on_own_auction() {
        let auction = open_auction();
        let mut bid_create = make_bid_create(&auction);
        bid_create.bidder_id = auction.seller_id;
        // Even an otherwise winning amount is rejected for the seller.
        bid_create.amount = dec!(1_000_000);
        assert_eq!(
            Service::verify_bid(&auction, &bid_create),
            Err(BidRejectionReason::SelfBid),
        );
    }
}
