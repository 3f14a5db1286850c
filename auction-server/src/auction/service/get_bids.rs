use {
    super::{
        get_auction_by_id::GetAuctionByIdInput,
        Service,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

pub struct GetBidsInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// Full audit trail of an auction's bids, rejected ones included.
    pub async fn get_bids(&self, input: GetBidsInput) -> Result<Vec<entities::Bid>, RestError> {
        self.get_auction_by_id(GetAuctionByIdInput {
            auction_id: input.auction_id,
        })
        .await?;
        self.repo.get_bids(input.auction_id).await
    }
}
