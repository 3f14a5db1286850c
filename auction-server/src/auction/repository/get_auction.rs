use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    /// Looks the auction up in the projection first and falls back to the
    /// database for auctions that already reached a terminal state.
    pub async fn get_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<Option<entities::Auction>, RestError> {
        if let Some(auction) = self.get_in_memory_auction_by_id(auction_id).await {
            return Ok(Some(auction));
        }
        match self.db.get_auction(auction_id).await? {
            Some(model) => model.get_auction_entity().map(Some).map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    auction_id = auction_id.to_string(),
                    "Failed to convert auction row to entity"
                );
                RestError::TemporarilyUnavailable
            }),
            None => Ok(None),
        }
    }
}
