use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    pub async fn get_bids(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<Vec<entities::Bid>, RestError> {
        self.db
            .get_bids(auction_id)
            .await?
            .iter()
            .map(|model| {
                model.get_bid_entity().map_err(|e| {
                    tracing::error!(
                        error = e.to_string(),
                        bid_id = model.id.to_string(),
                        "Failed to convert bid row to entity"
                    );
                    RestError::TemporarilyUnavailable
                })
            })
            .collect()
    }
}
