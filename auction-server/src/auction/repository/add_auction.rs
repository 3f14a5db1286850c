use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    pub async fn add_auction(
        &self,
        auction: entities::Auction,
    ) -> Result<entities::Auction, RestError> {
        self.db.add_auction(&auction).await?;
        self.in_memory_store
            .auctions
            .write()
            .await
            .insert(auction.id, auction.clone());
        Ok(auction)
    }
}
