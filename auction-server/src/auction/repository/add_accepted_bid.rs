use {
    super::{
        Bid,
        Repository,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    /// Persists the accepted bid together with the auction's new highest-bid
    /// columns in one transaction, then refreshes the projection. The
    /// projection is only touched after the database write succeeds, so a
    /// storage failure leaves no partial state behind.
    pub async fn add_accepted_bid(
        &self,
        bid: &entities::Bid,
        auction: &entities::Auction,
    ) -> Result<(), RestError> {
        self.db.add_accepted_bid(&Bid::new(bid), auction).await?;
        self.in_memory_store
            .auctions
            .write()
            .await
            .insert(auction.id, auction.clone());
        Ok(())
    }
}
