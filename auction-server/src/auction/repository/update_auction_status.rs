use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    /// Applies a lifecycle transition. The database update is guarded on the
    /// expected prior status, which makes re-applying an already-applied
    /// transition a no-op; the projection is only refreshed when the guarded
    /// update actually took effect. Returns whether it did.
    pub async fn update_auction_status(
        &self,
        auction: &entities::Auction,
        from: entities::AuctionStatus,
    ) -> anyhow::Result<bool> {
        let is_updated = self.db.update_auction_status(auction, from).await?;
        if is_updated {
            self.in_memory_store
                .auctions
                .write()
                .await
                .insert(auction.id, auction.clone());
        }
        Ok(is_updated)
    }
}
