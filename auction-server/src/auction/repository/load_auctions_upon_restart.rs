use {
    super::Repository,
    crate::auction::entities,
    std::collections::HashMap,
};

impl Repository {
    /// Rebuilds the projection from persistent storage. The bid history is
    /// the source of truth: the highest bid is re-derived from the accepted
    /// bids rather than trusted from the auction row.
    pub async fn load_auctions_upon_restart(&self) -> anyhow::Result<()> {
        let rows = self.db.get_active_auctions().await?;
        let mut auctions = HashMap::with_capacity(rows.len());
        for row in rows {
            let mut auction = row.get_auction_entity()?;
            auction.highest = self.rederive_highest_bid(auction.id).await?;
            auctions.insert(auction.id, auction);
        }
        let count = auctions.len();
        *self.in_memory_store.auctions.write().await = auctions;
        tracing::info!(auctions = count, "Loaded active auctions from the database");
        Ok(())
    }

    async fn rederive_highest_bid(
        &self,
        auction_id: entities::AuctionId,
    ) -> anyhow::Result<Option<entities::HighestBid>> {
        let mut highest: Option<entities::HighestBid> = None;
        for model in self.db.get_accepted_bids(auction_id).await? {
            let bid = model.get_bid_entity()?;
            if highest
                .as_ref()
                .map_or(true, |highest| bid.amount > highest.amount)
            {
                highest = Some(entities::HighestBid {
                    bid_id:    bid.id,
                    bidder_id: bid.bidder_id,
                    amount:    bid.amount,
                });
            }
        }
        Ok(highest)
    }
}
