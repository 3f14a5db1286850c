use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    /// Reclaims the serialization unit once an auction reaches a terminal
    /// state. In-flight holders keep their clone of the `Arc` alive until
    /// they drop it.
    pub async fn remove_auction_lock(&self, auction_id: &entities::AuctionId) {
        self.in_memory_store
            .auction_lock
            .lock()
            .await
            .remove(auction_id);
    }
}
