use {
    super::Service,
    crate::auction::entities,
};

impl Service {
    /// All auctions that have not yet reached a terminal state.
    pub async fn get_auctions(&self) -> Vec<entities::Auction> {
        let mut auctions = self.repo.get_in_memory_auctions().await;
        auctions.sort_by_key(|auction| auction.start_time);
        auctions
    }
}
