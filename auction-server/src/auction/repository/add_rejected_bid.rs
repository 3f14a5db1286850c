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
    /// Rejected bids are kept for the audit trail only; they never touch the
    /// projection.
    pub async fn add_rejected_bid(&self, bid: &entities::Bid) -> Result<(), RestError> {
        self.db.add_bid(&Bid::new(bid)).await
    }
}
