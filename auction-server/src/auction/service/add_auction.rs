use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::{
            UserId,
            VehicleId,
        },
    },
    time::OffsetDateTime,
};

pub struct AddAuctionInput {
    pub vehicle_id: VehicleId,
    pub seller_id:  UserId,
    pub start_time: OffsetDateTime,
    pub end_time:   OffsetDateTime,
}

impl Service {
    /// Registers a scheduled auction for an approved vehicle listing.
    #[tracing::instrument(skip_all, fields(auction_id))]
    pub async fn add_auction(
        &self,
        input: AddAuctionInput,
    ) -> Result<entities::Auction, RestError> {
        if input.end_time <= input.start_time {
            return Err(RestError::BadParameters(
                "Auction must end after it starts".to_string(),
            ));
        }
        let auction = entities::Auction::new(
            input.vehicle_id,
            input.seller_id,
            input.start_time,
            input.end_time,
            OffsetDateTime::now_utc(),
        );
        tracing::Span::current().record("auction_id", auction.id.to_string());
        self.repo.add_auction(auction).await
    }
}
