use {
    super::repository::{
        self,
        Database,
        Repository,
    },
    crate::{
        api::ws::UpdateEvent,
        auction::entities,
        kernel::fees::FeeSchedule,
    },
    drivebid_api_types::auction::AuctionStatusUpdate,
    std::{
        sync::Arc,
        time::Duration,
    },
    tokio::sync::broadcast,
    tokio_util::task::TaskTracker,
};

pub mod add_auction;
pub mod auction_events;
pub mod cancel_auction;
pub mod evaluate_lifecycle;
pub mod get_auction_by_id;
pub mod get_auctions;
pub mod get_bids;
pub mod record_approval;
pub mod submit_bid;
pub mod verification;
pub mod workers;

pub struct Config {
    pub approval_window:         Duration,
    pub lifecycle_tick_interval: Duration,
    pub fee_schedule:            FeeSchedule,
}

pub struct ServiceInner {
    config:       Config,
    repo:         Arc<Repository>,
    eligibility:  Arc<dyn verification::EligibilityCheck>,
    task_tracker: TaskTracker,
    event_sender: broadcast::Sender<UpdateEvent>,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(
        db: impl Database,
        config: Config,
        eligibility: Arc<dyn verification::EligibilityCheck>,
        task_tracker: TaskTracker,
        event_sender: broadcast::Sender<UpdateEvent>,
    ) -> Self {
        Self(Arc::new(ServiceInner {
            config,
            repo: Arc::new(repository::Repository::new(db)),
            eligibility,
            task_tracker,
            event_sender,
        }))
    }

    pub async fn load_auctions_upon_restart(&self) -> anyhow::Result<()> {
        self.repo.load_auctions_upon_restart().await
    }

    pub fn fee_schedule(&self) -> &FeeSchedule {
        &self.config.fee_schedule
    }

    /// Fan-out is fire and forget: a send only fails when nobody is
    /// listening, which is not an error for the producer.
    fn emit(&self, event: UpdateEvent) {
        if self.event_sender.send(event).is_err() {
            tracing::debug!("No active subscribers for update event");
        }
    }

    fn emit_status_update(&self, auction: &entities::Auction) {
        self.emit(UpdateEvent::AuctionStatusUpdate(AuctionStatusUpdate {
            id:                auction.id,
            status:            auction.status.into(),
            winner_id:         auction.winner_id,
            approval_deadline: auction.approval_deadline,
            fee:               auction.settlement.as_ref().map(|s| s.fee),
        }));
    }
}

#[cfg(test)]
pub mod tests {
    use {
        super::*,
        crate::{
            auction::repository::MockDatabase,
            kernel::{
                deadline::DEFAULT_APPROVAL_WINDOW,
                entities::UserId,
            },
        },
        super::verification::MockEligibilityCheck,
        time::OffsetDateTime,
        uuid::Uuid,
    };

    impl Service {
        pub fn new_with_mocks(db: MockDatabase) -> Self {
            let mut eligibility = MockEligibilityCheck::new();
            eligibility.expect_is_eligible().returning(|_| Ok(true));
            Self::new_with_mocks_and_eligibility(db, eligibility)
        }

        pub fn new_with_mocks_and_eligibility(
            db: MockDatabase,
            eligibility: MockEligibilityCheck,
        ) -> Self {
            Self(Arc::new(ServiceInner {
                config:       Config {
                    approval_window:         DEFAULT_APPROVAL_WINDOW,
                    lifecycle_tick_interval: Duration::from_secs(1),
                    fee_schedule:            FeeSchedule::default(),
                },
                repo:         Arc::new(Repository::new(db)),
                eligibility:  Arc::new(eligibility),
                task_tracker: TaskTracker::new(),
                event_sender: broadcast::channel(100).0,
            }))
        }

        /// Places an auction directly into the projection, bypassing the
        /// database.
        pub async fn seed_auction(&self, auction: entities::Auction) {
            self.repo
                .in_memory_store
                .auctions
                .write()
                .await
                .insert(auction.id, auction);
        }

        pub fn subscribe_events(&self) -> broadcast::Receiver<UpdateEvent> {
            self.event_sender.subscribe()
        }
    }

    pub fn make_auction(
        status: entities::AuctionStatus,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> entities::Auction {
        entities::Auction {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            seller_id: UserId::new_v4(),
            creation_time: start_time,
            start_time,
            end_time,
            status,
            highest: None,
            winner_id: None,
            approval_deadline: None,
            settlement: None,
        }
    }
}
