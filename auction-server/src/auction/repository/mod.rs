use {
    super::entities,
    std::{
        collections::HashMap,
        sync::Arc,
    },
    tokio::sync::{
        Mutex,
        RwLock,
    },
};

mod add_accepted_bid;
mod add_auction;
mod add_rejected_bid;
mod get_auction;
mod get_bids;
mod get_in_memory_auction_by_id;
mod get_in_memory_auctions;
mod get_or_create_auction_lock;
mod load_auctions_upon_restart;
mod models;
mod remove_auction_lock;
mod remove_in_memory_auction;
mod update_auction_status;

pub use models::*;

/// Projection over the persisted auction and bid history. Holds every
/// non-terminal auction plus the per-auction serialization units.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub auctions:     RwLock<HashMap<entities::AuctionId, entities::Auction>>,
    pub auction_lock: Mutex<HashMap<entities::AuctionId, entities::AuctionLock>>,
}

#[derive(Debug)]
pub struct Repository {
    pub in_memory_store: InMemoryStore,
    db:                  Arc<dyn Database>,
}

impl Repository {
    pub fn new(db: impl Database) -> Self {
        Self {
            in_memory_store: InMemoryStore::default(),
            db:              Arc::new(db),
        }
    }
}
