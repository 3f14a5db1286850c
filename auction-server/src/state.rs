use {
    crate::{
        api::ws::WsState,
        auction::service::Service as AuctionService,
    },
    std::sync::Arc,
    tokio_util::task::TaskTracker,
};

pub struct Store {
    pub ws:          WsState,
    pub admin_token: Option<String>,
}

pub struct StoreNew {
    pub store:           Arc<Store>,
    pub auction_service: AuctionService,
    pub task_tracker:    TaskTracker,
}
