use {
    crate::{
        api,
        auction::service::{
            self,
            verification::AllowAllEligibility,
        },
        config::{
            Config,
            RunOptions,
        },
        kernel::fees::FeeSchedule,
        state::{
            Store,
            StoreNew,
        },
    },
    anyhow::anyhow,
    futures::future::join_all,
    sqlx::postgres::PgPoolOptions,
    std::{
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        tokio::signal::ctrl_c().await.unwrap();
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&run_options.server.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(Store {
        ws:          api::ws::WsState::new(config.auction.broadcast_channel_size),
        admin_token: run_options.admin_token.clone(),
    });

    let task_tracker = TaskTracker::new();
    let auction_service = service::Service::new(
        pool,
        service::Config {
            approval_window:         config.auction.approval_window,
            lifecycle_tick_interval: config.auction.lifecycle_tick_interval,
            fee_schedule:            FeeSchedule::default(),
        },
        Arc::new(AllowAllEligibility),
        task_tracker.clone(),
        store.ws.broadcast_sender.clone(),
    );
    auction_service.load_auctions_upon_restart().await?;

    let store_new = Arc::new(StoreNew {
        store,
        auction_service: auction_service.clone(),
        task_tracker,
    });

    let lifecycle_loop = tokio::spawn({
        let service = auction_service.clone();
        async move { service.run_lifecycle_loop().await }
    });
    let server_loop = tokio::spawn(api::start_api(run_options, store_new));
    join_all(vec![lifecycle_loop, server_loop]).await;
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting
// down. Tasks poll it on EXIT_CHECK_INTERVAL and wind down gracefully.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
