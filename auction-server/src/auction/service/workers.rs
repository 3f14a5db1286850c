use {
    super::{
        evaluate_lifecycle::EvaluateLifecycleInput,
        Service,
    },
    crate::server::{
        EXIT_CHECK_INTERVAL,
        SHOULD_EXIT,
    },
    std::sync::atomic::Ordering,
    time::OffsetDateTime,
};

impl Service {
    /// One global periodic tick that re-evaluates every non-terminal
    /// auction. Each auction is evaluated in its own task under its own
    /// lock, so one slow or failing auction never holds up the rest of the
    /// tick; a failed evaluation is logged and retried on the next tick.
    pub async fn run_lifecycle_loop(&self) -> anyhow::Result<()> {
        tracing::info!("Starting lifecycle scheduler...");
        let mut tick = tokio::time::interval(self.config.lifecycle_tick_interval);
        let mut exit_check_interval = tokio::time::interval(EXIT_CHECK_INTERVAL);

        while !SHOULD_EXIT.load(Ordering::Acquire) {
            tokio::select! {
                _ = tick.tick() => {
                    let now = OffsetDateTime::now_utc();
                    for auction in self.repo.get_in_memory_auctions().await {
                        if auction.status.is_terminal() {
                            continue;
                        }
                        self.task_tracker.spawn({
                            let service = self.clone();
                            async move {
                                if let Err(e) = service
                                    .evaluate_lifecycle(EvaluateLifecycleInput {
                                        auction_id: auction.id,
                                        now,
                                    })
                                    .await
                                {
                                    tracing::error!(
                                        error = e.to_string(),
                                        auction_id = auction.id.to_string(),
                                        "Failed to evaluate auction lifecycle"
                                    );
                                }
                            }
                        });
                    }
                }
                _ = exit_check_interval.tick() => {}
            }
        }
        tracing::info!("Shutting down lifecycle scheduler...");
        Ok(())
    }
}
