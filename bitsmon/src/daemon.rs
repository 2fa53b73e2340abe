use rpc_client::RpcClient;
use rpc_core::ChainReader;
use tally::{AdvanceOutcome, RetargetSchedule, TallyConfig, TallyEngine, TallyError, TallyReport};
use tokio::signal;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use crate::config::Config;
use crate::error::Result;
use crate::ui;

/// Result of one poll of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tip unchanged.
    Idle,
    /// First window scan completed at `height`.
    Initialized { height: u64 },
    Advanced(AdvanceOutcome),
    /// The node's tip went backwards; the window was scanned again at `to`.
    Rescanned { from: u64, to: u64 },
}

pub struct Daemon<R> {
    config: Config,
    reader: R,
    tally_config: TallyConfig,
    schedule: RetargetSchedule,
    engine: Option<TallyEngine>,
    show_progress: bool,
}

impl Daemon<RpcClient> {
    /// Daemon talking to the node described by `config.rpc`.
    pub fn new(config: Config) -> Result<Self> {
        let client = RpcClient::new(&config.rpc_url(), config.credentials(), config.rpc_timeout())?;
        Ok(Self::with_reader(config, client)?.with_progress(true))
    }
}

impl<R: ChainReader> Daemon<R> {
    pub fn with_reader(config: Config, reader: R) -> Result<Self> {
        config.validate()?;
        let tally_config = config.tally_config();
        let schedule = config.retarget_schedule()?;

        Ok(Self {
            config,
            reader,
            tally_config,
            schedule,
            engine: None,
            show_progress: false,
        })
    }

    /// Draw a progress bar while scanning a full window.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn current_height(&self) -> Option<u64> {
        self.engine.as_ref().map(|engine| engine.current_height())
    }

    pub fn report(&self) -> Option<TallyReport> {
        self.engine
            .as_ref()
            .map(|engine| TallyReport::from_snapshot(&engine.snapshot(), self.schedule))
    }

    /// Initial window scan, retried up to `monitor.init_attempts` times.
    pub async fn bootstrap(&mut self) -> Result<u64> {
        let attempts = self.config.monitor.init_attempts;
        let mut attempt = 1;

        loop {
            match self.scan_tip().await {
                Ok(engine) => {
                    let height = engine.current_height();
                    self.engine = Some(engine);
                    return Ok(height);
                }
                Err(e) if attempt < attempts => {
                    warn!("Initial scan attempt {}/{} failed: {}", attempt, attempts, e);
                    sleep(self.config.retry_delay()).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Initial scan failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }

    /// Poll the tip once and bring the tally up to it.
    ///
    /// On error the tally is left as it was, so the next tick retries the same target.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let Some(engine) = self.engine.as_mut() else {
            let height = self.bootstrap().await?;
            return Ok(TickOutcome::Initialized { height });
        };

        let new_height = self.reader.current_height().await?;
        match engine.advance(&self.reader, new_height).await {
            Ok(AdvanceOutcome::Unchanged) => Ok(TickOutcome::Idle),
            Ok(outcome) => Ok(TickOutcome::Advanced(outcome)),
            Err(TallyError::HeightRegression { current, requested }) => {
                error!(
                    "Node tip went back from {} to {}, rescanning the window at {}",
                    current, requested, requested
                );
                let engine = TallyEngine::initialize(&self.reader, requested, self.tally_config).await?;
                self.engine = Some(engine);
                Ok(TickOutcome::Rescanned {
                    from: current,
                    to: requested,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Scan, print a single report and return it.
    pub async fn run_once(mut self) -> Result<Option<TallyReport>> {
        self.bootstrap().await?;
        self.print_report();
        Ok(self.report())
    }

    /// Poll until Ctrl+C.
    pub async fn run(mut self) -> Result<()> {
        ui::print_section("Scanning Window");
        let height = self.bootstrap().await?;
        info!("Window ready at height {}", height);
        self.print_report();

        ui::print_status("ℹ", "Watching for new blocks, press Ctrl+C to stop", ui::StatusType::Info);

        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    ui::print_status("ℹ", "Received Ctrl+C, shutting down...", ui::StatusType::Warning);
                    info!("Received Ctrl+C, shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.tick().await {
                        Ok(TickOutcome::Idle) => {}
                        Ok(outcome) => {
                            debug!("Tick outcome: {:?}", outcome);
                            self.print_report();
                        }
                        Err(e) => {
                            warn!("Poll failed, tally stays at height {:?}: {}", self.current_height(), e);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn scan_tip(&self) -> Result<TallyEngine> {
        let height = self.reader.current_height().await?;
        info!("Current block height: {}", height);
        info!("Next block retarget {}", self.schedule.next_after(height));

        if !self.show_progress {
            return Ok(TallyEngine::initialize(&self.reader, height, self.tally_config).await?);
        }

        let mut bar = ui::ProgressBar::new("Scanning".to_string(), self.tally_config.window_size as usize);
        let result = TallyEngine::initialize_with_progress(&self.reader, height, self.tally_config, |done| {
            bar.update(done as usize)
        })
        .await;
        bar.finish();
        Ok(result?)
    }

    fn print_report(&self) {
        if let Some(report) = self.report() {
            info!(
                "Window {} to {}: {} versions, next retarget {}",
                report.window_start,
                report.tip_height,
                report.versions.len(),
                report.next_retarget
            );
            print!("{}", ui::ReportView(&report));
        }
    }
}
