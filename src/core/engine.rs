use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 驅動 extract → transform → load 三階段的引擎
pub struct CardEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> CardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, enable_monitoring: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(enable_monitoring),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting card export process...");
        self.monitor.log_stats("Startup");

        tracing::info!("📥 Fetching deal listing...");
        let deals = self.pipeline.extract().await?;
        tracing::info!("📥 Fetched {} deals", deals.len());
        self.monitor.log_stats("Extract");

        tracing::info!("🎨 Composing cards...");
        let composed = self.pipeline.transform(deals).await?;
        tracing::info!("🎨 Composed {} cards", composed.cards.len());
        self.monitor.log_stats("Transform");

        tracing::info!("🖼️ Exporting PNGs...");
        let output_path = self.pipeline.load(composed).await?;
        tracing::info!("🖼️ Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
