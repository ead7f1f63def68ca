//! Selects a [`TransitionStrategy`] by configured name and runs it.

use std::sync::Arc;

use tracing::warn;

use crate::autopilot::AutopilotCommandSurface;
use crate::config::{Config, StrategyName};
use crate::strategy::tailsitter::TailsitterPitchProgram;
use crate::strategy::{TransitionOutcome, TransitionStrategy};
use crate::telemetry::TelemetryCache;

/// Builds and runs the configured transition strategy.
pub struct TransitionManager {
    strategy: Box<dyn TransitionStrategy>,
}

impl TransitionManager {
    /// Resolve `config.strategy` to a [`StrategyName`], falling back to the
    /// default with a logged warning if the name is unrecognized, then build
    /// the manager.
    pub fn new(
        config: Config,
        autopilot: Arc<dyn AutopilotCommandSurface>,
        telemetry: Arc<TelemetryCache>,
    ) -> Self {
        let name: StrategyName = config.strategy.parse().unwrap_or_else(|()| {
            warn!(
                configured = %config.strategy,
                "unknown strategy name, falling back to tailsitter_pitch_program"
            );
            StrategyName::default()
        });

        let strategy = Self::build_strategy(name, config, autopilot, telemetry);
        Self { strategy }
    }

    fn build_strategy(
        name: StrategyName,
        config: Config,
        autopilot: Arc<dyn AutopilotCommandSurface>,
        telemetry: Arc<TelemetryCache>,
    ) -> Box<dyn TransitionStrategy> {
        match name {
            StrategyName::TailsitterPitchProgram => {
                Box::new(TailsitterPitchProgram::new(config, autopilot, telemetry))
            }
        }
    }

    /// Run the configured strategy to completion.
    pub async fn execute(&self) -> TransitionOutcome {
        self.strategy.execute().await
    }

    /// Request an out-of-band abort of whatever the strategy is doing.
    pub async fn abort(&self) {
        self.strategy.abort().await
    }
}
