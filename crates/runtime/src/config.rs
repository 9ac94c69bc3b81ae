use battle_core::BattleConfig;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Rule constants handed to the core engine.
    pub battle_config: BattleConfig,
    /// Scheduler cadence in Hz (20–60 recommended).
    pub tick_hz: u32,
    /// Gauge ticks advanced per scheduler fire.
    pub ticks_per_advance: u32,
    /// Symmetric gauge multiplier applied while a human deliberates.
    ///
    /// Slows *all* gauges, both sides; difficulty settings tune it.
    pub deliberation_throttle: f64,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle_config: BattleConfig::default(),
            tick_hz: 30,
            ticks_per_advance: 1,
            deliberation_throttle: 0.5,
            event_buffer_size: 256,
            command_buffer_size: 32,
        }
    }
}
