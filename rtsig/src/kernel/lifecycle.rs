use super::ConfigError;

/// Whether a streaming filter persists its delay line across `apply` calls.
///
/// The two modes run the same difference equation; only the propagation of
/// state differs. Real-time mode makes arbitrarily chopped packets of one
/// input concatenate to the post-processing block result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Each `apply` is an independent block run starting from the stamped
    /// initial conditions.
    #[default]
    PostProcessing,
    /// Delay-line state carries over from packet to packet.
    RealTime,
}

/// Constructor validation lifecycle shared by one-shot kernel structs.
///
/// Design kernels (window generation, FIR/IIR design) validate their whole
/// configuration up front and are immutable afterwards.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

/// Two-phase lifecycle shared by streaming filters and transform plans.
///
/// A streaming kernel is created uninitialized; `initialize` validates the
/// config, captures coefficients by value, and allocates delay-line state;
/// `clear` releases everything and returns to the uninitialized state. A
/// failed `initialize` must leave the kernel cleared, never half-built.
pub trait StreamLifecycle {
    /// Streaming config type.
    type Config;

    /// Validate `config` and allocate state. On error no state is retained.
    fn initialize(&mut self, config: Self::Config) -> Result<(), ConfigError>;

    /// Whether `initialize` has succeeded since construction or the last
    /// `clear`.
    fn is_initialized(&self) -> bool;

    /// Release state and return to the uninitialized state.
    fn clear(&mut self);
}
