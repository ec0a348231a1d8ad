//! GPU Monte Carlo aggregation via wgpu compute shaders.
//!
//! Enabled with the `gpu` cargo feature. Semantics match the CPU engine:
//! each shader invocation runs a fixed number of paths sequentially with its
//! own hash-seeded counter RNG, each workgroup tree-reduces its threads'
//! partial `(sum, sum_sq)` in workgroup shared memory (synchronised within
//! the workgroup only), and the per-workgroup partials are read back and
//! combined on the host.
//!
//! Device and launch failures are fatal for the run: they surface as
//! [`GpuError`] naming the failed operation, never as a silent zero.

mod pricer;

pub use pricer::GpuBasketPricer;

use thiserror::Error;

/// Workgroup size baked into the WGSL kernel (`@workgroup_size`).
///
/// WGSL requires a constant here, so the thread-per-workgroup count is a
/// shader constant rather than a runtime knob; occupancy is tuned through
/// [`GpuConfig::paths_per_thread`] and [`GpuConfig::max_workgroups`].
pub const WORKGROUP_SIZE: u32 = 256;

/// Maximum basket dimension supported by the kernel's fixed-size registers.
pub const MAX_GPU_ASSETS: usize = 16;

/// GPU dispatch configuration.
///
/// The defaults target mid-range discrete GPUs: up to 1000 workgroups of
/// 256 threads, each thread simulating a fixed batch of paths.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpuConfig {
    /// Number of paths each invocation simulates sequentially.
    pub paths_per_thread: u32,
    /// Upper bound on dispatched workgroups.
    pub max_workgroups: u32,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            paths_per_thread: 64,
            max_workgroups: 1000,
        }
    }
}

/// Errors from the GPU backend.
///
/// All variants abort the current run; there are no retries. The host
/// program may fall back to the CPU engine or abort gracefully.
#[derive(Debug, Error)]
pub enum GpuError {
    /// No compatible GPU adapter was found.
    #[error("No GPU adapter found")]
    AdapterNotFound,

    /// Device creation failed.
    #[error("Device request failed: {0}")]
    DeviceRequest(String),

    /// A device operation failed, with the operation name and the native
    /// diagnostic.
    #[error("Device operation '{op}' failed: {detail}")]
    Operation {
        /// Name of the failing operation.
        op: &'static str,
        /// Native diagnostic text.
        detail: String,
    },

    /// A required buffer exceeds the device limits.
    #[error("Allocation of {bytes} bytes exceeds device limit {limit}")]
    Allocation {
        /// Requested size in bytes.
        bytes: u64,
        /// Device limit in bytes.
        limit: u64,
    },

    /// Basket dimension above the kernel's fixed register budget.
    #[error("Basket dimension {got} exceeds GPU kernel maximum {max}")]
    TooManyAssets {
        /// Kernel maximum.
        max: usize,
        /// Requested dimension.
        got: usize,
    },

    /// The pre-dispatch pricing setup failed (matrix or market data).
    #[error(transparent)]
    Pricing(#[from] crate::mc::PricingError),
}
