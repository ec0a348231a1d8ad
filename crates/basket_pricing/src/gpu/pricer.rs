//! Host-side wgpu pipeline for the basket Monte Carlo kernel.

use num_traits::Float;
use tracing::debug;
use wgpu::util::DeviceExt;

use basket_core::types::BasketOption;

use super::{GpuConfig, GpuError, MAX_GPU_ASSETS, WORKGROUP_SIZE};
use crate::mc::pricer::aggregate;
use crate::mc::{MonteCarloConfig, PricingRun};

/// Uniform parameter block matching the WGSL `Params` struct layout.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct KernelParams {
    n_assets: u32,
    n_paths: u32,
    paths_per_thread: u32,
    seed: u32,
    strike: f32,
    rate: f32,
    maturity: f32,
    _pad: u32,
}

/// GPU Monte Carlo pricer with the same statistical contract as the CPU
/// [`BasketPricer`](crate::mc::BasketPricer).
///
/// Path arithmetic runs in `f32` on the device (WGSL has no `f64`); the
/// final reduction over workgroup partials runs in `f64` on the host.
///
/// # Examples
///
/// ```no_run
/// use basket_core::types::OptionParams;
/// use basket_pricing::gpu::{GpuBasketPricer, GpuConfig};
/// use basket_pricing::mc::MonteCarloConfig;
///
/// let config = MonteCarloConfig::builder().n_paths(200_000).seed(42).build().unwrap();
/// let pricer = GpuBasketPricer::new(config, GpuConfig::default());
/// let option = OptionParams::new(100.0_f64, 100.0, 0.05, 0.2, 1.0).unwrap();
/// let run = pricer.price(&option.to_basket()).unwrap();
/// println!("{:.4} +/- {:.4}", run.value.expected, run.value.confidence);
/// ```
pub struct GpuBasketPricer {
    config: MonteCarloConfig,
    gpu: GpuConfig,
}

impl GpuBasketPricer {
    /// Creates a GPU pricer from a Monte Carlo configuration and dispatch
    /// tuning.
    pub fn new(config: MonteCarloConfig, gpu: GpuConfig) -> Self {
        Self { config, gpu }
    }

    /// Prices a basket call option on the GPU.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::Pricing`] if the correlation matrix fails
    /// factorisation, [`GpuError::TooManyAssets`] above the kernel register
    /// budget, and a device-specific [`GpuError`] for adapter, allocation,
    /// launch or readback failures. All device failures are fatal for the
    /// run; nothing is retried.
    pub fn price<T>(&self, option: &BasketOption<T>) -> Result<PricingRun<T>, GpuError>
    where
        T: Float,
    {
        let n = option.dim();
        if n > MAX_GPU_ASSETS {
            return Err(GpuError::TooManyAssets {
                max: MAX_GPU_ASSETS,
                got: n,
            });
        }

        let factor = option
            .correlation()
            .cholesky()
            .map_err(crate::mc::PricingError::Matrix)?;

        // Market buffer layout consumed by the kernel:
        // [spots | vols | weights | drifts].
        let mut market = Vec::with_capacity(4 * n);
        for a in option.assets() {
            market.push(to_f32(a.spot));
        }
        for a in option.assets() {
            market.push(to_f32(a.volatility));
        }
        for a in option.assets() {
            market.push(to_f32(a.weight));
        }
        for a in option.assets() {
            market.push(to_f32(a.drift));
        }

        let mut lower = vec![0.0_f32; n * n];
        for i in 0..n {
            for j in 0..=i {
                lower[i * n + j] = to_f32(factor.get(i, j));
            }
        }

        let n_paths = self.config.n_paths();
        let base_ppt = self.gpu.paths_per_thread.max(1);
        let capacity = self.gpu.max_workgroups as usize * WORKGROUP_SIZE as usize;
        // Raise paths-per-thread if the requested batch would exceed the
        // workgroup budget.
        let ppt = base_ppt.max(n_paths.div_ceil(capacity) as u32);
        let threads = n_paths.div_ceil(ppt as usize) as u32;
        let workgroups = threads.div_ceil(WORKGROUP_SIZE);

        let params = KernelParams {
            n_assets: n as u32,
            n_paths: n_paths as u32,
            paths_per_thread: ppt,
            seed: fold_seed(self.config.seed().unwrap_or(0)),
            strike: to_f32(option.strike),
            rate: to_f32(option.rate),
            maturity: to_f32(option.maturity),
            _pad: 0,
        };

        debug!(
            n_assets = n,
            n_paths, workgroups, paths_per_thread = ppt,
            "dispatching GPU pricing batch"
        );

        let (sum, sum_sq) =
            pollster::block_on(run_kernel(params, &market, &lower, workgroups))?;

        let value = aggregate(sum, sum_sq, n_paths);
        debug!(
            expected = value.expected,
            confidence = value.confidence,
            "GPU pricing batch complete"
        );

        Ok(PricingRun {
            value,
            option: option.clone(),
            n_assets: n,
            n_paths,
        })
    }
}

#[inline]
fn to_f32<T: Float>(x: T) -> f32 {
    x.to_f64().unwrap_or(f64::NAN) as f32
}

/// Folds a 64-bit seed into the kernel's 32-bit seed word by mixing both
/// halves, so seeds differing only in the high word stay distinct.
#[inline]
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Sets up the device, dispatches the kernel and reads back the workgroup
/// partial sums, combining them in `f64`.
async fn run_kernel(
    params: KernelParams,
    market: &[f32],
    cholesky: &[f32],
    workgroups: u32,
) -> Result<(f64, f64), GpuError> {
    let instance = wgpu::Instance::default();
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(GpuError::AdapterNotFound)?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("basket MC"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        )
        .await
        .map_err(|e| GpuError::DeviceRequest(e.to_string()))?;

    let limits = device.limits();
    if workgroups > limits.max_compute_workgroups_per_dimension {
        return Err(GpuError::Operation {
            op: "dispatch",
            detail: format!(
                "{} workgroups exceed device limit {}",
                workgroups, limits.max_compute_workgroups_per_dimension
            ),
        });
    }

    let partials_size = (2 * workgroups as usize * std::mem::size_of::<f32>()) as u64;
    if partials_size > limits.max_buffer_size {
        return Err(GpuError::Allocation {
            bytes: partials_size,
            limit: limits.max_buffer_size,
        });
    }

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("basket MC kernel"),
        source: wgpu::ShaderSource::Wgsl(include_str!("basket_mc.wgsl").into()),
    });

    let param_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("params"),
        contents: bytemuck::bytes_of(&params),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let market_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("market"),
        contents: bytemuck::cast_slice(market),
        usage: wgpu::BufferUsages::STORAGE,
    });

    let cholesky_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("cholesky"),
        contents: bytemuck::cast_slice(cholesky),
        usage: wgpu::BufferUsages::STORAGE,
    });

    let partials_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("partials"),
        size: partials_size,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });

    let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("staging"),
        size: partials_size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("basket MC bind group layout"),
        entries: &[
            uniform_entry(0),
            storage_entry(1, true),
            storage_entry(2, true),
            storage_entry(3, false),
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("basket MC pipeline layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("basket MC pipeline"),
        layout: Some(&pipeline_layout),
        module: &shader,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("basket MC bind group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: param_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: market_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: cholesky_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: partials_buffer.as_entire_binding(),
            },
        ],
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("basket MC encoder"),
    });
    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("basket MC pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(workgroups, 1, 1);
    }
    encoder.copy_buffer_to_buffer(&partials_buffer, 0, &staging_buffer, 0, partials_size);
    queue.submit(std::iter::once(encoder.finish()));

    // Synchronous readback of the workgroup partials.
    let slice = staging_buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device.poll(wgpu::Maintain::Wait);
    receiver
        .recv()
        .map_err(|e| GpuError::Operation {
            op: "readback",
            detail: e.to_string(),
        })?
        .map_err(|e| GpuError::Operation {
            op: "map_buffer",
            detail: e.to_string(),
        })?;

    let data = slice.get_mapped_range();
    let partials: &[f32] = bytemuck::cast_slice(&data);

    let mut sum = 0.0_f64;
    let mut sum_sq = 0.0_f64;
    for pair in partials.chunks_exact(2) {
        sum += pair[0] as f64;
        sum_sq += pair[1] as f64;
    }
    drop(data);
    staging_buffer.unmap();

    Ok((sum, sum_sq))
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basket_core::types::OptionParams;

    fn gpu_pricer(n_paths: usize, seed: u64) -> GpuBasketPricer {
        let config = MonteCarloConfig::builder()
            .n_paths(n_paths)
            .seed(seed)
            .build()
            .unwrap();
        GpuBasketPricer::new(config, GpuConfig::default())
    }

    #[test]
    fn test_fold_seed_mixes_high_word() {
        // Low word passes through when the high word is zero.
        assert_eq!(fold_seed(7), 7);
        // Seeds differing only in the high word must not alias.
        assert_ne!(fold_seed(42), fold_seed(42 | (1 << 32)));
        assert_ne!(fold_seed(0), fold_seed(1 << 63));
    }

    #[test]
    fn test_too_many_assets_rejected() {
        use basket_core::matrix::CorrelationMatrix;
        use basket_core::types::{Asset, BasketOption};

        let n = MAX_GPU_ASSETS + 1;
        let assets: Vec<_> = (0..n)
            .map(|_| Asset::new(100.0_f64, 0.2, 1.0 / n as f64).unwrap())
            .collect();
        let option =
            BasketOption::new(assets, CorrelationMatrix::identity(n), 100.0, 1.0, 0.05).unwrap();
        let result = gpu_pricer(1_000, 1).price(&option);
        assert!(matches!(result, Err(GpuError::TooManyAssets { .. })));
    }

    // Requires a GPU adapter; run with `cargo test --features gpu -- --ignored`.
    #[test]
    #[ignore]
    fn test_gpu_matches_black_scholes() {
        let option = OptionParams::new(100.0_f64, 100.0, 0.05, 0.2, 1.0)
            .unwrap()
            .to_basket();
        let run = gpu_pricer(200_000, 42).price(&option).unwrap();
        let reference = basket_core::analytic::black_scholes_call(100.0, 100.0, 0.05, 0.2, 1.0);
        assert!(
            (run.value.expected - reference).abs() < 0.3,
            "GPU price {} too far from Black-Scholes {}",
            run.value.expected,
            reference
        );
    }

    // Requires a GPU adapter.
    #[test]
    #[ignore]
    fn test_gpu_zero_volatility_is_exact() {
        let option = OptionParams::new(100.0_f64, 80.0, 0.05, 0.0, 1.0)
            .unwrap()
            .to_basket();
        let run = gpu_pricer(50_000, 7).price(&option).unwrap();
        let exact = (-0.05_f64).exp() * (100.0 * 0.05_f64.exp() - 80.0);
        assert!((run.value.expected - exact).abs() < 1e-3);
        assert!(run.value.confidence < 1e-6);
    }
}
