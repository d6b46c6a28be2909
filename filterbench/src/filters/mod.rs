mod bilateral;
mod blur;
mod copy;
mod reference_cache;
mod sharpen;
mod sobel;
mod stencil;
mod verify;


use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

pub use reference_cache::ReferenceCache;
pub use verify::{DEFAULT_TOLERANCE, MAX_REPORTED_MISMATCHES, display_precision};

use crate::backends::{ExecutionParams, Method, Timing, compute_kernel, native_cpu, native_gpu};
use crate::common::{Error, Result, Status};
use crate::image::Image;

/// Row kernel of the native CPU backend: fills output row `y`.
pub(crate) type RowKernel = fn(&Image, usize, &mut [u8]);

/// The image operations available for benchmarking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum FilterKind {
    /// Identity; the compute-kernel backend also measures copy bandwidth.
    Copy,
    Blur,
    Sharpen,
    Sobel,
    Bilateral,
}

impl FilterKind {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Scalar reference for one output row, using border-replicating
    /// pixel accessors.
    pub(crate) fn reference_row(self, input: &Image, output: &mut Image, y: i32) {
        match self {
            FilterKind::Copy => copy::reference_row(input, output, y),
            FilterKind::Blur => blur::reference_row(input, output, y),
            FilterKind::Sharpen => sharpen::reference_row(input, output, y),
            FilterKind::Sobel => sobel::reference_row(input, output, y),
            FilterKind::Bilateral => bilateral::reference_row(input, output, y),
        }
    }

    pub(crate) fn row_kernel(self) -> RowKernel {
        match self {
            FilterKind::Copy => copy::native_row,
            FilterKind::Blur => blur::native_row,
            FilterKind::Sharpen => sharpen::native_row,
            FilterKind::Sobel => sobel::native_row,
            FilterKind::Bilateral => bilateral::native_row,
        }
    }
}

/// One benchmarkable filter: its kind, the cached reference output and the
/// status channel its messages go to.
#[derive(Debug)]
pub struct Filter {
    kind: FilterKind,
    reference: ReferenceCache,
    status: Status,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Self::with_status(kind, Status::default())
    }

    pub fn with_status(kind: FilterKind, status: Status) -> Self {
        Self {
            kind,
            reference: ReferenceCache::default(),
            status,
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn reference_cache(&self) -> &ReferenceCache {
        &self.reference
    }

    /// Emits a progress message per reference row.
    pub fn set_reference_progress(&mut self, enabled: bool) {
        self.reference.set_show_progress(enabled);
    }

    /// Forgets the cached reference, e.g. after the input content changed.
    pub fn invalidate_reference(&mut self) {
        self.reference.invalidate();
    }

    /// Dispatches to the backend named by `method`.
    pub fn run(
        &mut self,
        method: Method,
        input: &Image,
        output: &mut Image,
        params: &ExecutionParams,
    ) -> Result<bool> {
        match method {
            Method::Reference => self.run_reference(input, output),
            Method::ComputeKernel => self.run_compute_kernel(input, output, params),
            Method::NativeCpu => self.run_native_cpu(input, output, params),
            Method::NativeGpu => self.run_native_gpu(input, output, params),
        }
    }

    /// Computes the reference output, reusing the cache when possible.
    pub fn run_reference(&mut self, input: &Image, output: &mut Image) -> Result<bool> {
        self.reported(|filter| {
            check_dims(input, output)?;
            filter
                .reference
                .produce(filter.kind, input, output, &filter.status)?;
            Ok(true)
        })
    }

    /// Runs the filter as a runtime-built kernel program on a GPU device.
    pub fn run_compute_kernel(
        &mut self,
        input: &Image,
        output: &mut Image,
        params: &ExecutionParams,
    ) -> Result<bool> {
        self.reported(|filter| {
            check_dims(input, output)?;
            compute_kernel::run(filter, input, output, params)
        })
    }

    /// Runs the compiled row-parallel CPU schedule.
    pub fn run_native_cpu(
        &mut self,
        input: &Image,
        output: &mut Image,
        params: &ExecutionParams,
    ) -> Result<bool> {
        self.reported(|filter| {
            check_dims(input, output)?;
            native_cpu::run(filter, input, output, params)
        })
    }

    /// Runs the compiled fixed-tile GPU schedule.
    pub fn run_native_gpu(
        &mut self,
        input: &Image,
        output: &mut Image,
        params: &ExecutionParams,
    ) -> Result<bool> {
        self.reported(|filter| {
            check_dims(input, output)?;
            native_gpu::run(filter, input, output, params)
        })
    }

    /// Compares `output` against the reference for `input`. Every byte may
    /// differ by at most `tolerance`.
    pub fn verify(&mut self, input: &Image, output: &Image, tolerance: u8) -> bool {
        if let Err(err) = check_dims(input, output) {
            self.status.report(err.to_string());
            return false;
        }

        let mut reference = output.new_like();
        if let Err(err) = self
            .reference
            .produce(self.kind, input, &mut reference, &self.status)
        {
            self.status.report(err.to_string());
            return false;
        }

        verify::count_mismatches(&reference, output, tolerance, &self.status) == 0
    }

    /// Reports the average runtime and, if requested, the verification
    /// outcome. Returns false only when verification ran and failed.
    pub(crate) fn report_results(
        &mut self,
        input: &Image,
        output: &Image,
        params: &ExecutionParams,
        timing: &Timing,
    ) -> bool {
        let verification = params
            .verify
            .then(|| self.verify(input, output, params.tolerance));

        self.status.report(verify::format_result(
            timing.average_ms(params.iterations),
            verification,
        ));

        verification.unwrap_or(true)
    }

    fn reported(&mut self, run: impl FnOnce(&mut Self) -> Result<bool>) -> Result<bool> {
        let result = run(self);
        if let Err(err) = &result {
            tracing::debug!("{} failed: {}", self.kind, err);
            self.status.report(err.to_string());
        }
        result
    }
}

fn check_dims(input: &Image, output: &Image) -> Result<()> {
    if input.dims() != output.dims() {
        return Err(Error::config(format!(
            "Input is {} but output is {}",
            input, output
        )));
    }
    Ok(())
}
