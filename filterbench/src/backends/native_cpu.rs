//! Row-parallel CPU schedule: rayon splits the output into rows and each
//! row runs the filter's compiled row kernel.

use rayon::prelude::*;

use super::{ExecutionParams, Stage, run_timed};
use crate::common::Result;
use crate::filters::{Filter, RowKernel};
use crate::image::Image;

pub(crate) fn run(
    filter: &mut Filter,
    input: &Image,
    output: &mut Image,
    params: &ExecutionParams,
) -> Result<bool> {
    let _span = tracing::debug_span!("native_cpu", filter = filter.name()).entered();
    let status = filter.status().clone();
    let kernel = filter.kind().row_kernel();

    tracing::trace!(stage = %Stage::Setup, threads = rayon::current_num_threads());
    status.report("Running native CPU filter");
    let timing = run_timed(
        params.iterations,
        || {
            apply(kernel, input, output);
            Ok(())
        },
        || Ok(()),
    )?;
    status.report("Finished native CPU filter");

    tracing::trace!(stage = %Stage::Teardown);
    Ok(filter.report_results(input, output, params, &timing))
}

/// Runs `kernel` over every output row in parallel.
pub(crate) fn apply(kernel: RowKernel, input: &Image, output: &mut Image) {
    let row_bytes = output.row_bytes();
    output
        .bytes_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| kernel(input, y, row));
}
