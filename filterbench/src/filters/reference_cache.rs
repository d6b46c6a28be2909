use super::FilterKind;
use crate::common::{Result, Status};
use crate::image::Image;

/// Last reference output of one filter, reused while the dimensions match.
///
/// The cached image is a function of the input content as well, so callers
/// that change the input pixels without changing its size must call
/// [`ReferenceCache::invalidate`].
#[derive(Debug, Default)]
pub struct ReferenceCache {
    cached: Option<Image>,
    computations: usize,
    show_progress: bool,
}

impl ReferenceCache {
    pub fn is_populated(&self) -> bool {
        self.cached.is_some()
    }

    pub fn cached_dims(&self) -> Option<(u32, u32)> {
        self.cached.as_ref().map(Image::dims)
    }

    /// How many times the reference has actually been computed, as
    /// opposed to served from the cache.
    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn set_show_progress(&mut self, show_progress: bool) {
        self.show_progress = show_progress;
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Fills `output` with the reference result for `input`.
    pub(crate) fn produce(
        &mut self,
        kind: FilterKind,
        input: &Image,
        output: &mut Image,
        status: &Status,
    ) -> Result<()> {
        if let Some(cached) = &self.cached {
            if cached.dims() == output.dims() {
                output.copy_from(cached)?;
                status.report("Finished reference (cached)");
                return Ok(());
            }
            tracing::debug!(
                "cached {} reference is {}, recomputing for {}",
                kind,
                cached,
                output
            );
        }

        status.report("Running reference");
        let height = output.height() as i32;
        for y in 0..height {
            kind.reference_row(input, output, y);
            if self.show_progress {
                let done = 100.0 * (y + 1) as f64 / height as f64;
                status.report(format!("Completed {done:.1}% of reference"));
            }
        }
        status.report("Finished reference");

        self.cached = Some(output.clone());
        self.computations += 1;
        Ok(())
    }
}
