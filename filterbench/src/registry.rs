use std::collections::BTreeMap;
use std::str::FromStr;

use strum::IntoEnumIterator;

use crate::backends::{ExecutionParams, Method};
use crate::common::{Error, Result, Status};
use crate::filters::{Filter, FilterKind};
use crate::image::Image;

/// Benchmark driver: every filter by name, sharing one status channel.
#[derive(Debug)]
pub struct Registry {
    filters: BTreeMap<FilterKind, Filter>,
    status: Status,
}

impl Registry {
    pub fn new(status: Status) -> Self {
        let filters = FilterKind::iter()
            .map(|kind| (kind, Filter::with_status(kind, status.clone())))
            .collect();

        Self { filters, status }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.keys().map(|kind| kind.name())
    }

    pub fn method_names() -> impl Iterator<Item = &'static str> {
        Method::iter().map(Method::name)
    }

    pub fn filter_mut(&mut self, name: &str) -> Result<&mut Filter> {
        FilterKind::from_str(name)
            .ok()
            .and_then(|kind| self.filters.get_mut(&kind))
            .ok_or_else(|| Error::config(format!("Unknown filter '{}'", name)))
    }

    pub fn method(name: &str) -> Result<Method> {
        Method::from_str(name).map_err(|_| Error::config(format!("Unknown method '{}'", name)))
    }

    pub fn set_reference_progress(&mut self, enabled: bool) {
        for filter in self.filters.values_mut() {
            filter.set_reference_progress(enabled);
        }
    }

    /// Forgets every filter's cached reference. Call this whenever the
    /// input pixels change, even if the dimensions stay the same.
    pub fn invalidate_references(&mut self) {
        for filter in self.filters.values_mut() {
            filter.invalidate_reference();
        }
    }

    /// Runs `filter` with `method`. Every failure has already been reported
    /// on the status channel when this returns `false`.
    pub fn run(
        &mut self,
        filter: &str,
        method: &str,
        input: &Image,
        output: &mut Image,
        params: &ExecutionParams,
    ) -> bool {
        let method = match Self::method(method) {
            Ok(method) => method,
            Err(err) => {
                self.status.report(err.to_string());
                return false;
            }
        };
        let status = self.status.clone();
        let filter = match self.filter_mut(filter) {
            Ok(filter) => filter,
            Err(err) => {
                status.report(err.to_string());
                return false;
            }
        };

        tracing::debug!("running {} with {}", filter.name(), method);
        filter
            .run(method, input, output, params)
            .unwrap_or(false)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Status::default())
    }
}
