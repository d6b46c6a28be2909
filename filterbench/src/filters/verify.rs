//! Output comparison and result formatting.

use crate::common::Status;
use crate::image::{CHANNELS, Image};

/// Largest per-byte difference accepted by default.
pub const DEFAULT_TOLERANCE: u8 = 1;

/// Mismatches reported individually before the rest are suppressed.
pub const MAX_REPORTED_MISMATCHES: usize = 16;

/// Compares `output` against `reference` byte by byte and returns the
/// number of bytes that differ by more than `tolerance`.
pub(crate) fn count_mismatches(
    reference: &Image,
    output: &Image,
    tolerance: u8,
    status: &Status,
) -> usize {
    let width = reference.width() as usize;
    let mut mismatches = 0usize;

    for (index, (&expected, &actual)) in reference.bytes().iter().zip(output.bytes()).enumerate() {
        if expected.abs_diff(actual) <= tolerance {
            continue;
        }

        mismatches += 1;
        if mismatches <= MAX_REPORTED_MISMATCHES {
            let pixel = index / CHANNELS;
            status.report(format!(
                "Mismatch at ({},{},{}): {} vs {}",
                pixel % width,
                pixel / width,
                index % CHANNELS,
                expected,
                actual
            ));
        } else if mismatches == MAX_REPORTED_MISMATCHES + 1 {
            status.report("Suppressing further errors");
        }
    }

    mismatches
}

/// Decimal places used to print a runtime: `1 - floor(log10(ms))`, so that
/// roughly two significant digits are shown. Zero or non-finite runtimes
/// get two places.
pub fn display_precision(runtime_ms: f64) -> usize {
    if !runtime_ms.is_finite() || runtime_ms <= 0.0 {
        return 2;
    }
    (1.0 - runtime_ms.log10().floor()).clamp(0.0, 9.0) as usize
}

/// The line summarizing one backend run.
///
/// `runtime_ms` is `None` when no iterations were timed, `verification` is
/// `None` when verification was disabled.
pub(crate) fn format_result(runtime_ms: Option<f64>, verification: Option<bool>) -> String {
    let runtime = match runtime_ms {
        Some(ms) => format!("{ms:.prec$} ms", prec = display_precision(ms)),
        None => "N/A".to_string(),
    };
    let outcome = match verification {
        Some(true) => " (verification passed)",
        Some(false) => " (verification failed)",
        None => "",
    };

    format!("Finished in {runtime}{outcome}")
}
