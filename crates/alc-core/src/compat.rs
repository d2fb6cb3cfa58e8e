//! Protocol and sample-rate compatibility between consecutive devices.

use thiserror::Error;

use crate::device::DeviceDescriptor;

/// Why a device cannot follow another one.
///
/// `reason` is user-facing: `"Dante -> Analog"` for a protocol mismatch,
/// `"SR 48kHz -> 96kHz"` for a sample-rate mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("incompatible connection: {reason}")]
pub struct Incompatible {
    /// Human-readable mismatch description.
    pub reason: String,
}

/// Checks whether `target` can accept the output of `source`.
///
/// Missing protocol information on either side is accepted. Protocol
/// mismatches are reported before sample-rate mismatches, and sample rates
/// only conflict when both sides specify one.
pub fn is_compatible(
    source: &DeviceDescriptor,
    target: &DeviceDescriptor,
) -> Result<(), Incompatible> {
    let (Some(output), Some(input)) = (
        source.output_protocol.as_deref(),
        target.input_protocol.as_deref(),
    ) else {
        return Ok(());
    };

    if output != input {
        return Err(Incompatible {
            reason: format!("{output} -> {input}"),
        });
    }

    if let (Some(out_sr), Some(in_sr)) = (
        source.output_sample_rate.as_deref(),
        target.input_sample_rate.as_deref(),
    ) && out_sr != in_sr
    {
        return Err(Incompatible {
            reason: format!("SR {out_sr} -> {in_sr}"),
        });
    }

    Ok(())
}
