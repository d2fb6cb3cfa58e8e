//! Device descriptors and output ports.
//!
//! A [`DeviceDescriptor`] is one catalog row: a device that accepts a signal on
//! an input protocol/sample rate and emits it on an output protocol/sample
//! rate, adding a fixed latency. Several rows may describe the same physical
//! device in different output configurations; each distinct configuration is a
//! [`Port`].
//!
//! Sample rates and protocols are optional. The catalog marks "no value" with
//! `-` or an empty cell, which is normalized to `None` on the way in.

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder used by the catalog for an unspecified protocol or sample rate.
pub const UNSPECIFIED: &str = "-";

/// Brand assigned to catalog rows that do not name one.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Immutable description of a catalog device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Catalog identifier.
    pub id: u64,
    /// Display name, e.g. `"DiGiCo SD-Rack"`.
    pub name: String,
    /// Manufacturer.
    #[serde(default = "unknown_brand")]
    pub brand: String,
    /// Latency added by the device, in milliseconds. Never negative.
    #[serde(deserialize_with = "deserialize_latency")]
    pub latency: f64,
    /// Protocol accepted on the input side.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_protocol: Option<String>,
    /// Sample rate expected on the input side.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_sample_rate: Option<String>,
    /// Protocol emitted on the output side.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub output_protocol: Option<String>,
    /// Sample rate emitted on the output side.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub output_sample_rate: Option<String>,
    /// Key into the documentation-source map.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,
    /// Latency as originally written in the catalog (e.g. `"2,27ms"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_time: Option<String>,
}

fn unknown_brand() -> String {
    UNKNOWN_BRAND.to_string()
}

fn deserialize_latency<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(f64::deserialize(deserializer)?.max(0.0))
}

fn deserialize_optional_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_field(value.as_deref()))
}

/// Normalizes a catalog cell: trims it and maps empty or `-` to `None`.
pub fn normalize_field(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() || value == UNSPECIFIED {
        None
    } else {
        Some(value.to_string())
    }
}

impl DeviceDescriptor {
    /// Creates a descriptor with no protocols, sample rates, or source.
    pub fn new(id: u64, name: impl Into<String>, latency: f64) -> Self {
        Self {
            id,
            name: name.into(),
            brand: unknown_brand(),
            latency: latency.max(0.0),
            input_protocol: None,
            input_sample_rate: None,
            output_protocol: None,
            output_sample_rate: None,
            source: None,
            display_time: None,
        }
    }

    /// Sets the brand.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Sets the input protocol and sample rate.
    pub fn with_input(mut self, protocol: &str, sample_rate: Option<&str>) -> Self {
        self.input_protocol = normalize_field(Some(protocol));
        self.input_sample_rate = normalize_field(sample_rate);
        self
    }

    /// Sets the output protocol and sample rate.
    pub fn with_output(mut self, protocol: &str, sample_rate: Option<&str>) -> Self {
        self.output_protocol = normalize_field(Some(protocol));
        self.output_sample_rate = normalize_field(sample_rate);
        self
    }

    /// Sets the documentation-source key.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        let source: String = source.into();
        self.source = normalize_field(Some(source.as_str()));
        self
    }

    /// Returns a copy whose output side is replaced by `port`.
    pub fn with_output_port(mut self, port: &Port) -> Self {
        self.output_protocol = Some(port.protocol.clone());
        self.output_sample_rate = port.sample_rate.clone();
        self
    }

    /// The output configuration of this row as a [`Port`].
    ///
    /// `None` when the row has no output protocol.
    pub fn output_port(&self) -> Option<Port> {
        Some(Port {
            protocol: self.output_protocol.clone()?,
            sample_rate: self.output_sample_rate.clone(),
            latency: self.latency,
        })
    }

    /// Short sample-rate label for listings.
    ///
    /// `"in -> out"` when both sides are known and differ, otherwise whichever
    /// side is known.
    pub fn sample_rate_label(&self) -> Option<String> {
        match (
            self.input_sample_rate.as_deref(),
            self.output_sample_rate.as_deref(),
        ) {
            (Some(input), Some(output)) if input != output => {
                Some(format!("{input} -> {output}"))
            }
            (Some(input), _) => Some(input.to_string()),
            (None, Some(output)) => Some(output.to_string()),
            (None, None) => None,
        }
    }
}

/// One output configuration a device can be set to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Output protocol.
    pub protocol: String,
    /// Output sample rate, `None` when unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<String>,
    /// Latency of the catalog row that offers this port, in milliseconds.
    pub latency: f64,
}

impl Port {
    /// Stable key used to address the port, e.g. `"Dante|48kHz"`.
    pub fn key(&self) -> String {
        format!(
            "{}|{}",
            self.protocol,
            self.sample_rate.as_deref().unwrap_or(UNSPECIFIED)
        )
    }
}
