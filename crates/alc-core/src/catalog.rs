//! Device catalog: lookup, port resolution, and library queries.
//!
//! The catalog is a read-only, ordered list of [`DeviceDescriptor`]s. Its order
//! is treated as popularity order. Two JSON shapes are accepted: the native
//! descriptor shape, and the catalog API record shape where protocols and sample
//! rates live under `raw_data` and latency may only be available as display text:
//!
//! ```json
//! [{ "id": 0, "name": "SD-Rack", "latency": 0.8, "display_time": "0,8ms",
//!    "source": "DiGiCo", "raw_data": { "input_type": "Analog",
//!    "output_type": "MADI", "input_sr": "-", "output_sr": "48kHz" } }]
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::compat::{Incompatible, is_compatible};
use crate::device::{DeviceDescriptor, Port, UNKNOWN_BRAND, normalize_field};

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog '{path}': {source}")]
    Read {
        /// Path of the catalog file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid JSON or has an unexpected shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parses a latency display string such as `"2,27ms"` or
/// `"0,21ms (round trip)"` into milliseconds.
///
/// Comma decimals are accepted. Anything unparsable yields `0.0`.
pub fn parse_latency_ms(text: &str) -> f64 {
    let lowered = text.to_lowercase().replace("ms", "").replace(',', ".");
    let number = lowered.split('(').next().unwrap_or_default().trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(0.0)
}

/// Catalog API record shape.
#[derive(Deserialize)]
struct CatalogRecord {
    #[serde(default)]
    id: Option<u64>,
    name: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    latency: Option<f64>,
    #[serde(default)]
    display_time: Option<String>,
    #[serde(default)]
    source: Option<String>,
    raw_data: RawData,
}

#[derive(Deserialize)]
struct RawData {
    #[serde(default)]
    input_type: Option<String>,
    #[serde(default)]
    output_type: Option<String>,
    #[serde(default)]
    input_sr: Option<String>,
    #[serde(default)]
    output_sr: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogEntry {
    Record(CatalogRecord),
    Native(DeviceDescriptor),
}

impl CatalogEntry {
    fn into_descriptor(self, position: usize) -> DeviceDescriptor {
        match self {
            Self::Record(record) => record.into_descriptor(position),
            Self::Native(device) => device,
        }
    }
}

impl CatalogRecord {
    fn into_descriptor(self, position: usize) -> DeviceDescriptor {
        let latency = self
            .latency
            .filter(|value| value.is_finite() && *value >= 0.0)
            .or_else(|| self.display_time.as_deref().map(parse_latency_ms))
            .unwrap_or(0.0);
        DeviceDescriptor {
            id: self.id.unwrap_or(position as u64),
            name: self.name.trim().to_string(),
            brand: normalize_field(self.brand.as_deref())
                .unwrap_or_else(|| UNKNOWN_BRAND.to_string()),
            latency,
            input_protocol: normalize_field(self.raw_data.input_type.as_deref()),
            input_sample_rate: normalize_field(self.raw_data.input_sr.as_deref()),
            output_protocol: normalize_field(self.raw_data.output_type.as_deref()),
            output_sample_rate: normalize_field(self.raw_data.output_sr.as_deref()),
            source: normalize_field(self.source.as_deref()),
            display_time: self.display_time,
        }
    }
}

/// Parses one device in either catalog shape.
///
/// `position` stands in for the id when a catalog record has none.
pub fn parse_device(
    value: serde_json::Value,
    position: usize,
) -> Result<DeviceDescriptor, serde_json::Error> {
    Ok(serde_json::from_value::<CatalogEntry>(value)?.into_descriptor(position))
}

/// Ordering applied to library listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Popularity,
    /// Name, A to Z.
    NameAsc,
    /// Name, Z to A.
    NameDesc,
    /// Lowest latency first.
    LatencyAsc,
    /// Highest latency first.
    LatencyDesc,
}

/// Error returned when parsing an unknown [`SortOrder`] name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order '{0}' (expected popularity, name-asc, name-desc, latency-asc, latency-desc)")]
pub struct ParseSortOrderError(String);

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "popularity" => Ok(Self::Popularity),
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            "latency-asc" => Ok(Self::LatencyAsc),
            "latency-desc" => Ok(Self::LatencyDesc),
            _ => Err(ParseSortOrderError(s.to_string())),
        }
    }
}

/// Filter and sort options for [`Catalog::query`].
#[derive(Debug, Clone, Default)]
pub struct LibraryQuery {
    /// Case-insensitive substring matched against name and protocols.
    pub search: String,
    /// Exact brand filter; `None` matches every brand.
    pub brand: Option<String>,
    /// Result ordering.
    pub sort: SortOrder,
}

impl LibraryQuery {
    fn matches(&self, device: &DeviceDescriptor) -> bool {
        let term = self.search.to_lowercase();
        let contains =
            |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&term));
        let matches_search = term.is_empty()
            || contains(Some(&device.name))
            || contains(device.input_protocol.as_deref())
            || contains(device.output_protocol.as_deref());
        let matches_brand = self.brand.as_deref().is_none_or(|brand| device.brand == brand);
        matches_search && matches_brand
    }
}

/// A library listing entry annotated with compatibility against the current
/// context device.
#[derive(Debug, Clone)]
pub struct LibraryEntry<'a> {
    /// The catalog device.
    pub device: &'a DeviceDescriptor,
    /// Whether the device can follow the context device.
    pub compatibility: Result<(), Incompatible>,
}

impl LibraryEntry<'_> {
    /// True when the device can be appended at the current position.
    pub fn is_compatible(&self) -> bool {
        self.compatibility.is_ok()
    }
}

/// Annotates devices with compatibility against `context`.
///
/// When a context exists, compatible devices are moved to the front; the
/// relative order inside each group is preserved.
pub fn rank_for_context<'a>(
    devices: Vec<&'a DeviceDescriptor>,
    context: Option<&DeviceDescriptor>,
) -> Vec<LibraryEntry<'a>> {
    let mut entries: Vec<LibraryEntry<'a>> = devices
        .into_iter()
        .map(|device| LibraryEntry {
            device,
            compatibility: context.map_or(Ok(()), |ctx| is_compatible(ctx, device)),
        })
        .collect();
    if context.is_some() {
        entries.sort_by_key(|entry| !entry.is_compatible());
    }
    entries
}

/// Read-only, ordered device catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    devices: Vec<DeviceDescriptor>,
}

impl Catalog {
    /// Creates a catalog from devices in popularity order.
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self { devices }
    }

    /// Parses a catalog from a JSON array in either accepted shape.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        let devices = entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| entry.into_descriptor(position))
            .collect();
        Ok(Self { devices })
    }

    /// Loads a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&content)?;
        tracing::debug!("catalog_load: {} devices from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// All devices in catalog order.
    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// True when the catalog has no devices.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Looks up a device by catalog id.
    pub fn get(&self, id: u64) -> Option<&DeviceDescriptor> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Looks up a device by name, exact match first, then case-insensitive.
    pub fn find_by_name(&self, name: &str) -> Option<&DeviceDescriptor> {
        self.devices
            .iter()
            .find(|d| d.name == name)
            .or_else(|| self.devices.iter().find(|d| d.name.eq_ignore_ascii_case(name)))
    }

    /// Distinct output ports offered by `device` for its input protocol.
    ///
    /// Scans every catalog row with the same name and input protocol and keeps
    /// one [`Port`] per `(protocol, sample rate)` pair, in first-seen order.
    /// The first row's latency wins on duplicates.
    pub fn unique_outputs(&self, device: Option<&DeviceDescriptor>) -> Vec<Port> {
        let Some(device) = device else {
            return Vec::new();
        };
        let mut ports: Vec<Port> = Vec::new();
        for row in self
            .devices
            .iter()
            .filter(|row| row.name == device.name && row.input_protocol == device.input_protocol)
        {
            let Some(port) = row.output_port() else {
                continue;
            };
            let seen = ports
                .iter()
                .any(|p| p.protocol == port.protocol && p.sample_rate == port.sample_rate);
            if !seen {
                ports.push(port);
            }
        }
        ports
    }

    /// Distinct brands, sorted, excluding the unknown placeholder.
    pub fn brands(&self) -> Vec<&str> {
        let mut brands: Vec<&str> = self
            .devices
            .iter()
            .map(|d| d.brand.as_str())
            .filter(|b| *b != UNKNOWN_BRAND)
            .collect();
        brands.sort_unstable();
        brands.dedup();
        brands
    }

    /// Filters and sorts the catalog.
    pub fn query(&self, query: &LibraryQuery) -> Vec<&DeviceDescriptor> {
        let mut found: Vec<&DeviceDescriptor> =
            self.devices.iter().filter(|d| query.matches(d)).collect();
        let by_name = |a: &&DeviceDescriptor, b: &&DeviceDescriptor| -> Ordering {
            a.name.to_lowercase().cmp(&b.name.to_lowercase())
        };
        match query.sort {
            SortOrder::Popularity => {}
            SortOrder::NameAsc => found.sort_by(by_name),
            SortOrder::NameDesc => found.sort_by(|a, b| by_name(b, a)),
            SortOrder::LatencyAsc => found.sort_by(|a, b| a.latency.total_cmp(&b.latency)),
            SortOrder::LatencyDesc => found.sort_by(|a, b| b.latency.total_cmp(&a.latency)),
        }
        found
    }
}
