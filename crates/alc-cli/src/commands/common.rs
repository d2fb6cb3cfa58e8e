//! Shared CLI helpers used across multiple commands.

use std::path::PathBuf;

use alc_config::{
    AnalyticsObserver, ChainStore, FileStorage, Settings, SourceMap, TracingSink, paths,
};
use alc_core::{Catalog, DeviceDescriptor, ProtocolFamily, Session};
use clap::Args;

/// Options accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Device catalog JSON file (defaults to the settings value)
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Directory holding the saved chain and consent (defaults to the settings value)
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,
}

/// Settings merged with command-line overrides.
pub struct Environment {
    pub settings: Settings,
    pub catalog_path: PathBuf,
    pub storage_dir: PathBuf,
}

impl Environment {
    pub fn new(opts: &GlobalOpts) -> Self {
        let settings = Settings::load_or_default(paths::settings_path());
        let catalog_path = opts.catalog.clone().unwrap_or_else(|| settings.catalog_path());
        let storage_dir = opts.store.clone().unwrap_or_else(|| settings.storage_dir());
        Self {
            settings,
            catalog_path,
            storage_dir,
        }
    }

    /// Loads the catalog, failing when the file is missing or invalid.
    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        if !self.catalog_path.exists() {
            anyhow::bail!(
                "No device catalog at {}. Pass --catalog <PATH> or set catalog_path in {}.",
                self.catalog_path.display(),
                paths::settings_path().display()
            );
        }
        Ok(Catalog::load(&self.catalog_path)?)
    }

    /// Loads the catalog, or an empty one when no catalog file exists yet.
    pub fn catalog_or_empty(&self) -> anyhow::Result<Catalog> {
        if !self.catalog_path.exists() {
            tracing::debug!("catalog_load: {} missing", self.catalog_path.display());
            return Ok(Catalog::default());
        }
        Ok(Catalog::load(&self.catalog_path)?)
    }

    pub fn sources(&self) -> SourceMap {
        SourceMap::load_or_empty(self.settings.sources_path())
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.storage_dir)
    }

    /// Restores the saved chain into a session that saves every change and
    /// reports additions when consent allows.
    pub fn open_session(&self, catalog: Catalog) -> Session {
        let store = ChainStore::new(self.storage());
        let mut session = Session::with_chain(catalog, store.load_or_empty());
        session.add_observer(Box::new(store));
        session.add_observer(Box::new(AnalyticsObserver::new(self.storage(), TracingSink)));
        session
    }
}

/// Finds a catalog device by id, or by name when the argument is not a number.
pub fn resolve_device(catalog: &Catalog, query: &str) -> anyhow::Result<DeviceDescriptor> {
    let found = match query.trim().parse::<u64>() {
        Ok(id) => catalog.get(id),
        Err(_) => catalog.find_by_name(query.trim()),
    };
    found.cloned().ok_or_else(|| {
        anyhow::anyhow!(
            "Device '{}' not found ({} devices in catalog). Use 'alc devices --search' to look it up.",
            query,
            catalog.len()
        )
    })
}

/// Formats a latency in milliseconds.
pub fn ms(latency: f64) -> String {
    format!("{latency:.2} ms")
}

/// `"Analog -> Dante @ 48kHz [ana/dante]"` style protocol summary.
///
/// The bracketed family codes are left out when neither protocol is known.
pub fn protocol_summary(device: &DeviceDescriptor) -> String {
    let input = device.input_protocol.as_deref();
    let output = device.output_protocol.as_deref();
    let mut summary = format!("{} -> {}", input.unwrap_or("?"), output.unwrap_or("?"));
    if let Some(rate) = device.sample_rate_label() {
        summary.push_str(&format!(" @ {rate}"));
    }
    if input.is_some() || output.is_some() {
        summary.push_str(&format!(
            " [{}/{}]",
            ProtocolFamily::classify(input).code(),
            ProtocolFamily::classify(output).code()
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            DeviceDescriptor::new(4, "CL5", 1.1),
            DeviceDescriptor::new(7, "Rio3224-D2", 0.3),
        ])
    }

    #[test]
    fn resolve_by_id_or_name() {
        let catalog = catalog();
        assert_eq!(resolve_device(&catalog, "7").unwrap().name, "Rio3224-D2");
        assert_eq!(resolve_device(&catalog, "cl5").unwrap().id, 4);
        assert!(resolve_device(&catalog, "99").is_err());
        assert!(resolve_device(&catalog, "Unknown").is_err());
    }

    #[test]
    fn summaries() {
        let device = DeviceDescriptor::new(1, "Rio", 0.3)
            .with_input("Analog", None)
            .with_output("Dante", Some("48kHz"));
        assert_eq!(protocol_summary(&device), "Analog -> Dante @ 48kHz [ana/dante]");
        assert_eq!(protocol_summary(&DeviceDescriptor::new(2, "X", 0.0)), "? -> ?");
        let half = DeviceDescriptor::new(3, "Y", 0.0).with_output("MADI Coax", None);
        assert_eq!(protocol_summary(&half), "? -> MADI Coax [unknown/madi]");
        assert_eq!(ms(1.234), "1.23 ms");
    }
}
