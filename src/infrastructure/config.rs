use crate::domain::preset::{Preset, PresetCatalog};
use anyhow::Context;
use config::{Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    #[serde(default = "default_preset")]
    pub default_preset: String,
    /// Shift applied to "now" when a request carries no reference time.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Fixed seed for reproducible demos; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_show_alerts")]
    pub show_alerts: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_preset: default_preset(),
            utc_offset_minutes: 0,
            seed: None,
            show_alerts: default_show_alerts(),
        }
    }
}

fn default_preset() -> String {
    "imbalance-monitor".to_string()
}

fn default_show_alerts() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PresetsFile {
    #[serde(default)]
    pub presets: Vec<Preset>,
}

/// `config/app.toml`, overridable with `FLEXBALANCE__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(File::with_name("config/app"))
        .add_source(
            Environment::with_prefix("FLEXBALANCE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Built-in presets, overlaid with `config/presets.toml` when present.
pub fn load_presets() -> anyhow::Result<PresetCatalog> {
    let settings = config::Config::builder()
        .add_source(File::with_name("config/presets").required(false))
        .build()?;
    let file: PresetsFile = settings.try_deserialize()?;
    merge_presets(file)
}

fn merge_presets(file: PresetsFile) -> anyhow::Result<PresetCatalog> {
    let mut catalog = PresetCatalog::builtin()?;
    for preset in file.presets {
        let name = preset.name.clone();
        catalog
            .insert(preset)
            .with_context(|| format!("Failed to load preset {}", name))?;
        tracing::info!("Loaded preset {} from configuration", name);
    }
    Ok(catalog)
}
