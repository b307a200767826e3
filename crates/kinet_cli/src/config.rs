//! Kinet configuration file handling

use anyhow::{Context, Result};
use kinet_widgets::{EyesConfig, LineConfig, LoaderConfig, MarqueeConfig, MenuConfig, TextConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "kinet.toml";

/// Top-level Kinet configuration (kinet.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct KinetConfig {
    #[serde(default)]
    pub frames: FrameConfig,
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub eyes: EyesConfig,
    #[serde(default)]
    pub marquee: MarqueeConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// Frame scheduler configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct FrameConfig {
    /// Frames per second of headless playback
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_fps() -> u32 {
    60
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl KinetConfig {
    /// Load configuration from a file, or from `kinet.toml` in a directory
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_path = config_path(path);
        if !config_path.exists() {
            anyhow::bail!(
                "No {CONFIG_FILE} found at {}. Run `kinet init` to create one.",
                path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: KinetConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load `path` if given, else `./kinet.toml` if present, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load_from(Path::new(".")),
            None => Ok(Self::default()),
        }
    }

    /// Check every widget section up front
    pub fn validate(&self) -> Result<()> {
        if self.frames.fps == 0 {
            anyhow::bail!("frames.fps must be positive");
        }
        self.line.validate().context("[line]")?;
        self.eyes.validate().context("[eyes]")?;
        self.marquee.validate().context("[marquee]")?;
        self.menu.validate().context("[menu]")?;
        self.text.validate().context("[text]")?;
        self.loader.validate().context("[loader]")?;
        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

fn config_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(CONFIG_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Write a default `kinet.toml` into `dir`
pub fn write_default(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    fs::write(&path, KinetConfig::default().to_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
