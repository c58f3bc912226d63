//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML and default every
//! field, so an empty file (or no file) yields the stock portfolio behavior.
//!
//! ```toml
//! [typewriter]
//! phrases = ["Rust Developer", "Systems Tinkerer"]
//!
//! [reveal]
//! threshold = 0.2
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Root configuration for every behavior on the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub typewriter: TypewriterConfig,
    pub navbar: NavbarConfig,
    pub menu: MenuConfig,
    pub sections: SectionConfig,
    pub reveal: RevealConfig,
    pub counters: CounterConfig,
    pub contact: ContactConfig,
    pub anchors: AnchorConfig,
}

impl PageConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PageConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject values no behavior can work with.
    pub fn validate(&self) -> Result<()> {
        self.reveal.validate()?;
        self.counters.validate()
    }
}

fn check_fraction(name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{name} must be within 0.0..=1.0, got {value}")))
    }
}

// =============================================================================
// Per-behavior sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    /// Id of the element receiving the typed text.
    pub target_id: String,
    pub phrases: Vec<String>,
    pub typing_ms: u64,
    pub deleting_ms: u64,
    /// Pause once a phrase is fully typed.
    pub hold_full_ms: u64,
    /// Pause once a phrase is fully deleted.
    pub hold_empty_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            target_id: "typed-text".into(),
            phrases: vec![
                "Full-Stack Developer".into(),
                "UI/UX Designer".into(),
                "AI Integration Specialist".into(),
            ],
            typing_ms: 80,
            deleting_ms: 40,
            hold_full_ms: 2000,
            hold_empty_ms: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavbarConfig {
    pub navbar_id: String,
    /// Scroll offset above which the navbar is styled `scrolled`.
    pub scroll_threshold: f32,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            navbar_id: "navbar".into(),
            scroll_threshold: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub toggle_id: String,
    pub menu_id: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            toggle_id: "nav-toggle".into(),
            menu_id: "nav-menu".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    /// Pixels subtracted from each section's top before matching the scroll offset.
    pub offset: f32,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self { offset: 120.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub threshold: f32,
    /// How far above the viewport's bottom edge a reveal fires.
    pub bottom_margin: f32,
}

impl RevealConfig {
    pub fn validate(&self) -> Result<()> {
        check_fraction("reveal.threshold", self.threshold)?;
        if self.bottom_margin < 0.0 {
            return Err(Error::InvalidConfig("reveal.bottom_margin must be >= 0".into()));
        }
        Ok(())
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            bottom_margin: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub threshold: f32,
    pub duration_ms: u64,
    /// Assumed frame length used to size the per-frame increment.
    pub frame_ms: u64,
    /// Attribute holding the target value.
    pub attribute: String,
}

impl CounterConfig {
    pub fn validate(&self) -> Result<()> {
        check_fraction("counters.threshold", self.threshold)?;
        if self.frame_ms == 0 {
            return Err(Error::InvalidConfig("counters.frame_ms must be > 0".into()));
        }
        if self.duration_ms == 0 {
            return Err(Error::InvalidConfig("counters.duration_ms must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            duration_ms: 1500,
            frame_ms: 16,
            attribute: "data-count".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub form_id: String,
    pub revert_ms: u64,
    pub sent_label: String,
    pub sent_background: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            form_id: "contact-form".into(),
            revert_ms: 3000,
            sent_label: "Message Sent!".into(),
            sent_background: "linear-gradient(135deg, #34d399, #06b6d4)".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub smooth_duration_ms: u64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self { smooth_duration_ms: 480 }
    }
}

impl AnchorConfig {
    pub fn smooth_duration(&self) -> Duration {
        Duration::from_millis(self.smooth_duration_ms)
    }
}
