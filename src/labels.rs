//! Endpoint identifiers, thread-model labels and their colors.
//!
//! Older backends reported "Kernel Threads"/"User Threads" and exposed
//! `kernel-threads`/`user-threads`; both collapse onto the limited and
//! optimized models. The aliases are accepted for compatibility only.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub const PLATFORM_LABEL: &str = "Platform Threads (1:1 OS-Mapping)";
pub const VIRTUAL_LABEL: &str = "Virtual Threads (JVM-optimized)";
pub const LIMITED_LABEL: &str = "Limited Threads (CPU-core-limited)";
pub const OPTIMIZED_LABEL: &str = "Optimized Threads (Work-Stealing)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Platform,
    Virtual,
    Limited,
    Optimized,
    CompareAll,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Platform,
        Endpoint::Virtual,
        Endpoint::Limited,
        Endpoint::Optimized,
        Endpoint::CompareAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Platform => "platform-threads",
            Endpoint::Virtual => "virtual-threads",
            Endpoint::Limited => "limited-threads",
            Endpoint::Optimized => "optimized-threads",
            Endpoint::CompareAll => "compare-all",
        }
    }

    pub fn path(&self) -> String {
        format!("/api/matrix/{}", self.as_str())
    }

    pub fn title(&self) -> &'static str {
        match self {
            Endpoint::Platform => "Platform Threads",
            Endpoint::Virtual => "Virtual Threads",
            Endpoint::Limited => "Limited Threads",
            Endpoint::Optimized => "Optimized Threads",
            Endpoint::CompareAll => "Comparison of all thread models",
        }
    }

    /// Extra card class; the comparison card carries none.
    pub fn card_class(&self) -> Option<&'static str> {
        match self {
            Endpoint::Platform => Some("thread-model-platform"),
            Endpoint::Virtual => Some("thread-model-virtual"),
            Endpoint::Limited => Some("thread-model-limited"),
            Endpoint::Optimized => Some("thread-model-optimized"),
            Endpoint::CompareAll => None,
        }
    }

    /// Id of the button that submits this endpoint.
    pub fn button_id(&self) -> &'static str {
        match self {
            Endpoint::Platform => "runPlatformBtn",
            Endpoint::Virtual => "runVirtualBtn",
            Endpoint::Limited => "runLimitedBtn",
            Endpoint::Optimized => "runOptimizedBtn",
            Endpoint::CompareAll => "runAllBtn",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "platform-threads" => Ok(Endpoint::Platform),
            "virtual-threads" => Ok(Endpoint::Virtual),
            "limited-threads" | "kernel-threads" => Ok(Endpoint::Limited),
            "optimized-threads" | "user-threads" => Ok(Endpoint::Optimized),
            "compare-all" => Ok(Endpoint::CompareAll),
            other => Err(ConfigError::UnknownEndpoint(other.to_string())),
        }
    }
}

/// Map legacy label variants onto the current canonical label.
///
/// Only labels containing a legacy substring are rewritten, so canonical
/// labels pass through unchanged.
pub fn normalize_label(label: &str) -> String {
    if label.contains("Kernel") {
        LIMITED_LABEL.to_string()
    } else if label.contains("User") {
        OPTIMIZED_LABEL.to_string()
    } else {
        label.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn opaque(self) -> Self {
        Self { a: 1.0, ..self }
    }

    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

const PLATFORM_COLOR: Rgba = Rgba::new(40, 167, 69, 0.6);
const VIRTUAL_COLOR: Rgba = Rgba::new(0, 123, 255, 0.6);
const LIMITED_COLOR: Rgba = Rgba::new(255, 193, 7, 0.6);
const OPTIMIZED_COLOR: Rgba = Rgba::new(220, 53, 69, 0.6);
const NEUTRAL_COLOR: Rgba = Rgba::new(108, 117, 125, 0.6);

/// Fill color for a thread-model label.
pub fn label_color(label: &str) -> Rgba {
    let has = |needles: &[&str]| needles.iter().any(|n| label.contains(n));
    if has(&["Platform"]) {
        PLATFORM_COLOR
    } else if has(&["Virtual"]) {
        VIRTUAL_COLOR
    } else if has(&["Limited", "Begrenzte", "Kernel"]) {
        LIMITED_COLOR
    } else if has(&["Optimized", "Optimierte", "User"]) {
        OPTIMIZED_COLOR
    } else {
        NEUTRAL_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_aliases() {
        assert_eq!("kernel-threads".parse::<Endpoint>().unwrap(), Endpoint::Limited);
        assert_eq!("user-threads".parse::<Endpoint>().unwrap(), Endpoint::Optimized);
        assert!("green-threads".parse::<Endpoint>().is_err());
        for ep in Endpoint::ALL {
            assert_eq!(ep.as_str().parse::<Endpoint>().unwrap(), ep);
        }
    }

    #[test]
    fn test_normalize_legacy() {
        assert_eq!(normalize_label("Kernel Threads (1:1)"), LIMITED_LABEL);
        assert_eq!(normalize_label("User Threads (M:N)"), OPTIMIZED_LABEL);
    }

    #[test]
    fn test_normalize_idempotent() {
        for label in [PLATFORM_LABEL, VIRTUAL_LABEL, LIMITED_LABEL, OPTIMIZED_LABEL, "Something else"] {
            let once = normalize_label(label);
            assert_eq!(once, label);
            assert_eq!(normalize_label(&once), once);
        }
        let legacy = normalize_label("Kernel Threads");
        assert_eq!(normalize_label(&legacy), legacy);
    }

    #[test]
    fn test_colors() {
        assert_eq!(label_color(PLATFORM_LABEL), PLATFORM_COLOR);
        assert_eq!(label_color(VIRTUAL_LABEL), VIRTUAL_COLOR);
        assert_eq!(label_color(LIMITED_LABEL), LIMITED_COLOR);
        assert_eq!(label_color("Begrenzte Threads"), LIMITED_COLOR);
        assert_eq!(label_color(OPTIMIZED_LABEL), OPTIMIZED_COLOR);
        assert_eq!(label_color("mystery"), NEUTRAL_COLOR);
    }

    #[test]
    fn test_border_is_opaque_fill() {
        let fill = label_color(VIRTUAL_LABEL);
        assert_eq!(fill.css(), "rgba(0, 123, 255, 0.6)");
        assert_eq!(fill.opaque().css(), "rgba(0, 123, 255, 1)");
    }
}
