use std::time::Duration;

use crate::error::ConfigError;
use crate::labels::Endpoint;
use crate::model::TestKind;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub infobox_path: String,
    pub test_kind: String,
    pub matrix_size: u32,
    pub parallel_tasks: u32,
    pub file_size_kb: u32,
    pub io_parallel_tasks: u32,
    pub run: Vec<String>,
    pub heavy_load: bool,
    pub out_path: String,
    pub infobox_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".to_string(),
            infobox_path: "infobox.html".to_string(),
            test_kind: "cpu".to_string(),
            matrix_size: 200,
            parallel_tasks: 10,
            file_size_kb: 100,
            io_parallel_tasks: 50,
            run: vec!["compare-all".to_string()],
            heavy_load: false,
            out_path: "out/dashboard.html".to_string(),
            infobox_delay_ms: 100,
        }
    }
}

fn env_bool(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            api_base: get("API_BASE").unwrap_or(d.api_base),
            infobox_path: get("INFOBOX_PATH").unwrap_or(d.infobox_path),
            test_kind: get("TEST_KIND").unwrap_or(d.test_kind),
            matrix_size: get("MATRIX_SIZE").and_then(|v| v.parse().ok()).unwrap_or(d.matrix_size),
            parallel_tasks: get("PARALLEL_TASKS").and_then(|v| v.parse().ok()).unwrap_or(d.parallel_tasks),
            file_size_kb: get("FILE_SIZE_KB").and_then(|v| v.parse().ok()).unwrap_or(d.file_size_kb),
            io_parallel_tasks: get("IO_PARALLEL_TASKS").and_then(|v| v.parse().ok()).unwrap_or(d.io_parallel_tasks),
            run: get("RUN")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or(d.run),
            heavy_load: get("HEAVY_LOAD").map(|v| env_bool(&v)).unwrap_or(d.heavy_load),
            out_path: get("OUT_PATH").unwrap_or(d.out_path),
            infobox_delay_ms: get("INFOBOX_DELAY_MS").and_then(|v| v.parse().ok()).unwrap_or(d.infobox_delay_ms),
        }
    }

    pub fn test_kind(&self) -> Result<TestKind, ConfigError> {
        self.test_kind.parse()
    }

    pub fn endpoints(&self) -> Result<Vec<Endpoint>, ConfigError> {
        self.run.iter().map(|s| s.parse()).collect()
    }

    pub fn infobox_delay(&self) -> Duration {
        Duration::from_millis(self.infobox_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.test_kind()?;
        self.endpoints()?;
        crate::api::parse_base(&self.api_base)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::from_lookup(|_| None);
        assert_eq!(cfg.endpoints().unwrap(), vec![Endpoint::CompareAll]);
        assert_eq!(cfg.test_kind().unwrap(), TestKind::Cpu);
        assert_eq!(cfg.infobox_delay(), Duration::from_millis(100));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let cfg = Config::from_lookup(lookup(&[
            ("RUN", "platform-threads, kernel-threads"),
            ("MATRIX_SIZE", "abc"),
            ("PARALLEL_TASKS", "32"),
            ("HEAVY_LOAD", "on"),
        ]));
        assert_eq!(cfg.endpoints().unwrap(), vec![Endpoint::Platform, Endpoint::Limited]);
        assert_eq!(cfg.matrix_size, 200);
        assert_eq!(cfg.parallel_tasks, 32);
        assert!(cfg.heavy_load);
    }

    #[test]
    fn test_validate_rejects() {
        assert!(Config::from_lookup(lookup(&[("RUN", "fiber-threads")])).validate().is_err());
        assert!(Config::from_lookup(lookup(&[("TEST_KIND", "gpu")])).validate().is_err());
        assert!(Config::from_lookup(lookup(&[("API_BASE", "file:///tmp")])).validate().is_err());
    }
}
