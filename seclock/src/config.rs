use dotenv::var;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable timings.
///
/// Deliberately holds no password: the stored password is ephemeral and
/// always comes back as the hardcoded default after a restart.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq)]
pub struct Config {
    /// Milliseconds between keypad sweeps.
    pub scan_interval_ms: u64,
    /// Milliseconds the lock stays open after an accepted password.
    pub unlock_hold_ms: u64,
}

impl Config {
    fn path() -> String {
        var("CONFIG_FILE").unwrap_or_else(|_| "seclock.json".to_string())
    }

    pub fn try_load() -> Option<Self> {
        Self::load_from(Path::new(&Self::path()))
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(Path::new(&Self::path()))
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        if path.exists() {
            let file = std::fs::File::open(path).ok()?;
            let reader = std::io::BufReader::new(file);
            serde_json::from_reader(reader).ok()
        } else {
            None
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scan_interval_ms: 200,
            unlock_hold_ms: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_timings() {
        let config = Config::default();
        assert_eq!(config.scan_interval_ms, 200);
        assert_eq!(config.unlock_hold_ms, 5000);
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("seclock-cfg-test-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let config = Config {
            scan_interval_ms: 100,
            unlock_hold_ms: 2500,
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), Some(config));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_loads_nothing() {
        let path = std::env::temp_dir().join("seclock-cfg-test-missing.json");
        let _ = std::fs::remove_file(&path);
        assert_eq!(Config::load_from(&path), None);
    }
}
