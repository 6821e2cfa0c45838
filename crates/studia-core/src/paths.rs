//! Standard paths used by Studia tools

use std::path::PathBuf;

/// Standard Studia paths
pub struct Paths {
    /// Data directory (~/.local/share/studia)
    pub data: PathBuf,
    /// Config directory (~/.config/studia)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("studia");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("studia");

        Self { data, config }
    }

    /// Get the state directory for a tool
    pub fn state(&self, tool: &str) -> PathBuf {
        self.data.join(tool)
    }
}
