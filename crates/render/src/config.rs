use battleball_geometry::SphereParams;
use serde::{Deserialize, Serialize};

/// Render settings. Missing fields fall back to [`RenderConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub sphere: SphereParams,
    /// Background clear color, linear RGBA.
    pub clear_color: [f64; 4],
    /// Consecutive failed frames before the scheduler gives up. 0 never gives up.
    pub max_consecutive_failures: u32,
    /// Automatic spin in radians per second.
    pub spin_rate: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sphere: SphereParams::default(),
            clear_color: [0.1, 0.1, 0.15, 1.0],
            max_consecutive_failures: 120,
            spin_rate: 1.0,
        }
    }
}
