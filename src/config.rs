//! Application configuration.
//!
//! Everything the assembly engine treats as injected configuration lives
//! here, read once from the environment at startup: the template and output
//! directories, the per-image size limit, chart resolution, and the policy
//! for partially-invalid image batches.

use std::env;
use std::path::PathBuf;

use crate::assembly::charts::ChartConfig;
use crate::assembly::common::default_template_dir;
use crate::assembly::engine::AssemblyOptions;
use crate::assembly::request::ImagePolicy;

/// Maximum size of the whole multipart payload (the original form allowed
/// 30 MB).
pub const MAX_PAYLOAD_BYTES: usize = 30 * 1024 * 1024;

const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_CHART_DPI: u32 = 300;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub max_image_bytes: usize,
    pub chart_dpi: u32,
    pub image_policy: ImagePolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let template_dir = env::var("REPORT_TEMPLATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_template_dir().to_path_buf());
        let output_dir = env::var("REPORT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("output"));
        let max_image_bytes = env::var("MAX_IMAGE_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES);
        let chart_dpi = env::var("CHART_DPI")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CHART_DPI);
        let image_policy = env::var("IMAGE_POLICY")
            .map(|v| ImagePolicy::from_env_value(&v))
            .unwrap_or(ImagePolicy::Strict);

        Self {
            template_dir,
            output_dir,
            max_image_bytes,
            chart_dpi,
            image_policy,
        }
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            template_dir: self.template_dir.clone(),
            max_image_bytes: self.max_image_bytes,
            image_policy: self.image_policy,
            chart: ChartConfig { dpi: self.chart_dpi },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_policy_parses_env_values() {
        assert_eq!(
            ImagePolicy::from_env_value("best-effort"),
            ImagePolicy::BestEffort
        );
        assert_eq!(ImagePolicy::from_env_value("strict"), ImagePolicy::Strict);
        assert_eq!(ImagePolicy::from_env_value("garbage"), ImagePolicy::Strict);
    }
}
