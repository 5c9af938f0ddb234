//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.optimize.max_width == 0 || self.optimize.max_height == 0 {
            return Err(invalid("optimize.max_width and optimize.max_height must be > 0"));
        }
        if !(1..=100).contains(&self.optimize.quality) {
            return Err(invalid("optimize.quality must be between 1 and 100"));
        }
        if self.thumbnail.max_width == 0 || self.thumbnail.max_height == 0 {
            return Err(invalid("thumbnail.max_width and thumbnail.max_height must be > 0"));
        }
        if !(1..=100).contains(&self.thumbnail.quality) {
            return Err(invalid("thumbnail.quality must be between 1 and 100"));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(invalid("limits.max_file_size_mb must be > 0"));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(invalid("limits.max_image_dimension must be > 0"));
        }
        let full_pixels = self.optimize.max_width as u64 * self.optimize.max_height as u64;
        if self.limits.max_surface_pixels < full_pixels {
            return Err(invalid(
                "limits.max_surface_pixels must fit a full-size receipt surface",
            ));
        }
        if self.limits.timeout_ms == 0 {
            return Err(invalid("limits.timeout_ms must be > 0"));
        }
        if self.storage.root.as_os_str().is_empty() {
            return Err(invalid("storage.root must not be empty"));
        }
        Ok(())
    }
}
