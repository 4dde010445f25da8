//! Chromium command-line options.
//!
//! Provides a type-safe interface for the flags a harvesting browser is
//! launched with. Flags that the driver always needs (remote debugging
//! port, profile directory) are added by the driver, not here.
//!
//! # Example
//!
//! ```ignore
//! use retro_harvest::ChromeOptions;
//!
//! let options = ChromeOptions::new()
//!     .with_window_size(1920, 1080)
//!     .with_arg("--lang=en-US");
//!
//! let args = options.to_args();
//! // ["--headless=new", "--no-sandbox", "--window-size=1920,1080", "--lang=en-US"]
//! ```

// ============================================================================
// ChromeOptions
// ============================================================================

/// Chromium process configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeOptions {
    /// Run without a GUI.
    pub headless: bool,

    /// Disable the renderer sandbox (required in most containers).
    pub no_sandbox: bool,

    /// Window dimensions in pixels (width, height).
    pub window_size: Option<(u32, u32)>,

    /// Additional custom command-line arguments.
    pub extra_args: Vec<String>,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ChromeOptions {
    /// Creates options for a headless, sandbox-less browser.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            headless: true,
            no_sandbox: true,
            window_size: None,
            extra_args: Vec::new(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ChromeOptions {
    /// Shows the browser window.
    #[inline]
    #[must_use]
    pub fn with_headed(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Keeps the renderer sandbox enabled.
    #[inline]
    #[must_use]
    pub fn with_sandbox(mut self) -> Self {
        self.no_sandbox = false;
        self
    }

    /// Sets window size in pixels.
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    /// Adds a custom command-line argument.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Adds multiple custom command-line arguments.
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Conversion Methods
// ============================================================================

impl ChromeOptions {
    /// Converts options to Chromium command-line arguments.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(4 + self.extra_args.len());

        if self.headless {
            args.push("--headless=new".to_string());
        }

        if self.no_sandbox {
            args.push("--no-sandbox".to_string());
        }

        if let Some((width, height)) = self.window_size {
            args.push(format!("--window-size={width},{height}"));
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Validates the options configuration.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if let Some((width, height)) = self.window_size
            && (width == 0 || height == 0)
        {
            return Err("Window dimensions must be greater than zero".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_headless_without_sandbox() {
        let options = ChromeOptions::default();
        assert_eq!(options.to_args(), vec!["--headless=new", "--no-sandbox"]);
    }

    #[test]
    fn test_headed_with_sandbox_has_no_flags() {
        let options = ChromeOptions::new().with_headed().with_sandbox();
        assert!(options.to_args().is_empty());
    }

    #[test]
    fn test_window_size_and_extra_args() {
        let options = ChromeOptions::new()
            .with_window_size(1280, 720)
            .with_args(["--lang=en-US", "--mute-audio"]);

        let args = options.to_args();
        assert!(args.contains(&"--window-size=1280,720".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--mute-audio"));
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        assert!(ChromeOptions::new().with_window_size(0, 600).validate().is_err());
        assert!(ChromeOptions::new().with_window_size(800, 600).validate().is_ok());
    }
}
