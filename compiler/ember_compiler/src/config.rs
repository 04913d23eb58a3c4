//! Compilation options.

/// Options for one compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileConfig {
    /// Path shown in rendered diagnostics.
    pub file_path: String,
    /// Run constant folding before validation.
    pub optimize: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            file_path: "input.js".to_owned(),
            optimize: true,
        }
    }
}

impl CompileConfig {
    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = path.into();
        self
    }

    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}
