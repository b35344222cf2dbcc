/// Interpreter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting of sequence evaluations before `RecursionLimit`.
    pub max_depth: usize,
    /// Run a collection rooted at the root env and the result after each
    /// `Interpreter::eval_code`.
    pub collect_after_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: 1000, collect_after_run: false }
    }
}

impl Config {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_collect_after_run(mut self, enabled: bool) -> Self {
        self.collect_after_run = enabled;
        self
    }
}
