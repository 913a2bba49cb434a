use std::collections::HashSet;
use std::path::PathBuf;

use pb_schema::NamespaceConfig;

/// The compiler's entire configuration surface. No CLI binary reads it —
/// spec.md §1/§6 leave the outer surface unspecified, so this is addressed
/// straight from a caller's own `build.rs` or test harness.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory searched (recursively) for `.proto` files. Also the
    /// base every `import` path resolves against.
    pub input_dir: PathBuf,
    pub namespaces: NamespaceConfig,
    /// Message names excluded from sample-data generation so a cyclic
    /// schema's test emitter still terminates (spec.md §4.4.4).
    pub cycle_break: HashSet<String>,
}
