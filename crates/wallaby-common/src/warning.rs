//! Layout warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple
//! times. Used by the layout components to report content the engine lays
//! out in a degraded way (for example, an unbreakable segment wider than
//! its line box).

use std::collections::HashSet;
use std::sync::{LazyLock, Mutex};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Messages already printed, for deduplication. Initialized at first
/// access through `LazyLock` so every code path sees the same set.
static WARNED: LazyLock<Mutex<HashSet<String>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Warn about a degraded layout situation (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Layout", "unbreakable segment wider than line box; overflowing");
/// ```
///
/// # Panics
/// Panics if the warning set mutex is poisoned.
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED.lock().unwrap().insert(key);

    if should_print {
        eprintln!("{YELLOW}[Wallaby {component}] ⚠ {message}{RESET}");
    }
}

/// Clear all recorded warnings (call when laying out a new document)
///
/// # Panics
/// Panics if the warning set mutex is poisoned.
pub fn clear_warnings() {
    WARNED.lock().unwrap().clear();
}
