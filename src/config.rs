/// Runtime hook configuration.
///
/// Owned by the radio's settings menu; the hooks only read it, once per
/// invocation at the dispatcher boundary.
use core::cell::Cell;

use critical_section::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookConfig {
    /// Decode, log and apply policy. When false the data hooks return the
    /// sentinel and the other hooks forward untouched.
    pub enabled: bool,
    /// Promiscuous/monitor mode: force muted calls audible.
    pub monitor: bool,
}

impl HookConfig {
    pub const fn new() -> Self {
        Self {
            enabled: true,
            monitor: false,
        }
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self::new()
    }
}

static HOOK_CONFIG: Mutex<Cell<HookConfig>> = Mutex::new(Cell::new(HookConfig::new()));

/// Snapshot of the current configuration.
pub fn get() -> HookConfig {
    critical_section::with(|cs| HOOK_CONFIG.borrow(cs).get())
}

pub fn set(config: HookConfig) {
    critical_section::with(|cs| HOOK_CONFIG.borrow(cs).set(config));
}

pub fn set_monitor(monitor: bool) {
    critical_section::with(|cs| {
        let cell = HOOK_CONFIG.borrow(cs);
        cell.set(HookConfig {
            monitor,
            ..cell.get()
        });
    });
}

pub fn set_enabled(enabled: bool) {
    critical_section::with(|cs| {
        let cell = HOOK_CONFIG.borrow(cs);
        cell.set(HookConfig {
            enabled,
            ..cell.get()
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_hooks_without_monitor() {
        let config = HookConfig::default();
        assert!(config.enabled);
        assert!(!config.monitor);
    }

    // Single test touching the global so parallel tests don't race on it.
    #[test]
    fn global_setters_update_one_field() {
        set(HookConfig::new());

        set_monitor(true);
        assert_eq!(get(), HookConfig { enabled: true, monitor: true });

        set_enabled(false);
        assert_eq!(get(), HookConfig { enabled: false, monitor: true });

        set(HookConfig::new());
        assert_eq!(get(), HookConfig::new());
    }
}
