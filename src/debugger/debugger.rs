use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl DebugLevel {
    pub fn from_u8(level: u8) -> Self {
        match level {
            0 => DebugLevel::Off,
            1 => DebugLevel::Error,
            2 => DebugLevel::Warn,
            3 => DebugLevel::Info,
            4 => DebugLevel::Debug,
            _ => DebugLevel::Trace,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "OFF" => Some(DebugLevel::Off),
            "ERROR" => Some(DebugLevel::Error),
            "WARN" => Some(DebugLevel::Warn),
            "INFO" => Some(DebugLevel::Info),
            "DEBUG" => Some(DebugLevel::Debug),
            "TRACE" => Some(DebugLevel::Trace),
            other => other.parse::<u8>().ok().map(DebugLevel::from_u8),
        }
    }
}

/// Subsystem tag printed in front of every log line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Component {
    Blocks,
    Frames,
    Registry,
    Extend,
    Fault,
    Clock,
    Syslog,
    Reclaim,
    Mmu,
    Cli,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Blocks => "blocks",
            Component::Frames => "frames",
            Component::Registry => "registry",
            Component::Extend => "extend",
            Component::Fault => "fault",
            Component::Clock => "clock",
            Component::Syslog => "syslog",
            Component::Reclaim => "reclaim",
            Component::Mmu => "mmu",
            Component::Cli => "cli",
        };
        f.write_str(name)
    }
}

pub static DEBUG_LEVEL: AtomicU8 = AtomicU8::new(DebugLevel::Off as u8);

pub fn set_debug_level(level: DebugLevel) {
    DEBUG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn get_debug_level() -> DebugLevel {
    DebugLevel::from_u8(DEBUG_LEVEL.load(Ordering::Relaxed))
}

pub fn should_log(level: DebugLevel) -> bool {
    level != DebugLevel::Off && (level as u8) <= DEBUG_LEVEL.load(Ordering::Relaxed)
}

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

pub fn indent() {
    DEPTH.with(|d| d.set(d.get() + 1));
}

pub fn dedent() {
    DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
}

pub fn format_indent() -> String {
    DEPTH.with(|d| "  ".repeat(d.get()))
}

pub mod color {
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const BLUE: &str = "\x1b[34m";
    pub const GRAY: &str = "\x1b[90m";
    pub const RESET: &str = "\x1b[0m";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!(DebugLevel::parse("trace"), Some(DebugLevel::Trace));
        assert_eq!(DebugLevel::parse(" Warn "), Some(DebugLevel::Warn));
        assert_eq!(DebugLevel::parse("3"), Some(DebugLevel::Info));
        assert_eq!(DebugLevel::parse("loud"), None);
    }

    #[test]
    fn off_never_logs() {
        assert!(!should_log(DebugLevel::Off));
    }

    #[test]
    fn indentation_is_per_thread_and_saturates() {
        dedent();
        assert_eq!(format_indent(), "");
        indent();
        indent();
        assert_eq!(format_indent(), "    ");
        dedent();
        dedent();
        assert_eq!(format_indent(), "");
    }
}
