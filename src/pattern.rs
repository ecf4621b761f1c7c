//! Lua-pattern lookup table
//!
//! The gateway's schema source declares string constraints as Lua patterns
//! (https://www.lua.org/pil/20.2.html). Rather than implement a pattern
//! dialect translator, we hard-code the finite set of patterns that actually
//! appear in entity and plugin schemas and map each to an equivalent
//! [`regex::Regex`]. An unknown pattern is not an error anywhere in the
//! crate: consumers treat it as "no constraint" and log a warning once at
//! checker construction time.

use regex::Regex;
use std::collections::HashMap;

/// Fixed mapping from Lua-pattern strings to native regex matchers
pub struct PatternTable {
    entries: HashMap<&'static str, Regex>,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternTable {
    /// Build the table. All patterns are known at build time, so
    /// construction cannot fail.
    pub fn new() -> Self {
        let entries = [
            ("//", r"//"),
            ("^%u+$", r"^[A-Z]+$"),
            ("^%*%.", r"^\*\."),
            ("%.%*$", r"\.\*$"),
            ("^[^*]*$", r"^[^*]*$"),
            ("^[^*]*%*?[^*]*$", r"^[^*]*\*?[^*]*$"),
            ("^[Hh][Oo][Ss][Tt]$", r"^[Hh][Oo][Ss][Tt]$"),
        ]
        .into_iter()
        .map(|(lua, native)| {
            // Entries are verified by the table tests; a bad entry is a
            // programmer error, not an input error.
            (lua, Regex::new(native).expect("pattern table entry must compile"))
        })
        .collect();

        Self { entries }
    }

    /// Look up the native matcher for a Lua-pattern string.
    ///
    /// `None` means "no constraint available", never a failure.
    pub fn lookup(&self, key: &str) -> Option<&Regex> {
        self.entries.get(key)
    }

    /// All recognized Lua-pattern keys
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}
