//! Allow-list filtering of compiler arguments for telemetry
//!
//! An argument is kept only when it matches the built-in pattern for its
//! compiler or the pattern delivered through experiment flags. Nothing is
//! kept for compilers outside the known set.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::warn;

use crate::config::ExperimentFlags;

/// Compilers that have argument filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compiler {
    Msvc,
    Clang,
    Gcc,
}

impl Compiler {
    /// Resolve a compiler from its display label (`GCC`) or raw short name (`gcc`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MSVC" | "msvc" => Some(Compiler::Msvc),
            "Clang" | "clang" => Some(Compiler::Clang),
            "GCC" | "gcc" => Some(Compiler::Gcc),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Compiler::Msvc => "MSVC",
            Compiler::Clang => "Clang",
            Compiler::Gcc => "GCC",
        }
    }

    /// Experiment flag carrying the additional filter for this compiler
    pub fn filter_flag(self) -> &'static str {
        match self {
            Compiler::Msvc => "copilotcppMsvcCompilerArgumentFilter",
            Compiler::Clang => "copilotcppClangCompilerArgumentFilter",
            Compiler::Gcc => "copilotcppGccCompilerArgumentFilter",
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Built-in per-compiler filters. All unset unless configured.
#[derive(Debug, Clone, Default)]
pub struct CompilerArgumentFilters {
    defaults: HashMap<Compiler, Regex>,
}

impl CompilerArgumentFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build filters from patterns keyed by compiler label.
    ///
    /// Unknown compiler keys and invalid patterns are skipped with a warning.
    pub fn from_patterns(patterns: &BTreeMap<String, String>) -> Self {
        let defaults = patterns
            .iter()
            .filter_map(|(name, pattern)| {
                let Some(compiler) = Compiler::from_name(name) else {
                    warn!("Ignoring argument filter for unknown compiler '{}'", name);
                    return None;
                };
                compile_pattern(pattern, name).map(|regex| (compiler, regex))
            })
            .collect();
        Self { defaults }
    }

    pub fn with_default(mut self, compiler: Compiler, pattern: Regex) -> Self {
        self.defaults.insert(compiler, pattern);
        self
    }

    /// Keep the arguments allowed for `compiler`, preserving their order.
    ///
    /// `compiler` is a display label or raw short name; anything else yields
    /// an empty list. Both the built-in and the flag-delivered pattern may
    /// independently admit an argument.
    pub fn filter(
        &self,
        compiler: &str,
        arguments: &[String],
        flags: &ExperimentFlags,
    ) -> Vec<String> {
        let Some(compiler) = Compiler::from_name(compiler) else {
            return Vec::new();
        };

        let default_filter = self.defaults.get(&compiler);
        let additional_filter = flags
            .get_str(compiler.filter_flag())
            .and_then(|pattern| compile_pattern(pattern, compiler.filter_flag()));

        if default_filter.is_none() && additional_filter.is_none() {
            return Vec::new();
        }

        arguments
            .iter()
            .filter(|arg| {
                default_filter.is_some_and(|re| re.is_match(arg.as_str()))
                    || additional_filter.as_ref().is_some_and(|re| re.is_match(arg.as_str()))
            })
            .cloned()
            .collect()
    }
}

fn compile_pattern(pattern: &str, source: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("Ignoring invalid compiler argument filter from {}: {}", source, e);
            None
        }
    }
}
