//! Selector precedence
//!
//! Merges the command-line and environment selectors into the effective
//! selector. An environment selector that is present at all, even empty or
//! unrecognized, wins over the command line.

use crate::domain::{GpuSelector, SelectorSource};

/// Resolves the effective selector for one launch
#[derive(Debug, Clone)]
pub struct SelectorResolver {
    env_var: String,
}

impl SelectorResolver {
    /// Create a resolver reading the selector from `env_var`
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }

    /// Name of the environment variable consulted
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// Read the raw environment selector, keeping "unset" distinct from "empty"
    ///
    /// Non-UTF-8 values are passed through lossily and fail to parse.
    pub fn read_env(&self) -> Option<String> {
        std::env::var_os(&self.env_var).map(|v| v.to_string_lossy().into_owned())
    }

    /// Resolve against the current process environment
    pub fn resolve_from_env(&self, cmdline: Option<&str>) -> GpuSelector {
        let env = self.read_env();
        resolve_raw(cmdline, env.as_deref())
    }
}

/// Merge two parsed selectors; the result is never `Unspecified`
pub fn resolve(cmdline: GpuSelector, env: GpuSelector) -> GpuSelector {
    let effective = if env.is_specified() {
        if cmdline.is_specified() {
            log::debug!("Environment selector {} overrides command line {}", env, cmdline);
        }
        env
    } else if cmdline.is_specified() {
        cmdline
    } else {
        GpuSelector::None
    };

    log::debug!("Effective GPU selector: {}", effective);
    effective
}

/// Parse both raw selectors and merge them
pub fn resolve_raw(cmdline: Option<&str>, env: Option<&str>) -> GpuSelector {
    resolve(
        GpuSelector::parse(cmdline, SelectorSource::Cmdline),
        GpuSelector::parse(env, SelectorSource::Env),
    )
}
