use std::env::consts;
use std::num::NonZero;

use many_cpus::ProcessorSet;

/// Compiler that built this package, recorded by the build script.
const RUSTC_VERSION: &str = env!("POOL_BENCH_RUSTC_VERSION");

/// Describes the execution environment that a benchmark run was measured in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Environment {
    pub(crate) runtime_name: String,
    pub(crate) runtime_version: String,
    pub(crate) package_version: String,
    pub(crate) os_name: String,
    pub(crate) os_version: String,
    pub(crate) processor: String,
    pub(crate) cpu_count: NonZero<usize>,
}

impl Environment {
    /// Inspects the current host and process.
    #[must_use]
    pub fn detect() -> Self {
        let (os_name, os_version) = os_identification();

        let environment = Self {
            runtime_name: "Rust".to_string(),
            runtime_version: RUSTC_VERSION.to_string(),
            package_version: env!("CARGO_PKG_VERSION").to_string(),
            os_name,
            os_version,
            processor: processor_identification(),
            cpu_count: detect_cpu_count(),
        };

        tracing::debug!(?environment, "execution environment detected");

        environment
    }

    /// Name of the language runtime, which is always `Rust`.
    #[must_use]
    pub fn runtime_name(&self) -> &str {
        &self.runtime_name
    }

    /// Identification of the compiler that built the benchmark.
    #[must_use]
    pub fn runtime_version(&self) -> &str {
        &self.runtime_version
    }

    /// Version of the benchmark package itself.
    #[must_use]
    pub fn package_version(&self) -> &str {
        &self.package_version
    }

    /// Name of the operating system, e.g. `Linux`.
    #[must_use]
    pub fn os_name(&self) -> &str {
        &self.os_name
    }

    /// Release of the operating system kernel. Empty if it could not be determined.
    #[must_use]
    pub fn os_version(&self) -> &str {
        &self.os_version
    }

    /// Processor model, or the target architecture if the model is not known.
    #[must_use]
    pub fn processor(&self) -> &str {
        &self.processor
    }

    /// Number of logical processors this process may execute on.
    #[must_use]
    pub fn cpu_count(&self) -> NonZero<usize> {
        self.cpu_count
    }
}

/// Counts the logical processors available to the current process.
#[must_use]
pub fn detect_cpu_count() -> NonZero<usize> {
    NonZero::new(ProcessorSet::default().len()).expect("a ProcessorSet is never empty")
}

#[cfg(unix)]
#[cfg_attr(test, mutants::skip)] // Depends on the host, only smoke-tested.
fn os_identification() -> (String, String) {
    use std::ffi::CStr;
    use std::mem;

    // SAFETY: `utsname` is a plain C struct of byte arrays, for which all-zero is valid.
    let mut uts: libc::utsname = unsafe { mem::zeroed() };

    // SAFETY: We pass a valid pointer to a correctly sized `utsname`, which is all uname needs.
    if unsafe { libc::uname(&raw mut uts) } != 0 {
        return (fallback_os_name(), String::new());
    }

    // SAFETY: On success, uname fills every field with a NUL-terminated string.
    let sysname = unsafe { CStr::from_ptr(uts.sysname.as_ptr()) };
    // SAFETY: As above.
    let release = unsafe { CStr::from_ptr(uts.release.as_ptr()) };

    (
        sysname.to_string_lossy().into_owned(),
        release.to_string_lossy().into_owned(),
    )
}

#[cfg(not(unix))]
fn os_identification() -> (String, String) {
    (fallback_os_name(), String::new())
}

fn fallback_os_name() -> String {
    match consts::OS {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        other => other.to_string(),
    }
}

#[cfg_attr(test, mutants::skip)] // Depends on the host, only smoke-tested.
fn processor_identification() -> String {
    #[cfg(target_os = "linux")]
    if let Some(model) = std::fs::read_to_string("/proc/cpuinfo")
        .ok()
        .and_then(|cpuinfo| parse_cpu_model(&cpuinfo))
    {
        return model;
    }

    consts::ARCH.to_string()
}

/// Extracts the first `model name` entry from `/proc/cpuinfo` contents.
#[cfg_attr(
    not(target_os = "linux"),
    allow(dead_code, reason = "only Linux has /proc/cpuinfo")
)]
fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim() == "model name")
        .map(|(_, value)| value.trim().to_string())
        .filter(|model| !model.is_empty())
}
