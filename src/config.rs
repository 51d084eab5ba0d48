// =============================================================================
// External tool constants
// =============================================================================

/// Recognized manifest file names, in lookup preference order.
pub const CONANFILE_NAMES: [&str; 2] = ["conanfile.py", "conanfile.txt"];

/// Candidate file names for the Conan executable on PATH.
#[cfg(unix)]
pub const CONAN_EXECUTABLE_NAMES: [&str; 1] = ["conan"];
#[cfg(not(unix))]
pub const CONAN_EXECUTABLE_NAMES: [&str; 3] = ["conan.exe", "conan.bat", "conan"];

// =============================================================================
// Concurrency constants
// =============================================================================

/// How many remote searches may be in flight at once during a check.
pub const MAX_CONCURRENT_SEARCHES: usize = 8;
