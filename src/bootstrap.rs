use std::{
    ffi::OsStr,
    io::{self, Write},
    path::{Path, PathBuf},
    process::Command,
};

use log::{error, info, LevelFilter};

/// Log verbosity selected on the test-runner command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// `full-log`: debug level with a module:line - LEVEL prefix.
    Full,
    /// `no-log`: warnings and above only.
    Quiet,
    /// Default: info level, bare messages.
    Plain,
}

impl LogMode {
    pub fn from_args<'a>(args: impl IntoIterator<Item = &'a str>) -> LogMode {
        let mut mode = LogMode::Plain;
        for arg in args {
            match arg {
                "full-log" => return LogMode::Full,
                "no-log" => mode = LogMode::Quiet,
                _ => {}
            }
        }
        mode
    }

    pub fn is_token(arg: &str) -> bool {
        matches!(arg, "full-log" | "no-log")
    }
}

pub fn init_logging(mode: LogMode) {
    match mode {
        LogMode::Full => env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{}:{} - {}: {}",
                    record.module_path().unwrap_or("?"),
                    record.line().unwrap_or(0),
                    record.level(),
                    record.args()
                )
            })
            .init(),
        LogMode::Quiet => env_logger::Builder::new()
            .filter_level(LevelFilter::Warn)
            .init(),
        LogMode::Plain => env_logger::Builder::new()
            .filter_level(LevelFilter::Info)
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .init(),
    }
}

/// Finds test programs in `dir`: regular files whose stem ends in `_test`,
/// in sorted order.
pub fn discover(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut tests = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let stem = path.file_stem().and_then(OsStr::to_str);
        if stem.is_some_and(|stem| stem.ends_with("_test")) {
            tests.push(path);
        }
    }
    tests.sort();
    Ok(tests)
}

/// Runs each discovered test as a subprocess; returns whether all passed.
pub fn run_suite(tests: &[PathBuf]) -> bool {
    let mut failures = 0usize;
    for test in tests {
        match Command::new(test).status() {
            Ok(status) if status.success() => info!("ok - {}", test.display()),
            Ok(status) => {
                error!("FAIL - {} ({status})", test.display());
                failures += 1;
            }
            Err(err) => {
                error!("FAIL - {} could not run: {err}", test.display());
                failures += 1;
            }
        }
    }
    info!("Ran {} tests, {} failures", tests.len(), failures);
    failures == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn log_mode_tokens() {
        assert_eq!(LogMode::from_args([]), LogMode::Plain);
        assert_eq!(LogMode::from_args(["foo"]), LogMode::Plain);
        assert_eq!(LogMode::from_args(["no-log"]), LogMode::Quiet);
        assert_eq!(LogMode::from_args(["full-log"]), LogMode::Full);
        // full-log wins over no-log
        assert_eq!(LogMode::from_args(["no-log", "full-log"]), LogMode::Full);
    }

    #[test]
    fn discover_matches_test_stems_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b_test", "a_test.sh", "helper.sh", "testdata"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub_test")).unwrap();

        let found = discover(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("a_test.sh"), dir.path().join("b_test")]
        );
    }

    #[test]
    fn discover_missing_dir_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(discover(&dir.path().join("nope")).is_err());
    }

    #[cfg(unix)]
    fn write_script(path: &Path, exit_code: i32) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::write(path, format!("#!/bin/sh\nexit {exit_code}\n")).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn suite_passes_when_all_tests_pass() {
        let dir = tempdir().unwrap();
        write_script(&dir.path().join("a_test"), 0);
        write_script(&dir.path().join("b_test"), 0);
        let tests = discover(dir.path()).unwrap();
        assert!(run_suite(&tests));
    }

    #[cfg(unix)]
    #[test]
    fn suite_fails_when_any_test_fails() {
        let dir = tempdir().unwrap();
        write_script(&dir.path().join("a_test"), 0);
        write_script(&dir.path().join("b_test"), 1);
        let tests = discover(dir.path()).unwrap();
        assert!(!run_suite(&tests));
    }
}
