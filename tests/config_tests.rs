//! Configuration loading from `.env` and the process environment.

mod helpers;

use helpers::{write_file, TestEnv};
use serial_test::serial;
use uspack::config::Config;
use uspack::platform::Os;

const VARS: &[&str] = &[
    "USPACK_VERSION",
    "USPACK_PLATFORM",
    "USPACK_CMAKE",
    "USPACK_BUILD_TYPE",
];

fn clear_vars() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_env_file_is_read() {
    clear_vars();
    let env = TestEnv::new();
    write_file(
        &env.work_dir.join(".env"),
        "# local overrides\nUSPACK_VERSION=3.1.0\nUSPACK_PLATFORM=\"windows\"\n",
    );

    let config = Config::load(&env.work_dir).unwrap();
    assert_eq!(config.version, "3.1.0");
    assert_eq!(config.platform, Os::Windows);
    assert_eq!(config.source_dir(), env.work_dir.join("CppMicroServices"));
}

#[test]
#[serial]
fn test_environment_overrides_env_file() {
    clear_vars();
    let env = TestEnv::new();
    write_file(&env.work_dir.join(".env"), "USPACK_CMAKE=/from/file/cmake\nUSPACK_PLATFORM=linux\n");
    std::env::set_var("USPACK_CMAKE", "/from/env/cmake");

    let config = Config::load(&env.work_dir).unwrap();
    clear_vars();

    assert_eq!(config.cmake, "/from/env/cmake");
    assert_eq!(config.platform, Os::Linux);
}

#[test]
#[serial]
fn test_defaults_without_env_file() {
    clear_vars();
    let env = TestEnv::new();
    std::env::set_var("USPACK_PLATFORM", "macos");

    let config = Config::load(&env.work_dir).unwrap();
    clear_vars();

    assert_eq!(config.version, "3.0.0");
    assert_eq!(config.platform, Os::MacOs);
    assert_eq!(config.cmake, "cmake");
}

#[test]
#[serial]
#[cfg(unix)]
fn test_non_utf8_environment_is_ignored() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    clear_vars();
    let env = TestEnv::new();
    let bad = OsStr::from_bytes(b"\xff\xfe");
    std::env::set_var("USPACK_TEST_BINARY", bad);
    std::env::set_var("USPACK_PLATFORM", "linux");
    std::env::set_var("USPACK_BUILD_TYPE", "MinSizeRel");

    let result = Config::load(&env.work_dir);
    std::env::remove_var("USPACK_TEST_BINARY");
    clear_vars();

    let config = result.unwrap();
    assert_eq!(config.platform, Os::Linux);
    assert_eq!(config.build_type, uspack::platform::BuildType::MinSizeRel);
}
