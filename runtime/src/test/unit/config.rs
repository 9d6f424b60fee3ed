use std::path::PathBuf;

use crate::config::DEFAULT_OPT_LEVEL;
use crate::{ClangToolchain, RuntimeConfig, Toolchain};

#[test]
fn test_builder_defaults() {
    let config = RuntimeConfig::builder().build();

    assert_eq!(config.opt_level, DEFAULT_OPT_LEVEL);
    assert!(config.cache_dir.ends_with("kiln-kernels"));
    assert!(!config.force_recompile);
    assert!(config.compiler == "clang" || config.compiler == "cc", "unexpected default: {}", config.compiler);
    assert_eq!(config, RuntimeConfig::default());
}

#[test]
fn test_builder_overrides() {
    let config = RuntimeConfig::builder()
        .compiler("gcc".to_string())
        .opt_level("-O0".to_string())
        .cache_dir(PathBuf::from("/tmp/kiln-test"))
        .force_recompile(true)
        .build();

    assert_eq!(config.compiler, "gcc");
    assert_eq!(config.opt_level, "-O0");
    assert_eq!(config.cache_dir, PathBuf::from("/tmp/kiln-test"));
    assert!(config.force_recompile);
}

#[test]
fn test_toolchain_from_config() {
    let config = RuntimeConfig::builder().compiler("gcc".to_string()).opt_level("-O3".to_string()).build();
    let toolchain = ClangToolchain::from_config(&config);

    assert_eq!(toolchain.compiler(), "gcc");
    assert_eq!(toolchain.opt_level(), "-O3");
    assert_eq!(toolchain.name(), "gcc");
}
