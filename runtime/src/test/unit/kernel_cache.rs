//! Compile cache: memory hits, disk reuse, forced recompilation and failures.

use kiln_device::Storage;
use kiln_dtype::DType;
use kiln_ir::{Graph, LazyBuffer, LoadOp, OpArg, UnaryOp};

use crate::test::helpers::{CountingToolchain, config_in, counting_runner, render_last};
use crate::{CacheStats, ClangToolchain, Error, KernelCache, Runner, RuntimeConfig};

fn const_neg(g: &Graph) -> LazyBuffer {
    g.load(LoadOp::Const, &[10, 10], Some(OpArg::Value(10.0))).unwrap().unary(UnaryOp::Neg).unwrap()
}

#[test]
fn test_same_key_compiles_once() {
    let dir = tempfile::tempdir().unwrap();
    let (runner, toolchain) = counting_runner(dir.path());

    // Two independent graphs produce identical keys.
    let first = const_neg(&Graph::new());
    let second = const_neg(&Graph::new());
    runner.materialize(&first).unwrap();
    runner.materialize(&second).unwrap();

    assert_eq!(toolchain.count(), 2, "one compile per distinct key");
    assert_eq!(runner.cache().len(), 2);
    assert_eq!(runner.cache().stats(), CacheStats { hits: 2, disk_hits: 0, compilations: 2 });
    assert_eq!(second.to_vec::<f32>().unwrap(), [-10.0; 100]);
}

#[test]
fn test_artifacts_are_reused_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (runner, _) = counting_runner(dir.path());
    runner.materialize(&const_neg(&Graph::new())).unwrap();

    let kernel = render_last(&const_neg(&Graph::new()));
    assert!(runner.cache().source_path(&kernel.key).is_file(), "source is persisted next to the artifact");
    assert!(runner.cache().artifact_path(&kernel.key).is_file());

    let (fresh, toolchain) = counting_runner(dir.path());
    let b = const_neg(&Graph::new());
    fresh.materialize(&b).unwrap();

    assert_eq!(toolchain.count(), 0);
    assert_eq!(fresh.cache().stats(), CacheStats { hits: 0, disk_hits: 2, compilations: 0 });
    assert_eq!(b.to_vec::<f32>().unwrap(), [-10.0; 100]);
}

#[test]
fn test_force_recompile_ignores_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (runner, _) = counting_runner(dir.path());
    runner.materialize(&const_neg(&Graph::new())).unwrap();

    let config = RuntimeConfig::builder().cache_dir(dir.path().to_path_buf()).force_recompile(true).build();
    let toolchain = CountingToolchain::new(&config);
    let forced = Runner::with_toolchain(config, toolchain.clone());
    let b = const_neg(&Graph::new());
    forced.materialize(&b).unwrap();

    assert_eq!(toolchain.count(), 2);
    assert_eq!(b.to_vec::<f32>().unwrap(), [-10.0; 100]);
}

#[test]
fn test_compilation_error_carries_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let cache = KernelCache::new(&config, ClangToolchain::from_config(&config));

    let mut kernel = render_last(&const_neg(&Graph::new()));
    kernel.source = "void this is not C {".to_string();

    let err = cache.get_or_compile(&kernel).unwrap_err();
    match &err {
        Error::Compilation { source_path, diagnostics, .. } => {
            assert_eq!(source_path, &cache.source_path(&kernel.key));
            assert!(!diagnostics.is_empty(), "toolchain stderr must be kept");
        }
        other => panic!("expected a compilation error, got {other}"),
    }
    assert!(!cache.artifact_path(&kernel.key).exists(), "no partial artifact");
    assert!(cache.is_empty());
}

#[test]
fn test_missing_symbol_is_link_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let cache = KernelCache::new(&config, ClangToolchain::from_config(&config));

    let mut kernel = render_last(&const_neg(&Graph::new()));
    kernel.source = "void some_other_kernel(float* restrict out, const float* restrict in0) { }\n".to_string();

    let err = cache.get_or_compile(&kernel).unwrap_err();
    assert!(matches!(&err, Error::Link { key, .. } if key == kernel.key.name()), "{err}");
    assert!(!cache.contains(&kernel.key));
}

#[test]
fn test_missing_compiler_fails_to_spawn() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig::builder()
        .compiler("kiln-no-such-compiler".to_string())
        .cache_dir(dir.path().to_path_buf())
        .build();
    let runner = Runner::new(config);

    let err = runner.materialize(&const_neg(&Graph::new())).unwrap_err();
    assert!(matches!(&err, Error::ToolchainSpawn { compiler, .. } if compiler == "kiln-no-such-compiler"), "{err}");
}

#[test]
fn test_failed_compile_allocates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig::builder()
        .compiler("kiln-no-such-compiler".to_string())
        .cache_dir(dir.path().to_path_buf())
        .build();
    let runner = Runner::new(config);
    let a = Graph::new().load(LoadOp::Const, &[10, 10], Some(OpArg::Value(10.0))).unwrap();
    let b = a.unary(UnaryOp::Neg).unwrap();

    assert!(runner.materialize(&b).is_err());
    assert!(!a.is_realized());
    assert!(!b.is_realized());
}

#[test]
fn test_invoke_checks_arity_and_dtype() {
    let dir = tempfile::tempdir().unwrap();
    let (runner, _) = counting_runner(dir.path());
    let kernel = runner.cache().get_or_compile(&render_last(&const_neg(&Graph::new()))).unwrap();
    assert_eq!(kernel.arity(), 1);
    assert_eq!(kernel.dtype(), DType::Float32);

    let out = Storage::allocate(DType::Float32, 100).unwrap();
    let err = unsafe { kernel.invoke(&out, &[]) }.unwrap_err();
    assert!(matches!(err, Error::ArityMismatch { expected: 1, actual: 0, .. }), "{err}");

    let src = Storage::allocate(DType::Float64, 100).unwrap();
    let err = unsafe { kernel.invoke(&out, &[&src]) }.unwrap_err();
    assert!(matches!(err, Error::DTypeMismatch { expected: DType::Float32, actual: DType::Float64, .. }), "{err}");

    let src = Storage::from_slice(&[3.0f32; 100]).unwrap();
    unsafe { kernel.invoke(&out, &[&src]) }.unwrap();
    assert_eq!(out.to_vec::<f32>().unwrap(), [-3.0; 100]);
}

#[test]
#[tracing_test::traced_test]
fn test_cache_logs_hits_and_misses() {
    let dir = tempfile::tempdir().unwrap();
    let (runner, _) = counting_runner(dir.path());
    let kernel = render_last(&const_neg(&Graph::new()));

    runner.cache().get_or_compile(&kernel).unwrap();
    assert!(logs_contain("kernel cache miss"));
    assert!(logs_contain("kernel compiled"));

    runner.cache().get_or_compile(&kernel).unwrap();
    assert!(logs_contain("kernel cache hit"));
}
