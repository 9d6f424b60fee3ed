use kiln_codegen::rand::uniform_f32;
use kiln_runtime::{Runner, RuntimeConfig};

use crate::test::helpers::*;
use crate::test::reference::tile;
use crate::{Error, Tensor};

#[test]
fn test_const_neg_scenario() {
    let t = -&Tensor::full(&[10, 10], 10.0).unwrap();
    let t = t.realize().unwrap();

    assert_eq!(t.to_vec::<f32>().unwrap(), vec![-10.0; 100]);
}

#[test]
fn test_rand_expand_sin_scenario() {
    let t = Tensor::rand_seeded(&[10, 1, 1], 1).unwrap().try_expand(&[10, 5, 8]).unwrap();
    let actual = realize_f32(t.sin().unwrap());

    let draws: Vec<f32> = (0..10).map(|i| uniform_f32(1, i)).collect();
    let expected: Vec<f32> = tile(&draws, &[10, 1, 1], &[10, 5, 8]).iter().map(|x| x.sin()).collect();
    assert_close_f32(&actual, &expected, 1e-6);
}

#[test]
fn test_to_vec_requires_realize() {
    let t = Tensor::ones(&[3]).unwrap();

    let err = t.to_vec::<f32>().unwrap_err();
    assert!(matches!(err, Error::Ir { source: kiln_ir::Error::NotRealized { .. } }), "{err}");
}

#[test]
fn test_wrong_element_type_is_an_error() {
    let t = Tensor::ones(&[3]).unwrap().realize().unwrap();

    let err = t.to_vec::<f64>().unwrap_err();
    assert!(matches!(err, Error::Ir { source: kiln_ir::Error::Storage { .. } }), "{err}");
}

#[test]
fn test_realize_twice_reuses_storage() {
    let t = (&Tensor::ones(&[4]).unwrap() * &Tensor::full(&[4], 3.0).unwrap()).realize().unwrap();
    let storage = t.buffer().storage().unwrap();

    let t = t.realize().unwrap();
    assert!(std::rc::Rc::ptr_eq(&storage, &t.buffer().storage().unwrap()));
    assert!(t.schedule().unwrap().is_empty());
}

#[test]
fn test_schedule_lists_sources_first() {
    let a = Tensor::ones(&[2, 2]).unwrap();
    let b = a.sqrt().unwrap();
    let c = (&b + &a).sum(0).unwrap();

    let schedule = c.schedule().unwrap();
    let ids: Vec<_> = schedule.iter().map(|item| item.target.id()).collect();
    assert_eq!(ids.len(), 4);
    assert_eq!(ids[0], a.buffer().id());
    assert_eq!(ids[3], c.buffer().id());
}

#[test]
fn test_realize_with_explicit_runner() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Runner::new(RuntimeConfig::builder().cache_dir(dir.path().to_path_buf()).build());

    let t = Tensor::full(&[2, 3], 1.5).unwrap().exp2().unwrap().realize_with(&runner).unwrap();

    assert_eq!(runner.cache().len(), 2);
    assert_close_f32(&t.to_ndarray::<f32>().unwrap(), &[1.5f32.exp2(); 6], 1e-6);
}

#[test]
fn test_runtime_errors_surface() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig::builder()
        .compiler("kiln-no-such-compiler".to_string())
        .cache_dir(dir.path().to_path_buf())
        .build();
    let runner = Runner::new(config);

    let t = Tensor::ones(&[2]).unwrap();
    let err = t.clone().realize_with(&runner).unwrap_err();
    assert!(matches!(err, Error::Runtime { source: kiln_runtime::Error::ToolchainSpawn { .. } }), "{err}");
    assert!(!t.is_realized());
}

#[test]
fn test_preallocated_buffer_is_computed() {
    let t = -&Tensor::full(&[4], 2.0).unwrap();
    t.buffer().realize().unwrap();
    assert!(!t.is_realized());
    assert_eq!(t.schedule().unwrap().len(), 2);

    let t = t.realize().unwrap();
    assert!(t.is_realized());
    assert_eq!(t.to_vec::<f32>().unwrap(), [-2.0; 4]);
}
