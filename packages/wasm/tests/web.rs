//! Browser tests for the JavaScript boundary.

#![cfg(target_arch = "wasm32")]

use euclid_graph_wasm::EuclideanGraphWasm;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn triangle() -> EuclideanGraphWasm {
    let mut graph = EuclideanGraphWasm::new();
    graph.insert(0.0, 0.0, 5.0).unwrap();
    graph.insert(3.0, 0.0, 5.0).unwrap();
    graph.insert(3.0, 4.0, 5.0).unwrap();
    graph
}

#[wasm_bindgen_test]
fn test_insert_and_query() {
    let graph = triangle();
    assert_eq!(graph.size(), 3);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.nearest_neighbor(2.9, 3.8).unwrap().to_vec(), vec![3.0, 4.0]);
    assert_eq!(graph.nearest_index(0.1, 0.1).unwrap(), 0);
    assert_eq!(graph.k_nearest(0.0, 0.0, 2).unwrap().to_vec(), vec![0.0, 0.0, 3.0, 0.0]);
    assert_eq!(graph.radius_search(0.0, 0.0, 10.0).unwrap().length(), 6);
}

#[wasm_bindgen_test]
fn test_a_star_interleaved_path() {
    let graph = triangle();
    let path = graph.a_star(0.0, 0.0, 3.0, 4.0).to_vec();
    assert_eq!(path, vec![0.0, 0.0, 3.0, 4.0]);

    // Excluding the far corner forces the empty result
    let blocked = graph.a_star_exclusive(0.0, 0.0, 3.0, 4.0, &[2]).to_vec();
    assert!(blocked.is_empty());
}

#[wasm_bindgen_test]
fn test_errors_cross_as_js_errors() {
    let mut graph = EuclideanGraphWasm::new();
    assert!(graph.insert(0.0, 0.0, -1.0).is_err());
    assert!(graph.nearest_neighbor(0.0, 0.0).is_err());
    assert!(graph.remove_index(7).is_err());
    assert!(graph.get_point(7).is_none());
}

#[wasm_bindgen_test]
fn test_remove_and_adjust() {
    let mut graph = triangle();
    assert_eq!(graph.remove_index(1).unwrap().to_vec(), vec![3.0, 0.0]);
    assert_eq!(graph.edge_count(), 1);

    graph.adjust_points(1.0, 1.0).unwrap();
    assert_eq!(graph.get_point(2).unwrap().to_vec(), vec![4.0, 5.0]);
    assert_eq!(graph.remove_point(1.0, 1.0, 0.001).unwrap(), 0);
    assert_eq!(graph.size(), 1);
}

#[wasm_bindgen_test]
fn test_from_config() {
    assert!(EuclideanGraphWasm::from_config(JsValue::UNDEFINED).is_ok());

    let config = js_sys::Object::new();
    js_sys::Reflect::set(&config, &"max_expansions".into(), &JsValue::from(1)).unwrap();
    let mut graph = EuclideanGraphWasm::from_config(config.into()).unwrap();
    let positions: Vec<f64> = (0..10).flat_map(|i| [i as f64, 0.0]).collect();
    assert_eq!(graph.insert_many(&positions, 1.0).unwrap().len(), 10);
    assert!(graph.a_star(0.0, 0.0, 9.0, 0.0).to_vec().is_empty());
}

#[wasm_bindgen_test]
fn test_invalid_input_is_rejected() {
    let mut graph = triangle();

    assert!(graph.insert_many(&[0.0, 0.0, 1.0], 0.0).is_err());
    assert_eq!(graph.size(), 3);

    assert!(graph.remove_point(f64::NAN, f64::NAN, 0.001).is_err());
    assert!(graph.nearest_neighbor(f64::NAN, 0.0).is_err());
    assert!(graph.k_nearest(0.0, f64::INFINITY, 1).is_err());
    assert!(graph.radius_search(f64::NAN, 0.0, 1.0).is_err());
    assert_eq!(graph.size(), 3);

    assert!(graph.adjust_points(f64::NAN, 0.0).is_err());
    assert_eq!(graph.get_point(0).unwrap().to_vec(), vec![0.0, 0.0]);

    assert!(graph.a_star(f64::NAN, 0.0, 3.0, 4.0).to_vec().is_empty());
}
