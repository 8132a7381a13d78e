/// This test should FAIL to compile
/// A state is consumed by its transition and cannot be used again

use codebox::{Engine, EngineConfig, ExecutionRequest, Language};

fn main() {
    let engine = Engine::new(EngineConfig::default()).expect("engine");
    let request = ExecutionRequest::new(Language::Python, "print(1)", None).expect("request");
    let execution = engine.begin(&request).expect("workspace");

    let _first = execution.resolve_dependencies();

    // This should fail: execution was moved
    let _second = execution.resolve_dependencies();
}
