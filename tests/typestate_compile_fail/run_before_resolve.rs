/// This test should FAIL to compile
/// A freshly created execution has no run step

use codebox::{Engine, EngineConfig, ExecutionRequest, Language};

fn main() {
    let engine = Engine::new(EngineConfig::default()).expect("engine");
    let request = ExecutionRequest::new(Language::Python, "print(1)", None).expect("request");
    let execution = engine.begin(&request).expect("workspace");

    // This should fail: Execution<Created> doesn't have run
    execution.run();
}
