/// This test should FAIL to compile
/// Compiling requires resolved dependencies

use codebox::{Engine, EngineConfig, ExecutionRequest, Language};

fn main() {
    let engine = Engine::new(EngineConfig::default()).expect("engine");
    let request = ExecutionRequest::new(Language::C, "int main(){}", None).expect("request");
    let execution = engine.begin(&request).expect("workspace");

    // This should fail: Execution<Created> doesn't have compile
    let _ = execution.compile();
}
