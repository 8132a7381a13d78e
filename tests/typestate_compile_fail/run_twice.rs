/// This test should FAIL to compile
/// Running consumes the chain and its workspace

use codebox::{Engine, EngineConfig, ExecutionRequest, Language};

fn main() {
    let engine = Engine::new(EngineConfig::default()).expect("engine");
    let request = ExecutionRequest::new(Language::Python, "print(1)", None).expect("request");
    let execution = engine.begin(&request).expect("workspace");

    let compiled = match execution.resolve_dependencies().and_then(|r| r.compile()) {
        Ok(compiled) => compiled,
        Err(terminated) => {
            terminated.finish();
            return;
        }
    };

    let _ = compiled.run();

    // This should fail: compiled was moved
    let _ = compiled.run();
}
