/// This test should FAIL to compile
/// The run step only exists after compile, even for interpreted languages

use codebox::{Engine, EngineConfig, ExecutionRequest, Language};

fn main() {
    let engine = Engine::new(EngineConfig::default()).expect("engine");
    let request = ExecutionRequest::new(Language::Python, "print(1)", None).expect("request");
    let execution = engine.begin(&request).expect("workspace");

    let resolved = match execution.resolve_dependencies() {
        Ok(resolved) => resolved,
        Err(terminated) => {
            terminated.finish();
            return;
        }
    };

    // This should fail: Execution<Resolved> doesn't have run
    resolved.run();
}
