use cobalt::types::EngineConfig;
use cobalt::uci::Engine;

fn main() {
    cobalt::board::init();
    let mut engine = Engine::new(EngineConfig::default());
    engine.run();
}
