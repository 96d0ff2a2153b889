use headless_host::engine::{Engine, EngineArgs, EngineLauncher, HostAdapter};
use headless_host::errors::{HostError, Result};

use crate::Recorder;

type Script = Box<dyn Fn(&HostAdapter) -> Result<()>>;

/// A fake engine launcher that:
/// - records the runner id and whether launch ran on the designated thread
/// - runs a test-provided script against the adapter (usually posting tasks)
/// - records when the engine is shut down.
pub struct ScriptedLauncher {
    recorder: Recorder<String>,
    script: Script,
}

impl ScriptedLauncher {
    pub fn new(
        recorder: Recorder<String>,
        script: impl Fn(&HostAdapter) -> Result<()> + 'static,
    ) -> Self {
        Self {
            recorder,
            script: Box::new(script),
        }
    }
}

impl EngineLauncher for ScriptedLauncher {
    fn launch(&self, args: EngineArgs) -> Result<Box<dyn Engine>> {
        let runner = &args.platform_runner.runner;
        self.recorder.record(format!(
            "launch runner={} designated={}",
            args.platform_runner.identifier,
            runner.runs_on_designated_thread()
        ));
        (self.script)(runner)?;
        Ok(Box::new(ScriptedEngine {
            recorder: self.recorder.clone(),
        }))
    }
}

struct ScriptedEngine {
    recorder: Recorder<String>,
}

impl Engine for ScriptedEngine {
    fn shutdown(&mut self) -> Result<()> {
        self.recorder.record("shutdown".to_string());
        Ok(())
    }
}

/// Launcher whose engine never starts.
pub struct FailingLauncher;

impl EngineLauncher for FailingLauncher {
    fn launch(&self, _args: EngineArgs) -> Result<Box<dyn Engine>> {
        Err(HostError::EngineStart("engine refused to start".to_string()))
    }
}
