use std::{collections::HashMap, path::PathBuf};

use super::{BuildHost, HostError, Invocation, RunOutput};

/// Scripted host for sequencer tests: records every invocation and replays
/// canned outputs. A registered response matches on an argv prefix and is
/// consumed on first use, so repeated commands can be given distinct outputs
/// in registration order. Unmatched invocations succeed with empty output.
pub struct FakeHost {
    pub invocations: Vec<Invocation>,
    responses: Vec<(Vec<String>, RunOutput)>,
    properties: HashMap<String, String>,
    tools: HashMap<String, PathBuf>,
}

impl FakeHost {
    pub fn new() -> Self {
        FakeHost {
            invocations: Vec::new(),
            responses: Vec::new(),
            properties: HashMap::new(),
            tools: HashMap::new(),
        }
    }

    pub fn respond(&mut self, argv_prefix: &[&str], stdout: &str) {
        self.responses.push((
            argv_prefix.iter().map(|s| s.to_string()).collect(),
            RunOutput {
                success: true,
                stdout: Some(stdout.to_string()),
                stderr: String::new(),
            },
        ));
    }

    pub fn fail(&mut self, argv_prefix: &[&str], stderr: &str) {
        self.responses.push((
            argv_prefix.iter().map(|s| s.to_string()).collect(),
            RunOutput {
                success: false,
                stdout: Some(String::new()),
                stderr: stderr.to_string(),
            },
        ));
    }

    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_tool(mut self, name: &str, path: &str) -> Self {
        self.tools.insert(name.to_string(), PathBuf::from(path));
        self
    }

    pub fn argv(&self) -> Vec<Vec<String>> {
        self.invocations.iter().map(|i| i.args.clone()).collect()
    }

    pub fn step_names(&self) -> Vec<String> {
        self.invocations
            .iter()
            .map(|i| i.step_name.clone())
            .collect()
    }
}

impl BuildHost for FakeHost {
    fn run(&mut self, invocation: &Invocation) -> Result<RunOutput, HostError> {
        self.invocations.push(invocation.clone());
        let matched = self.responses.iter().position(|(prefix, _)| {
            invocation.args.len() >= prefix.len() && invocation.args[..prefix.len()] == prefix[..]
        });
        if let Some(index) = matched {
            return Ok(self.responses.remove(index).1);
        }
        Ok(RunOutput {
            success: true,
            stdout: invocation.capture_stdout.then(String::new),
            stderr: String::new(),
        })
    }

    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: String) {
        self.properties.insert(name.to_string(), value);
    }

    fn resolve_tool(&self, name: &str) -> Option<PathBuf> {
        self.tools.get(name).cloned()
    }
}
