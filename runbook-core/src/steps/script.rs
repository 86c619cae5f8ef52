use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid"));

pub const DEFAULT_SCRIPT_RUNTIME: &str = "python3.11";

/// Run an embedded script.
///
/// The script text is supplied verbatim. Helper functions it may call are
/// declared by name and looked up in the owning automation's [`HelperLibrary`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    runtime: String,
    handler: String,
    script: String,
    helpers: Vec<String>,
    input_payload: BTreeMap<String, String>,
}

impl ScriptStep {
    pub fn new(handler: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            runtime: DEFAULT_SCRIPT_RUNTIME.to_string(),
            handler: handler.into(),
            script: script.into(),
            helpers: Vec::new(),
            input_payload: BTreeMap::new(),
        }
    }

    pub fn runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    pub fn helper(mut self, name: impl Into<String>) -> Self {
        self.helpers.push(name.into());
        self
    }

    /// Pass the context value `reference` to the script as payload field `key`.
    pub fn payload(mut self, key: impl Into<String>, reference: impl Into<String>) -> Self {
        self.input_payload.insert(key.into(), reference.into());
        self
    }

    pub fn runtime_name(&self) -> &str {
        &self.runtime
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn helpers(&self) -> &[String] {
        &self.helpers
    }

    pub fn input_payload(&self) -> &BTreeMap<String, String> {
        &self.input_payload
    }
}

/// Named helper function sources that scripts may pull in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HelperLibrary {
    helpers: BTreeMap<String, String>,
}

impl HelperLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_helper(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.helpers.insert(name.into(), source.into());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn source(&self, name: &str) -> Option<&str> {
        self.helpers.get(name).map(String::as_str)
    }

    /// Library helpers that `script` calls, found by call sites of the form `name(`.
    pub fn calls_in(&self, script: &str) -> Vec<&str> {
        let called: BTreeSet<&str> = CALL_RE
            .captures_iter(script)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        self.helpers
            .keys()
            .map(String::as_str)
            .filter(|name| called.contains(*name))
            .collect()
    }

    /// Script text as emitted: declared helper sources followed by the script.
    pub fn assemble(&self, step: &ScriptStep) -> String {
        let mut parts: Vec<&str> = step
            .helpers()
            .iter()
            .filter_map(|h| self.source(h))
            .collect();
        parts.push(step.script());
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> HelperLibrary {
        HelperLibrary::new()
            .with_helper("retry_call", "def retry_call(fn):\n    return fn()")
            .with_helper("tag_of", "def tag_of(i, k):\n    return i[k]")
    }

    #[test]
    fn finds_called_helpers() {
        let script = "def handler(events, context):\n    return retry_call(lambda: 1)";
        assert_eq!(library().calls_in(script), vec!["retry_call"]);
    }

    #[test]
    fn ignores_names_that_are_not_called() {
        let script = "retry_call_count = 1\nprint( tag_of (x))\nmy_tag_of(1)";
        assert_eq!(library().calls_in(script), vec!["tag_of"]);
    }

    #[test]
    fn assembles_declared_helpers_before_script() {
        let step = ScriptStep::new("handler", "def handler(e, c):\n    return tag_of(e, 'k')")
            .helper("tag_of");
        let text = library().assemble(&step);
        assert!(text.starts_with("def tag_of(i, k):"));
        assert!(text.ends_with("return tag_of(e, 'k')"));
    }
}
