//! A step chain that is also a complete, standalone document.

use crate::chain::Chain;
use crate::error::ConfigError;
use crate::expressions::reference;
use crate::steps::{HelperLibrary, Step};
use crate::validate::Validator;
use crate::values::Input;

/// `StepName.OutputName` reference to a member step's declared output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocOutputRef {
    step: String,
    output: String,
}

impl DocOutputRef {
    pub fn parse(raw: &str) -> Option<Self> {
        let (step, output) = raw.split_once('.')?;
        if step.is_empty() || output.is_empty() || output.contains('.') {
            return None;
        }
        Some(Self {
            step: step.to_string(),
            output: output.to_string(),
        })
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Execution-context key the output is stored under.
    pub fn key(&self) -> String {
        format!("{}.{}", self.step, self.output)
    }
}

impl std::fmt::Display for DocOutputRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.step, self.output)
    }
}

/// How an automation's role reference resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleBinding {
    /// The reference names one of the automation's own inputs.
    Own(String),
    /// Not an own input: the enclosing document supplies the value.
    Inherited(String),
}

impl RoleBinding {
    pub fn context_key(&self) -> &str {
        match self {
            RoleBinding::Own(name) | RoleBinding::Inherited(name) => name,
        }
    }

    pub fn template(&self) -> String {
        reference(self.context_key())
    }
}

#[derive(Debug, Clone)]
pub struct Automation {
    name: String,
    description: Option<String>,
    inputs: Vec<Input>,
    assume_role: Option<String>,
    doc_outputs: Vec<DocOutputRef>,
    chain: Chain,
    helpers: HelperLibrary,
}

impl Automation {
    pub fn builder(name: impl Into<String>) -> AutomationBuilder {
        AutomationBuilder {
            name: name.into(),
            description: None,
            inputs: Vec::new(),
            assume_role: None,
            doc_outputs: Vec::new(),
            steps: Vec::new(),
            helpers: HelperLibrary::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.name() == name)
    }

    pub fn assume_role(&self) -> Option<&str> {
        self.assume_role.as_deref()
    }

    pub fn doc_outputs(&self) -> &[DocOutputRef] {
        &self.doc_outputs
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn helpers(&self) -> &HelperLibrary {
        &self.helpers
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.chain.order()
    }

    /// Resolve the role reference against this automation's own inputs.
    ///
    /// Only the local part (after the last `.`) is compared with input names;
    /// anything else is left for the enclosing context.
    pub fn role_binding(&self) -> Option<RoleBinding> {
        let role = self.assume_role.as_deref()?;
        let local = role.rsplit('.').next().unwrap_or(role);
        Some(if self.input(local).is_some() {
            RoleBinding::Own(local.to_string())
        } else {
            RoleBinding::Inherited(role.to_string())
        })
    }

    /// Context keys an enclosing chain must provide when this automation runs nested.
    pub fn forwarded_inputs(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .inputs
            .iter()
            .filter(|i| i.is_required())
            .map(|i| i.name().to_string())
            .collect();
        if let Some(RoleBinding::Inherited(key)) = self.role_binding() {
            keys.push(key);
        }
        keys
    }
}

pub struct AutomationBuilder {
    name: String,
    description: Option<String>,
    inputs: Vec<Input>,
    assume_role: Option<String>,
    doc_outputs: Vec<String>,
    steps: Vec<Step>,
    helpers: HelperLibrary,
}

impl AutomationBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn assume_role(mut self, reference: impl Into<String>) -> Self {
        self.assume_role = Some(reference.into());
        self
    }

    pub fn doc_output(mut self, reference: impl Into<String>) -> Self {
        self.doc_outputs.push(reference.into());
        self
    }

    pub fn helpers(mut self, helpers: HelperLibrary) -> Self {
        self.helpers = helpers;
        self
    }

    /// Append `step`; it becomes the successor of the previously added step.
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Link and validate the chain. Every violation is reported at once.
    pub fn build(self) -> Result<Automation, ConfigError> {
        let automation = Automation {
            name: self.name,
            description: self.description,
            inputs: self.inputs,
            assume_role: self.assume_role,
            doc_outputs: self
                .doc_outputs
                .iter()
                .filter_map(|r| DocOutputRef::parse(r))
                .collect(),
            chain: Chain::link(self.steps),
            helpers: self.helpers,
        };

        let mut v = Validator::new();
        v.validate_automation(&automation, &self.doc_outputs);
        v.finish()?;
        Ok(automation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_doc_output_refs() {
        let r = DocOutputRef::parse("Describe.State").unwrap();
        assert_eq!((r.step(), r.output()), ("Describe", "State"));
        assert_eq!(r.key(), "Describe.State");
        assert!(DocOutputRef::parse("State").is_none());
        assert!(DocOutputRef::parse("a.b.c").is_none());
        assert!(DocOutputRef::parse(".b").is_none());
    }
}
