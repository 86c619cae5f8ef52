use std::sync::Arc;

use runbook_core::types::AutomationDoc;
use runbook_core::{
    parse_automation_document, parse_command_document, ApiCall, Automation, BranchStep, Choice,
    CommandDocument, CommandStep, DataType, DocumentFormat, EmitFormat, HelperLibrary, Input,
    Operation, Output, Platform, RunCommandStep, ScriptStep, Step,
};
use serde_json::{json, Value};

fn sample() -> Automation {
    Automation::builder("PatchFleet")
        .description("Patch an instance")
        .input(Input::new("InstanceId", DataType::String, "target"))
        .input(Input::new("Role", DataType::String, "role").with_default("arn:role"))
        .assume_role("Role")
        .then(
            Step::api_call(
                "Describe",
                ApiCall::new("ec2", "DescribeInstances")
                    .param("InstanceIds", vec!["{{ InstanceId }}"]),
            )
            .max_attempts(3)
            .on_failure("Recover")
            .output(Output::new("Platform", DataType::String)),
        )
        .then(Step::branch(
            "Route",
            BranchStep::new(vec![Choice::new(
                Operation::StringEquals,
                "Describe.Platform",
                "Linux",
                "Recover",
            )]),
        ))
        .then(Step::sleep("Settle", 30).timeout_seconds(60))
        .then(Step::pause("Recover").is_end(true))
        .doc_output("Describe.Platform")
        .build()
        .unwrap()
}

fn fragment(doc: &AutomationDoc, name: &str) -> Value {
    let step = doc.main_steps.iter().find(|s| s.name == name).unwrap();
    serde_json::to_value(step).unwrap()
}

#[test]
fn compile_is_deterministic() {
    let automation = sample();
    assert_eq!(automation.compile(), automation.compile());
    assert_eq!(
        automation.render(EmitFormat::Json).unwrap(),
        automation.render(EmitFormat::Json).unwrap()
    );
}

#[test]
fn emits_header_and_parameters() {
    let doc = sample().compile();
    assert_eq!(doc.schema_version, "0.3");
    assert_eq!(doc.assume_role.as_deref(), Some("{{ Role }}"));
    assert_eq!(doc.outputs, Some(vec!["Describe.Platform".to_string()]));
    let params = serde_json::to_value(&doc.parameters).unwrap();
    assert_eq!(params["InstanceId"], json!({"type": "String", "description": "target"}));
    assert_eq!(params["Role"]["default"], json!("arn:role"));
}

#[test]
fn omits_default_attempts_and_timeout() {
    let doc = sample().compile();
    let describe = fragment(&doc, "Describe");
    assert_eq!(describe["maxAttempts"], json!(3));
    assert!(describe.get("timeoutSeconds").is_none());
    assert_eq!(describe["onFailure"], json!("step:Recover"));
    assert_eq!(describe["inputs"]["Service"], json!("ec2"));
    assert_eq!(describe["outputs"][0]["Selector"], json!("$.Platform"));

    let settle = fragment(&doc, "Settle");
    assert!(settle.get("maxAttempts").is_none());
    assert_eq!(settle["timeoutSeconds"], json!(60));
    assert_eq!(settle["inputs"]["Duration"], json!("PT30S"));

    assert_eq!(fragment(&doc, "Recover")["isEnd"], json!(true));
}

#[test]
fn branch_defaults_to_next_step() {
    let doc = sample().compile();
    let route = fragment(&doc, "Route");
    assert_eq!(route["action"], json!("aws:branch"));
    assert_eq!(
        route["inputs"]["Choices"][0],
        json!({"NextStep": "Recover", "Variable": "{{ Describe.Platform }}", "StringEquals": "Linux"})
    );
    assert_eq!(route["inputs"]["Default"], json!("Settle"));
}

#[test]
fn script_embeds_helpers_and_payload() {
    let helpers = HelperLibrary::new().with_helper("shout", "def shout(s):\n    return s.upper()");
    let automation = Automation::builder("Scripted")
        .input(Input::new("Word", DataType::String, ""))
        .helpers(helpers)
        .then(
            Step::script(
                "Run",
                ScriptStep::new("handler", "def handler(e, c):\n    return {'Out': shout(e['w'])}")
                    .helper("shout")
                    .payload("w", "Word"),
            )
            .output(Output::payload("Out", DataType::String)),
        )
        .build()
        .unwrap();
    let run = fragment(&automation.compile(), "Run");
    assert_eq!(run["inputs"]["Runtime"], json!("python3.11"));
    assert_eq!(run["inputs"]["InputPayload"], json!({"w": "{{ Word }}"}));
    assert!(run["inputs"]["Script"]
        .as_str()
        .unwrap()
        .starts_with("def shout(s):"));
    assert_eq!(run["outputs"][0]["Selector"], json!("$.Payload.Out"));
}

#[test]
fn nested_and_run_command_fragments() {
    let inner = Arc::new(
        Automation::builder("InnerDoc")
            .input(Input::new("Target", DataType::String, ""))
            .then(Step::pause("Hold"))
            .build()
            .unwrap(),
    );
    let command = Arc::new(
        CommandDocument::builder("Uptime")
            .then(CommandStep::shell("show", ["uptime"]))
            .build()
            .unwrap(),
    );
    let outer = Automation::builder("OuterDoc")
        .input(Input::new("Target", DataType::String, ""))
        .then(Step::automation("Nested", inner))
        .then(Step::run_command(
            "Remote",
            RunCommandStep::new(command).instance("i-123"),
        ))
        .build()
        .unwrap();
    let doc = outer.compile();

    let nested = fragment(&doc, "Nested");
    assert_eq!(nested["action"], json!("aws:executeAutomation"));
    assert_eq!(nested["inputs"]["DocumentName"], json!("InnerDoc"));
    assert_eq!(nested["inputs"]["RuntimeParameters"], json!({"Target": "{{ Target }}"}));

    let remote = fragment(&doc, "Remote");
    assert_eq!(remote["inputs"]["InstanceIds"], json!(["i-123"]));
    assert_eq!(remote["outputs"][1]["Name"], json!("ResponseCode"));
    assert_eq!(remote["outputs"][1]["Type"], json!("Integer"));
}

#[test]
fn command_document_pins_single_platform() {
    let doc = CommandDocument::builder("Restart")
        .parameter(Input::new("Unit", DataType::String, ""))
        .then(
            CommandStep::shell("restart", ["systemctl restart {{ Unit }}"])
                .platforms([Platform::Linux])
                .timeout_seconds(120)
                .continue_on_failure(),
        )
        .then(CommandStep::shell("report", ["echo done"]).finally())
        .build()
        .unwrap()
        .compile();

    let first = serde_json::to_value(&doc.main_steps[0]).unwrap();
    assert_eq!(doc.schema_version, "2.2");
    assert_eq!(first["precondition"], json!({"StringEquals": ["platformType", "Linux"]}));
    assert_eq!(first["inputs"]["timeoutSeconds"], json!(120));
    assert_eq!(first["onFailure"], json!("continue"));
    let last = serde_json::to_value(&doc.main_steps[1]).unwrap();
    assert_eq!(last["finallyStep"], json!(true));
}

#[test]
fn multi_platform_document_has_no_precondition() {
    let doc = CommandDocument::builder("Anywhere")
        .then(CommandStep::shell("a", ["true"]))
        .build()
        .unwrap()
        .compile();
    assert!(doc.main_steps[0].precondition.is_none());
}

#[test]
fn written_documents_parse_back() {
    let dir = tempfile::tempdir().unwrap();
    let automation = sample();

    let json_path = dir.path().join("patch.json");
    automation.write_to(&json_path, EmitFormat::Json).unwrap();
    let text = std::fs::read_to_string(&json_path).unwrap();
    let parsed = parse_automation_document(&text, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Json);
    assert_eq!(parsed.document, automation.compile());

    let command = CommandDocument::builder("Uptime")
        .then(CommandStep::shell("show", ["uptime"]))
        .build()
        .unwrap();
    let yaml_path = dir.path().join("uptime.yaml");
    command.write_to(&yaml_path, EmitFormat::Yaml).unwrap();
    let text = std::fs::read_to_string(&yaml_path).unwrap();
    let parsed = parse_command_document(&text, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Yaml);
    assert_eq!(parsed.document, command.compile());
}
