//! End-to-end conversation flows through the comms state with a scripted
//! model: commands, tool execution, persistence, and per-chat isolation.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use aas_agent::agent::AgentContext;
use aas_agent::comms::{CommsState, Reply};
use aas_agent::llm::providers::dummy::DummyProvider;
use aas_agent::llm::{ChatMessage, LlmProvider, ToolCall};

fn state(dummy: &DummyProvider, data_dir: &Path) -> CommsState {
    CommsState::new(AgentContext {
        provider: LlmProvider::Dummy(dummy.clone()),
        prompts_dir: PathBuf::from("config/prompts"),
        data_dir: data_dir.to_path_buf(),
        history_cap: 20,
    })
}

fn tool_calls(calls: &[(&str, &str)]) -> ChatMessage {
    ChatMessage::assistant_tool_calls(
        None,
        calls
            .iter()
            .enumerate()
            .map(|(i, (name, args))| ToolCall::function(format!("call_{i}"), *name, *args))
            .collect(),
    )
}

fn text(reply: Reply) -> String {
    reply.to_plain_text()
}

#[tokio::test]
async fn build_save_and_reload_a_motor() {
    let dir = tempfile::tempdir().unwrap();
    let dummy = DummyProvider::default();
    let s = state(&dummy, dir.path());

    dummy.push_reply(tool_calls(&[
        (
            "create_aas",
            r#"{"aas_id":"https://example.com/aas/motor","id_short":"Motor","global_asset_id":"https://example.com/asset/motor-001"}"#,
        ),
        ("add_submodel", r#"{"submodel_id":"https://example.com/submodels/td","id_short":"TechnicalData"}"#),
        (
            "add_property",
            r#"{"submodel_id_short":"TechnicalData","property_name":"Temperature","value_type":"float","value":25.5}"#,
        ),
        (
            "add_property",
            r#"{"submodel_id_short":"TechnicalData","property_name":"RatedSpeed","value_type":"int","value":"1450"}"#,
        ),
    ]));
    dummy.push_reply(ChatMessage::assistant("Your motor is ready."));
    assert_eq!(text(s.handle("pty0", "pty0", "Create a motor with temperature 25.5").await), "Your motor is ready.");

    // The second model call saw every tool result.
    let second = dummy.requests().pop().unwrap();
    let tool_results: Vec<_> = second
        .messages
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref().map(|_| m.content.clone().unwrap_or_default()))
        .collect();
    assert_eq!(tool_results.len(), 4);
    assert!(tool_results.iter().all(|r| r.starts_with("✅")));

    let state_reply = text(s.handle("pty0", "pty0", "/state").await);
    assert!(state_reply.starts_with("Current State:\n\nCurrent AAS: Motor (https://example.com/aas/motor)"));
    assert!(state_reply.contains("    • Temperature (Float): 25.5"));
    assert!(state_reply.contains("    • RatedSpeed (Int): 1450"));

    dummy.push_reply(tool_calls(&[("save_aas", r#"{"filename":"motor"}"#)]));
    dummy.push_reply(ChatMessage::assistant("Saved."));
    assert_eq!(text(s.handle("pty0", "pty0", "save it as motor").await), "Saved.");

    let saved: Value = serde_json::from_str(&fs::read_to_string(dir.path().join("motor.json")).unwrap()).unwrap();
    assert_eq!(saved["assetAdministrationShells"][0]["idShort"], "Motor");
    let elements = &saved["submodels"][0]["submodelElements"];
    assert_eq!(elements[0]["valueType"], "xs:float");
    assert_eq!(elements[0]["value"], "25.5");
    assert_eq!(elements[1]["value"], "1450");

    // A different chat loads the file into its own session.
    dummy.push_reply(tool_calls(&[("load_aas", r#"{"filename":"motor.json"}"#)]));
    dummy.push_failure("rate limited");
    assert_eq!(
        text(s.handle("telegram0", "telegram0:42", "load motor.json").await),
        "✅ Loaded 'Motor' from 'motor.json' (1 submodels, 2 elements)"
    );
    let tree = s.handle("telegram0", "telegram0:42", "/tree").await;
    assert!(matches!(&tree, Reply::Code(t) if t.contains("📌 RatedSpeed")));
}

#[tokio::test]
async fn loading_preserves_foreign_elements() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy("tests/fixtures/pump.json", dir.path().join("pump.json")).unwrap();
    let dummy = DummyProvider::scripted([
        tool_calls(&[
            ("load_aas", r#"{"filename":"pump"}"#),
            ("update_property", r#"{"submodel_id_short":"Nameplate","property_name":"MaxFlow","value":14}"#),
            ("update_property", r#"{"submodel_id_short":"Nameplate","property_name":"Manual","value":"x"}"#),
            ("save_aas", r#"{"filename":"pump-v2.json"}"#),
        ]),
        ChatMessage::assistant(""),
    ]);
    let s = state(&dummy, dir.path());

    let reply = text(s.handle("pty0", "pty0", "bump the flow").await);
    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines[0], "✅ Loaded 'Pump' from 'pump.json' (1 submodels, 3 elements, 1 concept(s))");
    assert_eq!(lines[1], "✅ Updated 'MaxFlow': 12.5 → 14.0");
    assert_eq!(lines[2], "❌ Element 'Manual' is not a Property");
    assert_eq!(lines[3], "✅ Saved AAS to 'pump-v2.json' (1 submodels, 1 concept(s))");

    let saved: Value = serde_json::from_str(&fs::read_to_string(dir.path().join("pump-v2.json")).unwrap()).unwrap();
    let manual = &saved["submodels"][0]["submodelElements"][2];
    assert_eq!(manual["modelType"], "File");
    assert_eq!(manual["contentType"], "application/pdf");
    assert_eq!(saved["submodels"][0]["submodelElements"][1]["value"], "14.0");
    assert_eq!(saved["conceptDescriptions"][0]["displayName"][0]["text"], "Maximum flow");

    // Members the agent never edits are written back as they were read.
    let original: Value = serde_json::from_str(&fs::read_to_string("tests/fixtures/pump.json").unwrap()).unwrap();
    let shell = &saved["assetAdministrationShells"][0];
    assert_eq!(shell["description"], original["assetAdministrationShells"][0]["description"]);
    assert_eq!(shell["administration"]["version"], "1");
    assert_eq!(shell["assetInformation"]["assetType"], "CentrifugalPump");
    assert_eq!(shell["assetInformation"]["specificAssetIds"][0]["value"], "P7-0042");
    let nameplate = &saved["submodels"][0];
    assert_eq!(nameplate["kind"], "Instance");
    assert_eq!(nameplate["semanticId"], original["submodels"][0]["semanticId"]);
    assert_eq!(nameplate["description"][0]["text"], "Digital nameplate");
    let max_flow = &nameplate["submodelElements"][1];
    assert_eq!(max_flow["category"], "PARAMETER");
    assert_eq!(max_flow["qualifiers"][0]["value"], "One");
    assert_eq!(max_flow["description"][0]["text"], "Rated maximum flow in m3/h");
    assert_eq!(
        saved["conceptDescriptions"][0]["embeddedDataSpecifications"],
        original["conceptDescriptions"][0]["embeddedDataSpecifications"]
    );
}

#[tokio::test]
async fn chats_do_not_share_state() {
    let dir = tempfile::tempdir().unwrap();
    let dummy = DummyProvider::scripted([
        tool_calls(&[(
            "create_aas",
            r#"{"aas_id":"urn:aas:a","id_short":"A","global_asset_id":"urn:asset:a"}"#,
        )]),
        ChatMessage::assistant("Created A."),
    ]);
    let s = state(&dummy, dir.path());

    s.handle("telegram0", "telegram0:1", "create A").await;
    assert_eq!(
        text(s.handle("telegram0", "telegram0:2", "/state").await),
        "Current State:\n\nNo AAS exists yet."
    );

    assert_eq!(
        text(s.handle("telegram0", "telegram0:1", "/reset").await),
        "✅ Reset complete! Starting fresh with no AAS."
    );
    assert_eq!(text(s.handle("telegram0", "telegram0:1", "/tree").await), "❌ No AAS available");
}

#[tokio::test]
async fn path_escape_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("aas");
    let dummy = DummyProvider::scripted([
        tool_calls(&[(
            "create_aas",
            r#"{"aas_id":"urn:aas:a","id_short":"A","global_asset_id":"urn:asset:a"}"#,
        )]),
        ChatMessage::assistant("ok"),
        tool_calls(&[("save_aas", r#"{"filename":"../outside"}"#)]),
    ]);
    dummy.push_failure("offline");
    let s = state(&dummy, &data_dir);

    s.handle("pty0", "pty0", "create").await;
    let reply = text(s.handle("pty0", "pty0", "save to ../outside").await);
    assert!(reply.starts_with("❌ Invalid file name"), "{reply}");
    assert!(!dir.path().join("outside.json").exists());
}
