//! Function tools offered to the model and their execution against a
//! workspace.
//!
//! The model names a tool and sends its arguments as JSON text;
//! [`AasAction::from_call`] turns that pair into a typed action and
//! [`execute`] applies it, producing the chat line the user sees.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::aas::workspace::{FileMode, resolve_file_name};
use crate::aas::{AasError, AasWorkspace};
use crate::llm::ToolDefinition;

#[derive(Debug, Error, PartialEq)]
pub enum ToolError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    #[error("Invalid arguments for {name}: {reason}")]
    InvalidArguments { name: String, reason: String },
}

/// A tool call with its arguments decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum AasAction {
    CreateAas {
        aas_id: String,
        id_short: String,
        global_asset_id: String,
    },
    AddSubmodel {
        submodel_id: String,
        id_short: String,
    },
    AddProperty {
        submodel_id_short: String,
        property_name: String,
        value_type: String,
        #[serde(default)]
        value: Option<Value>,
        #[serde(default)]
        semantic_id: Option<String>,
    },
    UpdateProperty {
        submodel_id_short: String,
        property_name: String,
        value: Value,
    },
    GetPropertyValue {
        submodel_id_short: String,
        property_name: String,
    },
    SaveAas {
        filename: String,
    },
    LoadAas {
        filename: String,
    },
    GetTreeView {},
    GetCurrentState {},
    AddConceptDescription {
        concept_id: String,
        id_short: String,
        #[serde(default)]
        preferred_name: Option<String>,
        #[serde(default)]
        definition: Option<String>,
    },
    UpdateSemanticId {
        submodel_id_short: String,
        property_name: String,
        semantic_id: String,
    },
    GetDigitalTwinJson {},
}

pub const TOOL_NAMES: [&str; 12] = [
    "create_aas",
    "add_submodel",
    "add_property",
    "update_property",
    "get_property_value",
    "save_aas",
    "load_aas",
    "get_tree_view",
    "get_current_state",
    "add_concept_description",
    "update_semantic_id",
    "get_digital_twin_json",
];

impl AasAction {
    /// Decode a model tool call. Blank argument text counts as `{}`.
    pub fn from_call(name: &str, arguments: &str) -> Result<Self, ToolError> {
        if !TOOL_NAMES.contains(&name) {
            return Err(ToolError::UnknownFunction(name.to_string()));
        }
        let invalid = |reason: String| ToolError::InvalidArguments { name: name.to_string(), reason };

        let args: Value = if arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(arguments).map_err(|e| invalid(e.to_string()))?
        };
        if !args.is_object() {
            return Err(invalid("expected a JSON object".into()));
        }

        serde_json::from_value(json!({ "name": name, "arguments": args })).map_err(|e| invalid(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            AasAction::CreateAas { .. } => "create_aas",
            AasAction::AddSubmodel { .. } => "add_submodel",
            AasAction::AddProperty { .. } => "add_property",
            AasAction::UpdateProperty { .. } => "update_property",
            AasAction::GetPropertyValue { .. } => "get_property_value",
            AasAction::SaveAas { .. } => "save_aas",
            AasAction::LoadAas { .. } => "load_aas",
            AasAction::GetTreeView {} => "get_tree_view",
            AasAction::GetCurrentState {} => "get_current_state",
            AasAction::AddConceptDescription { .. } => "add_concept_description",
            AasAction::UpdateSemanticId { .. } => "update_semantic_id",
            AasAction::GetDigitalTwinJson {} => "get_digital_twin_json",
        }
    }
}

/// Run `action` against `workspace`, returning the user-facing result line.
/// File names are resolved inside `data_dir`.
pub fn execute(workspace: &mut AasWorkspace, action: &AasAction, data_dir: &Path) -> String {
    debug!(tool = action.name(), "executing tool");
    run(workspace, action, data_dir).unwrap_or_else(|e| format!("❌ {e}"))
}

fn run(ws: &mut AasWorkspace, action: &AasAction, data_dir: &Path) -> Result<String, AasError> {
    match action {
        AasAction::CreateAas { aas_id, id_short, global_asset_id } => {
            ws.create_shell(aas_id, id_short, global_asset_id)?;
            Ok(format!("✅ Created AAS '{id_short}' with ID: {aas_id}"))
        }

        AasAction::AddSubmodel { submodel_id, id_short } => {
            ws.add_submodel(submodel_id, id_short)?;
            Ok(format!("✅ Added submodel '{id_short}' to AAS"))
        }

        AasAction::AddProperty { submodel_id_short, property_name, value_type, value, semantic_id } => {
            let p = ws.add_property(
                submodel_id_short,
                property_name,
                value_type,
                value.as_ref(),
                semantic_id.as_deref(),
            )?;
            let mut out = format!(
                "✅ Added property '{property_name}' ({}) to submodel '{submodel_id_short}'",
                value_type.trim().to_ascii_lowercase()
            );
            if let Some(v) = &p.value {
                out.push_str(&format!(" with value {v}"));
            }
            if let Some(id) = p.semantic_id.as_ref().and_then(|r| r.target()) {
                out.push_str(&format!("\n   Semantic ID: {id}"));
            }
            Ok(out)
        }

        AasAction::UpdateProperty { submodel_id_short, property_name, value } => {
            let change = ws.update_property(submodel_id_short, property_name, value)?;
            Ok(format!("✅ Updated '{property_name}': {} → {}", change.old, change.new))
        }

        AasAction::GetPropertyValue { submodel_id_short, property_name } => {
            let p = ws.property_value(submodel_id_short, property_name)?;
            Ok(format!("📌 {property_name} = {} ({})", p.display_value(), p.value_type))
        }

        AasAction::SaveAas { filename } => {
            let path = resolve_file_name(data_dir, filename, FileMode::Save)?;
            let report = ws.save(&path)?;
            Ok(format!(
                "✅ Saved AAS to '{}' ({} submodels{})",
                display_name(&report.path),
                report.submodels,
                concepts_suffix(report.concept_descriptions)
            ))
        }

        AasAction::LoadAas { filename } => {
            let path = resolve_file_name(data_dir, filename, FileMode::Load)?;
            let (loaded, report) = AasWorkspace::load(&path)?;
            *ws = loaded;
            Ok(format!(
                "✅ Loaded '{}' from '{}' ({} submodels, {} elements{})",
                report.shell_id_short,
                display_name(&report.path),
                report.submodels,
                report.elements,
                concepts_suffix(report.concept_descriptions)
            ))
        }

        AasAction::GetTreeView {} => Ok(ws.tree_view().unwrap_or_else(|| "❌ No AAS available".to_string())),

        AasAction::GetCurrentState {} => Ok(ws.summary()),

        AasAction::AddConceptDescription { concept_id, id_short, preferred_name, definition } => {
            let cd = ws.add_concept_description(
                concept_id,
                id_short,
                preferred_name.as_deref(),
                definition.as_deref(),
            )?;
            let mut out = format!("✅ Added concept description '{id_short}'");
            if let Some(name) = cd.display_name.first() {
                out.push_str(&format!("\n   Name: {}", name.text));
            }
            if let Some(def) = cd.description.first() {
                out.push_str(&format!("\n   Definition: {}", def.text));
            }
            Ok(out)
        }

        AasAction::UpdateSemanticId { submodel_id_short, property_name, semantic_id } => {
            ws.update_semantic_id(submodel_id_short, property_name, semantic_id)?;
            Ok(format!("✅ Updated semantic ID for '{property_name}'\n   Semantic ID: {semantic_id}"))
        }

        AasAction::GetDigitalTwinJson {} => {
            let json = ws.to_json()?;
            let id_short = ws.shell().map(|s| s.id_short.as_str()).unwrap_or_default();
            Ok(format!(
                "📄 Digital Twin JSON:\n\n```json\n{json}\n```\n\n\
                 ✅ Complete Digital Twin with:\n   \
                 • 1 AAS: {id_short}\n   \
                 • {} Submodel(s)\n   \
                 • {} Element(s)\n   \
                 • {} Concept Description(s)",
                ws.submodels().len(),
                ws.element_count(),
                ws.concept_descriptions().len()
            ))
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn concepts_suffix(count: usize) -> String {
    if count > 0 { format!(", {count} concept(s)") } else { String::new() }
}

// ── Definitions ───────────────────────────────────────────────────────────────

fn tool(name: &str, description: &str, parameters: Value) -> ToolDefinition {
    ToolDefinition { name: name.to_string(), description: description.to_string(), parameters }
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "object", "properties": properties, "required": required })
}

/// The function tools offered on the first model call of every turn.
pub fn definitions() -> Vec<ToolDefinition> {
    let string = |description: &str| json!({ "type": "string", "description": description });
    let submodel = string("ID short of the submodel");
    let property = string("Name/ID short of the property");

    vec![
        tool(
            "create_aas",
            "Create a new Asset Administration Shell (AAS). Replaces the current one.",
            object(
                json!({
                    "aas_id": string("Unique identifier for the AAS (URL format)"),
                    "id_short": string("Short human-readable identifier"),
                    "global_asset_id": string("Global identifier for the asset"),
                }),
                &["aas_id", "id_short", "global_asset_id"],
            ),
        ),
        tool(
            "add_submodel",
            "Add a submodel to the AAS",
            object(
                json!({
                    "submodel_id": string("Unique identifier for the submodel"),
                    "id_short": string("Short human-readable identifier"),
                }),
                &["submodel_id", "id_short"],
            ),
        ),
        tool(
            "add_property",
            "Add a property element to a submodel",
            object(
                json!({
                    "submodel_id_short": string("ID short of the submodel to add property to"),
                    "property_name": property.clone(),
                    "value_type": {
                        "type": "string",
                        "enum": ["string", "int", "float", "boolean"],
                        "description": "Data type of the property",
                    },
                    "value": { "description": "Value to set (can be string, number, or boolean)" },
                    "semantic_id": string("Optional semantic ID reference to concept description"),
                }),
                &["submodel_id_short", "property_name", "value_type"],
            ),
        ),
        tool(
            "update_property",
            "Update the value of an existing property",
            object(
                json!({
                    "submodel_id_short": submodel.clone(),
                    "property_name": property.clone(),
                    "value": { "description": "New value to set" },
                }),
                &["submodel_id_short", "property_name", "value"],
            ),
        ),
        tool(
            "get_property_value",
            "Get the current value of a property",
            object(
                json!({ "submodel_id_short": submodel.clone(), "property_name": property.clone() }),
                &["submodel_id_short", "property_name"],
            ),
        ),
        tool(
            "save_aas",
            "Save the AAS to a JSON file in the data directory",
            object(json!({ "filename": string("File name, e.g. motor.json") }), &["filename"]),
        ),
        tool(
            "load_aas",
            "Load an AAS from a JSON file in the data directory",
            object(json!({ "filename": string("Name of the file to load") }), &["filename"]),
        ),
        tool(
            "get_tree_view",
            "Get a tree view representation of the entire AAS structure",
            object(json!({}), &[]),
        ),
        tool(
            "get_current_state",
            "Get a summary of the current AAS state including all submodels and properties",
            object(json!({}), &[]),
        ),
        tool(
            "add_concept_description",
            "Add a concept description to define semantic meaning of properties",
            object(
                json!({
                    "concept_id": string("Unique identifier for the concept"),
                    "id_short": string("Short identifier"),
                    "preferred_name": string("Human-readable name"),
                    "definition": string("Definition of the concept"),
                }),
                &["concept_id", "id_short"],
            ),
        ),
        tool(
            "update_semantic_id",
            "Update or add semantic ID reference to an existing property",
            object(
                json!({
                    "submodel_id_short": submodel,
                    "property_name": property,
                    "semantic_id": string("Semantic ID reference (usually concept description ID)"),
                }),
                &["submodel_id_short", "property_name", "semantic_id"],
            ),
        ),
        tool(
            "get_digital_twin_json",
            "Get the complete Digital Twin (AAS) as JSON format string",
            object(json!({}), &[]),
        ),
    ]
}
