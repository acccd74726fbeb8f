//! AAS v3.0 JSON environment reader/writer.
//!
//! The environment is the top-level container:
//! `{ "assetAdministrationShells": [...], "submodels": [...], "conceptDescriptions": [...] }`.
//! Every identifiable and submodel element carries a `modelType`
//! discriminator; property values are XSD lexical strings. All three
//! top-level arrays are always written, nested empties are omitted.
//! Members the wire structs do not name are collected by `#[serde(flatten)]`
//! and written back unchanged.
//!
//! Wire types are private; callers work with [`Environment`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AasError;
use super::model::{
    AssetAdministrationShell, AssetInformation, ConceptDescription, Extra, LangString, ModellingKind,
    OpaqueElement, Property, Reference, Submodel, SubmodelElement, ValueType,
};

/// Decoded contents of an AAS JSON file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    pub shells: Vec<AssetAdministrationShell>,
    pub submodels: Vec<Submodel>,
    pub concept_descriptions: Vec<ConceptDescription>,
}

impl Environment {
    /// Pretty-printed JSON (two-space indent).
    pub fn to_json_pretty(&self) -> Result<String, AasError> {
        Ok(serde_json::to_string_pretty(&self.to_wire())?)
    }

    /// Parse an environment; a leading UTF-8 BOM is ignored.
    pub fn from_json(text: &str) -> Result<Self, AasError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let wire: EnvironmentWire = serde_json::from_str(text)?;
        Self::from_wire(wire)
    }

    fn to_wire(&self) -> EnvironmentWire {
        EnvironmentWire {
            asset_administration_shells: self.shells.iter().map(ShellWire::from).collect(),
            submodels: self.submodels.iter().map(SubmodelWire::from).collect(),
            concept_descriptions: self.concept_descriptions.iter().map(ConceptDescriptionWire::from).collect(),
        }
    }

    fn from_wire(wire: EnvironmentWire) -> Result<Self, AasError> {
        Ok(Self {
            shells: wire.asset_administration_shells.into_iter().map(Into::into).collect(),
            submodels: wire
                .submodels
                .into_iter()
                .map(SubmodelWire::into_submodel)
                .collect::<Result<_, _>>()?,
            concept_descriptions: wire.concept_descriptions.into_iter().map(Into::into).collect(),
        })
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

const MODEL_SHELL: &str = "AssetAdministrationShell";
const MODEL_SUBMODEL: &str = "Submodel";
const MODEL_CONCEPT: &str = "ConceptDescription";
const MODEL_PROPERTY: &str = "Property";

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvironmentWire {
    #[serde(default)]
    asset_administration_shells: Vec<ShellWire>,
    #[serde(default)]
    submodels: Vec<SubmodelWire>,
    #[serde(default)]
    concept_descriptions: Vec<ConceptDescriptionWire>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShellWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id_short: String,
    id: String,
    asset_information: AssetInformation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    submodels: Vec<Reference>,
    #[serde(default)]
    model_type: String,
    #[serde(flatten)]
    extra: Extra,
}

impl From<&AssetAdministrationShell> for ShellWire {
    fn from(s: &AssetAdministrationShell) -> Self {
        Self {
            id_short: s.id_short.clone(),
            id: s.id.clone(),
            asset_information: s.asset_information.clone(),
            submodels: s.submodels.clone(),
            model_type: MODEL_SHELL.to_string(),
            extra: s.extra.clone(),
        }
    }
}

impl From<ShellWire> for AssetAdministrationShell {
    fn from(w: ShellWire) -> Self {
        Self {
            id: w.id,
            id_short: w.id_short,
            asset_information: w.asset_information,
            submodels: w.submodels,
            extra: w.extra,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmodelWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id_short: String,
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<ModellingKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    submodel_elements: Vec<Value>,
    #[serde(default)]
    model_type: String,
    #[serde(flatten)]
    extra: Extra,
}

impl From<&Submodel> for SubmodelWire {
    fn from(s: &Submodel) -> Self {
        Self {
            id_short: s.id_short.clone(),
            id: s.id.clone(),
            kind: Some(s.kind),
            submodel_elements: s.elements.iter().map(element_to_value).collect(),
            model_type: MODEL_SUBMODEL.to_string(),
            extra: s.extra.clone(),
        }
    }
}

impl SubmodelWire {
    fn into_submodel(self) -> Result<Submodel, AasError> {
        Ok(Submodel {
            id: self.id,
            id_short: self.id_short,
            kind: self.kind.unwrap_or_default(),
            extra: self.extra,
            elements: self
                .submodel_elements
                .into_iter()
                .map(element_from_value)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyWire {
    id_short: String,
    value_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    semantic_id: Option<Reference>,
    #[serde(default)]
    model_type: String,
    #[serde(flatten)]
    extra: Extra,
}

fn element_to_value(element: &SubmodelElement) -> Value {
    match element {
        SubmodelElement::Property(p) => {
            let wire = PropertyWire {
                id_short: p.id_short.clone(),
                value_type: p.value_type.xsd_name().to_string(),
                value: p.value.as_ref().map(|v| v.lexical()),
                semantic_id: p.semantic_id.clone(),
                model_type: MODEL_PROPERTY.to_string(),
                extra: p.extra.clone(),
            };
            // A struct of strings and references always serializes.
            serde_json::to_value(wire).unwrap_or(Value::Null)
        }
        SubmodelElement::Opaque(o) => o.raw.clone(),
    }
}

fn element_from_value(value: Value) -> Result<SubmodelElement, AasError> {
    let model_type = value.get("modelType").and_then(Value::as_str).unwrap_or_default().to_string();
    if model_type == MODEL_PROPERTY {
        let wire: PropertyWire = serde_json::from_value(value)?;
        let value_type = ValueType::from_xsd(&wire.value_type);
        let value = wire.value.as_deref().map(|v| value_type.parse_lexical(v)).transpose()?;
        return Ok(SubmodelElement::Property(Property {
            id_short: wire.id_short,
            value_type,
            value,
            semantic_id: wire.semantic_id,
            extra: wire.extra,
        }));
    }
    let id_short = value.get("idShort").and_then(Value::as_str).unwrap_or_default().to_string();
    Ok(SubmodelElement::Opaque(OpaqueElement { id_short, model_type, raw: value }))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConceptDescriptionWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id_short: String,
    id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    display_name: Vec<LangString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    description: Vec<LangString>,
    #[serde(default)]
    model_type: String,
    #[serde(flatten)]
    extra: Extra,
}

impl From<&ConceptDescription> for ConceptDescriptionWire {
    fn from(c: &ConceptDescription) -> Self {
        Self {
            id_short: c.id_short.clone(),
            id: c.id.clone(),
            display_name: c.display_name.clone(),
            description: c.description.clone(),
            model_type: MODEL_CONCEPT.to_string(),
            extra: c.extra.clone(),
        }
    }
}

impl From<ConceptDescriptionWire> for ConceptDescription {
    fn from(w: ConceptDescriptionWire) -> Self {
        Self {
            id: w.id,
            id_short: w.id_short,
            display_name: w.display_name,
            description: w.description,
            extra: w.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aas::model::PropertyValue;
    use serde_json::json;

    fn keys(value: &Value) -> Vec<&str> {
        value.as_object().into_iter().flat_map(|m| m.keys()).map(String::as_str).collect()
    }

    fn sample() -> Environment {
        let mut shell = AssetAdministrationShell::instance(
            "https://example.com/aas/motor",
            "Motor",
            "https://example.com/asset/motor-001",
        );
        shell.submodels.push(Reference::submodel("https://example.com/submodels/td"));

        let mut temp = Property::new("Temperature", ValueType::Float);
        temp.value = Some(PropertyValue::Float(25.0));
        temp.semantic_id = Some(Reference::global("https://example.com/cd/temperature"));
        let mut sm = Submodel::new("https://example.com/submodels/td", "TechnicalData");
        sm.elements.push(SubmodelElement::Property(temp));
        sm.elements.push(SubmodelElement::Property(Property::new("Serial", ValueType::String)));

        Environment {
            shells: vec![shell],
            submodels: vec![sm],
            concept_descriptions: vec![ConceptDescription {
                id: "https://example.com/cd/temperature".into(),
                id_short: "Temperature".into(),
                display_name: vec![LangString::en("Motor temperature")],
                description: Vec::new(),
                extra: Extra::new(),
            }],
        }
    }

    #[test]
    fn writes_v3_shape() {
        let text = sample().to_json_pretty().unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();

        let shell = &v["assetAdministrationShells"][0];
        assert_eq!(shell["modelType"], "AssetAdministrationShell");
        assert_eq!(shell["assetInformation"]["assetKind"], "Instance");
        assert_eq!(shell["submodels"][0]["type"], "ModelReference");
        assert_eq!(shell["submodels"][0]["keys"][0]["type"], "Submodel");

        let sm = &v["submodels"][0];
        assert_eq!(sm["modelType"], "Submodel");
        assert_eq!(sm["kind"], "Instance");
        let temp = &sm["submodelElements"][0];
        assert_eq!(temp["modelType"], "Property");
        assert_eq!(temp["valueType"], "xs:float");
        assert_eq!(temp["value"], "25.0");
        assert_eq!(temp["semanticId"]["keys"][0]["type"], "GlobalReference");

        let serial = &sm["submodelElements"][1];
        assert!(serial.get("value").is_none());
        assert!(serial.get("semanticId").is_none());

        let cd = &v["conceptDescriptions"][0];
        assert_eq!(cd["displayName"][0], json!({"language": "en", "text": "Motor temperature"}));
        assert!(cd.get("description").is_none());
    }

    #[test]
    fn empty_environment_keeps_top_level_arrays() {
        let v: Value = serde_json::from_str(&Environment::default().to_json_pretty().unwrap()).unwrap();
        let mut k = keys(&v);
        k.sort_unstable();
        assert_eq!(k, ["assetAdministrationShells", "conceptDescriptions", "submodels"]);
    }

    #[test]
    fn reads_back_what_it_writes() {
        let env = sample();
        let text = env.to_json_pretty().unwrap();
        assert_eq!(Environment::from_json(&text).unwrap(), env);
    }

    #[test]
    fn unknown_elements_survive() {
        let text = r#"{
            "assetAdministrationShells": [],
            "submodels": [{
                "id": "sm", "idShort": "Docs", "modelType": "Submodel",
                "submodelElements": [
                    {"idShort": "Manual", "modelType": "File", "contentType": "application/pdf", "value": "/manual.pdf"},
                    {"idShort": "Rpm", "modelType": "Property", "valueType": "xs:double", "value": "1450.5"}
                ]
            }]
        }"#;
        let env = Environment::from_json(text).unwrap();
        let sm = &env.submodels[0];
        match &sm.elements[0] {
            SubmodelElement::Opaque(o) => {
                assert_eq!(o.model_type, "File");
                assert_eq!(o.id_short, "Manual");
            }
            other => panic!("expected opaque element, got {other:?}"),
        }
        let rpm = sm.property("Rpm").unwrap();
        assert_eq!(rpm.value_type, ValueType::Other("xs:double".into()));
        assert_eq!(rpm.display_value(), "1450.5");

        let out: Value = serde_json::from_str(&env.to_json_pretty().unwrap()).unwrap();
        assert_eq!(out["submodels"][0]["submodelElements"][0]["contentType"], "application/pdf");
        assert_eq!(out["submodels"][0]["submodelElements"][1]["valueType"], "xs:double");
    }

    #[test]
    fn uninterpreted_members_survive() {
        let input = json!({
            "assetAdministrationShells": [{
                "id": "urn:aas:valve", "idShort": "Valve", "modelType": "AssetAdministrationShell",
                "description": [{"language": "en", "text": "Inlet valve"}],
                "administration": {"version": "2", "revision": "1"},
                "assetInformation": {
                    "assetKind": "Type", "globalAssetId": "urn:asset:valve", "assetType": "Valve",
                    "specificAssetIds": [{"name": "serial", "value": "V-9"}]
                }
            }],
            "submodels": [{
                "id": "urn:sm:tpl", "idShort": "Template", "kind": "Template", "modelType": "Submodel",
                "semanticId": {"type": "ExternalReference", "keys": [{"type": "GlobalReference", "value": "urn:sem:tpl"}]},
                "submodelElements": [{
                    "idShort": "Size", "modelType": "Property", "valueType": "xs:int", "value": "3",
                    "category": "PARAMETER",
                    "description": [{"language": "en", "text": "Nominal size"}],
                    "qualifiers": [{"type": "Multiplicity", "valueType": "xs:string", "value": "One"}],
                    "semanticId": {
                        "type": "ExternalReference",
                        "keys": [{"type": "GlobalReference", "value": "urn:sem:size"}],
                        "referredSemanticId": {"type": "ExternalReference", "keys": [{"type": "GlobalReference", "value": "urn:sem:dn"}]}
                    }
                }]
            }],
            "conceptDescriptions": [{
                "id": "urn:sem:size", "idShort": "Size", "modelType": "ConceptDescription",
                "embeddedDataSpecifications": [{"dataSpecificationContent": {"modelType": "DataSpecificationIec61360", "preferredName": [{"language": "en", "text": "Size"}]}}]
            }]
        });

        let env = Environment::from_json(&input.to_string()).unwrap();
        assert_eq!(env.submodels[0].kind, ModellingKind::Template);
        let out: Value = serde_json::from_str(&env.to_json_pretty().unwrap()).unwrap();

        let shell = &out["assetAdministrationShells"][0];
        assert_eq!(shell["description"], input["assetAdministrationShells"][0]["description"]);
        assert_eq!(shell["administration"]["version"], "2");
        assert_eq!(shell["assetInformation"]["assetType"], "Valve");
        assert_eq!(shell["assetInformation"]["specificAssetIds"][0]["value"], "V-9");

        let sm = &out["submodels"][0];
        assert_eq!(sm["kind"], "Template");
        assert_eq!(sm["semanticId"]["keys"][0]["value"], "urn:sem:tpl");

        let size = &sm["submodelElements"][0];
        assert_eq!(size["category"], "PARAMETER");
        assert_eq!(size["description"][0]["text"], "Nominal size");
        assert_eq!(size["qualifiers"][0]["type"], "Multiplicity");
        assert_eq!(size["semanticId"]["referredSemanticId"]["keys"][0]["value"], "urn:sem:dn");

        let cd = &out["conceptDescriptions"][0];
        assert_eq!(cd["embeddedDataSpecifications"], input["conceptDescriptions"][0]["embeddedDataSpecifications"]);
    }

    #[test]
    fn bom_is_ignored() {
        let text = "\u{feff}{\"assetAdministrationShells\": []}";
        assert!(Environment::from_json(text).unwrap().shells.is_empty());
    }

    #[test]
    fn invalid_lexical_value_rejected() {
        let text = r#"{"submodels": [{"id": "sm", "modelType": "Submodel", "submodelElements": [
            {"idShort": "On", "modelType": "Property", "valueType": "xs:boolean", "value": "maybe"}
        ]}]}"#;
        assert!(matches!(Environment::from_json(text), Err(AasError::InvalidValue { .. })));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(Environment::from_json("{not json"), Err(AasError::Json(_))));
    }
}
