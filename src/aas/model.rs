//! AAS v3.0 types: shell, submodel, property, concept description, reference.
//!
//! Types whose JSON shape matches the metamodel one-to-one derive serde
//! directly; types that carry a `modelType` discriminator are mapped in
//! [`super::json`]. Members this crate does not interpret (descriptions,
//! qualifiers, data specifications, ...) ride along in an [`Extra`] map so
//! a loaded file is written back without losing them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AasError;

/// Uninterpreted JSON members of an object, kept for the next save.
pub type Extra = Map<String, Value>;

const ID_SHORT_MAX: usize = 128;
const IDENTIFIER_MAX: usize = 2000;

// ── Identification ────────────────────────────────────────────────────────────

/// Check an `idShort` against the AAS v3.0 pattern
/// `^[a-zA-Z][a-zA-Z0-9_-]*[a-zA-Z0-9_]+$` (single letters allowed).
pub fn validate_id_short(id_short: &str) -> Result<(), AasError> {
    let invalid = || AasError::InvalidIdShort(id_short.to_string());
    let mut chars = id_short.chars();
    let first = chars.next().ok_or_else(invalid)?;
    if !first.is_ascii_alphabetic()
        || id_short.len() > ID_SHORT_MAX
        || id_short.ends_with('-')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(invalid());
    }
    Ok(())
}

/// Check a globally unique identifier (`id`): non-blank, bounded, printable.
pub fn validate_identifier(id: &str) -> Result<(), AasError> {
    if id.trim().is_empty() || id.chars().count() > IDENTIFIER_MAX || id.chars().any(char::is_control) {
        return Err(AasError::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}

// ── References ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    ExternalReference,
    ModelReference,
}

/// AAS v3.0 `KeyTypes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    AnnotatedRelationshipElement,
    AssetAdministrationShell,
    BasicEventElement,
    Blob,
    Capability,
    ConceptDescription,
    DataElement,
    Entity,
    EventElement,
    File,
    FragmentReference,
    GlobalReference,
    Identifiable,
    MultiLanguageProperty,
    Operation,
    Property,
    Range,
    Referable,
    ReferenceElement,
    RelationshipElement,
    Submodel,
    SubmodelElement,
    SubmodelElementCollection,
    SubmodelElementList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    pub keys: Vec<Key>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Reference {
    /// External reference with a single `GlobalReference` key — the form
    /// used for semantic ids.
    pub fn global(value: impl Into<String>) -> Self {
        Self {
            kind: ReferenceKind::ExternalReference,
            keys: vec![Key { key_type: KeyType::GlobalReference, value: value.into() }],
            extra: Extra::new(),
        }
    }

    /// Model reference from a shell to one of its submodels.
    pub fn submodel(id: impl Into<String>) -> Self {
        Self {
            kind: ReferenceKind::ModelReference,
            keys: vec![Key { key_type: KeyType::Submodel, value: id.into() }],
            extra: Extra::new(),
        }
    }

    /// Value of the last key — the referenced thing itself.
    pub fn target(&self) -> Option<&str> {
        self.keys.last().map(|k| k.value.as_str())
    }
}

// ── Shell ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    Type,
    #[default]
    Instance,
    NotApplicable,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Type => "Type",
            AssetKind::Instance => "Instance",
            AssetKind::NotApplicable => "NotApplicable",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInformation {
    pub asset_kind: AssetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_asset_id: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetAdministrationShell {
    pub id: String,
    pub id_short: String,
    pub asset_information: AssetInformation,
    /// Model references to the shell's submodels.
    pub submodels: Vec<Reference>,
    pub extra: Extra,
}

impl AssetAdministrationShell {
    /// A shell describing an asset instance.
    pub fn instance(id: impl Into<String>, id_short: impl Into<String>, global_asset_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            id_short: id_short.into(),
            asset_information: AssetInformation {
                asset_kind: AssetKind::Instance,
                global_asset_id: Some(global_asset_id.into()),
                extra: Extra::new(),
            },
            submodels: Vec::new(),
            extra: Extra::new(),
        }
    }
}

// ── Values ────────────────────────────────────────────────────────────────────

/// The XSD value type of a property.
///
/// The four named variants are the ones a chat user can create; anything
/// else read from a file is kept as `Other` with its `xs:` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Float,
    Boolean,
    Other(String),
}

impl ValueType {
    /// Parse the tool-facing name (`string`, `int`, `float`, `boolean`).
    pub fn from_tool_name(name: &str) -> Result<Self, AasError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(ValueType::String),
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            "boolean" => Ok(ValueType::Boolean),
            _ => Err(AasError::InvalidValueType(name.to_string())),
        }
    }

    pub fn from_xsd(name: &str) -> Self {
        match name {
            "xs:string" => ValueType::String,
            "xs:int" => ValueType::Int,
            "xs:float" => ValueType::Float,
            "xs:boolean" => ValueType::Boolean,
            other => ValueType::Other(other.to_string()),
        }
    }

    pub fn xsd_name(&self) -> &str {
        match self {
            ValueType::String => "xs:string",
            ValueType::Int => "xs:int",
            ValueType::Float => "xs:float",
            ValueType::Boolean => "xs:boolean",
            ValueType::Other(name) => name,
        }
    }

    /// Convert a JSON value supplied by the model into a typed value.
    pub fn coerce(&self, value: &Value) -> Result<PropertyValue, AasError> {
        let invalid = |reason: &str| AasError::InvalidValue {
            value_type: self.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ValueType::Int => {
                let wide: i64 = match value {
                    Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                        (Some(i), _) => i,
                        (None, Some(f)) if f.is_finite() && f.abs() < i64::MAX as f64 => f.trunc() as i64,
                        _ => return Err(invalid("out of range for xs:int")),
                    },
                    Value::String(s) => s.trim().parse().map_err(|_| invalid("not an integer"))?,
                    Value::Bool(b) => i64::from(*b),
                    _ => return Err(invalid("expected a number")),
                };
                i32::try_from(wide)
                    .map(PropertyValue::Int)
                    .map_err(|_| invalid("out of range for xs:int"))
            }
            ValueType::Float => match value {
                Value::Number(n) => n.as_f64().map(PropertyValue::Float).ok_or_else(|| invalid("not a number")),
                Value::String(s) => parse_float(s).map(PropertyValue::Float).ok_or_else(|| invalid("not a number")),
                Value::Bool(b) => Ok(PropertyValue::Float(if *b { 1.0 } else { 0.0 })),
                _ => Err(invalid("expected a number")),
            },
            ValueType::Boolean => match value {
                Value::Null => Err(invalid("expected a boolean")),
                Value::Bool(b) => Ok(PropertyValue::Boolean(*b)),
                Value::String(s) => Ok(PropertyValue::Boolean(is_truthy(s))),
                other => Ok(PropertyValue::Boolean(is_truthy(&other.to_string()))),
            },
            ValueType::String => match value {
                Value::Null => Err(invalid("expected a value")),
                Value::String(s) => Ok(PropertyValue::Text(s.clone())),
                other => Ok(PropertyValue::Text(other.to_string())),
            },
            ValueType::Other(xsd) => {
                let lexical = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return Err(invalid("expected a scalar")),
                };
                check_lexical(xsd, &lexical).map_err(|reason| invalid(&reason))?;
                Ok(PropertyValue::Text(lexical))
            }
        }
    }

    /// Parse the XSD lexical form stored in JSON files.
    pub fn parse_lexical(&self, lexical: &str) -> Result<PropertyValue, AasError> {
        let invalid = |reason: &str| AasError::InvalidValue {
            value_type: self.to_string(),
            value: format!("\"{lexical}\""),
            reason: reason.to_string(),
        };
        match self {
            ValueType::Int => lexical.trim().parse().map(PropertyValue::Int).map_err(|_| invalid("not an xs:int")),
            ValueType::Float => parse_float(lexical).map(PropertyValue::Float).ok_or_else(|| invalid("not an xs:float")),
            ValueType::Boolean => match lexical.trim() {
                "true" | "1" => Ok(PropertyValue::Boolean(true)),
                "false" | "0" => Ok(PropertyValue::Boolean(false)),
                _ => Err(invalid("not an xs:boolean")),
            },
            ValueType::String | ValueType::Other(_) => Ok(PropertyValue::Text(lexical.to_string())),
        }
    }
}

/// Display name used in chat output: `String`, `Int`, `Float`, `Boolean`,
/// or the capitalised local part of other XSD names (`xs:double` → `Double`).
impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => f.write_str("String"),
            ValueType::Int => f.write_str("Int"),
            ValueType::Float => f.write_str("Float"),
            ValueType::Boolean => f.write_str("Boolean"),
            ValueType::Other(name) => {
                let local = name.rsplit(':').next().unwrap_or(name);
                let mut chars = local.chars();
                match chars.next() {
                    Some(c) => write!(f, "{}{}", c.to_ascii_uppercase(), chars.as_str()),
                    None => f.write_str(name),
                }
            }
        }
    }
}

fn is_truthy(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "t" | "yes" | "1")
}

/// Validate `lexical` against an XSD type outside the four named variants.
/// Only the numeric family and free-text types can be written from chat.
fn check_lexical(xsd: &str, lexical: &str) -> Result<(), String> {
    let s = lexical.trim();
    let ok = match xsd {
        "xs:anyURI" | "xs:normalizedString" | "xs:token" => return Ok(()),
        "xs:double" => parse_float(s).is_some(),
        "xs:decimal" => is_decimal(s),
        "xs:integer" => s.parse::<i128>().is_ok(),
        "xs:long" => s.parse::<i64>().is_ok(),
        "xs:short" => s.parse::<i16>().is_ok(),
        "xs:byte" => s.parse::<i8>().is_ok(),
        "xs:unsignedLong" | "xs:nonNegativeInteger" => s.parse::<u64>().is_ok(),
        "xs:unsignedInt" => s.parse::<u32>().is_ok(),
        "xs:unsignedShort" => s.parse::<u16>().is_ok(),
        "xs:unsignedByte" => s.parse::<u8>().is_ok(),
        "xs:positiveInteger" => s.parse::<u64>().is_ok_and(|n| n > 0),
        "xs:nonPositiveInteger" => s.parse::<i128>().is_ok_and(|n| n <= 0),
        "xs:negativeInteger" => s.parse::<i128>().is_ok_and(|n| n < 0),
        _ => return Err(format!("updating {xsd} values is not supported")),
    };
    if ok { Ok(()) } else { Err(format!("not an {xsd}")) }
}

fn is_decimal(s: &str) -> bool {
    let digits = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
    !(int.is_empty() && frac.is_empty()) && int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
}

fn parse_float(s: &str) -> Option<f64> {
    match s.trim() {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Int(i32),
    Float(f64),
    Boolean(bool),
}

impl PropertyValue {
    /// XSD lexical representation, as written to JSON.
    pub fn lexical(&self) -> String {
        match self {
            PropertyValue::Text(s) => s.clone(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::Boolean(b) => b.to_string(),
            PropertyValue::Float(f) if f.is_nan() => "NaN".to_string(),
            PropertyValue::Float(f) if f.is_infinite() => {
                if *f > 0.0 { "INF".to_string() } else { "-INF".to_string() }
            }
            PropertyValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.1}"),
            PropertyValue::Float(f) => f.to_string(),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexical())
    }
}

// ── Submodel elements ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id_short: String,
    pub value_type: ValueType,
    pub value: Option<PropertyValue>,
    pub semantic_id: Option<Reference>,
    pub extra: Extra,
}

impl Property {
    pub fn new(id_short: impl Into<String>, value_type: ValueType) -> Self {
        Self { id_short: id_short.into(), value_type, value: None, semantic_id: None, extra: Extra::new() }
    }

    /// Value for chat output; `(no value)` when unset.
    pub fn display_value(&self) -> String {
        self.value.as_ref().map(PropertyValue::lexical).unwrap_or_else(|| "(no value)".to_string())
    }
}

/// A submodel element of a kind this crate does not model, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueElement {
    pub id_short: String,
    pub model_type: String,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmodelElement {
    Property(Property),
    Opaque(OpaqueElement),
}

impl SubmodelElement {
    pub fn id_short(&self) -> &str {
        match self {
            SubmodelElement::Property(p) => &p.id_short,
            SubmodelElement::Opaque(o) => &o.id_short,
        }
    }

    pub fn as_property(&self) -> Option<&Property> {
        match self {
            SubmodelElement::Property(p) => Some(p),
            SubmodelElement::Opaque(_) => None,
        }
    }
}

// ── Submodel ──────────────────────────────────────────────────────────────────

/// AAS v3.0 `ModellingKind`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModellingKind {
    Template,
    #[default]
    Instance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submodel {
    pub id: String,
    pub id_short: String,
    pub kind: ModellingKind,
    pub elements: Vec<SubmodelElement>,
    pub extra: Extra,
}

impl Submodel {
    pub fn new(id: impl Into<String>, id_short: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            id_short: id_short.into(),
            kind: ModellingKind::Instance,
            elements: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn element(&self, id_short: &str) -> Option<&SubmodelElement> {
        self.elements.iter().find(|e| e.id_short() == id_short)
    }

    /// Look up a property by `idShort`, distinguishing "missing" from
    /// "present but not a property".
    pub fn property(&self, id_short: &str) -> Result<&Property, AasError> {
        match self.element(id_short) {
            Some(SubmodelElement::Property(p)) => Ok(p),
            Some(SubmodelElement::Opaque(_)) => Err(AasError::NotAProperty(id_short.to_string())),
            None => Err(AasError::PropertyNotFound {
                submodel: self.id_short.clone(),
                property: id_short.to_string(),
            }),
        }
    }

    pub fn property_mut(&mut self, id_short: &str) -> Result<&mut Property, AasError> {
        let submodel = self.id_short.clone();
        match self.elements.iter_mut().find(|e| e.id_short() == id_short) {
            Some(SubmodelElement::Property(p)) => Ok(p),
            Some(SubmodelElement::Opaque(_)) => Err(AasError::NotAProperty(id_short.to_string())),
            None => Err(AasError::PropertyNotFound { submodel, property: id_short.to_string() }),
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.elements.iter().filter_map(SubmodelElement::as_property)
    }
}

// ── Concept descriptions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangString {
    pub language: String,
    pub text: String,
}

impl LangString {
    pub fn en(text: impl Into<String>) -> Self {
        Self { language: "en".to_string(), text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConceptDescription {
    pub id: String,
    pub id_short: String,
    pub display_name: Vec<LangString>,
    pub description: Vec<LangString>,
    /// Data specifications, `isCaseOf`, administration and the like.
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_short_pattern() {
        for ok in ["Temperature", "T", "serial_no", "Motor-01", "a_"] {
            assert!(validate_id_short(ok).is_ok(), "{ok} should be valid");
        }
        let too_long = "a".repeat(129);
        for bad in ["", "1abc", "_x", "with space", "ends-", "ümlaut", too_long.as_str()] {
            assert!(validate_id_short(bad).is_err(), "{bad} should be invalid");
        }
    }

    #[test]
    fn identifier_rules() {
        assert!(validate_identifier("https://example.com/aas/motor").is_ok());
        assert!(validate_identifier("   ").is_err());
        assert!(validate_identifier("line\nbreak").is_err());
        assert!(validate_identifier(&"x".repeat(2001)).is_err());
    }

    #[test]
    fn tool_names_case_insensitive() {
        assert_eq!(ValueType::from_tool_name("Float").unwrap(), ValueType::Float);
        assert_eq!(ValueType::from_tool_name(" INT ").unwrap(), ValueType::Int);
        assert!(matches!(ValueType::from_tool_name("double"), Err(AasError::InvalidValueType(_))));
    }

    #[test]
    fn xsd_names_round_trip() {
        for vt in [ValueType::String, ValueType::Int, ValueType::Float, ValueType::Boolean] {
            assert_eq!(ValueType::from_xsd(vt.xsd_name()), vt);
        }
        let other = ValueType::from_xsd("xs:dateTime");
        assert_eq!(other.xsd_name(), "xs:dateTime");
        assert_eq!(other.to_string(), "DateTime");
    }

    #[test]
    fn int_coercion() {
        let t = ValueType::Int;
        assert_eq!(t.coerce(&json!(42)).unwrap(), PropertyValue::Int(42));
        assert_eq!(t.coerce(&json!(" 17 ")).unwrap(), PropertyValue::Int(17));
        assert_eq!(t.coerce(&json!(25.9)).unwrap(), PropertyValue::Int(25));
        assert_eq!(t.coerce(&json!(true)).unwrap(), PropertyValue::Int(1));
        assert!(t.coerce(&json!("25.5")).is_err());
        assert!(t.coerce(&json!(3_000_000_000i64)).is_err());
        assert!(t.coerce(&json!(null)).is_err());
    }

    #[test]
    fn float_coercion() {
        let t = ValueType::Float;
        assert_eq!(t.coerce(&json!(23.5)).unwrap(), PropertyValue::Float(23.5));
        assert_eq!(t.coerce(&json!("1.25")).unwrap(), PropertyValue::Float(1.25));
        assert_eq!(t.coerce(&json!(7)).unwrap(), PropertyValue::Float(7.0));
        assert!(t.coerce(&json!("warm")).is_err());
    }

    #[test]
    fn boolean_coercion() {
        let t = ValueType::Boolean;
        assert_eq!(t.coerce(&json!(false)).unwrap(), PropertyValue::Boolean(false));
        for truthy in ["true", "T", "yes", "1"] {
            assert_eq!(t.coerce(&json!(truthy)).unwrap(), PropertyValue::Boolean(true));
        }
        assert_eq!(t.coerce(&json!("no")).unwrap(), PropertyValue::Boolean(false));
        assert_eq!(t.coerce(&json!(1)).unwrap(), PropertyValue::Boolean(true));
        assert_eq!(t.coerce(&json!([true])).unwrap(), PropertyValue::Boolean(false));
        assert_eq!(t.coerce(&json!({"on": true})).unwrap(), PropertyValue::Boolean(false));
        assert!(t.coerce(&json!(null)).is_err());
    }

    #[test]
    fn string_coercion_stringifies_scalars() {
        let t = ValueType::String;
        assert_eq!(t.coerce(&json!("SN-001")).unwrap(), PropertyValue::Text("SN-001".into()));
        assert_eq!(t.coerce(&json!(12)).unwrap(), PropertyValue::Text("12".into()));
        assert!(t.coerce(&json!(null)).is_err());
    }

    #[test]
    fn other_numeric_types_are_checked() {
        let double = ValueType::from_xsd("xs:double");
        assert_eq!(double.coerce(&json!(2.5)).unwrap(), PropertyValue::Text("2.5".into()));
        assert_eq!(double.coerce(&json!("-INF")).unwrap(), PropertyValue::Text("-INF".into()));
        let err = double.coerce(&json!("hot")).unwrap_err();
        assert!(err.to_string().contains("Double"), "{err}");

        let long = ValueType::from_xsd("xs:long");
        assert!(long.coerce(&json!("9000000000")).is_ok());
        assert!(long.coerce(&json!(1.5)).is_err());
        assert!(ValueType::from_xsd("xs:unsignedByte").coerce(&json!(256)).is_err());
        assert!(ValueType::from_xsd("xs:positiveInteger").coerce(&json!(0)).is_err());
        assert!(ValueType::from_xsd("xs:decimal").coerce(&json!("-12.50")).is_ok());
        assert!(ValueType::from_xsd("xs:decimal").coerce(&json!("1e3")).is_err());
    }

    #[test]
    fn other_non_numeric_types_are_refused() {
        let uri = ValueType::from_xsd("xs:anyURI");
        assert_eq!(uri.coerce(&json!("https://example.com/x")).unwrap(), PropertyValue::Text("https://example.com/x".into()));
        let err = ValueType::from_xsd("xs:dateTime").coerce(&json!("2024-01-01T00:00:00Z")).unwrap_err();
        assert!(matches!(&err, AasError::InvalidValue { reason, .. } if reason.contains("xs:dateTime")));
        assert!(uri.coerce(&json!(["a"])).is_err());
    }

    #[test]
    fn lexical_forms() {
        assert_eq!(PropertyValue::Float(25.0).lexical(), "25.0");
        assert_eq!(PropertyValue::Float(23.5).lexical(), "23.5");
        assert_eq!(PropertyValue::Float(f64::INFINITY).lexical(), "INF");
        assert_eq!(PropertyValue::Boolean(true).lexical(), "true");
        assert_eq!(PropertyValue::Int(-3).lexical(), "-3");
    }

    #[test]
    fn lexical_parsing() {
        assert_eq!(ValueType::Int.parse_lexical("42").unwrap(), PropertyValue::Int(42));
        assert_eq!(ValueType::Boolean.parse_lexical("0").unwrap(), PropertyValue::Boolean(false));
        assert!(ValueType::Boolean.parse_lexical("yes").is_err());
        assert!(matches!(ValueType::Float.parse_lexical("-INF").unwrap(), PropertyValue::Float(f) if f == f64::NEG_INFINITY));
    }

    #[test]
    fn submodel_property_lookup_distinguishes_kinds() {
        let mut sm = Submodel::new("https://example.com/sm/td", "TechnicalData");
        sm.elements.push(SubmodelElement::Property(Property::new("Speed", ValueType::Int)));
        sm.elements.push(SubmodelElement::Opaque(OpaqueElement {
            id_short: "Docs".into(),
            model_type: "SubmodelElementCollection".into(),
            raw: json!({"idShort": "Docs", "modelType": "SubmodelElementCollection"}),
        }));
        assert!(sm.property("Speed").is_ok());
        assert!(matches!(sm.property("Docs"), Err(AasError::NotAProperty(_))));
        assert!(matches!(sm.property_mut("Nope"), Err(AasError::PropertyNotFound { .. })));
        assert_eq!(sm.properties().count(), 1);
    }

    #[test]
    fn reference_shapes() {
        let r = Reference::global("0173-1#02-AAA123#001");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json, json!({"type": "ExternalReference", "keys": [{"type": "GlobalReference", "value": "0173-1#02-AAA123#001"}]}));
        assert_eq!(Reference::submodel("sm-1").target(), Some("sm-1"));
    }
}
