//! `AasWorkspace` — the editable shell of one conversation.
//!
//! Holds at most one shell, the submodels it references (in insertion
//! order), and any concept descriptions. All edits validate first and mutate
//! second, so a failed operation leaves the workspace unchanged.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::AasError;
use super::json::Environment;
use super::model::{
    AssetAdministrationShell, ConceptDescription, Extra, LangString, Property, Reference, Submodel,
    SubmodelElement, ValueType, validate_id_short, validate_identifier,
};

/// Counts reported after saving or loading a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub shell_id_short: String,
    pub submodels: usize,
    pub elements: usize,
    pub concept_descriptions: usize,
}

/// Old and new display values of an updated property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyUpdate {
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Always ends up with a `.json` extension.
    Save,
    /// Gets `.json` only when the name has no extension at all.
    Load,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AasWorkspace {
    shell: Option<AssetAdministrationShell>,
    submodels: Vec<Submodel>,
    concept_descriptions: Vec<ConceptDescription>,
}

impl AasWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shell(&self) -> Option<&AssetAdministrationShell> {
        self.shell.as_ref()
    }

    pub fn submodels(&self) -> &[Submodel] {
        &self.submodels
    }

    pub fn concept_descriptions(&self) -> &[ConceptDescription] {
        &self.concept_descriptions
    }

    /// Total number of submodel elements across all submodels.
    pub fn element_count(&self) -> usize {
        self.submodels.iter().map(|s| s.elements.len()).sum()
    }

    fn require_shell(&self) -> Result<&AssetAdministrationShell, AasError> {
        self.shell.as_ref().ok_or(AasError::NoShell)
    }

    fn submodel(&self, id_short: &str) -> Result<&Submodel, AasError> {
        self.submodels
            .iter()
            .find(|s| s.id_short == id_short)
            .ok_or_else(|| AasError::SubmodelNotFound(id_short.to_string()))
    }

    fn submodel_mut(&mut self, id_short: &str) -> Result<&mut Submodel, AasError> {
        self.submodels
            .iter_mut()
            .find(|s| s.id_short == id_short)
            .ok_or_else(|| AasError::SubmodelNotFound(id_short.to_string()))
    }

    // ── Edits ─────────────────────────────────────────────────────────────

    /// Start a new shell. Submodels of the previous shell go with it;
    /// concept descriptions stay.
    pub fn create_shell(
        &mut self,
        id: &str,
        id_short: &str,
        global_asset_id: &str,
    ) -> Result<&AssetAdministrationShell, AasError> {
        validate_identifier(id)?;
        validate_id_short(id_short)?;
        validate_identifier(global_asset_id)?;

        if !self.submodels.is_empty() {
            debug!(dropped = self.submodels.len(), "new shell replaces previous submodels");
        }
        self.submodels.clear();
        Ok(&*self.shell.insert(AssetAdministrationShell::instance(id, id_short, global_asset_id)))
    }

    pub fn add_submodel(&mut self, id: &str, id_short: &str) -> Result<&Submodel, AasError> {
        self.require_shell()?;
        validate_identifier(id)?;
        validate_id_short(id_short)?;
        if self.submodels.iter().any(|s| s.id == id) {
            return Err(AasError::Duplicate { kind: "Submodel", id: id.to_string() });
        }
        if self.submodels.iter().any(|s| s.id_short == id_short) {
            return Err(AasError::Duplicate { kind: "Submodel", id: id_short.to_string() });
        }

        if let Some(shell) = self.shell.as_mut() {
            shell.submodels.push(Reference::submodel(id));
        }
        self.submodels.push(Submodel::new(id, id_short));
        Ok(&self.submodels[self.submodels.len() - 1])
    }

    pub fn add_property(
        &mut self,
        submodel_id_short: &str,
        name: &str,
        value_type: &str,
        value: Option<&Value>,
        semantic_id: Option<&str>,
    ) -> Result<&Property, AasError> {
        let value_type = ValueType::from_tool_name(value_type)?;
        validate_id_short(name)?;
        let value = match value {
            None | Some(Value::Null) => None,
            Some(v) => Some(value_type.coerce(v)?),
        };
        let semantic_id = non_blank(semantic_id)
            .map(|id| validate_identifier(id).map(|_| Reference::global(id)))
            .transpose()?;

        let submodel = self.submodel_mut(submodel_id_short)?;
        if submodel.element(name).is_some() {
            return Err(AasError::Duplicate { kind: "Element", id: name.to_string() });
        }

        submodel.elements.push(SubmodelElement::Property(Property {
            id_short: name.to_string(),
            value_type,
            value,
            semantic_id,
            extra: Extra::new(),
        }));
        submodel.property(name)
    }

    pub fn update_property(
        &mut self,
        submodel_id_short: &str,
        name: &str,
        value: &Value,
    ) -> Result<PropertyUpdate, AasError> {
        let property = self.submodel_mut(submodel_id_short)?.property_mut(name)?;
        let new = property.value_type.coerce(value)?;

        let old = property.display_value();
        property.value = Some(new);
        Ok(PropertyUpdate { old, new: property.display_value() })
    }

    pub fn property_value(&self, submodel_id_short: &str, name: &str) -> Result<&Property, AasError> {
        self.submodel(submodel_id_short)?.property(name)
    }

    /// Add a concept description; one with the same `id` is replaced in place,
    /// keeping the members this crate does not edit (data specifications).
    pub fn add_concept_description(
        &mut self,
        id: &str,
        id_short: &str,
        preferred_name: Option<&str>,
        definition: Option<&str>,
    ) -> Result<&ConceptDescription, AasError> {
        validate_identifier(id)?;
        validate_id_short(id_short)?;

        let mut concept = ConceptDescription {
            id: id.to_string(),
            id_short: id_short.to_string(),
            display_name: non_blank(preferred_name).map(LangString::en).into_iter().collect(),
            description: non_blank(definition).map(LangString::en).into_iter().collect(),
            extra: Extra::new(),
        };

        let index = match self.concept_descriptions.iter().position(|c| c.id == id) {
            Some(i) => {
                concept.extra = std::mem::take(&mut self.concept_descriptions[i].extra);
                self.concept_descriptions[i] = concept;
                i
            }
            None => {
                self.concept_descriptions.push(concept);
                self.concept_descriptions.len() - 1
            }
        };
        Ok(&self.concept_descriptions[index])
    }

    pub fn update_semantic_id(
        &mut self,
        submodel_id_short: &str,
        name: &str,
        semantic_id: &str,
    ) -> Result<&Property, AasError> {
        validate_identifier(semantic_id)?;
        let property = self.submodel_mut(submodel_id_short)?.property_mut(name)?;
        property.semantic_id = Some(Reference::global(semantic_id));
        Ok(&*property)
    }

    // ── Serialization ─────────────────────────────────────────────────────

    /// Snapshot as an AAS environment. Requires a shell.
    pub fn environment(&self) -> Result<Environment, AasError> {
        let shell = self.require_shell()?;
        Ok(Environment {
            shells: vec![shell.clone()],
            submodels: self.submodels.clone(),
            concept_descriptions: self.concept_descriptions.clone(),
        })
    }

    pub fn to_json(&self) -> Result<String, AasError> {
        self.environment()?.to_json_pretty()
    }

    pub fn save(&self, path: &Path) -> Result<FileReport, AasError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        debug!(path = %path.display(), "aas saved");
        Ok(self.report(path))
    }

    /// Read a workspace from `path`: the first shell, every submodel and
    /// every concept description in the file.
    pub fn load(path: &Path) -> Result<(Self, FileReport), AasError> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AasError::FileNotFound(path.to_path_buf()),
            _ => AasError::Io(e),
        })?;
        let env = Environment::from_json(&text)?;
        let shell = env
            .shells
            .into_iter()
            .next()
            .ok_or_else(|| AasError::NoShellInFile(path.to_path_buf()))?;

        let workspace = Self {
            shell: Some(shell),
            submodels: env.submodels,
            concept_descriptions: env.concept_descriptions,
        };
        let report = workspace.report(path);
        debug!(path = %path.display(), submodels = report.submodels, "aas loaded");
        Ok((workspace, report))
    }

    fn report(&self, path: &Path) -> FileReport {
        FileReport {
            path: path.to_path_buf(),
            shell_id_short: self.shell.as_ref().map(|s| s.id_short.clone()).unwrap_or_default(),
            submodels: self.submodels.len(),
            elements: self.element_count(),
            concept_descriptions: self.concept_descriptions.len(),
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Resolve a user-supplied file name inside `data_dir`.
///
/// Only plain names are accepted: no separators, no `..`, not hidden.
pub fn resolve_file_name(data_dir: &Path, name: &str, mode: FileMode) -> Result<PathBuf, AasError> {
    let trimmed = name.trim();
    let invalid = || AasError::InvalidFileName(name.to_string());
    if trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.contains(['/', '\\'])
        || trimmed.chars().any(char::is_control)
    {
        return Err(invalid());
    }

    let has_json_ext = Path::new(trimmed)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let has_any_ext = Path::new(trimmed).extension().is_some();
    let file_name = match mode {
        FileMode::Save if !has_json_ext => format!("{trimmed}.json"),
        FileMode::Load if !has_any_ext => format!("{trimmed}.json"),
        _ => trimmed.to_string(),
    };
    Ok(data_dir.join(file_name))
}
