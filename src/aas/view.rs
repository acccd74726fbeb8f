//! Human-readable renderings of a workspace for chat replies.

use std::fmt::Write as _;

use super::model::SubmodelElement;
use super::workspace::AasWorkspace;

impl AasWorkspace {
    /// Plain-text state summary. Also fed to the model as prompt context.
    pub fn summary(&self) -> String {
        let Some(shell) = self.shell() else {
            return "No AAS exists yet.".to_string();
        };

        let mut out = String::new();
        let _ = writeln!(out, "Current AAS: {} ({})", shell.id_short, shell.id);
        let _ = writeln!(
            out,
            "Asset ID: {}",
            shell.asset_information.global_asset_id.as_deref().unwrap_or("(none)")
        );
        let _ = writeln!(out, "Number of Submodels: {}", self.submodels().len());

        if !self.submodels().is_empty() {
            out.push_str("\nSubmodels:\n");
            for sm in self.submodels() {
                let _ = writeln!(out, "  - {}: {} elements", sm.id_short, sm.elements.len());
                for p in sm.properties() {
                    let _ = writeln!(out, "    • {} ({}): {}", p.id_short, p.value_type, p.display_value());
                }
            }
        }
        out
    }

    /// Box-drawing tree of the shell, or `None` when there is no shell.
    pub fn tree_view(&self) -> Option<String> {
        let shell = self.shell()?;
        let mut lines: Vec<String> = vec![
            "📦 Asset Administration Shell".into(),
            "│".into(),
            format!("├─ ID Short: {}", shell.id_short),
            format!("├─ ID: {}", shell.id),
            "├─ 🏭 Asset Information".into(),
            format!(
                "│  ├─ Global Asset ID: {}",
                shell.asset_information.global_asset_id.as_deref().unwrap_or("(none)")
            ),
            format!("│  └─ Asset Kind: {}", shell.asset_information.asset_kind),
        ];

        let submodels = self.submodels();
        if submodels.is_empty() {
            lines.push("└─ Submodels: 0 (empty)".into());
        } else {
            lines.push("│".into());
        }

        for (i, sm) in submodels.iter().enumerate() {
            let last_sm = i + 1 == submodels.len();
            let (branch, cont) = if last_sm { ("└─", "   ") } else { ("├─", "│  ") };
            lines.push(format!("{branch} 📋 Submodel: {}", sm.id_short));
            lines.push(format!("{cont}├─ ID: {}", sm.id));

            if sm.elements.is_empty() {
                lines.push(format!("{cont}└─ Elements: 0 (empty)"));
            } else {
                lines.push(format!("{cont}├─ Elements: {}", sm.elements.len()));
                lines.push(format!("{cont}│"));
                for (j, element) in sm.elements.iter().enumerate() {
                    let last_el = j + 1 == sm.elements.len();
                    let el_branch = if last_el { "└─" } else { "├─" };
                    let el_cont = if last_el { "   " } else { "│  " };
                    lines.push(format!("{cont}│  {el_branch} 📌 {}", element.id_short()));
                    match element {
                        SubmodelElement::Property(p) => {
                            lines.push(format!("{cont}│  {el_cont}├─ Type: {}", p.value_type));
                            lines.push(format!("{cont}│  {el_cont}└─ Value: {}", p.display_value()));
                        }
                        SubmodelElement::Opaque(o) => {
                            lines.push(format!("{cont}│  {el_cont}└─ Kind: {}", o.model_type));
                        }
                    }
                }
            }

            if !last_sm {
                lines.push("│".into());
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "Summary: {} Submodel(s), {} Element(s)",
            submodels.len(),
            self.element_count()
        ));
        Some(lines.join("\n"))
    }
}
