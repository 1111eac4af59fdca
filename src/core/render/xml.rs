use chrono::Local;

use super::super::code_map::{CodeMap, RelationshipKind};
use super::super::scanner::DefinitionKind;

/// XML document for machine-readable code map export.
pub fn render_code_map_xml(map: &CodeMap) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<codeMap generated=\"{}\">\n",
        Local::now().format("%Y-%m-%dT%H:%M:%S")
    ));

    for file in &map.files {
        out.push_str(&format!(
            "  <file path=\"{}\" language=\"{}\"",
            escape(&file.path.to_string_lossy()),
            file.language
        ));
        if let Some(error) = &file.error {
            out.push_str(&format!(" error=\"{}\"/>\n", escape(error)));
            continue;
        }
        out.push_str(">\n");

        for import in &file.imports {
            out.push_str(&format!(
                "    <import module=\"{}\" items=\"{}\"/>\n",
                escape(&import.module),
                escape(&import.items.join(","))
            ));
        }
        for def in &file.definitions {
            out.push_str(&format!(
                "    <definition kind=\"{}\" name=\"{}\" exported=\"{}\"/>\n",
                kind_name(def.kind),
                escape(&def.name),
                def.exported
            ));
        }
        for symbol in &file.public_api {
            out.push_str(&format!("    <api name=\"{}\"/>\n", escape(symbol)));
        }

        out.push_str("  </file>\n");
    }

    for rel in &map.relationships {
        let kind = match rel.kind {
            RelationshipKind::Imports => "imports",
            RelationshipKind::ReferencesType => "references_type",
            RelationshipKind::InheritsFrom => "inherits_from",
            RelationshipKind::ExtendsInterface => "extends_interface",
        };
        out.push_str(&format!(
            "  <relationship type=\"{}\" source=\"{}\" target=\"{}\"",
            kind,
            escape(&rel.source),
            escape(&rel.target)
        ));
        if let Some(type_name) = &rel.type_name {
            out.push_str(&format!(" typeName=\"{}\"", escape(type_name)));
        }
        if let (Some(s), Some(t)) = (&rel.source_type, &rel.target_type) {
            out.push_str(&format!(
                " sourceType=\"{}\" targetType=\"{}\"",
                escape(s),
                escape(t)
            ));
        }
        out.push_str("/>\n");
    }

    out.push_str("</codeMap>\n");
    out
}

fn kind_name(kind: DefinitionKind) -> &'static str {
    match kind {
        DefinitionKind::Function => "function",
        DefinitionKind::ArrowFunction => "arrow_function",
        DefinitionKind::Method => "method",
        DefinitionKind::Class => "class",
        DefinitionKind::Interface => "interface",
        DefinitionKind::Enum => "enum",
        DefinitionKind::TypeAlias => "type_alias",
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::code_map::CodeMapBuilder;
    use crate::core::scanner::SourceScanner;
    use std::path::Path;

    #[test]
    fn test_xml_is_escaped_and_well_formed_at_the_edges() {
        let scanner = SourceScanner::new().unwrap();
        let files = vec![scanner.scan_source(
            Path::new("a.ts"),
            "import { x } from './b';\nexport function f(a: Widget) {}\n",
        )];
        let map = CodeMapBuilder::new().build(files);
        let xml = render_code_map_xml(&map);

        assert!(xml.starts_with("<?xml"));
        assert!(xml.trim_end().ends_with("</codeMap>"));
        assert!(xml.contains("<file path=\"a.ts\" language=\"typescript\">"));
        assert!(xml.contains("<import module=\"./b\" items=\"x\"/>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
