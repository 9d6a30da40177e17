//! Page template
//!
//! The page is a single static template with `{{key}}` placeholders. Values
//! are substituted in one pass, so substituted text is never scanned again.

use std::collections::HashMap;

use serde_json::Value;

const TEMPLATE: &str = include_str!("../templates/taxonomy.html");

/// Opening tag of the data block holding the tree
pub const DATA_BLOCK_OPEN: &str = r#"<script id="taxonomy-data" type="application/json">"#;

const DATA_BLOCK_CLOSE: &str = "</script>";

/// Values for one rendered page
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub d3_url: &'a str,
    pub summary: &'a str,
    pub initial_depth: u32,
    pub tree: &'a Value,
}

/// Fill the page template
pub fn render_page(ctx: &PageContext<'_>) -> serde_json::Result<String> {
    let mut values: HashMap<&str, String> = HashMap::new();
    values.insert("title", escape_html(ctx.title));
    values.insert("d3_url", escape_html(ctx.d3_url));
    values.insert("summary", escape_html(ctx.summary));
    values.insert("initial_depth", ctx.initial_depth.to_string());
    values.insert("taxonomy_json", embed_json(ctx.tree)?);

    Ok(substitute(TEMPLATE, &values))
}

/// Replace `{{key}}` placeholders; unknown keys are kept verbatim
fn substitute(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len() + values.values().map(String::len).sum::<usize>());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match values.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Escapes HTML special characters in a string.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Serialize a JSON value for a `<script>` data block.
///
/// `<`, `>` and `&` only occur inside JSON strings, where the `\uXXXX`
/// forms decode to the same characters.
pub fn embed_json(value: &Value) -> serde_json::Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

/// Read the tree back out of a rendered page
pub fn embedded_tree(html: &str) -> Option<Value> {
    let start = html.find(DATA_BLOCK_OPEN)? + DATA_BLOCK_OPEN.len();
    let len = html[start..].find(DATA_BLOCK_CLOSE)?;
    serde_json::from_str(&html[start..start + len]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_placeholders() {
        for key in ["title", "d3_url", "summary", "initial_depth", "taxonomy_json"] {
            assert!(TEMPLATE.contains(&format!("{{{{{key}}}}}")), "missing {key}");
        }
        assert!(TEMPLATE.contains(DATA_BLOCK_OPEN));
    }

    #[test]
    fn test_search_restores_expansion() {
        let search = &TEMPLATE[TEMPLATE.find("function search(").unwrap()..];
        assert!(search.contains("savedExpansion = captureExpansionState()"));
        assert!(search.contains("restoreExpansionState(savedExpansion)"));
        assert!(TEMPLATE.contains("function restoreExpansionState(state)"));
    }

    #[test]
    fn test_substitute_single_pass() {
        let mut values = HashMap::new();
        values.insert("a", "{{b}}".to_string());
        values.insert("b", "never".to_string());

        assert_eq!(substitute("x{{a}}y", &values), "x{{b}}y");
        assert_eq!(substitute("{{ a }}", &values), "{{b}}");
        assert_eq!(substitute("{{unknown}} {{a", &values), "{{unknown}} {{a");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Fügen" & Kleben</b>"#),
            "&lt;b&gt;&quot;Fügen&quot; &amp; Kleben&lt;/b&gt;"
        );
    }

    #[test]
    fn test_embed_json_cannot_close_script() {
        let value = json!({"id": "a", "label": "</script><script>alert(1)</script> & more", "children": []});
        let embedded = embed_json(&value).unwrap();

        assert!(!embedded.contains("</script"));
        assert!(!embedded.contains('<'));
        assert!(!embedded.contains('&'));

        let back: Value = serde_json::from_str(&embedded).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_render_page() {
        let tree = json!({"id": "urn:root", "label": "DIN8580", "children": []});
        let html = render_page(&PageContext {
            title: "Fertigung <alle>",
            d3_url: "https://d3js.org/d3.v7.min.js",
            summary: "1 nodes",
            initial_depth: 2,
            tree: &tree,
        })
        .unwrap();

        assert!(html.contains("<title>Fertigung &lt;alle&gt;</title>"));
        assert!(html.contains(r#"<script src="https://d3js.org/d3.v7.min.js"></script>"#));
        assert!(html.contains("const INITIAL_DEPTH = 2;"));
        assert!(!html.contains("{{"));
        assert_eq!(embedded_tree(&html), Some(tree));
    }

    #[test]
    fn test_embedded_tree_missing_block() {
        assert_eq!(embedded_tree("<html></html>"), None);
    }
}
