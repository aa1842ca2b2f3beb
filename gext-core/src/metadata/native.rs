//! Parser for compiled module sources (`main.c`)
//!
//! Recognises metadata assignments, possibly spanning several lines:
//!
//! ```text
//! module->description =
//!     _("Generalizes vector lines "
//!       "and areas.");
//! ```
//!
//! and keyword registrations such as `G_add_keyword(_("vector"));`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ModuleMetadata;

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bmodule\w*\s*->\s*(\w+)\s*=(.*)$").expect("valid assignment regex")
});

static KEYWORD_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bG_add_keyword\s*\((.+)\)\s*;").expect("valid keyword call regex")
});

const WRAPPER: &str = "_(";

/// Extract description and keywords from C source text
pub fn parse_native_source(text: &str) -> ModuleMetadata {
    let mut meta = ModuleMetadata::default();
    let mut pending: Option<String> = None;
    let mut value = String::new();

    for raw in text.lines() {
        let line = raw.trim();

        let chunk = if let Some(caps) = ASSIGNMENT.captures(line) {
            pending = Some(caps[1].to_string());
            value.clear();
            caps.get(2).map_or("", |m| m.as_str().trim())
        } else {
            if let Some(caps) = KEYWORD_CALL.captures(line) {
                let keyword = clean_literal(&caps[1]);
                if !keyword.is_empty() {
                    meta.keywords.push(keyword);
                }
            }
            line
        };

        let Some(key) = pending.as_deref() else {
            continue;
        };
        value.push_str(chunk);

        if value.ends_with(';') {
            let cleaned = clean_literal(&value);
            meta.assign(key, cleaned);
            pending = None;
            value.clear();
        }
    }

    meta
}

/// Strip string delimiters, the localisation wrapper and the statement terminator
fn clean_literal(raw: &str) -> String {
    let wrapped = raw.contains(WRAPPER);
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                out.push('"');
                chars.next();
            }
            '"' => {}
            _ => out.push(c),
        }
    }

    let unwrapped = out.replace(WRAPPER, "");
    let mut trimmed = unwrapped.trim_end();
    trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    if wrapped {
        trimmed = trimmed.strip_suffix(')').unwrap_or(trimmed);
    }
    trimmed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MAIN_C: &str = r#"
int main(int argc, char *argv[])
{
    struct GModule *module;

    G_gisinit(argv[0]);

    module = G_define_module();
    G_add_keyword(_("vector"));
    G_add_keyword(_("generalization"));
    module->description =
        _("Vector based generalization: "
          "simplification, smoothing.");

    if (G_parser(argc, argv))
        exit(EXIT_FAILURE);
}
"#;

    #[test]
    fn test_multiline_assignment_and_keyword_calls() {
        let meta = parse_native_source(MAIN_C);
        assert_eq!(
            meta.description,
            "Vector based generalization: simplification, smoothing."
        );
        assert_eq!(meta.keywords, vec!["vector", "generalization"]);
    }

    #[test]
    fn test_single_line_keywords_assignment() {
        let meta = parse_native_source(r#"module->keywords = _("raster, buffer, distance");"#);
        assert_eq!(meta.keywords, vec!["raster", "buffer", "distance"]);
    }

    #[test]
    fn test_value_free_of_quote_and_wrapper_artifacts() {
        let meta =
            parse_native_source(r#"    module->description = _("Sum (weighted) of \"cells\"");"#);
        assert_eq!(meta.description, "Sum (weighted) of \"cells\"");
        assert!(!meta.description.contains("_("));
        assert!(!meta.description.ends_with(';'));
    }

    #[test]
    fn test_unwrapped_literal() {
        let meta = parse_native_source(r#"module->label = "Raster buffer";"#);
        assert_eq!(meta.extra.get("label").map(String::as_str), Some("Raster buffer"));
    }

    #[test]
    fn test_both_patterns_merge() {
        let text = "module->keywords = _(\"imagery\");\nG_add_keyword(\"landsat\");\n";
        let meta = parse_native_source(text);
        assert_eq!(meta.keywords, vec!["imagery", "landsat"]);
    }

    #[test]
    fn test_unterminated_assignment_is_dropped() {
        let meta = parse_native_source("module->description = _(\"never closed\"\n");
        assert!(meta.description.is_empty());
    }

    #[test]
    fn test_unrelated_source_is_empty() {
        assert!(parse_native_source("int x = 1;\nreturn 0;\n").is_empty());
    }
}
