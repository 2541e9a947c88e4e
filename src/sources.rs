use regex::Regex;
use std::sync::OnceLock;

pub const SOURCES_LABEL: &str = "Sources: ";
pub const SOURCE_SEPARATOR: &str = ", ";

fn edge_noise() -> &'static Regex {
    static EDGE_NOISE: OnceLock<Regex> = OnceLock::new();
    EDGE_NOISE.get_or_init(|| Regex::new(r#"^["'\s]+|["'\s]+$"#).expect("static regex"))
}

/// A citation as displayed (`label`) and as opened (`target`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    pub label: String,
    pub target: String,
}

impl SourceLink {
    pub fn new(source: &str) -> Self {
        Self {
            label: source.to_string(),
            target: clean_source(source),
        }
    }
}

/// Strip surrounding whitespace and quote characters from a source so it can be opened
pub fn clean_source(source: &str) -> String {
    edge_noise().replace_all(source, "").into_owned()
}

pub fn links(sources: &[String]) -> Vec<SourceLink> {
    sources.iter().map(|s| SourceLink::new(s)).collect()
}

/// Plain-text "Sources: a, b" line, or `None` when there is nothing to cite
pub fn format_sources(sources: &[String]) -> Option<String> {
    if sources.is_empty() {
        return None;
    }
    Some(format!("{}{}", SOURCES_LABEL, sources.join(SOURCE_SEPARATOR)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quotes_and_whitespace_at_edges() {
        assert_eq!(clean_source("  \"s3://bucket/doc.txt\" "), "s3://bucket/doc.txt");
        assert_eq!(clean_source("'http://a'"), "http://a");
        assert_eq!(clean_source("http://a"), "http://a");
    }

    #[test]
    fn keeps_inner_quotes() {
        assert_eq!(clean_source("\"it's here\""), "it's here");
    }

    #[test]
    fn formats_with_separator() {
        let sources = vec!["http://a".to_string(), "http://b".to_string()];
        assert_eq!(
            format_sources(&sources).as_deref(),
            Some("Sources: http://a, http://b")
        );
        assert_eq!(format_sources(&[]), None);
    }

    #[test]
    fn link_keeps_raw_label() {
        let link = SourceLink::new(" 'http://a' ");
        assert_eq!(link.label, " 'http://a' ");
        assert_eq!(link.target, "http://a");
    }
}
