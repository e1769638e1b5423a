use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use unicode_segmentation::UnicodeSegmentation;

lazy_static::lazy_static! {
    static ref TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref ANCHORS: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Elements whose text never counts as page words
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template", "svg"];

/// Turns raw page content into ordered words and outgoing link targets.
pub trait ContentParser: Send + Sync {
    /// Lower-cased alphabetic words longer than one character, in document order
    fn parse_words(&self, raw: &str) -> Vec<String>;

    /// Article link targets in document order
    fn parse_links(&self, raw: &str) -> Vec<String>;
}

/// Accept only same-site article paths: no query string, no namespace, required prefix.
pub fn is_article_link(href: &str, article_prefix: &str) -> bool {
    if href.contains('?') || href.contains(':') {
        return false;
    }
    href.starts_with(article_prefix)
}

/// The document `<title>`, trimmed
pub fn extract_title(raw: &str) -> Option<String> {
    let document = Html::parse_document(raw);
    let title = document
        .select(&TITLE)
        .next()
        .map(|node| node.text().collect::<String>())?;
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// HTML implementation of [`ContentParser`]
pub struct HtmlParser {
    article_prefix: String,
}

impl HtmlParser {
    pub fn new(article_prefix: impl Into<String>) -> Self {
        Self {
            article_prefix: article_prefix.into(),
        }
    }

    /// Split a text node into words
    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.unicode_words()
            .filter(|w| Self::is_word(w))
            .map(|w| w.to_ascii_lowercase())
    }

    fn is_word(token: &str) -> bool {
        token.len() > 1 && token.chars().all(|c| c.is_ascii_alphabetic())
    }

    fn collect_words(element: ElementRef, words: &mut Vec<String>) {
        if SKIPPED_ELEMENTS.contains(&element.value().name()) {
            return;
        }
        for child in element.children() {
            match child.value() {
                Node::Text(text) => words.extend(Self::tokenize(text)),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        Self::collect_words(child_element, words);
                    }
                }
                _ => {}
            }
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new("/wiki/")
    }
}

impl ContentParser for HtmlParser {
    fn parse_words(&self, raw: &str) -> Vec<String> {
        let document = Html::parse_document(raw);
        let mut words = Vec::new();
        Self::collect_words(document.root_element(), &mut words);
        words
    }

    fn parse_links(&self, raw: &str) -> Vec<String> {
        let document = Html::parse_document(raw);
        document
            .select(&ANCHORS)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| href.split('#').next().unwrap_or(href))
            .filter(|href| is_article_link(href, &self.article_prefix))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
        <head><title>Cat - Wikipedia</title><style>body { color: red }</style></head>
        <body>
            <h1>Cat</h1>
            <p>The cat (Felis catus) is a small carnivorous mammal, 3 kg.</p>
            <script>var x = "hidden words";</script>
            <a href="/wiki/Felis">Felis</a>
            <a href="/wiki/Mammal#Classification">mammals</a>
            <a href="/wiki/Special:Random">random</a>
            <a href="/w/index.php?title=Cat">edit</a>
            <a href="https://example.com/wiki/Cat">elsewhere</a>
            <a href="/wiki/Felis">again</a>
        </body>
    </html>"#;

    #[test]
    fn test_parse_words() {
        let words = HtmlParser::default().parse_words(PAGE);
        assert_eq!(
            &words[..8],
            &["cat", "the", "cat", "felis", "catus", "is", "small", "carnivorous"]
        );
        assert!(!words.contains(&"a".to_string()));
        assert!(words.contains(&"kg".to_string()));
        assert!(!words.contains(&"hidden".to_string()));
        assert!(!words.contains(&"color".to_string()));
        assert!(!words.contains(&"wikipedia".to_string()));
        assert!(words.iter().all(|w| w.len() > 1));
    }

    #[test]
    fn test_parse_links() {
        let links = HtmlParser::default().parse_links(PAGE);
        assert_eq!(links, vec!["/wiki/Felis", "/wiki/Mammal", "/wiki/Felis"]);
    }

    #[test]
    fn test_is_article_link() {
        assert!(is_article_link("/wiki/Cat", "/wiki/"));
        assert!(!is_article_link("/wiki/File:Cat.jpg", "/wiki/"));
        assert!(!is_article_link("/wiki/Cat?action=edit", "/wiki/"));
        assert!(!is_article_link("/w/Cat", "/wiki/"));
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title(PAGE).as_deref(), Some("Cat - Wikipedia"));
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
    }
}
