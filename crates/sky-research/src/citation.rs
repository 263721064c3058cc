//! Citation extraction and report formatting.
//!
//! This is a heuristic line-based prettifier, not a markup parser. The only
//! patterns it promises to render are:
//!
//! - `**Header:**` / `**Header**:` lines and `#`-style lines become `<h4>`
//! - `-`, `*` and `•` lines become `<ul>` items; `1.` / `1)` lines become
//!   `<ol>` items
//! - `**bold**` spans become `<strong>`
//! - blank-line runs of any length separate paragraphs; single newlines
//!   inside a paragraph become `<br>`
//!
//! Everything else is HTML-escaped text. URLs found in the narrative are
//! classified; accepted ones are replaced by numbered `[n]` markers and
//! listed in a references block, rejected ones stay as plain text.
//!
//! Formatting is a pure function of the narrative, so formatting the same
//! input twice yields identical output and identical numbering.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use sky_core::SourceCitation;
use url::{Host, Url};

/// Agencies whose links are always accepted, matched on the host or any
/// subdomain of it.
pub const TRUSTED_DOMAINS: &[&str] = &[
    "weather.gov",
    "noaa.gov",
    "nasa.gov",
    "faa.gov",
    "esa.int",
    "metoffice.gov.uk",
];

// Bold spans are swapped for these before URL scanning so that a link
// wrapped in `**` is still found cleanly.
const BOLD_OPEN: char = '\u{1}';
const BOLD_CLOSE: char = '\u{2}';

static URL_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"\x01\x02]+"#).expect("URL pattern is valid")
});
static BOLD_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\*\*([^*:]+?)\s*(?::\*\*|\*\*:)\s*(.*)$").expect("header pattern is valid")
});
static HASH_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#{1,6}\s+(.+?)\s*#*\s*$").expect("heading pattern is valid")
});
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*•]\s+(.+)$").expect("bullet pattern is valid"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,3}[.)]\s+(.+)$").expect("numbered pattern is valid"));
static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("bold pattern is valid"));

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Why a candidate URL was left unlinked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Contains `[` or `]`.
    Bracket,
    Whitespace,
    /// A second scheme inside the URL, e.g. `https://a.comhttps://b.com`.
    NestedUrl,
    UnbalancedParens,
    /// Failed the generic well-formedness check.
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlVerdict {
    /// Host is on the trusted allowlist.
    Trusted,
    /// Passed the generic check.
    WellFormed,
    Rejected(RejectReason),
}

impl UrlVerdict {
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Classify one candidate URL.
///
/// Known-malformed patterns are rejected first, whatever the host. Then a
/// trusted host is accepted outright, and anything else must parse as an
/// absolute http(s) URL with a dotted DNS host and a clean path.
#[must_use]
pub fn classify(candidate: &str) -> UrlVerdict {
    if let Some(reason) = malformed(candidate) {
        return UrlVerdict::Rejected(reason);
    }
    if host_of(candidate).is_some_and(|host| is_trusted(&host)) {
        return UrlVerdict::Trusted;
    }
    if is_well_formed(candidate) {
        UrlVerdict::WellFormed
    } else {
        UrlVerdict::Rejected(RejectReason::Malformed)
    }
}

fn malformed(candidate: &str) -> Option<RejectReason> {
    if candidate.contains(['[', ']']) {
        return Some(RejectReason::Bracket);
    }
    if candidate.chars().any(char::is_whitespace) {
        return Some(RejectReason::Whitespace);
    }
    if candidate.matches("://").count() > 1 {
        return Some(RejectReason::NestedUrl);
    }
    if candidate.matches('(').count() != candidate.matches(')').count() {
        return Some(RejectReason::UnbalancedParens);
    }
    None
}

/// Lowercased host with any leading `www.` removed. Taken from the parsed
/// URL when it parses, so userinfo and backslash separators resolve the way
/// a browser would; otherwise read from the text.
fn host_of(candidate: &str) -> Option<String> {
    let host = match Url::parse(candidate) {
        Ok(url) => url.host_str()?.to_ascii_lowercase(),
        Err(_) => {
            let (_, rest) = candidate.split_once("://")?;
            let authority = rest.split(['/', '\\', '?', '#']).next()?;
            let host_port = authority.rsplit('@').next()?;
            host_port.split(':').next()?.to_ascii_lowercase()
        }
    };
    let host = host.strip_prefix("www.").map_or_else(|| host.clone(), str::to_string);
    (!host.is_empty()).then_some(host)
}

/// Key two spellings of the same address share: parsed and reserialised,
/// host without `www.`, empty path as `/`.
fn canonical_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url.trim()) else {
        return url.trim().to_ascii_lowercase();
    };
    if let Some(bare) = parsed
        .host_str()
        .and_then(|host| host.strip_prefix("www."))
        .map(str::to_string)
    {
        let _ = parsed.set_host(Some(&bare));
    }
    parsed.into()
}

fn is_trusted(host: &str) -> bool {
    TRUSTED_DOMAINS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

fn is_well_formed(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(Host::Domain(host)) = url.host() else {
        return false;
    };

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    let path_ok = !candidate.contains(['{', '}', '|', '\\', '^', '`']);
    labels_ok && tld_ok && path_ok
}

/// Strip trailing sentence punctuation and closing brackets that have no
/// opening partner inside the URL.
fn trim_candidate(raw: &str) -> &str {
    let mut s = raw;
    loop {
        let Some(last) = s.chars().last() else {
            return s;
        };
        let unbalanced = |open: char, close: char| {
            last == close && s.matches(open).count() < s.matches(close).count()
        };
        if matches!(last, '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '*')
            || unbalanced('(', ')')
            || unbalanced('[', ']')
            || unbalanced('{', '}')
        {
            s = &s[..s.len() - last.len_utf8()];
        } else {
            return s;
        }
    }
}

/// Reference title for a URL: its host without `www.`.
#[must_use]
pub fn display_title(url: &str) -> String {
    host_of(url).unwrap_or_else(|| url.to_string())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One numbered reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub number: usize,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedReport {
    pub html: String,
    pub references: Vec<Citation>,
}

#[derive(Default)]
struct References {
    list: Vec<Citation>,
    by_url: HashMap<String, usize>,
}

impl References {
    fn cite(&mut self, url: &str, title: Option<&str>) -> usize {
        let key = canonical_url(url);
        if let Some(&number) = self.by_url.get(&key) {
            return number;
        }
        let number = self.list.len() + 1;
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or_else(|| display_title(url), str::to_string);
        self.list.push(Citation {
            number,
            url: url.to_string(),
            title,
        });
        self.by_url.insert(key, number);
        number
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    const fn tag(self) -> &'static str {
        match self {
            Self::Bullet => "ul",
            Self::Numbered => "ol",
        }
    }
}

#[derive(Default)]
struct Blocks {
    html: String,
    paragraph: Vec<String>,
    list: Option<(ListKind, Vec<String>)>,
}

impl Blocks {
    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let _ = writeln!(self.html, "<p>{}</p>", self.paragraph.join("<br>"));
        self.paragraph.clear();
    }

    fn flush_list(&mut self) {
        let Some((kind, items)) = self.list.take() else {
            return;
        };
        let _ = writeln!(self.html, "<{}>", kind.tag());
        for item in items {
            let _ = writeln!(self.html, "<li>{item}</li>");
        }
        let _ = writeln!(self.html, "</{}>", kind.tag());
    }

    fn flush(&mut self) {
        self.flush_paragraph();
        self.flush_list();
    }

    fn heading(&mut self, text: String) {
        self.flush();
        let _ = writeln!(self.html, "<h4>{text}</h4>");
    }

    fn item(&mut self, kind: ListKind, text: String) {
        self.flush_paragraph();
        if self.list.as_ref().is_some_and(|(k, _)| *k != kind) {
            self.flush_list();
        }
        self.list.get_or_insert_with(|| (kind, Vec::new())).1.push(text);
    }

    fn line(&mut self, text: String) {
        self.flush_list();
        self.paragraph.push(text);
    }
}

/// Turns narratives into linked, numbered HTML reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct CitationProcessor;

impl CitationProcessor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Format a narrative with only the citations found in its text.
    #[must_use]
    pub fn format(&self, narrative: &str) -> FormattedReport {
        self.format_with_sources(narrative, &[])
    }

    /// Format a narrative, then append upstream citations that pass the
    /// same classification and are not already numbered.
    #[must_use]
    pub fn format_with_sources(
        &self,
        narrative: &str,
        sources: &[SourceCitation],
    ) -> FormattedReport {
        let mut refs = References::default();
        let mut blocks = Blocks::default();

        let cleaned = narrative
            .replace("\r\n", "\n")
            .replace([BOLD_OPEN, BOLD_CLOSE], "");

        for line in cleaned.lines() {
            if line.trim().is_empty() {
                blocks.flush();
            } else if let Some(caps) = BOLD_HEADER.captures(line) {
                blocks.heading(render_inline(&caps[1], &mut refs));
                let rest = caps[2].trim();
                if !rest.is_empty() {
                    blocks.line(render_inline(rest, &mut refs));
                }
            } else if let Some(caps) = HASH_HEADER.captures(line) {
                blocks.heading(render_inline(&caps[1], &mut refs));
            } else if let Some(caps) = BULLET_ITEM.captures(line) {
                blocks.item(ListKind::Bullet, render_inline(&caps[1], &mut refs));
            } else if let Some(caps) = NUMBERED_ITEM.captures(line) {
                blocks.item(ListKind::Numbered, render_inline(&caps[1], &mut refs));
            } else {
                blocks.line(render_inline(line.trim(), &mut refs));
            }
        }
        blocks.flush();

        for source in sources {
            let url = source.url.trim();
            if !url.is_empty() && classify(url).is_accepted() {
                refs.cite(url, Some(&source.title));
            }
        }

        let mut html = blocks.html;
        if !refs.list.is_empty() {
            html.push_str("<div class=\"references\">\n<h4>References</h4>\n<ol>\n");
            for citation in &refs.list {
                let _ = writeln!(
                    html,
                    "<li id=\"ref-{}\"><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></li>",
                    citation.number,
                    escape(&citation.url),
                    escape(&citation.title),
                );
            }
            html.push_str("</ol>\n</div>\n");
        }

        tracing::debug!(references = refs.list.len(), "formatted research report");
        FormattedReport {
            html,
            references: refs.list,
        }
    }
}

/// Escape one line of text, mark bold spans, and swap accepted URLs for
/// numbered markers.
fn render_inline(text: &str, refs: &mut References) -> String {
    let text = BOLD_SPAN.replace_all(text, format!("{BOLD_OPEN}$1{BOLD_CLOSE}"));
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for found in URL_CANDIDATE.find_iter(&text) {
        let candidate = trim_candidate(found.as_str());
        if candidate.len() <= "https://".len() {
            continue;
        }
        push_escaped(&mut out, &text[cursor..found.start()]);
        if classify(candidate).is_accepted() {
            let number = refs.cite(candidate, None);
            let _ = write!(
                out,
                "<sup class=\"citation\"><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">[{number}]</a></sup>",
                escape(candidate),
            );
        } else {
            push_escaped(&mut out, candidate);
        }
        cursor = found.start() + candidate.len();
    }
    push_escaped(&mut out, &text[cursor..]);
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            BOLD_OPEN => out.push_str("<strong>"),
            BOLD_CLOSE => out.push_str("</strong>"),
            _ => out.push(c),
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("http://weather.gov/x", UrlVerdict::Trusted)]
    #[case("https://www.nasa.gov/feature/{id}", UrlVerdict::Trusted)]
    #[case("https://radar_site.weather.gov/loop", UrlVerdict::Trusted)]
    #[case("https://example.com/a/b?c=d", UrlVerdict::WellFormed)]
    #[case("http://bad[url.com", UrlVerdict::Rejected(RejectReason::Bracket))]
    #[case("https://weather.gov/[x]", UrlVerdict::Rejected(RejectReason::Bracket))]
    #[case(
        "https://a.comhttps://b.com",
        UrlVerdict::Rejected(RejectReason::NestedUrl)
    )]
    #[case("https://example.com/a(b", UrlVerdict::Rejected(RejectReason::UnbalancedParens))]
    #[case("https://radar_site.example.com/x", UrlVerdict::Rejected(RejectReason::Malformed))]
    #[case("https://example.com/image/{id}", UrlVerdict::Rejected(RejectReason::Malformed))]
    #[case("https://localhost/x", UrlVerdict::Rejected(RejectReason::Malformed))]
    #[case("https://192.168.0.1/x", UrlVerdict::Rejected(RejectReason::Malformed))]
    #[case("https://example.c0m", UrlVerdict::Rejected(RejectReason::Malformed))]
    #[case("https://evil.com\\@weather.gov/x", UrlVerdict::Rejected(RejectReason::Malformed))]
    #[case("https://user@weather.gov/x", UrlVerdict::Trusted)]
    fn classification(#[case] url: &str, #[case] expected: UrlVerdict) {
        assert_eq!(classify(url), expected);
    }

    #[test]
    fn lookalike_hosts_are_not_trusted() {
        assert!(!is_trusted("notweather.gov"));
        assert!(!is_trusted("weather.gov.evil.com"));
        assert!(is_trusted("forecast.weather.gov"));
    }

    #[rstest]
    #[case("https://nasa.gov/a.", "https://nasa.gov/a")]
    #[case("https://nasa.gov/a),", "https://nasa.gov/a")]
    #[case("https://en.wikipedia.org/wiki/Foo_(bar))", "https://en.wikipedia.org/wiki/Foo_(bar)")]
    #[case("https://nasa.gov/a?!", "https://nasa.gov/a")]
    fn trailing_punctuation_is_trimmed(#[case] raw: &str, #[case] trimmed: &str) {
        assert_eq!(trim_candidate(raw), trimmed);
    }

    #[test]
    fn accepted_and_rejected_urls() {
        let report = CitationProcessor::new()
            .format("See http://weather.gov/x and http://bad[url.com");

        assert_eq!(
            report.references,
            vec![Citation {
                number: 1,
                url: "http://weather.gov/x".into(),
                title: "weather.gov".into(),
            }]
        );
        assert_eq!(report.html.matches("[1]").count(), 1);
        assert!(report.html.contains("http://bad[url.com"));
        assert!(!report.html.contains("href=\"http://bad"));
        assert!(report.html.contains("<div class=\"references\">"));
    }

    #[test]
    fn backslash_userinfo_does_not_borrow_a_trusted_host() {
        let narrative = "Details at https://evil.com\\@weather.gov/x today";
        let report = CitationProcessor::new().format(narrative);
        assert!(report.references.is_empty());
        assert!(!report.html.contains("href="));
        assert!(report.html.contains("https://evil.com\\@weather.gov/x"));
        assert_eq!(display_title("https://evil.com\\@weather.gov/x"), "evil.com");
    }

    #[rstest]
    #[case("https://NASA.gov/a", "https://nasa.gov/a")]
    #[case("https://www.weather.gov", "https://weather.gov/")]
    #[case("https://weather.gov:443/", "https://weather.gov/")]
    fn spellings_share_a_canonical_form(#[case] url: &str, #[case] canonical: &str) {
        assert_eq!(canonical_url(url), canonical);
    }

    #[test]
    fn equivalent_spellings_share_one_reference() {
        let sources = vec![SourceCitation {
            title: "NWS".into(),
            url: "https://weather.gov/".into(),
        }];
        let report = CitationProcessor::new().format_with_sources(
            "See https://NASA.gov/a and https://nasa.gov/a and https://www.weather.gov",
            &sources,
        );

        let urls: Vec<&str> = report.references.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://NASA.gov/a", "https://www.weather.gov"]);
        assert_eq!(report.html.matches(">[1]<").count(), 2);
        assert_eq!(report.html.matches(">[2]<").count(), 1);
        assert!(!report.html.contains("[3]"));
    }

    #[test]
    fn repeated_url_reuses_number() {
        let report = CitationProcessor::new().format(
            "First https://www.noaa.gov/storm. Later https://example.org/a and again https://www.noaa.gov/storm",
        );
        let numbers: Vec<usize> = report.references.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(report.references[0].title, "noaa.gov");
        assert_eq!(report.html.matches(">[1]<").count(), 2);
        assert_eq!(report.html.matches(">[2]<").count(), 1);
    }

    #[test]
    fn no_accepted_urls_means_no_references_block() {
        let report = CitationProcessor::new().format("Nothing to cite here, only http://bad[x].com");
        assert!(report.references.is_empty());
        assert!(!report.html.contains("references"));
    }

    #[test]
    fn structure_cleanup() {
        let narrative = "**Weather Conditions:**\nClear skies.\nLight wind.\n\n\n\n\n## Aviation\n- Flight one\n- Flight two\n1. Step\n2) Step two\nA **bold** claim & more";
        let html = CitationProcessor::new().format(narrative).html;
        assert_eq!(
            html,
            "<h4>Weather Conditions</h4>\n\
             <p>Clear skies.<br>Light wind.</p>\n\
             <h4>Aviation</h4>\n\
             <ul>\n<li>Flight one</li>\n<li>Flight two</li>\n</ul>\n\
             <ol>\n<li>Step</li>\n<li>Step two</li>\n</ol>\n\
             <p>A <strong>bold</strong> claim &amp; more</p>\n"
        );
    }

    #[test]
    fn header_with_trailing_text() {
        let html = CitationProcessor::new()
            .format("**Assessment**: likely Starlink")
            .html;
        assert_eq!(html, "<h4>Assessment</h4>\n<p>likely Starlink</p>\n");
    }

    #[test]
    fn markup_in_narrative_is_escaped() {
        let html = CitationProcessor::new().format("<script>alert(1)</script>").html;
        assert_eq!(html, "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>\n");
    }

    #[test]
    fn bold_wrapped_url_is_linked() {
        let report = CitationProcessor::new().format("Source: **https://www.faa.gov/uas**");
        assert_eq!(report.references.len(), 1);
        assert_eq!(report.references[0].url, "https://www.faa.gov/uas");
        assert!(report.html.contains("<strong><sup class=\"citation\">"));
    }

    #[test]
    fn formatting_is_repeatable() {
        let processor = CitationProcessor::new();
        let narrative = "See https://weather.gov/a, https://example.com/b and https://weather.gov/a.";
        let first = processor.format(narrative);
        let second = processor.format(narrative);
        assert_eq!(first, second);
        assert_eq!(first.references.len(), 2);

        let reformatted = processor.format(&first.html);
        assert_eq!(reformatted.references.len(), first.references.len());
    }

    #[test]
    fn upstream_sources_are_merged_after_narrative() {
        let sources = vec![
            SourceCitation {
                title: "NWS Albuquerque".into(),
                url: "https://www.weather.gov/abq".into(),
            },
            SourceCitation {
                title: "Repeat".into(),
                url: "https://example.com/b".into(),
            },
            SourceCitation {
                title: "Broken".into(),
                url: "https://bad[url].com".into(),
            },
            SourceCitation {
                title: String::new(),
                url: "https://www.esa.int/space".into(),
            },
        ];
        let report = CitationProcessor::new()
            .format_with_sources("Compare https://example.com/b", &sources);

        let summary: Vec<(usize, &str)> = report
            .references
            .iter()
            .map(|c| (c.number, c.title.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![(1, "example.com"), (2, "NWS Albuquerque"), (3, "esa.int")]
        );
    }
}
