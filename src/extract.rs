use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ExtractionResult;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_TITLE: &str = "Prodotto senza nome";

/// Substrings that mark a scanned image as site chrome rather than content.
const CHROME_NEEDLES: &[&str] = &["icon", "logo"];

/// Replacement order matters: `&amp;` goes first so `&amp;lt;` ends up as `<`.
const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
];

// ── Lazy static regexes ──────────────────────────────────────────────────────

static IMG_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["'](https://[^"']+?\.(?:jpe?g|png|webp|gif))["'][^>]*>"#)
        .unwrap()
});

static IMG_DATA_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]+data-src=["'](https://[^"']+?\.(?:jpe?g|png|webp|gif))["'][^>]*>"#)
        .unwrap()
});

static CSS_BACKGROUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)background-image:\s*url\(["']?(https://[^"']+?\.(?:jpe?g|png|webp|gif))["']?\)"#,
    )
    .unwrap()
});

// Pulls the image URL back out of a whole tag/declaration match.
static IMAGE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(https://[^"']+?\.(?:jpe?g|png|webp|gif))"#).unwrap());

static TITLE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<title[^>]*>(.*?)</title>").unwrap());

static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<h1[^>]*>(.*?)</h1>").unwrap());

static TITLE_CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)class=["'][^"']*title[^"']*["'][^>]*>(.*?)<"#).unwrap()
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

// ── Cascades ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum ImageSource {
    Meta(&'static str),
    ImgSrc,
    ImgDataSrc,
    CssBackground,
}

const IMAGE_CASCADE: &[ImageSource] = &[
    ImageSource::Meta("og:image"),
    ImageSource::Meta("twitter:image"),
    ImageSource::Meta("twitter:image:src"),
    ImageSource::ImgSrc,
    ImageSource::ImgDataSrc,
    ImageSource::CssBackground,
];

impl ImageSource {
    fn resolve(self, html: &str) -> Option<String> {
        match self {
            ImageSource::Meta(property) => get_meta(html, property),
            ImageSource::ImgSrc => scan_images(html, &IMG_SRC_RE),
            ImageSource::ImgDataSrc => scan_images(html, &IMG_DATA_SRC_RE),
            ImageSource::CssBackground => scan_images(html, &CSS_BACKGROUND_RE),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TitleSource {
    Meta(&'static str),
    TitleTag,
    FirstH1,
    TitleClass,
}

const TITLE_CASCADE: &[TitleSource] = &[
    TitleSource::Meta("og:title"),
    TitleSource::Meta("twitter:title"),
    TitleSource::TitleTag,
    TitleSource::FirstH1,
    TitleSource::TitleClass,
];

impl TitleSource {
    fn resolve(self, html: &str) -> Option<String> {
        match self {
            TitleSource::Meta(property) => get_meta(html, property),
            TitleSource::TitleTag => markup_text(html, &TITLE_TAG_RE),
            TitleSource::FirstH1 => markup_text(html, &H1_RE),
            TitleSource::TitleClass => markup_text(html, &TITLE_CLASS_RE),
        }
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Resolves the preview title and image of a page from its raw markup.
///
/// Never fails: a page with nothing recognisable yields no image and
/// [`DEFAULT_TITLE`].
pub fn extract(html: &str) -> ExtractionResult {
    let image = IMAGE_CASCADE.iter().find_map(|source| source.resolve(html));

    let title = TITLE_CASCADE
        .iter()
        .find_map(|source| source.resolve(html))
        .map(|raw| decode_entities(&raw).trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    ExtractionResult {
        image,
        title,
        success: true,
    }
}

/// Looks up the `content` of a `<meta>` tag identified by `property`.
///
/// Three tag shapes are tried in order and the first one yielding a
/// non-empty value wins. Values come back still entity-encoded.
pub fn get_meta(html: &str, property: &str) -> Option<String> {
    meta_shapes(property).iter().find_map(|re| {
        re.captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}

// ── Meta-tag shapes ──────────────────────────────────────────────────────────

fn meta_shapes(property: &str) -> Vec<Regex> {
    let p = regex::escape(property);
    [
        format!(r#"(?i)<meta[^>]+property=["']{p}["'][^>]+content=["'](.*?)["'][^>]*>"#),
        format!(r#"(?i)<meta[^>]+name=["']{p}["'][^>]+content=["'](.*?)["'][^>]*>"#),
        format!(r#"(?i)<meta[^>]+content=["'](.*?)["'][^>]+(?:property|name)=["']{p}["'][^>]*>"#),
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
}

// ── Markup scanning ──────────────────────────────────────────────────────────

fn scan_images(html: &str, pattern: &Regex) -> Option<String> {
    pattern
        .find_iter(html)
        .filter_map(|m| IMAGE_URL_RE.find(m.as_str()))
        .map(|url| url.as_str())
        .find(|url| !CHROME_NEEDLES.iter().any(|needle| url.contains(needle)))
        .map(str::to_string)
}

/// Text of the first match of `pattern`, with nested tags removed.
/// Whitespace-only text counts as no match.
fn markup_text(html: &str, pattern: &Regex) -> Option<String> {
    let captured = pattern.captures(html)?.get(1)?.as_str();
    let text = TAG_RE.replace_all(captured, "").trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn decode_entities(text: &str) -> String {
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, literal)| {
            acc.replace(entity, literal)
        })
}
