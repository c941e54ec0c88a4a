//! Parsed HTML document
//!
//! Wraps a `scraper` DOM and answers the structural questions the analyser
//! asks: title, main text, social metadata and media references. Main
//! content is isolated with `llm_readability` and rendered to plain text
//! with `html2text`.

use super::text::collapse_whitespace;
use crate::analysis::html::OPENGRAPH_URL_KEY;
use llm_readability::extractor;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("Valid title selector"));
static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").expect("Valid meta selector"));
static IMAGES: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").expect("Valid img selector"));
static MEDIA: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("video[src], video source[src], iframe[src], embed[src], object[data]")
        .expect("Valid media selector")
});

/// `[1]: http://...` lines html2text appends for links
static LINK_FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\d+\]:\s").expect("Valid footnote regex"));

/// Inline `[1]` link markers
static LINK_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").expect("Valid marker regex"));

/// Render width for plain text; paragraphs must not wrap mid-sentence
const TEXT_WIDTH: usize = 10_000;

/// Hosts whose embeds count as movies
const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
    "vimeo.com",
    "dailymotion.com",
    "twitch.tv",
];

/// Main content as isolated by readability
struct Article {
    html: String,
    text: String,
}

pub struct Document {
    html: Html,
    source: String,
    url: Url,
    /// `None` when readability found no text
    article: Option<Article>,
}

impl Document {
    pub fn parse(source: &str, url: &Url) -> Self {
        Self {
            html: Html::parse_document(source),
            source: source.to_string(),
            url: url.clone(),
            article: main_content(source, url),
        }
    }

    /// Text of the `<title>` element, `None` when missing or blank
    pub fn title(&self) -> Option<String> {
        self.html
            .select(&TITLE)
            .next()
            .map(|title| collapse_whitespace(&title.text().collect::<String>()))
            .filter(|title| !title.is_empty())
    }

    /// Main text, one paragraph per line
    ///
    /// Falls back to the text of the whole page when readability finds no
    /// main content.
    pub fn text(&self) -> Option<String> {
        let text = match &self.article {
            Some(article) => article.text.clone(),
            None => {
                debug!(url = %self.url, "no main content, using page text");
                plain_text(&self.source, &self.url)
            }
        };

        Some(text).filter(|t| !t.is_empty())
    }

    /// Markup of the main content
    pub fn content_html(&self) -> Option<String> {
        self.article.as_ref().map(|article| article.html.clone())
    }

    /// `og:*` properties keyed without the prefix
    ///
    /// The page URL is recorded under [`OPENGRAPH_URL_KEY`]. `None` when the
    /// page carries no OpenGraph properties.
    pub fn opengraph(&self) -> Option<BTreeMap<String, String>> {
        let mut properties = BTreeMap::new();

        for meta in self.html.select(&META) {
            let element = meta.value();
            let (Some(property), Some(content)) = (element.attr("property"), element.attr("content"))
            else {
                continue;
            };
            if let Some(name) = property.trim().strip_prefix("og:") {
                if !name.is_empty() {
                    properties
                        .entry(name.to_string())
                        .or_insert_with(|| content.trim().to_string());
                }
            }
        }

        if properties.is_empty() {
            warn!(url = %self.url, "failed to extract OpenGraph data");
            return None;
        }

        properties.insert(OPENGRAPH_URL_KEY.to_string(), self.url.to_string());
        Some(properties)
    }

    /// `twitter:*` meta names keyed without the prefix
    pub fn twitter_card(&self) -> Option<BTreeMap<String, String>> {
        let mut card = BTreeMap::new();

        for meta in self.html.select(&META) {
            let element = meta.value();
            let name = element
                .attr("name")
                .or_else(|| element.attr("property"))
                .unwrap_or_default()
                .trim();
            let Some(key) = name.strip_prefix("twitter:") else {
                continue;
            };
            if key.is_empty() {
                warn!(url = %self.url, name = %name, "invalid twitter card value");
                continue;
            }
            card.entry(key.to_string())
                .or_insert_with(|| element.attr("content").unwrap_or_default().trim().to_string());
        }

        if card.is_empty() {
            warn!(url = %self.url, "failed to extract twitter card");
            return None;
        }
        Some(card)
    }

    /// Absolute image URLs in document order, de-duplicated
    pub fn images(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.html
            .select(&IMAGES)
            .filter_map(|img| img.value().attr("src"))
            .filter_map(|src| self.resolve(src))
            .filter(|src| seen.insert(src.clone()))
            .collect()
    }

    /// Embedded videos: `<video>` sources and iframes from known video hosts
    pub fn movies(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.html
            .select(&MEDIA)
            .filter_map(|media| {
                let element = media.value();
                let src = element.attr("src").or_else(|| element.attr("data"))?;
                let resolved = self.resolve(src)?;
                match element.name() {
                    "video" | "source" => Some(resolved),
                    _ if is_video_host(&resolved) => Some(resolved),
                    _ => None,
                }
            })
            .filter(|src| seen.insert(src.clone()))
            .collect()
    }

    /// The image that best represents the page
    ///
    /// `og:image` wins, then `twitter:image`, then the first content image.
    pub fn top_image(
        &self,
        opengraph: Option<&BTreeMap<String, String>>,
        twitter: Option<&BTreeMap<String, String>>,
        images: &[String],
    ) -> Option<String> {
        opengraph
            .and_then(|og| og.get("image"))
            .or_else(|| twitter.and_then(|card| card.get("image")))
            .and_then(|src| self.resolve(src))
            .or_else(|| images.first().cloned())
    }

    fn resolve(&self, src: &str) -> Option<String> {
        let src = src.trim();
        if src.is_empty() || src.starts_with("data:") {
            return None;
        }
        self.url.join(src).ok().map(|u| u.to_string())
    }
}

fn main_content(source: &str, url: &Url) -> Option<Article> {
    let product = match extractor::extract(&mut source.as_bytes(), url) {
        Ok(product) => product,
        Err(e) => {
            warn!(url = %url, error = %e, "readability extraction failed");
            return None;
        }
    };

    let text = plain_text(&product.content, url);
    if text.is_empty() {
        return None;
    }
    Some(Article {
        html: product.content,
        text,
    })
}

/// Plain text of `markup`, blank lines and link footnotes removed
fn plain_text(markup: &str, url: &Url) -> String {
    let rendered = match html2text::from_read(markup.as_bytes(), TEXT_WIDTH) {
        Ok(rendered) => rendered,
        Err(e) => {
            warn!(url = %url, error = %e, "failed to render page text");
            return String::new();
        }
    };

    rendered
        .lines()
        .filter(|line| !LINK_FOOTNOTE.is_match(line))
        .map(|line| collapse_whitespace(&LINK_MARKER.replace_all(line, "")))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_video_host(src: &str) -> bool {
    Url::parse(src)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .map_or(false, |host| {
            VIDEO_HOSTS
                .iter()
                .any(|known| host == *known || host.ends_with(&format!(".{}", known)))
        })
}
