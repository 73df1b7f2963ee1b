//! Page classification and candidate extraction
//!
//! Heuristic only. A page is `multi` when product-like blocks repeat,
//! otherwise it is treated as a single product page and read through
//! selector cascades with OpenGraph fallbacks.

use mart_core::entities::Currency;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

use crate::price::{detect_currency, parse_price};

const MAX_IMAGES: usize = 10;
const MIN_REPEATED_BLOCKS: usize = 2;
const MIN_GRID_CHILDREN: usize = 3;
/// Longer blocks are page sections, not product cards
const MAX_CARD_TEXT: usize = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Single,
    Multi,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportCandidate {
    pub title: String,
    pub price: Option<Decimal>,
    pub currency: Currency,
    pub description: Option<String>,
    pub images: Vec<String>,
    /// Link to the product's own page, when the card carries one
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageAnalysis {
    pub kind: PageKind,
    pub candidates: Vec<ImportCandidate>,
}

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter().filter_map(|s| Selector::parse(s).ok()).collect()
}

static PRODUCT_BLOCKS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[itemtype*='schema.org/Product']",
        ".product-item",
        ".product-card",
        ".products-i",
        ".listing-item",
        ".item-card",
        ".product",
        "li.item",
    ])
});

static GRID_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        ".products",
        ".product-list",
        ".products-list",
        ".listings",
        ".catalog",
        ".grid",
        "ul.items",
    ])
});

static STRUCTURAL_BLOCKS: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["article", "li", "div"]));

static TITLE: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[itemprop='name']",
        ".product-title",
        ".product-name",
        ".products-name",
        ".title",
        ".name",
        "h1",
        "h2",
        "h3",
        "h4",
    ])
});

static PRICE: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[itemprop='price']",
        ".product-price",
        ".price-val",
        ".price",
        "[class*='price']",
    ])
});

static DESCRIPTION: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[itemprop='description']",
        ".product-description",
        ".description",
        ".desc",
    ])
});

static GALLERY_IMAGES: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "[itemprop='image']",
        ".product-gallery img",
        ".gallery img",
        ".product-images img",
        "main img",
    ])
});

static HEADING: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["h1, h2, h3, h4, h5"]));
static IMG: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["img"]));
static LINK: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["a[href]"]));
static DOCUMENT_TITLE: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["title"]));
static META: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["meta"]));

/// Classify `html` and extract at most `max_items` candidates
pub fn analyze(html: &str, base_url: &Url, max_items: usize) -> PageAnalysis {
    let document = Html::parse_document(html);

    let blocks = repeated_blocks(&document);
    if blocks.len() >= MIN_REPEATED_BLOCKS {
        let candidates = blocks
            .into_iter()
            .filter_map(|block| extract_card(block, base_url))
            .take(max_items.max(1))
            .collect();
        return PageAnalysis {
            kind: PageKind::Multi,
            candidates,
        };
    }

    PageAnalysis {
        kind: PageKind::Single,
        candidates: extract_single(&document, base_url).into_iter().collect(),
    }
}

/// Product-like blocks, trying known product selectors, then grid
/// containers, then a structural match on image + heading + price text.
fn repeated_blocks(document: &Html) -> Vec<ElementRef<'_>> {
    let by_selector = PRODUCT_BLOCKS
        .iter()
        .map(|sel| document.select(sel).collect::<Vec<_>>())
        .max_by_key(Vec::len)
        .unwrap_or_default();
    if by_selector.len() >= MIN_REPEATED_BLOCKS {
        return by_selector;
    }

    for sel in GRID_CONTAINERS.iter() {
        for container in document.select(sel) {
            let cards: Vec<_> = container
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| first_match(*child, &IMG).is_some())
                .collect();
            if cards.len() >= MIN_GRID_CHILDREN {
                return cards;
            }
        }
    }

    structural_blocks(document)
}

fn structural_blocks(document: &Html) -> Vec<ElementRef<'_>> {
    let qualifies = |el: ElementRef<'_>| {
        let text = element_text(el);
        text.len() <= MAX_CARD_TEXT
            && first_match(el, &IMG).is_some()
            && first_match(el, &HEADING).is_some()
            && parse_price(&text).is_some()
    };

    let mut found: Vec<ElementRef<'_>> = Vec::new();
    for sel in STRUCTURAL_BLOCKS.iter() {
        for el in document.select(sel) {
            if !qualifies(el) {
                continue;
            }
            // Keep the innermost qualifying block
            let has_qualifying_child = el
                .descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .any(|d| matches!(d.value().name(), "article" | "li" | "div") && qualifies(d));
            if !has_qualifying_child {
                found.push(el);
            }
        }
    }
    found
}

fn extract_card(block: ElementRef<'_>, base_url: &Url) -> Option<ImportCandidate> {
    let title = first_text(block, &TITLE)
        .or_else(|| first_match(block, &LINK).and_then(|a| a.value().attr("title").map(clean_text)))
        .filter(|t| !t.is_empty())?;

    let price_text = first_text(block, &PRICE).unwrap_or_else(|| element_text(block));
    let parsed = parse_price(&price_text);

    let images = first_match(block, &IMG)
        .and_then(|img| image_source(img, base_url))
        .into_iter()
        .collect();

    let source_url = first_match(block, &LINK)
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| base_url.join(href).ok())
        .map(String::from);

    Some(ImportCandidate {
        title,
        price: parsed.map(|p| p.amount),
        currency: parsed.map_or_else(|| detect_currency(&price_text), |p| p.currency),
        description: first_text(block, &DESCRIPTION),
        images,
        source_url,
    })
}

fn extract_single(document: &Html, base_url: &Url) -> Option<ImportCandidate> {
    let root = document.root_element();

    let title = first_text(root, &TITLE)
        .or_else(|| meta_content(document, "og:title"))
        .or_else(|| first_text(root, &DOCUMENT_TITLE))
        .filter(|t| !t.is_empty())?;

    let price_text = first_match(root, &PRICE)
        .map(|el| {
            el.value()
                .attr("content")
                .map_or_else(|| element_text(el), str::to_string)
        })
        .or_else(|| meta_content(document, "product:price:amount"))
        .or_else(|| meta_content(document, "og:price:amount"));
    let parsed = price_text.as_deref().and_then(parse_price);
    let currency = meta_content(document, "product:price:currency")
        .and_then(|c| c.parse::<Currency>().ok())
        .or_else(|| parsed.map(|p| p.currency))
        .unwrap_or_default();

    let description = first_text(root, &DESCRIPTION)
        .or_else(|| meta_content(document, "og:description"))
        .or_else(|| meta_content(document, "description"));

    let mut images: Vec<String> = Vec::new();
    if let Some(og) = meta_content(document, "og:image").and_then(|src| absolute(&src, base_url)) {
        images.push(og);
    }
    for sel in GALLERY_IMAGES.iter() {
        for el in root.select(sel) {
            if let Some(src) = image_source(el, base_url) {
                if !images.contains(&src) {
                    images.push(src);
                }
            }
        }
        if !images.is_empty() {
            break;
        }
    }
    images.truncate(MAX_IMAGES);

    Some(ImportCandidate {
        title,
        price: parsed.map(|p| p.amount),
        currency,
        description,
        images,
        source_url: Some(base_url.to_string()),
    })
}

fn first_match<'a>(el: ElementRef<'a>, cascade: &[Selector]) -> Option<ElementRef<'a>> {
    cascade.iter().find_map(|sel| el.select(sel).next())
}

fn first_text(el: ElementRef<'_>, cascade: &[Selector]) -> Option<String> {
    cascade.iter().find_map(|sel| {
        el.select(sel)
            .map(element_text)
            .find(|text| !text.is_empty())
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `<meta property=...>` or `<meta name=...>` content
fn meta_content(document: &Html, key: &str) -> Option<String> {
    META.iter()
        .flat_map(|sel| document.select(sel))
        .find(|m| {
            let v = m.value();
            v.attr("property") == Some(key) || v.attr("name") == Some(key)
        })
        .and_then(|m| m.value().attr("content"))
        .map(clean_text)
        .filter(|c| !c.is_empty())
}

fn image_source(img: ElementRef<'_>, base_url: &Url) -> Option<String> {
    let v = img.value();
    ["data-src", "data-lazy-src", "src", "content"]
        .iter()
        .filter_map(|attr| v.attr(attr))
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
        .and_then(|src| absolute(src, base_url))
}

fn absolute(src: &str, base_url: &Url) -> Option<String> {
    base_url.join(src.trim()).ok().map(String::from)
}
