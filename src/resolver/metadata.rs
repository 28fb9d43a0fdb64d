//! Render-ready metadata: what a page head is built from.

use super::SeoEntry;
use super::normalize::{
    DESCRIPTION_LIMIT, Robots, TITLE_LIMIT, absolute_url, clamp, decorate_title, parse_robots,
};
use crate::store::model::{Breadcrumb, OpenGraphConfig, SeoStore};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OgImage {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    pub url: String,
    pub site_name: String,
    pub locale: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub images: Vec<OgImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Twitter {
    pub card: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    pub robots: Robots,
    pub open_graph: OpenGraph,
    pub twitter: Twitter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    pub json_ld: Vec<Value>,
}

/// Page-kind specifics the renderer needs beyond the entry itself.
#[derive(Debug, Clone, Default)]
pub(crate) struct RenderContext<'a> {
    /// Open Graph settings of the page's domain, if it has one.
    pub open_graph: Option<&'a OpenGraphConfig>,
}

pub(crate) fn render(store: &SeoStore, entry: &SeoEntry, ctx: &RenderContext<'_>) -> Metadata {
    let brand = &store.brand;
    let canonical_url = absolute_url(&brand.site_url, &entry.canonical);

    let og_title = clamp(entry.og_title.as_deref().unwrap_or(&entry.title), TITLE_LIMIT);
    let og_description = clamp(
        entry.og_description.as_deref().unwrap_or(&entry.description),
        DESCRIPTION_LIMIT,
    );

    let domain_image = ctx.open_graph.and_then(|og| og.image.as_deref());
    let image = entry
        .og_image
        .as_deref()
        .or(domain_image)
        .unwrap_or(&brand.default_image);
    let image_url = absolute_url(&brand.site_url, image);
    let alt = entry
        .image_alt
        .get(image)
        .cloned()
        .or_else(|| ctx.open_graph.and_then(|og| og.image_alt.clone()))
        .unwrap_or_else(|| og_title.clone());

    let kind = ctx
        .open_graph
        .map(|og| og.kind.clone())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| "website".to_owned());

    let mut json_ld: Vec<Value> = match &entry.structured_data {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other.clone()],
    };
    if !entry.breadcrumbs.is_empty() {
        json_ld.push(breadcrumb_list(&brand.site_url, &entry.breadcrumbs));
    }

    Metadata {
        title: decorate_title(&entry.title, brand),
        description: entry.description.clone(),
        canonical_url: canonical_url.clone(),
        keywords: (!entry.keywords.is_empty()).then(|| entry.keywords.join(", ")),
        robots: parse_robots(entry.robots.as_ref()),
        open_graph: OpenGraph {
            title: og_title.clone(),
            description: og_description.clone(),
            url: canonical_url,
            site_name: brand.site_name.clone(),
            locale: brand.locale.clone(),
            kind,
            images: vec![OgImage {
                url: image_url.clone(),
                alt,
            }],
        },
        twitter: Twitter {
            card: "summary_large_image".into(),
            title: og_title,
            description: og_description,
            images: vec![image_url],
            site: brand.twitter_handle.clone(),
        },
        icon: brand.favicon.clone().filter(|f| !f.is_empty()),
        theme_color: brand.theme_color.clone().filter(|c| !c.is_empty()),
        json_ld,
    }
}

fn breadcrumb_list(site_url: &str, crumbs: &[Breadcrumb]) -> Value {
    let items: Vec<Value> = crumbs
        .iter()
        .enumerate()
        .map(|(i, crumb)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": crumb.name,
                "item": absolute_url(site_url, &crumb.path),
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": items,
    })
}
