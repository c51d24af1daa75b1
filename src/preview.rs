//! Static HTML preview of a layout pass.
//!
//! Renders every placement as an absolutely positioned tile inside a container
//! sized to the layout height. No JavaScript: what you see is the settled
//! state of the pass, with hover feedback done in CSS from the animation
//! config.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating, so
//! alt text, ids and URLs are escaped automatically.

use crate::config::AnimationConfig;
use crate::layout::Layout;
use crate::types::{GalleryItem, Placement};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::HashMap;
use std::fs;
use std::path;
use std::path::Path;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const BASE_CSS: &str = r#"
body { margin: 0; padding: 24px; background: #111; color: #ddd; font-family: system-ui, sans-serif; }
h1 { font-weight: 400; font-size: 1.1rem; margin: 0 0 16px; }
.masonry { position: relative; }
.tile { position: absolute; overflow: hidden; background: #222; }
.tile img { width: 100%; height: 100%; object-fit: cover; display: block; }
.tile .overlay { position: absolute; inset: 0; background: #000; opacity: 0; pointer-events: none; }
"#;

/// CSS for hover effects, derived from the animation settings.
pub fn hover_css(animation: &AnimationConfig) -> String {
    let mut css = format!(
        ".tile, .tile .overlay {{ transition: transform {d}s ease-out, opacity {d}s ease-out; }}\n",
        d = animation.hover_duration
    );
    if animation.scale_on_hover {
        css.push_str(&format!(
            ".tile:hover {{ transform: scale({}); }}\n",
            animation.hover_scale
        ));
    }
    if animation.color_shift_on_hover {
        css.push_str(&format!(
            ".tile:hover .overlay {{ opacity: {}; }}\n",
            animation.overlay_opacity
        ));
    }
    css
}

/// Browser-loadable URL for an image source.
///
/// Bare paths become absolute `file://` URLs, resolved against the current
/// directory, so the page works wherever it is written.
fn image_url(source: &str) -> String {
    if source.contains("://") {
        return source.to_string();
    }
    path::absolute(source)
        .ok()
        .and_then(|abs| Url::from_file_path(abs).ok())
        .map(String::from)
        .unwrap_or_else(|| source.to_string())
}

fn tile_style(p: &Placement) -> String {
    format!(
        "left:{:.2}px;top:{:.2}px;width:{:.2}px;height:{:.2}px",
        p.x, p.y, p.width, p.height
    )
}

fn render_tile(placement: &Placement, item: &GalleryItem) -> Markup {
    let img = html! {
        img src=(image_url(&item.image_source)) alt=(item.alt.as_deref().unwrap_or("")) loading="lazy";
        div.overlay {}
    };
    html! {
        @match &item.link_target {
            Some(url) => {
                a.tile href=(url) target="_blank" rel="noopener noreferrer"
                    data-id=(item.id) title=[item.group.as_deref()] style=(tile_style(placement)) {
                    (img)
                }
            }
            None => {
                div.tile data-id=(item.id) title=[item.group.as_deref()] style=(tile_style(placement)) {
                    (img)
                }
            }
        }
    }
}

/// Render a complete preview document.
pub fn render_preview(
    title: &str,
    layout: &Layout,
    items: &[GalleryItem],
    animation: &AnimationConfig,
) -> Markup {
    let by_id: HashMap<&str, &GalleryItem> = items.iter().map(|i| (i.id.as_str(), i)).collect();
    let container_style = format!(
        "height:{:.2}px;width:{:.2}px",
        layout.height,
        container_width(layout)
    );
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(BASE_CSS)) (PreEscaped(hover_css(animation))) }
            }
            body {
                h1 { (title) " · " (layout.placements.len()) " images" }
                div.masonry style=(container_style) {
                    @for placement in &layout.placements {
                        @if let Some(item) = by_id.get(placement.item_id.as_str()) {
                            (render_tile(placement, item))
                        }
                    }
                }
            }
        }
    }
}

/// Right edge of the widest column.
fn container_width(layout: &Layout) -> f64 {
    layout
        .placements
        .iter()
        .map(|p| p.x + p.width)
        .fold(0.0, f64::max)
}

/// Render and write the preview to `output`, creating parent directories.
pub fn write_preview(
    output: &Path,
    title: &str,
    layout: &Layout,
    items: &[GalleryItem],
    animation: &AnimationConfig,
) -> Result<(), PreviewError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let doc = render_preview(title, layout, items, animation);
    fs::write(output, doc.into_string())?;
    tracing::info!(path = %output.display(), tiles = layout.placements.len(), "preview written");
    Ok(())
}
