use client::OrderedMap;
use regex::Regex;
use std::sync::LazyLock;

use crate::document::{Document, ElementIds, SelectOption};
use crate::entity;

pub const WARNING_NOTICE: &str =
    r#"<div class="alert alert-warning">Please enter some text to analyze</div>"#;

pub const NO_ENTITIES: &str = r#"<div class="text-muted">No entities found</div>"#;

pub const LOADING_LABEL: &str = r#"<span class="spinner-border spinner-border-sm" role="status" aria-hidden="true"></span> Processing..."#;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain text of a markup fragment, for terminal output
pub fn strip_tags(markup: &str) -> String {
    TAG_RE
        .replace_all(markup, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn danger_notice(message: &str) -> String {
    format!(
        r#"<div class="alert alert-danger">An error occurred during processing: {}</div>"#,
        escape_html(message)
    )
}

/// One entity-type badge
pub fn badge(code: &str, count: i64) -> String {
    let info = entity::describe(code);
    format!(
        r#"<div class="col-md-4 mb-2" data-entity-type="{code}">
    <div style="background-color: {color}; color: white; padding: 8px 12px; border-radius: 20px; display: flex; align-items: center; box-shadow: 0 1px 3px rgba(0,0,0,0.1); font-size: 14px;">
        <span style="font-size: 16px; margin-right: 8px;">{glyph}</span>
        <span style="font-weight: 500;">{name}</span>
        <span style="background: rgba(255,255,255,0.2); padding: 2px 8px; border-radius: 10px; margin-left: 8px; font-size: 12px;">{count}</span>
    </div>
</div>"#,
        code = escape_html(code),
        color = info.color,
        glyph = info.glyph,
        name = escape_html(info.name),
        count = count,
    )
}

/// Replace the badges in `container` with one badge per entry of `counts`,
/// in the order the entries appear. Returns how many badges were appended.
pub fn render_badges<D: Document + ?Sized>(
    document: &D,
    container: &str,
    counts: Option<&OrderedMap<i64>>,
) -> usize {
    if !document.set_inner_html(container, "") {
        return 0;
    }

    let Some(counts) = counts else {
        return 0;
    };

    let mut appended = 0;
    for (code, count) in counts.iter() {
        if document.append_child(container, &badge(code, *count)) {
            appended += 1;
        }
    }
    appended
}

fn select_markup(id: &str, options: &[SelectOption], selected: &str) -> String {
    let mut html = format!(r#"<select id="{}" class="form-select">"#, escape_html(id));
    for option in options {
        let marker = if option.value == selected { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            escape_html(&option.value),
            marker,
            escape_html(&option.text)
        ));
    }
    html.push_str("</select>");
    html
}

fn button_markup(document: &dyn Document, id: &str, class: &str) -> Option<String> {
    let label = document.inner_html(id)?;
    let disabled = if document.is_disabled(id).unwrap_or(false) { " disabled" } else { "" };
    Some(format!(
        r#"<button id="{}" class="btn {}"{}>{}</button>"#,
        escape_html(id),
        class,
        disabled,
        label
    ))
}

/// Serialise the page state to a standalone HTML document
pub fn page(document: &dyn Document, ids: &ElementIds, title: &str, description: &str) -> String {
    let mut controls = String::new();

    if let Some(options) = document.options(&ids.model_selector) {
        let selected = document.value(&ids.model_selector).unwrap_or_default();
        controls.push_str(&select_markup(&ids.model_selector, &options, &selected));
        controls.push('\n');
    }
    if let Some(text) = document.value(&ids.input) {
        controls.push_str(&format!(
            r#"<textarea id="{}" class="form-control" rows="6">{}</textarea>"#,
            escape_html(&ids.input),
            escape_html(&text)
        ));
        controls.push('\n');
    }
    if let Some(button) = button_markup(document, &ids.extract_button, "btn-primary") {
        controls.push_str(&button);
        controls.push('\n');
    }
    if let Some(button) = button_markup(document, &ids.clear_button, "btn-secondary") {
        controls.push_str(&button);
        controls.push('\n');
    }

    let result = document
        .inner_html(&ids.result)
        .map(|html| format!(r#"<div id="{}" class="result-box">{}</div>"#, escape_html(&ids.result), html))
        .unwrap_or_default();
    let badges = document
        .inner_html(&ids.badges)
        .map(|html| format!(r#"<div id="{}" class="row">{}</div>"#, escape_html(&ids.badges), html))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css">
<style>
.entity-highlight {{ padding: 2px 4px; border-radius: 4px; }}
.result-box {{ min-height: 120px; padding: 12px; border: 1px solid #dee2e6; border-radius: 8px; }}
</style>
</head>
<body>
<main class="container py-4">
<h1>{title}</h1>
<p class="lead">{description}</p>
{controls}{result}
{badges}
</main>
</body>
</html>
"#,
        title = escape_html(title),
        description = escape_html(description),
    )
}
