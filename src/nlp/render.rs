//! displaCy-style entity markup and the table cell built from it.

use anyhow::{bail, Context, Result};
use askama::Template;
use serde_json::{json, Value};

use super::ner::Annotation;

struct Segment<'a> {
    text: &'a str,
    label: &'a str,
    color: &'static str,
    entity: bool,
}

#[derive(Template)]
#[template(
    source = r#"<div class="entities" style="line-height: 2.5; direction: ltr">{% for seg in segments %}{% if seg.entity %}<mark class="entity" style="background: {{ seg.color }}; padding: 0.45em 0.6em; margin: 0 0.25em; line-height: 1; border-radius: 0.35em;">{{ seg.text }}<span style="font-size: 0.8em; font-weight: bold; line-height: 1; border-radius: 0.35em; vertical-align: middle; margin-left: 0.5rem">{{ seg.label }}</span></mark>{% else %}{{ seg.text }}{% endif %}{% endfor %}</div>"#,
    ext = "html"
)]
struct EntitiesHtml<'a> {
    segments: Vec<Segment<'a>>,
}

fn label_color(label: &str) -> &'static str {
    match label {
        "PERSON" => "#aa9cfc",
        "ORG" => "#7aecec",
        "GPE" => "#feca74",
        "DATE" => "#bfe1d9",
        "MONEY" | "PERCENT" | "CARDINAL" => "#e4e7d2",
        _ => "#ddd",
    }
}

/// Render the annotation as inline HTML, entities highlighted with their label.
pub fn render_html(annotation: &Annotation) -> Result<String> {
    let text = annotation.text.as_str();
    let mut segments = Vec::with_capacity(annotation.ents.len() * 2 + 1);
    let mut cursor = 0;
    for span in &annotation.ents {
        if span.start < cursor {
            bail!(
                "entity {}..{} overlaps the previous entity ending at {cursor}",
                span.start,
                span.end
            );
        }
        let Some(entity) = text.get(span.start..span.end) else {
            bail!(
                "entity {}..{} is not a valid range of the {}-byte text",
                span.start,
                span.end,
                text.len()
            );
        };
        if span.start > cursor {
            segments.push(Segment {
                text: &text[cursor..span.start],
                label: "",
                color: "",
                entity: false,
            });
        }
        segments.push(Segment {
            text: entity,
            label: &span.label,
            color: label_color(&span.label),
            entity: true,
        });
        cursor = span.end;
    }
    if cursor < text.len() {
        segments.push(Segment {
            text: &text[cursor..],
            label: "",
            color: "",
            entity: false,
        });
    }
    EntitiesHtml { segments }
        .render()
        .context("rendering entity markup")
}

/// Table cell holding the rendered markup alongside the structured annotation.
pub fn ner_cell(annotation: &Annotation) -> Result<Value> {
    Ok(json!({
        "_type": "html",
        "html": render_html(annotation)?,
        "doc": annotation,
    }))
}
