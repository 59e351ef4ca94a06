// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use itertools::Itertools;
use pulldown_cmark_escape::escape_html;

use crate::{
    conversation::UnitFault,
    render::{ConversationRow, MathContext, RenderNode, RenderRow, RenderTree},
};

const KATEX_VERSION: &str = "0.16.11";

fn escaped(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, s);
    out
}

pub fn html_node(node: &RenderNode) -> String {
    match node {
        RenderNode::PlainText { content } => escaped(content),
        RenderNode::MathExpression {
            hidden_raw,
            marked_raw,
            ..
        } => format!(
            r#"<span class="math-raw" aria-hidden="true">{}</span><span class="math-inline">{}</span>"#,
            escaped(hidden_raw),
            escaped(marked_raw)
        ),
    }
}

fn html_field(class_name: &str, nodes: &[RenderNode]) -> String {
    let inner = nodes.iter().map(html_node).join("");
    format!(r#"<div class="{class_name}">{inner}</div>"#)
}

fn html_fault(fault: &UnitFault) -> String {
    format!(
        r#"<div class="qa-row qa-fault">{}</div>"#,
        escaped(&fault.to_string())
    )
}

pub fn html_row(row: &RenderRow) -> String {
    match row {
        Ok(ConversationRow {
            question, answer, ..
        }) => format!(
            r#"<div class="qa-row">{}{}</div>"#,
            html_field("qa-question", question),
            html_field("qa-answer", answer)
        ),
        Err(fault) => html_fault(fault),
    }
}

pub fn html_tree(tree: &RenderTree) -> String {
    match tree {
        RenderTree::Error { message } => {
            format!(r#"<div class="qa-error">{}</div>"#, escaped(message))
        }
        RenderTree::Plain { rows } => format!(
            r#"<div class="qa-conversation">{}</div>"#,
            rows.iter().map(html_row).join("\n")
        ),
        RenderTree::Math { rows, .. } => format!(
            r#"<div class="qa-conversation math-context">{}</div>"#,
            rows.iter().map(html_row).join("\n")
        ),
    }
}

/// KaTeX auto-render, told to read only the marker as an inline delimiter.
pub fn html_math_context(context: &MathContext) -> String {
    let options = serde_json::json!({
        "delimiters": [{
            "left": context.left.to_string(),
            "right": context.right.to_string(),
            "display": false,
        }],
        "ignoredClasses": ["math-raw"],
        "throwOnError": false,
    });
    let options = escaped(&options.to_string());
    let base = format!("https://cdn.jsdelivr.net/npm/katex@{KATEX_VERSION}/dist");
    format!(
        r#"<link rel="stylesheet" href="{base}/katex.min.css">
<script defer src="{base}/katex.min.js"></script>
<script defer src="{base}/contrib/auto-render.min.js"
  onload="renderMathInElement(document.querySelector('.math-context'), {options})"></script>"#
    )
}

pub fn html_doc(tree: &RenderTree, title: &str) -> String {
    let math = match tree {
        RenderTree::Math { context, .. } => html_math_context(context),
        _ => String::new(),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en-US">
<head>
<meta http-equiv="Content-Type" content="text/html; charset=utf-8">
<meta name="viewport" content="width=device-width">
<title>{}</title>
<style>{}</style>
{}
</head>
<body>
{}
</body>
</html>
"#,
        escaped(title),
        html_main_style(),
        math,
        html_tree(tree)
    )
}

pub fn html_main_style() -> &'static str {
    include_str!("include/main.css")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_node_keeps_raw_hidden() {
        let node = RenderNode::MathExpression {
            expression: "a<b".to_string(),
            hidden_raw: r"\(a<b\)".to_string(),
            marked_raw: "$a<b$".to_string(),
        };
        assert_eq!(
            html_node(&node),
            r#"<span class="math-raw" aria-hidden="true">\(a&lt;b\)</span><span class="math-inline">$a&lt;b$</span>"#
        );
    }

    #[test]
    fn test_plain_doc_has_no_katex() {
        let tree = RenderTree::Plain {
            rows: vec![Ok(ConversationRow {
                question: vec![RenderNode::PlainText {
                    content: "Q".to_string(),
                }],
                answer: vec![],
                has_math: false,
            })],
        };
        let doc = html_doc(&tree, "qa");
        assert!(!doc.contains("katex"));
        assert!(doc.contains(r#"<div class="qa-row"><div class="qa-question">Q</div><div class="qa-answer"></div></div>"#));
    }

    #[test]
    fn test_math_doc_registers_marker() {
        let tree = RenderTree::Math {
            context: MathContext::new('§'),
            rows: vec![Err(UnitFault::NotATuple { index: 2 })],
        };
        let doc = html_doc(&tree, "qa");
        assert!(doc.contains("auto-render.min.js"));
        assert!(doc.contains("&quot;left&quot;:&quot;§&quot;"));
        assert!(doc.contains("entry 2 is not an array"));
    }

    #[test]
    fn test_error_tree() {
        let tree = RenderTree::Error {
            message: "bad <json>".to_string(),
        };
        assert_eq!(html_tree(&tree), r#"<div class="qa-error">bad &lt;json&gt;</div>"#);
    }
}
