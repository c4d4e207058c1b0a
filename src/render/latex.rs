//! LaTeX output: a standalone `article` document.

use super::{Block, CvDocument, CvRenderer};
use crate::error::Result;
use std::fmt::Write;

const PREAMBLE: &str = r"\documentclass[11pt,a4paper]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage[margin=2cm]{geometry}
\usepackage{enumitem}
\setlist{noitemsep}
\setlength{\parindent}{0pt}
\pagestyle{empty}
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Itemize,
    Enumerate,
}

impl ListKind {
    fn env(self) -> &'static str {
        match self {
            Self::Itemize => "itemize",
            Self::Enumerate => "enumerate",
        }
    }
}

/// Renders `.tex` sources
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexRenderer;

impl CvRenderer for LatexRenderer {
    fn name(&self) -> &str {
        "tex"
    }

    fn extension(&self) -> &str {
        "tex"
    }

    fn render(&self, cv: &CvDocument) -> Result<Vec<u8>> {
        Ok(render_latex(cv)?.into_bytes())
    }
}

/// Render a CV to LaTeX source
pub fn render_latex(cv: &CvDocument) -> Result<String> {
    let mut out = String::new();
    out.push_str(PREAMBLE);
    writeln!(out, "\\title{{{}}}", escape_latex(&cv.title))?;
    out.push_str("\n\\begin{document}\n\n");

    let mut lists: Vec<ListKind> = Vec::new();
    for block in &cv.blocks {
        match block {
            Block::Bullet { level, text } => {
                set_list_depth(&mut out, &mut lists, *level as usize + 1, ListKind::Itemize)?;
                writeln!(out, "{}\\item {}", indent(lists.len()), line_text(text))?;
            }
            Block::Numbered(text) => {
                set_list_depth(&mut out, &mut lists, 1, ListKind::Enumerate)?;
                writeln!(out, "{}\\item {}", indent(lists.len()), line_text(text))?;
            }
            other => {
                set_list_depth(&mut out, &mut lists, 0, ListKind::Itemize)?;
                write_block(&mut out, other)?;
            }
        }
    }
    set_list_depth(&mut out, &mut lists, 0, ListKind::Itemize)?;

    out.push_str("\n\\end{document}\n");
    Ok(out)
}

fn write_block(out: &mut String, block: &Block) -> Result<()> {
    match block {
        Block::Header { name, contact } => {
            out.push_str("\\begin{center}\n");
            writeln!(out, "{{\\LARGE\\bfseries {}}}\\\\[6pt]", escape_latex(name))?;
            for line in contact {
                writeln!(out, "{}\\\\", line_text(line))?;
            }
            out.push_str("\\end{center}\n");
        }
        Block::Heading(text) => writeln!(out, "\n\\section*{{{}}}", escape_latex(text))?,
        Block::Paragraph(text) => writeln!(out, "{}\n", escape_latex(text))?,
        Block::Bullet { .. } | Block::Numbered(_) => {}
    }
    Ok(())
}

/// Close or open list environments until `depth` lists of `kind` are open
fn set_list_depth(
    out: &mut String,
    lists: &mut Vec<ListKind>,
    depth: usize,
    kind: ListKind,
) -> Result<()> {
    while lists.len() > depth || (lists.len() == depth && depth > 0 && lists.last() != Some(&kind)) {
        if let Some(open) = lists.pop() {
            writeln!(out, "{}\\end{{{}}}", indent(lists.len()), open.env())?;
        }
    }
    while lists.len() < depth {
        writeln!(out, "{}\\begin{{{}}}", indent(lists.len()), kind.env())?;
        lists.push(kind);
    }
    Ok(())
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Escaped text placed after `\\` or `\item`. A leading `[` would be read
/// as their optional argument, so it is shielded with `{}`.
fn line_text(text: &str) -> String {
    let escaped = escape_latex(text);
    if escaped.starts_with('[') {
        format!("{{}}{}", escaped)
    } else {
        escaped
    }
}

/// Escape LaTeX special characters in user text
pub fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\textbackslash{}"),
            '~' => escaped.push_str("\\textasciitilde{}"),
            '^' => escaped.push_str("\\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}
