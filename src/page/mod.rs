//! Editor page rendering
//!
//! A single askama template (`templates/editor.html`). Every interpolated value
//! goes through askama's HTML escaping; query values are percent-encoded here
//! before they reach the template.

use askama::Template;

use crate::http::query;
use crate::storage::FileSummary;

/// The file currently open in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableDocument {
    /// Path exactly as requested in `?file=`
    pub path: String,
    /// Downloaded text; empty when the download failed
    pub content: String,
    pub name: String,
}

impl EditableDocument {
    pub fn new(path: &str, content: String) -> Self {
        Self {
            path: path.to_string(),
            content,
            name: path.to_string(),
        }
    }
}

struct SidebarLink<'a> {
    name: &'a str,
    href: String,
}

struct DocumentView<'a> {
    name: &'a str,
    action: String,
    content: &'a str,
}

#[derive(Template)]
#[template(path = "editor.html")]
struct EditorPage<'a> {
    links: Vec<SidebarLink<'a>>,
    document: Option<&'a DocumentView<'a>>,
}

/// Render the editor: one sidebar link per file, plus the open document if any.
///
/// Without a document, or with one whose name is empty, the textarea and
/// save button are disabled.
pub fn render_page(
    files: &[FileSummary],
    document: Option<&EditableDocument>,
) -> askama::Result<String> {
    let links = files
        .iter()
        .map(|file| SidebarLink {
            name: &file.name,
            href: query::editor_url(&file.path),
        })
        .collect();
    let view = document.filter(|doc| !doc.name.is_empty()).map(|doc| DocumentView {
        name: &doc.name,
        action: query::editor_url(&doc.path),
        content: &doc.content,
    });

    EditorPage {
        links,
        document: view.as_ref(),
    }
    .render()
}
