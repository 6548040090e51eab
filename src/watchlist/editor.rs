//! Rich-text editor capability
//!
//! Notes fields are edited in an HTML rich-text widget. The watchlist only
//! needs to read and replace its content and to hear about user edits.

/// Callback invoked with the editor's HTML after every user edit
pub type ChangeHandler = Box<dyn FnMut(&str) + Send>;

pub trait RichTextEditor {
    /// Current HTML content
    fn content(&self) -> String;

    /// Replace the content. Programmatic updates do not fire change handlers.
    fn set_content(&mut self, html: &str);

    /// Register a handler for user edits
    fn on_change(&mut self, handler: ChangeHandler);
}

/// Headless editor holding its content in memory
#[derive(Default)]
pub struct MemoryEditor {
    html: String,
    handlers: Vec<ChangeHandler>,
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an edit as if the user typed it
    pub fn type_content(&mut self, html: &str) {
        self.html = html.to_string();
        for handler in self.handlers.iter_mut() {
            handler(html);
        }
    }
}

impl RichTextEditor for MemoryEditor {
    fn content(&self) -> String {
        self.html.clone()
    }

    fn set_content(&mut self, html: &str) {
        self.html = html.to_string();
    }

    fn on_change(&mut self, handler: ChangeHandler) {
        self.handlers.push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_only_user_edits_notify() {
        let (tx, rx) = mpsc::channel();
        let mut editor = MemoryEditor::new();
        editor.on_change(Box::new(move |html| {
            let _ = tx.send(html.to_string());
        }));

        editor.set_content("<p>loaded</p>");
        assert!(rx.try_recv().is_err());

        editor.type_content("<p>typed</p>");
        assert_eq!(rx.try_recv().unwrap(), "<p>typed</p>");
        assert_eq!(editor.content(), "<p>typed</p>");
    }
}
