use crate::model::DisplayFields;

/// Rendering target for the widget. Implementations own all presentation details.
pub trait DisplaySurface: Send + Sync {
    /// Show a successful lookup.
    fn render(&self, fields: &DisplayFields);

    /// Show the error banner.
    fn show_error(&self, message: &str);

    fn hide_error(&self);

    /// Replace the suggestion list; an empty slice clears it.
    fn render_suggestions(&self, suggestions: &[String]);

    fn render_clock(&self, text: &str);

    /// Reflect a picked suggestion back into the input box.
    fn set_input(&self, _text: &str) {}
}
