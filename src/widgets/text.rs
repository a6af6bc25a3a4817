use super::Widget;

/// Text fields: cells pass through unchanged.
pub struct TextWidget;

impl Widget for TextWidget {
    fn name(&self) -> &'static str {
        "text"
    }
}
