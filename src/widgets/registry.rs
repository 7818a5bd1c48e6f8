use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::Widget;
use crate::domain::{FormError, FormResult};

/// Widget lookup by id.
///
/// Every registry starts from a shared baseline of stock widgets. Overrides
/// registered on one registry shadow the baseline for that registry only.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    overrides: BTreeMap<String, Widget>,
}

fn baseline() -> &'static BTreeMap<&'static str, Widget> {
    static BASELINE: OnceLock<BTreeMap<&'static str, Widget>> = OnceLock::new();
    BASELINE.get_or_init(|| {
        let mut map = BTreeMap::new();
        map.insert("object", Widget::Object);
        map.insert("array", Widget::Array);
        for id in [
            "string", "search", "tel", "url", "email", "password", "color", "date", "time",
            "hidden",
        ] {
            map.insert(id, Widget::String);
        }
        map.insert("textarea", Widget::Textarea);
        for id in ["integer", "number", "range"] {
            map.insert(id, Widget::Number);
        }
        map.insert("boolean", Widget::Checkbox);
        map.insert("checkbox", Widget::Checkbox);
        map.insert("select", Widget::Select);
        map
    })
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, widget: Widget) {
        self.overrides.insert(id.into(), widget);
    }

    /// Look up a widget. A miss is a configuration defect, reported as
    /// [`FormError::WidgetNotFound`].
    pub fn get(&self, id: &str) -> FormResult<Widget> {
        self.overrides
            .get(id)
            .or_else(|| baseline().get(id))
            .copied()
            .ok_or_else(|| FormError::WidgetNotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.overrides.contains_key(id) || baseline().contains_key(id)
    }

    /// All known ids, baseline and overrides merged.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = baseline().keys().map(|id| id.to_string()).collect();
        for id in self.overrides.keys() {
            if !baseline().contains_key(id.as_str()) {
                ids.push(id.clone());
            }
        }
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_widgets() {
        let registry = WidgetRegistry::new();
        assert_eq!(registry.get("string").unwrap(), Widget::String);
        assert_eq!(registry.get("color").unwrap(), Widget::String);
        assert_eq!(registry.get("integer").unwrap(), Widget::Number);
        assert_eq!(registry.get("object").unwrap(), Widget::Object);
        assert!(registry.contains("checkbox"));
    }

    #[test]
    fn test_miss_is_error() {
        let err = WidgetRegistry::new().get("rich-text").unwrap_err();
        assert!(matches!(err, FormError::WidgetNotFound { ref id } if id == "rich-text"));
    }

    #[test]
    fn test_override_does_not_touch_baseline() {
        let mut custom = WidgetRegistry::new();
        custom.register("string", Widget::Textarea);
        custom.register("rich-text", Widget::Textarea);

        assert_eq!(custom.get("string").unwrap(), Widget::Textarea);
        assert_eq!(WidgetRegistry::new().get("string").unwrap(), Widget::String);
        assert!(custom.ids().contains(&"rich-text".to_string()));
        assert!(!WidgetRegistry::new().contains("rich-text"));
    }
}
