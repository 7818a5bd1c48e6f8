use tracing::debug;

use crate::domain::{IdGenerator, SchemaNode, SchemaType, WidgetInfo, DEFAULT_MODEL_NAME};

/// Annotates a raw schema tree before property construction.
///
/// Every node gets an explicit `type`, a widget id, a fresh `formId` and the
/// `modelName` of its parent (the root keeps its own, or `"model"`). Properties
/// get `name` from their key unless one is set.
///
/// Not idempotent: each call draws new ids, so preprocess a schema exactly once
/// per build.
pub struct SchemaPreprocessor<'a> {
    ids: &'a dyn IdGenerator,
    default_model_name: &'a str,
}

impl<'a> SchemaPreprocessor<'a> {
    pub fn new(ids: &'a dyn IdGenerator) -> Self {
        Self {
            ids,
            default_model_name: DEFAULT_MODEL_NAME,
        }
    }

    pub fn with_default_model_name(mut self, name: &'a str) -> Self {
        self.default_model_name = name;
        self
    }

    pub fn preprocess(&self, root: &mut SchemaNode) {
        if root.schema_type.is_none() {
            root.schema_type = Some(SchemaType::Object);
        }
        if root.model_name.is_none() {
            root.model_name = Some(self.default_model_name.to_string());
        }
        root.form_id = Some(self.ids.next_id());
        Self::default_widget(root);
        self.cover(root);
        debug!(
            form_id = root.form_id.as_deref().unwrap_or_default(),
            "schema preprocessed"
        );
    }

    fn cover(&self, node: &mut SchemaNode) {
        let model_name = node.model_name().to_string();

        for (key, child) in node.properties.iter_mut() {
            if child.name.is_none() {
                child.name = Some(key.clone());
            }
            self.annotate(child, &model_name);
            self.cover(child);
        }

        if let Some(items) = node.items.as_deref_mut() {
            if items.name.is_none() {
                items.name = node.name.clone();
            }
            self.annotate(items, &model_name);
            self.cover(items);
        }
    }

    fn annotate(&self, node: &mut SchemaNode, model_name: &str) {
        node.schema_type = Some(node.schema_type());
        node.form_id = Some(self.ids.next_id());
        node.model_name = Some(model_name.to_string());
        Self::default_widget(node);
    }

    fn default_widget(node: &mut SchemaNode) {
        let missing = node.widget.as_ref().map_or(true, |w| w.id.is_empty());
        if missing {
            node.widget = Some(WidgetInfo::new(node.schema_type().as_str()));
        }
    }
}
