use std::sync::Arc;

use crate::data::{
    schema::SchemaEntry,
    value::Data,
    variant::{Opaque, Variant, VariantExt},
};

/// Ordered set of variants used to classify values.
///
/// The registry is an ordinary value handed to every build and edit, so
/// each tree (and each test) can use its own.
#[derive(Debug, Clone)]
pub struct Registry {
    variants: Vec<Variant>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry holding the builtin variants in default order.
    pub fn new() -> Self {
        Self {
            variants: Variant::builtins(),
        }
    }

    /// Registry without any variant. Everything classifies as `Any`.
    pub fn empty() -> Self {
        Self {
            variants: Vec::new(),
        }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name() == name)
    }

    /// Add a variant ahead of the catch-all.
    ///
    /// A variant with the same name is replaced in place.
    pub fn register(&mut self, variant: Variant) {
        if let Some(slot) = self.variants.iter_mut().find(|v| **v == variant) {
            *slot = variant;
            return;
        }
        let pos = self
            .variants
            .iter()
            .position(|v| matches!(v, Variant::Any))
            .unwrap_or(self.variants.len());
        self.variants.insert(pos, variant);
    }

    /// Add a variant at an explicit priority; `0` is tested first.
    pub fn insert(&mut self, index: usize, variant: Variant) {
        self.variants.retain(|v| *v != variant);
        let index = index.min(self.variants.len());
        self.variants.insert(index, variant);
    }

    pub fn register_ext(&mut self, ext: impl VariantExt + 'static) {
        self.register(Variant::Extension(Arc::new(ext)));
    }

    /// Variant registered under `name`, registering one when missing.
    ///
    /// Builtin names bring in the builtin variant, any other name gets an
    /// [`Opaque`] pass-through leaf. Either way the variant stays
    /// registered for the rest of the registry's life.
    pub fn get_or_register(&mut self, name: &str) -> Variant {
        if let Some(v) = self.get(name) {
            return v.clone();
        }
        let variant = Variant::from_name(name)
            .unwrap_or_else(|| Variant::Extension(Arc::new(Opaque::new(name))));
        info!("registering variant `{name}` requested by schema");
        self.register(variant.clone());
        variant
    }

    /// First variant whose predicate accepts `data`, else `Any`.
    pub fn classify(&self, data: &Data) -> Variant {
        self.variants
            .iter()
            .find(|v| v.matches(data))
            .cloned()
            .unwrap_or(Variant::Any)
    }

    /// Variant for `data` under the schema entry of its key.
    ///
    /// An explicit schema `type` always wins, even over a value that does
    /// not match it.
    pub fn resolve(&mut self, data: &Data, fragment: Option<&SchemaEntry>) -> Variant {
        if let Some(name) = fragment.and_then(|f| f.type_name.as_deref()) {
            return self.get_or_register(name);
        }
        self.classify(data)
    }
}
