use super::{sources, SourceAdapter};
use tracing::debug;

/// Lookup of every known source adapter by canonical name.
pub struct SourceRegistry {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl SourceRegistry {
    /// Registry holding every built-in source.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for adapter in sources::builtin() {
            registry.register(adapter);
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Add an adapter, replacing any existing one with the same name.
    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>) {
        debug!(source = adapter.name(), "registering source adapter");
        self.adapters.retain(|a| a.name() != adapter.name());
        self.adapters.push(adapter);
    }

    pub fn get(&self, name: &str) -> Option<&dyn SourceAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    pub fn list_sources(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SourceAdapter> {
        self.adapters.iter().map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sources_are_registered() {
        let registry = SourceRegistry::new();
        assert_eq!(registry.len(), 9);
        assert!(registry.get("Anglian Water").is_some());
        assert!(registry.get("Thames Water").is_none());
        assert_eq!(
            registry.get("United Utilities").map(|a| a.dir_name()),
            Some("United utilities")
        );
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = SourceRegistry::empty();
        registry.register(Box::new(sources::Ofwat));
        registry.register(Box::new(sources::Ofwat));
        assert_eq!(registry.list_sources(), vec!["Ofwat"]);
    }
}
