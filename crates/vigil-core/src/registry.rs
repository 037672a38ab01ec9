//! Ordered set of validator modules run by the orchestrator

use vigil_diagnostics::ModuleId;

use crate::batched::{ContainerBatchedModule, FieldBatchedModule};
use crate::error::{EngineError, Result};
use crate::host::FeatureSwitch;
use crate::module::ValidatorModule;
use crate::modules::{ConditionCheck, FeatureToggleModule, MissingComponentCheck};

/// Registry of validator modules, one per id, in run order
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Box<dyn ValidatorModule>>,
}

impl ModuleRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in modules
    #[must_use]
    pub fn with_defaults(features: FeatureSwitch) -> Self {
        let mut registry = Self::new();
        registry.modules.push(Box::new(ContainerBatchedModule::new(MissingComponentCheck)));
        registry.modules.push(Box::new(FieldBatchedModule::new(ConditionCheck::new())));
        registry.modules.push(Box::new(FeatureToggleModule::new(features)));
        registry
    }

    /// Append a module
    ///
    /// # Errors
    /// Returns [`EngineError::DuplicateModule`] if the id is taken
    pub fn register(&mut self, module: impl ValidatorModule + 'static) -> Result<()> {
        let id = module.id();
        if self.contains(&id) {
            return Err(EngineError::DuplicateModule(id));
        }
        tracing::debug!(module = %id, "module registered");
        self.modules.push(Box::new(module));
        Ok(())
    }

    /// Builder form of [`register`](Self::register)
    ///
    /// # Errors
    /// Returns [`EngineError::DuplicateModule`] if the id is taken
    pub fn with(mut self, module: impl ValidatorModule + 'static) -> Result<Self> {
        self.register(module)?;
        Ok(self)
    }

    /// Check if a module id is registered
    #[must_use]
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.iter().any(|m| &m.id() == id)
    }

    /// Module ids in run order
    #[must_use]
    pub fn ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    /// Display names in run order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.display_name()).collect()
    }

    /// Module at a run position
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&dyn ValidatorModule> {
        self.modules.get(index).map(AsRef::as_ref)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut (dyn ValidatorModule + 'static)> {
        self.modules.get_mut(index).map(AsMut::as_mut)
    }

    /// Iterate modules in run order
    pub fn iter(&self) -> impl Iterator<Item = &dyn ValidatorModule> {
        self.modules.iter().map(AsRef::as_ref)
    }

    /// Number of modules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
