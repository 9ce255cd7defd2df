//! Interfaces to the hosting web framework.
//!
//! The core computes search paths and names; the framework owns the view
//! finder, the translator, the component factory and the service container.
//! Each of those is modelled as a small trait, and a [`Host`] hands them out.
//!
//! [`RecordingHost`] implements every trait by recording calls. It backs the
//! crate's tests and is useful for inspecting what activation would register.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// View finder: namespaced view hints plus the global location list.
pub trait ViewRegistrar {
    /// Registers `paths` (searched in order) under `namespace::`.
    fn add_namespace(&mut self, namespace: &str, paths: &[PathBuf]);

    /// Puts `path` at the front of the global view search list.
    fn prepend_location(&mut self, path: &Path);

    /// Registers a directory of anonymous template components under `prefix`.
    fn add_anonymous_component_path(&mut self, path: &Path, prefix: &str);
}

/// Translator: namespaced language directories and JSON catalogs.
pub trait TranslationRegistrar {
    fn add_namespace(&mut self, namespace: &str, path: &Path);

    fn add_json_path(&mut self, path: &Path);
}

/// A component namespace: where view templates and classes live for `name::`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNamespace {
    pub name: String,
    pub view_path: PathBuf,
    pub class_namespace: Option<String>,
    pub class_path: Option<PathBuf>,
}

/// Where component generators should write new classes and views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorTarget {
    pub class_namespace: String,
    pub class_path: PathBuf,
    pub view_path: PathBuf,
}

/// Called back by the framework when it cannot resolve a component name.
pub trait MissingComponentHandler {
    /// Returns the class that answers `name`, or `None`.
    fn resolve_missing(
        &mut self,
        name: &str,
        components: &mut dyn ComponentRegistrar,
    ) -> Option<String>;
}

/// Component factory of the framework.
pub trait ComponentRegistrar {
    fn add_namespace(&mut self, namespace: ComponentNamespace);

    /// Resolves `target` (e.g. `dark::pages.checkout`) to a class name.
    ///
    /// A framework that cannot resolve `target` may consult `missing`, which
    /// is how a lookup can re-enter the theme resolver.
    fn resolve_class(
        &mut self,
        target: &str,
        missing: &mut dyn MissingComponentHandler,
    ) -> Option<String>;

    /// Tells the framework that missing-component lookups should be forwarded
    /// to the theme resolver.
    fn enable_missing_component_fallback(&mut self);

    /// Replaces the generator target, returning the previous one.
    fn set_generator_target(&mut self, target: Option<GeneratorTarget>) -> Option<GeneratorTarget>;
}

/// Service container of the host application.
pub trait ServiceContainer {
    /// Loads (executes) a provider source file.
    fn load_provider_file(&mut self, path: &Path);

    fn class_exists(&self, class: &str) -> bool;

    fn register_provider(&mut self, class: &str);
}

/// Access to every collaborator the core talks to.
pub trait Host {
    fn views(&mut self) -> &mut dyn ViewRegistrar;

    fn translator(&mut self) -> &mut dyn TranslationRegistrar;

    fn components(&mut self) -> &mut dyn ComponentRegistrar;

    fn container(&mut self) -> &mut dyn ServiceContainer;
}

/// Recorded view registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedViews {
    /// `(namespace, paths)` in call order.
    pub namespaces: Vec<(String, Vec<PathBuf>)>,
    /// Global locations; index 0 is searched first.
    pub locations: Vec<PathBuf>,
    /// `(path, prefix)` in call order.
    pub anonymous_components: Vec<(PathBuf, String)>,
}

impl RecordedViews {
    /// The most recent paths registered for `namespace`.
    pub fn namespace(&self, namespace: &str) -> Option<&[PathBuf]> {
        self.namespaces
            .iter()
            .rev()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, paths)| paths.as_slice())
    }
}

impl ViewRegistrar for RecordedViews {
    fn add_namespace(&mut self, namespace: &str, paths: &[PathBuf]) {
        self.namespaces.push((namespace.to_string(), paths.to_vec()));
    }

    fn prepend_location(&mut self, path: &Path) {
        self.locations.insert(0, path.to_path_buf());
    }

    fn add_anonymous_component_path(&mut self, path: &Path, prefix: &str) {
        self.anonymous_components
            .push((path.to_path_buf(), prefix.to_string()));
    }
}

/// Recorded translation registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedTranslations {
    pub namespaces: Vec<(String, PathBuf)>,
    pub json_paths: Vec<PathBuf>,
}

impl RecordedTranslations {
    /// The most recent path registered for `namespace`.
    pub fn namespace(&self, namespace: &str) -> Option<&Path> {
        self.namespaces
            .iter()
            .rev()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, path)| path.as_path())
    }
}

impl TranslationRegistrar for RecordedTranslations {
    fn add_namespace(&mut self, namespace: &str, path: &Path) {
        self.namespaces
            .push((namespace.to_string(), path.to_path_buf()));
    }

    fn add_json_path(&mut self, path: &Path) {
        self.json_paths.push(path.to_path_buf());
    }
}

/// Recording component factory with a table of resolvable targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedComponents {
    pub namespaces: Vec<ComponentNamespace>,
    /// `target → class` pairs that [`ComponentRegistrar::resolve_class`] answers.
    pub classes: HashMap<String, String>,
    /// Every target passed to `resolve_class`, in order.
    pub attempts: Vec<String>,
    /// When true, unresolved targets are forwarded to the missing handler.
    pub forward_missing: bool,
    pub fallback_enabled: usize,
    pub generator_target: Option<GeneratorTarget>,
}

impl RecordedComponents {
    /// Makes `target` resolvable to `class`.
    pub fn define(&mut self, target: impl Into<String>, class: impl Into<String>) {
        self.classes.insert(target.into(), class.into());
    }

    /// Names of every registered namespace, in call order.
    pub fn namespace_names(&self) -> Vec<&str> {
        self.namespaces.iter().map(|ns| ns.name.as_str()).collect()
    }
}

impl ComponentRegistrar for RecordedComponents {
    fn add_namespace(&mut self, namespace: ComponentNamespace) {
        self.namespaces.push(namespace);
    }

    fn resolve_class(
        &mut self,
        target: &str,
        missing: &mut dyn MissingComponentHandler,
    ) -> Option<String> {
        self.attempts.push(target.to_string());
        if let Some(class) = self.classes.get(target) {
            return Some(class.clone());
        }
        if self.forward_missing {
            return missing.resolve_missing(target, self);
        }
        None
    }

    fn enable_missing_component_fallback(&mut self) {
        self.fallback_enabled += 1;
    }

    fn set_generator_target(&mut self, target: Option<GeneratorTarget>) -> Option<GeneratorTarget> {
        std::mem::replace(&mut self.generator_target, target)
    }
}

/// Recording service container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedContainer {
    /// Classes that loading a given provider file defines.
    pub file_classes: HashMap<PathBuf, Vec<String>>,
    pub defined: HashSet<String>,
    pub loaded_files: Vec<PathBuf>,
    pub providers: Vec<String>,
}

impl ServiceContainer for RecordedContainer {
    fn load_provider_file(&mut self, path: &Path) {
        self.loaded_files.push(path.to_path_buf());
        if let Some(classes) = self.file_classes.get(path) {
            self.defined.extend(classes.iter().cloned());
        }
    }

    fn class_exists(&self, class: &str) -> bool {
        self.defined.contains(class)
    }

    fn register_provider(&mut self, class: &str) {
        self.providers.push(class.to_string());
    }
}

/// A [`Host`] that records every registration.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub views: RecordedViews,
    pub translations: RecordedTranslations,
    pub components: RecordedComponents,
    pub container: RecordedContainer,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for RecordingHost {
    fn views(&mut self) -> &mut dyn ViewRegistrar {
        &mut self.views
    }

    fn translator(&mut self) -> &mut dyn TranslationRegistrar {
        &mut self.translations
    }

    fn components(&mut self) -> &mut dyn ComponentRegistrar {
        &mut self.components
    }

    fn container(&mut self) -> &mut dyn ServiceContainer {
        &mut self.container
    }
}
