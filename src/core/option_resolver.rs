// src/core/option_resolver.rs

//! # Option Resolution Engine
//!
//! A [`Session`] turns a sparse set of user-supplied options into a complete
//! one. Three registries drive it:
//!
//! - **handlers** validate or normalize a raw value (`realm` is uppercased,
//!   `server` gains a scheme, ...). An option is *supported* when it has one.
//! - **defaults** compute a fallback for an option nobody set. Each default
//!   declares the options it requires; those are resolved first, lazily and
//!   memoized, and a requirement cycle aborts the session.
//! - **synonyms** mirror a canonical option's value onto an alternate name.
//!
//! Once an option holds a value it is never overwritten: the first writer wins.

use crate::{
    core::config_cache::{ConfigCache, ConfigError},
    system::collaborators::{CollaboratorError, Collaborators, DirectoryService, HostResolver},
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Validates or normalizes a raw value. The error string explains the rejection.
pub type OptionHandler = fn(&str) -> Result<String, String>;

/// Computes a fallback value. `Ok(None)` means "no value could be derived".
pub type DefaultFn = fn(&mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>>;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid value '{value}' for option '{option}': {reason}")]
    InvalidValue {
        option: String,
        value: String,
        reason: String,
    },
    #[error("Circular dependency detected while resolving defaults: {path}")]
    Cycle { path: String },
    #[error("No value could be determined for option '{0}'.")]
    Unresolved(String),
    #[error("Config error while resolving '{option}': {source}")]
    Config {
        option: String,
        #[source]
        source: ConfigError,
    },
    #[error("Collaborator failure while resolving '{option}': {source}")]
    Collaborator {
        option: String,
        #[source]
        source: CollaboratorError,
    },
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Where an option stands within the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionState {
    Unset,
    Resolved,
    Unsupported,
}

/// A default computation together with the options it reads.
#[derive(Debug, Clone, Copy)]
pub struct DefaultRule {
    pub requires: &'static [&'static str],
    pub compute: DefaultFn,
}

// --- REGISTRY ---

/// Handlers, defaults and synonyms, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    handlers: BTreeMap<String, OptionHandler>,
    defaults: BTreeMap<String, DefaultRule>,
    /// Canonical name -> synonym.
    synonyms: BTreeMap<String, String>,
    /// Installed synonym -> canonical name whose handler it shares.
    aliases: BTreeMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_handler(&mut self, name: &str, handler: OptionHandler) -> &mut Self {
        self.handlers.insert(name.to_string(), handler);
        self
    }

    pub fn register_default(
        &mut self,
        name: &str,
        requires: &'static [&'static str],
        compute: DefaultFn,
    ) -> &mut Self {
        self.defaults
            .insert(name.to_string(), DefaultRule { requires, compute });
        self
    }

    pub fn register_synonym(&mut self, name: &str, synonym: &str) -> &mut Self {
        self.synonyms.insert(name.to_string(), synonym.to_string());
        self
    }

    /// Lets every synonym share its canonical option's handler. Synonyms of
    /// unsupported options are left alone. Running it twice changes nothing.
    pub fn install_synonyms(&mut self) {
        for (name, synonym) in &self.synonyms {
            if self.handlers.contains_key(name) {
                log::trace!("Synonym '{}' now shares the handler of '{}'", synonym, name);
                self.aliases.insert(synonym.clone(), name.clone());
            }
        }
    }

    /// The handler for `name`, following an installed synonym if needed.
    pub fn handler(&self, name: &str) -> Option<OptionHandler> {
        self.handlers.get(name).copied().or_else(|| {
            self.aliases
                .get(name)
                .and_then(|canonical| self.handlers.get(canonical).copied())
        })
    }

    pub fn default_rule(&self, name: &str) -> Option<DefaultRule> {
        self.defaults.get(name).copied()
    }

    pub fn synonym_of(&self, name: &str) -> Option<&str> {
        self.synonyms.get(name).map(String::as_str)
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.handler(name).is_some()
    }

    /// Every supported name, canonical options and installed synonyms, sorted.
    pub fn supported_options(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self.handlers.keys().chain(self.aliases.keys()).collect();
        names.into_iter().cloned().collect()
    }
}

// --- DEFAULT CONTEXT ---

/// What a default computation may see: the options resolved so far, the
/// session's config cache and the external collaborators.
#[derive(Debug)]
pub struct DefaultContext<'s, 'a> {
    option: &'s str,
    options: &'s BTreeMap<String, String>,
    configs: &'s mut ConfigCache,
    collaborators: Collaborators<'a>,
}

impl DefaultContext<'_, '_> {
    /// The option being computed.
    pub fn option(&self) -> &str {
        self.option
    }

    /// An already-resolved option. Declared requirements are always resolved
    /// before the computation runs.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Looks `key` up in the config file whose path is held by option `path_option`.
    pub fn config_value(&mut self, path_option: &str, key: &str) -> ResolveResult<Option<String>> {
        let Some(path) = self.options.get(path_option) else {
            return Ok(None);
        };
        let path = Path::new(path).to_path_buf();
        self.configs
            .lookup(&path, key)
            .map_err(|source| ResolveError::Config {
                option: self.option.to_string(),
                source,
            })
    }

    pub fn host(&self) -> &dyn HostResolver {
        self.collaborators.host
    }

    pub fn directory(&self) -> &dyn DirectoryService {
        self.collaborators.directory
    }

    /// Wraps a collaborator failure with the option being computed.
    pub fn collaborator_error(&self, source: CollaboratorError) -> ResolveError {
        ResolveError::Collaborator {
            option: self.option.to_string(),
            source,
        }
    }
}

// --- SESSION ---

/// One resolution session: the option set plus everything used to fill it.
#[derive(Debug)]
pub struct Session<'a> {
    registry: Registry,
    options: BTreeMap<String, String>,
    unsupported: BTreeSet<String>,
    configs: ConfigCache,
    collaborators: Collaborators<'a>,
}

impl<'a> Session<'a> {
    pub fn new(registry: Registry, collaborators: Collaborators<'a>) -> Self {
        Self {
            registry,
            options: BTreeMap::new(),
            unsupported: BTreeSet::new(),
            configs: ConfigCache::new(),
            collaborators,
        }
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.registry.is_supported(name)
    }

    pub fn install_synonyms(&mut self) {
        self.registry.install_synonyms();
    }

    /// Assigns an explicit value through the option's handler.
    ///
    /// An unknown option is reported and left `Unsupported`; the caller keeps
    /// going. An option that already holds a value keeps it.
    pub fn handle_option(&mut self, name: &str, raw: &str) -> ResolveResult<OptionState> {
        let Some(handler) = self.registry.handler(name) else {
            log::warn!("Option '{}' is not supported, ignoring it", name);
            self.unsupported.insert(name.to_string());
            return Ok(OptionState::Unsupported);
        };

        if self.options.contains_key(name) {
            log::debug!("Option '{}' already resolved, keeping the first value", name);
            return Ok(OptionState::Resolved);
        }

        let value = handler(raw).map_err(|reason| ResolveError::InvalidValue {
            option: name.to_string(),
            value: raw.to_string(),
            reason,
        })?;
        log::debug!("Option '{}' set to '{}'", name, value);
        self.options.insert(name.to_string(), value);
        Ok(OptionState::Resolved)
    }

    /// Fills every supported option that is still unset, in name order, then
    /// mirrors resolved options onto their synonyms.
    pub fn resolve_defaults(&mut self) -> ResolveResult<()> {
        for name in self.registry.supported_options() {
            if !self.options.contains_key(&name) {
                self.resolve(&name)?;
            }
        }
        let canonical: Vec<String> = self.options.keys().cloned().collect();
        for name in canonical {
            self.mirror_synonym(&name);
        }
        Ok(())
    }

    /// Resolves a single option on demand: its current value, or its default.
    pub fn resolve(&mut self, name: &str) -> ResolveResult<Option<String>> {
        let mut stack = Vec::new();
        self.resolve_inner(name, &mut stack)
    }

    /// Like [`Session::resolve`], but a missing value is an error.
    pub fn require(&mut self, name: &str) -> ResolveResult<String> {
        self.resolve(name)?
            .ok_or_else(|| ResolveError::Unresolved(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn state(&self, name: &str) -> OptionState {
        if self.options.contains_key(name) {
            OptionState::Resolved
        } else if self.unsupported.contains(name) || !self.is_supported(name) {
            OptionState::Unsupported
        } else {
            OptionState::Unset
        }
    }

    pub fn config_cache(&self) -> &ConfigCache {
        &self.configs
    }

    pub fn collaborators(&self) -> Collaborators<'a> {
        self.collaborators
    }

    fn resolve_inner(&mut self, name: &str, stack: &mut Vec<String>) -> ResolveResult<Option<String>> {
        if let Some(value) = self.options.get(name) {
            return Ok(Some(value.clone()));
        }

        if stack.iter().any(|n| n == name) {
            let mut path = stack.clone();
            path.push(name.to_string());
            return Err(ResolveError::Cycle {
                path: path.join(" -> "),
            });
        }

        let Some(rule) = self.registry.default_rule(name) else {
            return Ok(None);
        };

        stack.push(name.to_string());
        for requirement in rule.requires {
            self.resolve_inner(requirement, stack)?;
        }

        let computed = {
            let mut ctx = DefaultContext {
                option: name,
                options: &self.options,
                configs: &mut self.configs,
                collaborators: self.collaborators,
            };
            (rule.compute)(&mut ctx)
        };
        stack.pop();

        let Some(raw) = computed? else {
            log::debug!("No default available for '{}'", name);
            return Ok(None);
        };

        // Defaults go through the same normalization as explicit values.
        let value = match self.registry.handler(name) {
            Some(handler) => handler(&raw).map_err(|reason| ResolveError::InvalidValue {
                option: name.to_string(),
                value: raw.clone(),
                reason,
            })?,
            None => raw,
        };

        log::debug!("Option '{}' defaulted to '{}'", name, value);
        self.options.insert(name.to_string(), value.clone());
        self.mirror_synonym(name);
        Ok(Some(value))
    }

    /// Copies `name`'s value onto its synonym unless the synonym already has one.
    fn mirror_synonym(&mut self, name: &str) {
        let Some(synonym) = self.registry.synonym_of(name).map(str::to_string) else {
            return;
        };
        if self.options.contains_key(&synonym) {
            return;
        }
        if let Some(value) = self.options.get(name).cloned() {
            log::trace!("Mirroring '{}' onto synonym '{}'", name, synonym);
            self.options.insert(synonym, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{FakeDirectory, FakeHost};

    fn upper(raw: &str) -> Result<String, String> {
        Ok(raw.to_uppercase())
    }

    fn non_empty(raw: &str) -> Result<String, String> {
        if raw.trim().is_empty() {
            Err("value must not be empty".to_string())
        } else {
            Ok(raw.to_string())
        }
    }

    fn default_color(_: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
        Ok(Some("blue".to_string()))
    }

    fn default_shade(ctx: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
        Ok(ctx.get("color").map(|c| format!("dark-{}", c)))
    }

    fn default_own_name(ctx: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
        Ok(Some(format!("{}-default", ctx.option())))
    }

    fn default_nothing(_: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
        Ok(None)
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_handler("color", non_empty)
            .register_handler("shade", non_empty)
            .register_handler("name", upper)
            .register_default("color", &[], default_color)
            .register_default("shade", &["color"], default_shade)
            .register_synonym("color", "colour")
            .register_synonym("missing", "absent");
        registry
    }

    fn with_session<F: FnOnce(&mut Session<'_>)>(registry: Registry, f: F) {
        let host = FakeHost::new("ws1.example.com");
        let directory = FakeDirectory::default();
        let mut session = Session::new(
            registry,
            Collaborators {
                host: &host,
                directory: &directory,
            },
        );
        f(&mut session);
    }

    #[test]
    fn test_handle_option_invokes_handler() {
        with_session(registry(), |session| {
            assert_eq!(session.handle_option("name", "alice").unwrap(), OptionState::Resolved);
            assert_eq!(session.get("name"), Some("ALICE"));
        });
    }

    #[test]
    fn test_unsupported_option_is_left_unresolved() {
        with_session(registry(), |session| {
            assert_eq!(
                session.handle_option("bogus", "x").unwrap(),
                OptionState::Unsupported
            );
            assert_eq!(session.get("bogus"), None);
            assert_eq!(session.state("bogus"), OptionState::Unsupported);
        });
    }

    #[test]
    fn test_handler_rejection_is_an_error() {
        with_session(registry(), |session| {
            let err = session.handle_option("color", "  ").unwrap_err();
            assert!(matches!(err, ResolveError::InvalidValue { .. }));
            assert_eq!(session.state("color"), OptionState::Unset);
        });
    }

    #[test]
    fn test_first_writer_wins() {
        with_session(registry(), |session| {
            session.handle_option("name", "first").unwrap();
            session.handle_option("name", "second").unwrap();
            assert_eq!(session.get("name"), Some("FIRST"));
        });
    }

    #[test]
    fn test_defaults_resolve_requirements_first() {
        with_session(registry(), |session| {
            assert_eq!(session.resolve("shade").unwrap().as_deref(), Some("dark-blue"));
            assert_eq!(session.get("color"), Some("blue"));
        });
    }

    #[test]
    fn test_explicit_value_is_not_overwritten_by_default() {
        with_session(registry(), |session| {
            session.handle_option("color", "red").unwrap();
            session.resolve_defaults().unwrap();
            assert_eq!(session.get("color"), Some("red"));
            assert_eq!(session.get("shade"), Some("dark-red"));
        });
    }

    #[test]
    fn test_synonym_mirroring_after_install() {
        with_session(registry(), |session| {
            assert!(!session.is_supported("colour"));
            session.install_synonyms();
            session.install_synonyms();
            assert!(session.is_supported("colour"));
            assert!(!session.is_supported("absent"));

            session.resolve_defaults().unwrap();
            assert_eq!(session.get("colour"), Some("blue"));
        });
    }

    #[test]
    fn test_synonym_with_own_value_is_not_overwritten() {
        with_session(registry(), |session| {
            session.install_synonyms();
            session.handle_option("colour", "green").unwrap();
            session.resolve_defaults().unwrap();
            // Mirroring only flows from canonical to synonym.
            assert_eq!(session.get("colour"), Some("green"));
            assert_eq!(session.get("color"), Some("blue"));
        });
    }

    #[test]
    fn test_default_returning_none_leaves_option_unset() {
        let mut registry = registry();
        registry
            .register_handler("empty", non_empty)
            .register_default("empty", &[], default_nothing);
        with_session(registry, |session| {
            session.resolve_defaults().unwrap();
            assert_eq!(session.state("empty"), OptionState::Unset);
            assert!(matches!(
                session.require("empty"),
                Err(ResolveError::Unresolved(_))
            ));
        });
    }

    #[test]
    fn test_default_sees_the_option_being_computed() {
        let mut registry = registry();
        registry
            .register_handler("label", non_empty)
            .register_default("label", &[], default_own_name);
        with_session(registry, |session| {
            assert_eq!(session.require("label").unwrap(), "label-default");
        });
    }

    #[test]
    fn test_dependency_cycle_is_fatal() {
        let mut registry = Registry::new();
        registry
            .register_handler("a", non_empty)
            .register_handler("b", non_empty)
            .register_handler("c", non_empty)
            .register_default("a", &["b"], default_color)
            .register_default("b", &["c"], default_color)
            .register_default("c", &["a"], default_color);

        with_session(registry, |session| {
            let err = session.resolve_defaults().unwrap_err();
            match err {
                ResolveError::Cycle { path } => assert_eq!(path, "a -> b -> c -> a"),
                other => panic!("expected a cycle, got {:?}", other),
            }
        });
    }

    #[test]
    fn test_explicit_value_breaks_a_cycle() {
        let mut registry = Registry::new();
        registry
            .register_handler("a", non_empty)
            .register_handler("b", non_empty)
            .register_default("a", &["b"], default_color)
            .register_default("b", &["a"], default_color);

        with_session(registry, |session| {
            // A value that is already set is never recomputed, so no cycle is walked.
            session.handle_option("b", "given").unwrap();
            session.resolve_defaults().unwrap();
            assert_eq!(session.get("a"), Some("blue"));
        });
    }
}
