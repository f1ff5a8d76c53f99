//! Application configuration.
//!
//! [`AppOptions`] holds the merged configuration. [`AppOptionsPatch`] is what
//! callers hand to [`App::init`](crate::App::init): every key it sets
//! overwrites the current value, every key it leaves out is kept.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Default directory startup modules are loaded from.
pub const DEFAULT_MODULE_PATH: &str = "/src/modules/";

/// Merged application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppOptions {
    /// Prefix for relative URLs. Empty leaves relative URLs as they are.
    pub base_path: String,
    /// Startup modules, loaded from `<module_path><name>.js`.
    pub modules: Vec<String>,
    /// Directory startup modules are loaded from.
    pub module_path: String,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            modules: Vec::new(),
            module_path: DEFAULT_MODULE_PATH.to_string(),
        }
    }
}

impl AppOptions {
    /// Shallow merge: keys set in `patch` overwrite, the rest is kept.
    pub fn merge(mut self, patch: AppOptionsPatch) -> Self {
        if let Some(base_path) = patch.base_path {
            self.base_path = base_path;
        }
        if let Some(modules) = patch.modules {
            self.modules = modules;
        }
        if let Some(module_path) = patch.module_path {
            self.module_path = module_path;
        }
        self
    }

    /// Script path of the startup module `name`.
    pub fn module_script(&self, name: &str) -> String {
        format!("{}{name}.js", self.module_path)
    }
}

/// A partial configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOptionsPatch {
    /// Overrides [`AppOptions::base_path`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Overrides [`AppOptions::modules`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,
    /// Overrides [`AppOptions::module_path`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,
}

impl AppOptionsPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a patch from a JSON object, e.g. an inline configuration blob.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the base path.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Set the startup modules.
    pub fn modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules = Some(modules.into_iter().map(Into::into).collect());
        self
    }

    /// Set the module directory.
    pub fn module_path(mut self, module_path: impl Into<String>) -> Self {
        self.module_path = Some(module_path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_keys_overwrite_and_missing_keys_are_kept() {
        let options = AppOptions::default()
            .merge(AppOptionsPatch::new().base_path("http://host").modules(["events"]))
            .merge(AppOptionsPatch::new().modules(["templates"]));

        assert_eq!(options.base_path, "http://host");
        assert_eq!(options.modules, vec!["templates"]);
        assert_eq!(options.module_path, DEFAULT_MODULE_PATH);
        assert_eq!(options.module_script("templates"), "/src/modules/templates.js");
    }

    #[test]
    fn patches_parse_from_camel_case_json() {
        let patch =
            AppOptionsPatch::from_json(r#"{"basePath": "http://host/", "modules": ["events"]}"#)
                .unwrap();
        assert_eq!(patch.base_path.as_deref(), Some("http://host/"));
        assert_eq!(patch.module_path, None);

        assert!(matches!(
            AppOptionsPatch::from_json("[1, 2]"),
            Err(AppError::Config(_))
        ));
    }
}
