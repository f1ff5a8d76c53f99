//! Template rendering module.
//!
//! Rendering itself is delegated to an external [`TemplateEngine`] adapter
//! (mustache, handlebars, ...). The module adds template fetching and
//! exposes `render` as a mountable member.

use crate::http::{HttpClient, HttpError, is_absolute};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use xorb_core::{Data, MemberKind, Module, ModuleError};

/// Default directory templates are fetched from.
pub const DEFAULT_TEMPLATE_URL: &str = "templates/";

/// Errors raised while fetching or rendering templates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The engine rejected the template.
    #[error("template could not be rendered: {0}")]
    Render(String),

    /// The template could not be fetched.
    #[error("template could not be fetched: {0}")]
    Fetch(#[from] HttpError),
}

/// A template engine adapter.
pub trait TemplateEngine: Send + Sync + 'static {
    /// Engine name, for diagnostics.
    fn name(&self) -> &str;

    /// Render `template` with `variables`.
    fn render(&self, template: &str, variables: &Data) -> Result<String, TemplateError>;
}

/// Renders templates through an engine adapter.
pub struct TemplatesModule {
    template_url: String,
    engine: Arc<dyn TemplateEngine>,
}

impl TemplatesModule {
    /// Create a module rendering through `engine`.
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            template_url: DEFAULT_TEMPLATE_URL.to_string(),
            engine,
        }
    }

    /// Fetch relative templates from `template_url` instead of the default.
    pub fn with_template_url(mut self, template_url: impl Into<String>) -> Self {
        self.template_url = template_url.into();
        self
    }

    /// Directory relative templates are fetched from.
    pub fn template_url(&self) -> &str {
        &self.template_url
    }

    /// Render a template string.
    pub fn render(&self, template: &str, variables: &Data) -> Result<String, TemplateError> {
        self.engine.render(template, variables)
    }

    /// Fetch a template and render it.
    pub async fn get_template(
        &self,
        client: &HttpClient,
        url: &str,
        variables: &Data,
    ) -> Result<String, TemplateError> {
        let url = if is_absolute(url) {
            url.to_string()
        } else {
            format!("{}{url}", self.template_url)
        };
        let response = client.get(url.as_str()).await.inspect_err(|err| {
            tracing::error!(target: "xorb::http", %url, "Could not fetch template: {err}");
        })?;
        let template = response.text()?;
        self.render(&template, variables)
    }
}

impl Module for TemplatesModule {
    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        match name {
            "render" => Some(MemberKind::Method),
            "templateUrl" | "templateEngine" => Some(MemberKind::Property),
            _ => None,
        }
    }

    fn members(&self) -> Vec<String> {
        vec!["render".into(), "templateEngine".into(), "templateUrl".into()]
    }

    fn property(&self, name: &str) -> Option<Data> {
        match name {
            "templateUrl" => Some(json!(self.template_url)),
            "templateEngine" => Some(json!(self.engine.name())),
            _ => None,
        }
    }

    fn call_method(&self, name: &str, args: Vec<Data>) -> Result<Data, ModuleError> {
        if name != "render" {
            return Err(match self.member_kind(name) {
                Some(_) => ModuleError::NotCallable(name.to_string()),
                None => ModuleError::UnknownMember(name.to_string()),
            });
        }
        let mut args = args.into_iter();
        let template = match args.next() {
            Some(Data::String(template)) => template,
            _ => {
                return Err(ModuleError::InvalidArguments(
                    "render expects a template string".to_string(),
                ));
            }
        };
        let variables = args.next().unwrap_or(Data::Null);
        self.render(&template, &variables)
            .map(Data::String)
            .map_err(|err| ModuleError::Failed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;
    use crate::testing::MockTransport;

    /// Replaces `{{name}}` with the string form of `variables.name`.
    struct Braces;

    impl TemplateEngine for Braces {
        fn name(&self) -> &str {
            "braces"
        }

        fn render(&self, template: &str, variables: &Data) -> Result<String, TemplateError> {
            let mut out = template.to_string();
            if let Some(map) = variables.as_object() {
                for (key, value) in map {
                    let value = value.as_str().map_or_else(|| value.to_string(), str::to_string);
                    out = out.replace(&format!("{{{{{key}}}}}"), &value);
                }
            }
            if out.contains("{{") {
                return Err(TemplateError::Render("unresolved placeholder".into()));
            }
            Ok(out)
        }
    }

    #[test]
    fn renders_through_the_module_contract() {
        let module = TemplatesModule::new(Arc::new(Braces));
        assert_eq!(
            module.call_method(
                "render",
                vec![json!("rendering is {{status}}"), json!({"status": "working"})]
            ),
            Ok(json!("rendering is working"))
        );
        assert!(matches!(
            module.call_method("render", vec![json!("{{missing}}")]),
            Err(ModuleError::Failed(_))
        ));
        assert_eq!(module.property("templateEngine"), Some(json!("braces")));
    }

    #[tokio::test]
    async fn fetches_relative_templates_from_the_template_url() {
        let transport = MockTransport::new();
        transport.respond_with(Response::ok_with("rendering is {{status}}"));
        let client = HttpClient::new(Arc::new(transport.clone()), "http://host");
        let module = TemplatesModule::new(Arc::new(Braces));

        let rendered = module
            .get_template(&client, "testTemplate.tpl", &json!({"status": "working"}))
            .await
            .unwrap();

        assert_eq!(rendered, "rendering is working");
        assert_eq!(
            transport.requests()[0].url,
            "http://host/templates/testTemplate.tpl"
        );
    }
}
