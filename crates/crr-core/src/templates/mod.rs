//! Template rendering for config generation
//!
//! Uses Tera to generate a commented crr.yaml for `crr config init`.

mod context;

pub use context::ConfigInitContext;

use tera::Tera;
use tracing::debug;

use crate::error::{Error, Result};

/// Template registry for config file generation
pub struct ConfigTemplateRegistry {
    tera: Tera,
}

impl ConfigTemplateRegistry {
    /// Create a new template registry with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("crr.yaml", include_str!("crr.yaml.tera"))
            .map_err(|e| Error::Template(e.to_string()))?;
        Ok(Self { tera })
    }

    /// Render the crr.yaml template with the given context
    pub fn render_config(&self, context: &ConfigInitContext) -> Result<String> {
        debug!(
            "Rendering crr.yaml for {} -> {}",
            context.source_region, context.target_region
        );
        let tera_context = context.to_tera_context()?;
        self.tera
            .render("crr.yaml", &tera_context)
            .map_err(|e| Error::Template(e.to_string()))
    }
}

/// Render a crr.yaml from the given context
pub fn generate_config(context: &ConfigInitContext) -> Result<String> {
    ConfigTemplateRegistry::new()?.render_config(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HierarchicalConfigLoader;
    use crate::schema::{SchemaValidator, CONFIG_SCHEMA};
    use crate::types::CrrConfigFile;

    fn default_context() -> ConfigInitContext {
        ConfigInitContext::from_config(&HierarchicalConfigLoader::embedded_defaults().unwrap())
    }

    #[test]
    fn test_rendered_config_passes_schema() {
        let rendered = generate_config(&default_context()).unwrap();
        SchemaValidator::global()
            .unwrap()
            .validate_yaml(&rendered, CONFIG_SCHEMA)
            .unwrap();
    }

    #[test]
    fn test_rendered_config_round_trips_to_defaults() {
        let rendered = generate_config(&default_context()).unwrap();
        let parsed: CrrConfigFile = serde_yaml_ng::from_str(&rendered).unwrap();
        assert_eq!(parsed, HierarchicalConfigLoader::embedded_defaults().unwrap());
    }

    #[test]
    fn test_default_lookup_is_commented_out() {
        let rendered = generate_config(&default_context()).unwrap();
        assert!(rendered.contains("# lookup:"));
    }

    #[test]
    fn test_custom_values_are_rendered() {
        let mut context = default_context()
            .with_account("210987654321")
            .with_regions("us-west-2", "us-east-1");
        context.lookup_timeout_secs = 60;

        let rendered = generate_config(&context).unwrap();
        let parsed: CrrConfigFile = serde_yaml_ng::from_str(&rendered).unwrap();
        assert_eq!(parsed.account, "210987654321");
        assert_eq!(parsed.target.region, "us-west-2");
        assert_eq!(parsed.source.region, "us-east-1");
        assert_eq!(parsed.lookup.timeout_secs, 60);
    }
}
