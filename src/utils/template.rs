use anyhow::{Context, Result};
use handlebars::Handlebars;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    env_var: Regex,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // A misspelled settings key must not render as a blank value
        handlebars.set_strict_mode(true);
        // Kickstarts are not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        // Only ${env.VAR}; plain ${VAR} belongs to the shell sections
        let env_var = Regex::new(r"\$\{env\.([A-Za-z_][A-Za-z0-9_]*)\}")
            .context("Failed to compile template variable pattern")?;

        Ok(Self {
            handlebars,
            env_var,
        })
    }

    pub fn render_string(
        &self,
        template: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<String> {
        debug!("Rendering template ({} bytes)", template.len());

        let handlebars_template = self.convert_env_vars_to_handlebars(template);

        self.handlebars
            .render_template(&handlebars_template, variables)
            .context("Failed to render template")
    }

    fn convert_env_vars_to_handlebars(&self, template: &str) -> String {
        self.env_var.replace_all(template, "{{$1}}").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_handlebars_and_env_syntax() {
        let engine = TemplateEngine::new().unwrap();
        let out = engine
            .render_string(
                "network --hostname={{sah_hostname}}\nrootpw {{root_password}}\n# ${env.domain}",
                &vars(&[
                    ("sah_hostname", "csah.acme.local"),
                    ("root_password", "s3cr&t<"),
                    ("domain", "acme.local"),
                ]),
            )
            .unwrap();
        assert_eq!(
            out,
            "network --hostname=csah.acme.local\nrootpw s3cr&t<\n# acme.local"
        );
    }

    #[test]
    fn test_shell_variables_pass_through() {
        let engine = TemplateEngine::new().unwrap();
        let template = "\
network --hostname={{sah_hostname}}
%post
for nic in ${NICS}; do
  echo \"${nic}\" >> /root/nics-${HOSTNAME}.txt
done
%end
";
        let out = engine
            .render_string(template, &vars(&[("sah_hostname", "csah.acme.local")]))
            .unwrap();
        assert!(out.starts_with("network --hostname=csah.acme.local\n"));
        assert!(out.contains("for nic in ${NICS}; do\n"));
        assert!(out.contains("echo \"${nic}\" >> /root/nics-${HOSTNAME}.txt\n"));
    }

    #[test]
    fn test_undefined_variable_is_an_error() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine
            .render_string("timezone {{timezone}} --utc", &BTreeMap::new())
            .is_err());
        assert!(engine
            .render_string("search ${env.domain}", &BTreeMap::new())
            .is_err());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render_string("{{#if}}", &BTreeMap::new()).is_err());
    }
}
