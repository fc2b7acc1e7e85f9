mod assess_compliance;
mod discover_ai_services;
mod discover_organization;

type ValidateFn = fn(&serde_json::Value) -> Result<(), String>;

/// A compliance tool the gateway exposes. Invocation is proxied to the
/// upstream API; only the schema and argument validation live here.
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
    pub validate: ValidateFn,
}

pub fn all_tools() -> Vec<ToolDefinition> {
    vec![
        discover_organization::definition(),
        discover_ai_services::definition(),
        assess_compliance::definition(),
    ]
}

fn validate_as<T: serde::de::DeserializeOwned>(input: &serde_json::Value) -> Result<(), String> {
    serde_json::from_value::<T>(input.clone())
        .map(|_| ())
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::all_tools;
    use serde_json::json;

    #[test]
    fn every_tool_has_a_schema_and_a_name() {
        let tools = all_tools();
        assert_eq!(tools.len(), 3);
        for tool in &tools {
            assert!(!tool.name.is_empty());
            assert!(!tool.description.is_empty());
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        }
    }

    #[test]
    fn discover_organization_requires_a_name() {
        let tools = all_tools();
        let tool = tools
            .iter()
            .find(|t| t.name == "discover_organization")
            .unwrap();

        assert!((tool.validate)(&json!({"organizationName": "Acme"})).is_ok());
        assert!((tool.validate)(&json!({"domain": "acme.com"})).is_err());
    }

    #[test]
    fn discover_ai_services_accepts_empty_arguments() {
        let tools = all_tools();
        let tool = tools
            .iter()
            .find(|t| t.name == "discover_ai_services")
            .unwrap();

        assert!((tool.validate)(&json!({})).is_ok());
        assert!(
            (tool.validate)(&json!({
                "systemNames": ["Watson", "Copilot"],
                "scope": "high-risk-only"
            }))
            .is_ok()
        );
        assert!((tool.validate)(&json!({"scope": "everything"})).is_err());
    }

    #[test]
    fn assess_compliance_defaults_documentation_on() {
        let tools = all_tools();
        let tool = tools
            .iter()
            .find(|t| t.name == "assess_compliance")
            .unwrap();

        assert!((tool.validate)(&json!({})).is_ok());
        assert!((tool.validate)(&json!({"generateDocumentation": false})).is_ok());
        assert!((tool.validate)(&json!({"focusAreas": "not-a-list"})).is_err());
    }
}
