use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use super::{ToolDefinition, validate_as};

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct AssessComplianceInput {
    #[schemars(description = "Organization profile from the discover_organization tool.")]
    organization_context: Option<serde_json::Value>,
    #[schemars(description = "Discovery results from the discover_ai_services tool.")]
    ai_services_context: Option<serde_json::Value>,
    #[schemars(description = "Specific compliance areas to focus on.")]
    focus_areas: Option<Vec<String>>,
    #[schemars(description = "Whether to generate documentation templates.")]
    #[serde(default = "default_generate_documentation")]
    generate_documentation: bool,
}

fn default_generate_documentation() -> bool {
    true
}

pub(crate) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "assess_compliance",
        description: "Assess compliance against the regulation and produce a scored report: gap \
                      analysis, prioritized recommendations, and draft documentation templates in \
                      markdown.",
        input_schema: serde_json::to_value(schema_for!(AssessComplianceInput)).unwrap_or_default(),
        validate: validate_as::<AssessComplianceInput>,
    }
}
