use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use super::{ToolDefinition, validate_as};

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
enum DiscoveryScope {
    All,
    HighRiskOnly,
    ProductionOnly,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct DiscoverAiServicesInput {
    #[schemars(description = "Organization profile from the discover_organization tool.")]
    organization_context: Option<serde_json::Value>,
    #[schemars(description = "Specific AI system names to discover.")]
    system_names: Option<Vec<String>>,
    #[schemars(description = "Scope of discovery; defaults to 'all'.")]
    scope: Option<DiscoveryScope>,
    #[schemars(description = "Additional context about the systems.")]
    context: Option<String>,
}

pub(crate) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "discover_ai_services",
        description: "Discover the AI systems an organization runs and classify each one by risk \
                      category (unacceptable, high, limited, minimal), including conformity \
                      assessment needs and documentation gaps.",
        input_schema: serde_json::to_value(schema_for!(DiscoverAiServicesInput))
            .unwrap_or_default(),
        validate: validate_as::<DiscoverAiServicesInput>,
    }
}
