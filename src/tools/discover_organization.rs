use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use super::{ToolDefinition, validate_as};

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct DiscoverOrganizationInput {
    #[schemars(description = "Name of the organization to discover.")]
    organization_name: String,
    #[schemars(
        description = "Organization's domain (e.g. 'ibm.com'). Auto-discovered if not provided."
    )]
    domain: Option<String>,
    #[schemars(description = "Additional context about the organization.")]
    context: Option<String>,
}

pub(crate) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "discover_organization",
        description: "Research an organization and build its compliance profile: sector, size, \
                      headquarters, EU presence, AI maturity, and the regulatory deadlines that \
                      apply to it.",
        input_schema: serde_json::to_value(schema_for!(DiscoverOrganizationInput))
            .unwrap_or_default(),
        validate: validate_as::<DiscoverOrganizationInput>,
    }
}
