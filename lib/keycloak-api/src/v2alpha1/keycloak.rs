use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Keycloak represents a Keycloak server deployment managed by the operator
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.keycloak.org",
    version = "v2alpha1",
    kind = "Keycloak",
    plural = "keycloaks",
    shortname = "kc",
    namespaced,
    derive = "Default",
    status = "KeycloakStatus",
    printcolumn = r#"{"name":"HasErrors","type":"string","jsonPath":".status.conditions[?(@.type==\"HasErrors\")].status"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakSpec {
    /// Number of Keycloak instances
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<i32>,

    /// Custom Keycloak image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// HTTP listener and TLS configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpSpec>,

    /// Hostname configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<HostnameSpec>,
}

/// HTTP listener configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpSpec {
    /// Enables the plain HTTP listener alongside HTTPS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_enabled: Option<bool>,

    /// Port used when TLS is not configured (defaults to 8080)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<i32>,

    /// Port used when TLS is configured (defaults to 8443)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_port: Option<i32>,

    /// Name of the Secret holding the TLS certificate and key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_secret: Option<String>,
}

/// Hostname configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostnameSpec {
    /// Public hostname of the Keycloak server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// Status of a Keycloak
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakStatus {
    /// Generation of the spec last processed by the operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Conditions describing the status
    #[serde(default)]
    pub conditions: Vec<KeycloakStatusCondition>,
}

/// Condition for Keycloak status
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakStatusCondition {
    /// Type of condition
    #[serde(rename = "type")]
    pub condition_type: String,

    /// Whether the condition holds; unset means unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the status flipped (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// Generation the condition was computed for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl Keycloak {
    /// TLS counts as configured when a non-empty `spec.http.tlsSecret` is set
    pub fn is_tls_configured(&self) -> bool {
        self.spec
            .http
            .as_ref()
            .and_then(|http| http.tls_secret.as_deref())
            .is_some_and(|secret| !secret.is_empty())
    }
}

impl KeycloakStatus {
    /// Look up a condition by type
    pub fn condition(&self, condition_type: &str) -> Option<&KeycloakStatusCondition> {
        self.conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }
}
