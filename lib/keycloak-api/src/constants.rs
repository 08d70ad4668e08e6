//! Naming, port and label constants for operator-managed resources

/// Suffix appended to the Keycloak name to form its Service name
pub const KEYCLOAK_SERVICE_SUFFIX: &str = "-service";

/// Port Keycloak answers plain HTTP on when `spec.http.httpPort` is unset
pub const KEYCLOAK_HTTP_PORT: i32 = 8080;

/// Port Keycloak answers HTTPS on when `spec.http.httpsPort` is unset
pub const KEYCLOAK_HTTPS_PORT: i32 = 8443;

/// Service port name used when TLS is not configured
pub const KEYCLOAK_HTTP_PORT_NAME: &str = "http";

/// Service port name used when TLS is configured
pub const KEYCLOAK_HTTPS_PORT_NAME: &str = "https";

/// Protocol of the Keycloak Service port
pub const KEYCLOAK_SERVICE_PROTOCOL: &str = "TCP";

/// Field manager recorded on every write the operator makes
pub const FIELD_MANAGER: &str = "keycloak-operator";

// Labels

/// Application label carried by every operator-managed resource
pub const APP_LABEL: &str = "app";

/// Value of [`APP_LABEL`]
pub const APP_LABEL_VALUE: &str = "keycloak";

/// Standard label for the tool managing the resource
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of [`MANAGED_BY_LABEL`]
pub const MANAGED_BY_VALUE: &str = "keycloak-operator";

/// Standard label naming the Keycloak instance a resource belongs to
pub const INSTANCE_LABEL: &str = "app.kubernetes.io/instance";

/// Label selector matching every resource this operator manages.
///
/// Shared by all Keycloak instances, so it cannot tell two instances apart.
pub const MANAGED_BY_SELECTOR: &str = "app.kubernetes.io/managed-by=keycloak-operator";

// Status conditions

/// Condition type reporting a failed reconciliation
pub const CONDITION_HAS_ERRORS: &str = "HasErrors";
