use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The API server rejected a write because the object already exists or
    /// changed since it was read. Retried by the caller.
    #[error("Conflict writing {0}")]
    Conflict(String),

    #[error("Invalid Keycloak configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Kubernetes error: {0}")]
    KubernetesError(#[from] kube::Error),
}

impl CoreError {
    /// Map a failed write, turning HTTP 409 into [`CoreError::Conflict`]
    pub fn from_write(err: kube::Error, target: impl std::fmt::Display) -> Self {
        match err {
            kube::Error::Api(ref response) if response.code == 409 => {
                CoreError::Conflict(format!("{}: {}", target, response.message))
            }
            other => CoreError::KubernetesError(other),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::error::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} happened", reason),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_conflict_is_mapped() {
        let err = CoreError::from_write(api_error(409, "AlreadyExists"), "ns/kc-service");
        assert!(err.is_conflict());
        assert_eq!(
            err.to_string(),
            "Conflict writing ns/kc-service: AlreadyExists happened"
        );
    }

    #[test]
    fn test_other_api_errors_pass_through() {
        let err = CoreError::from_write(api_error(403, "Forbidden"), "ns/kc-service");
        assert!(!err.is_conflict());
        assert!(matches!(err, CoreError::KubernetesError(_)));
    }
}
