//! Prints the Keycloak CustomResourceDefinition as YAML

use keycloak_api::Keycloak;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&Keycloak::crd())?);
    Ok(())
}
