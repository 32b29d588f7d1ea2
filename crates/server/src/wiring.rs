use emission_zk_prover::{ProofService, ServiceConfig};

pub const NO_BACKEND: &str = "no proving backend or proof network configured, rerun with --dev \
                              to serve with the in-process collaborators";

/// The collaborators a [`ProofService`] is built with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Wiring {
    /// Nothing to prove with, the service refuses to start.
    #[default]
    Unconfigured,
    /// In-process collaborators serving storage slots with the given values. Responses are not
    /// backed by any chain or proof network.
    Dev(Vec<u64>),
}

/// Build the service for `wiring`.
#[cfg_attr(not(feature = "dev"), allow(unused_variables))]
pub fn build_service(config: ServiceConfig, wiring: Wiring) -> eyre::Result<ProofService> {
    match wiring {
        Wiring::Unconfigured => eyre::bail!(NO_BACKEND),
        #[cfg(feature = "dev")]
        Wiring::Dev(values) => {
            tracing::warn!(
                slots = values.len(),
                "serving with in-process collaborators, no proof reaches a chain"
            );
            Ok(emission_zk_integration::DevServiceBuilder::new(config)
                .slot_values(&values)
                .build()
                .service)
        }
        #[cfg(not(feature = "dev"))]
        Wiring::Dev(_) => eyre::bail!("in-process collaborators require the `dev` feature"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_to_start_without_collaborators() {
        let err = build_service(ServiceConfig::default(), Wiring::Unconfigured)
            .err()
            .expect("unconfigured service");
        assert_eq!(err.to_string(), NO_BACKEND);
    }

    #[cfg(feature = "dev")]
    #[test]
    fn dev_wiring_builds_a_service() {
        let service = build_service(ServiceConfig::default(), Wiring::Dev(vec![10_000])).unwrap();
        assert_eq!(service.config().estimated_emission, 10_000);
    }

    #[cfg(not(feature = "dev"))]
    #[test]
    fn dev_wiring_needs_the_feature() {
        let err = build_service(ServiceConfig::default(), Wiring::Dev(vec![10_000]))
            .err()
            .expect("feature disabled");
        assert!(err.to_string().contains("`dev` feature"));
    }
}
