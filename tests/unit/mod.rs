// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for memory-guard.
//!
//! These tests exercise the public API of each stage in isolation, without
//! any HTTP layer.

#[path = "../common/fixtures.rs"]
mod fixtures;

mod decoder_tests {
    use kube::core::GroupVersionKind;
    use memory_guard::admission::schema::{admission_review_schema, deployment_schema};
    use memory_guard::admission::{AdmissionError, Decoder, ReviewEnvelope, Scheme};

    use crate::fixtures::{ContainerFixture, ReviewBuilder};

    fn decoder() -> Decoder {
        Decoder::new(Scheme::admission())
    }

    #[test]
    fn test_decode_envelope_returns_identity() {
        let body = ReviewBuilder::new("uid-1").to_bytes();
        let (envelope, identity): (ReviewEnvelope, _) =
            decoder().decode(&body, &admission_review_schema()).unwrap();
        assert_eq!(identity, admission_review_schema());
        assert_eq!(envelope.request.unwrap().uid, "uid-1");
    }

    #[test]
    fn test_outer_kind_mismatch_reports_both_triples() {
        let body = ReviewBuilder::new("uid-1").kind("Pod").to_bytes();
        let err = decoder()
            .decode::<ReviewEnvelope>(&body, &admission_review_schema())
            .unwrap_err();

        match &err {
            AdmissionError::SchemaMismatch { expected, actual } => {
                assert_eq!(*expected, admission_review_schema());
                assert_eq!(
                    *actual,
                    GroupVersionKind::gvk("admission.k8s.io", "v1", "Pod")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("kind: AdmissionReview"));
        assert!(message.contains("kind: Pod"));
    }

    #[test]
    fn test_embedded_object_uses_same_primitive() {
        let body = ReviewBuilder::new("uid-1")
            .containers(&[ContainerFixture::complete("app")])
            .to_bytes();
        let (envelope, _): (ReviewEnvelope, _) =
            decoder().decode(&body, &admission_review_schema()).unwrap();
        let request = envelope.request.unwrap();

        let (deployment, identity): (k8s_openapi::api::apps::v1::Deployment, _) = decoder()
            .decode(request.object_bytes().unwrap(), &deployment_schema())
            .unwrap();
        assert_eq!(identity, deployment_schema());
        assert_eq!(deployment.metadata.name.as_deref(), Some("web"));
    }

    #[test]
    fn test_empty_scheme_rejects_everything() {
        let body = ReviewBuilder::new("uid-1").to_bytes();
        let err = Decoder::new(Scheme::new())
            .decode::<ReviewEnvelope>(&body, &admission_review_schema())
            .unwrap_err();
        assert!(matches!(err, AdmissionError::Decode { .. }));
    }
}

mod policy_tests {
    use memory_guard::webhooks::policies::{Verdict, validate_all};
    use memory_guard::workload::{ContainerSpec, Workload};

    #[test]
    fn test_scenario_second_container_without_resources() {
        let workload = Workload::new(vec![
            ContainerSpec::new("a")
                .request("memory", "1Gi")
                .limit("memory", "1Gi"),
            ContainerSpec::new("b"),
        ]);
        assert_eq!(
            validate_all(&workload),
            Verdict::denied("Memory request not specified for container b")
        );
    }

    #[test]
    fn test_scenario_missing_limit() {
        let workload = Workload::new(vec![ContainerSpec::new("a").request("memory", "1Gi")]);
        assert_eq!(
            validate_all(&workload),
            Verdict::denied("Memory limit not specified for container a")
        );
    }

    #[test]
    fn test_scenario_fully_specified() {
        let workload = Workload::new(vec![
            ContainerSpec::new("a")
                .request("memory", "256Mi")
                .limit("memory", "512Mi"),
        ]);
        assert_eq!(validate_all(&workload), Verdict::Allowed);
    }

    #[test]
    fn test_no_containers_allowed() {
        assert!(validate_all(&Workload::default()).is_allowed());
    }
}

mod handler_tests {
    use memory_guard::AdmissionHandler;
    use memory_guard::admission::{Decoder, Scheme, Stage};
    use memory_guard::webhooks::Verdict;
    use serde_json::Value;

    use crate::fixtures::{ContainerFixture, ReviewBuilder};

    fn handler() -> AdmissionHandler {
        AdmissionHandler::new(Decoder::new(Scheme::admission()))
    }

    #[test]
    fn test_uid_round_trips_on_deny() {
        let uid = "b4a0c1f2-0000-4c3e-9d3f-7f1e2a3b4c5d";
        let body = ReviewBuilder::new(uid)
            .containers(&[ContainerFixture::new("app")])
            .to_bytes();

        let reviewed = handler().review(&body).unwrap();
        assert!(!reviewed.verdict.is_allowed());
        let value: Value = serde_json::from_slice(&reviewed.body).unwrap();
        assert_eq!(value["response"]["uid"], uid);
    }

    #[test]
    fn test_response_envelope_echoes_inbound_identity() {
        let reviewed = handler()
            .review(&ReviewBuilder::new("uid-1").to_bytes())
            .unwrap();
        let value: Value = serde_json::from_slice(&reviewed.body).unwrap();
        assert_eq!(value["apiVersion"], "admission.k8s.io/v1");
        assert_eq!(value["kind"], "AdmissionReview");
        assert_eq!(reviewed.verdict, Verdict::Allowed);
    }

    #[test]
    fn test_failure_stages() {
        let cases = [
            (b"{".to_vec(), Stage::DecodeEnvelope),
            (
                ReviewBuilder::new("u").kind("Pod").to_bytes(),
                Stage::DecodeEnvelope,
            ),
            (
                ReviewBuilder::new("u").without_request().to_bytes(),
                Stage::CheckRequestPresent,
            ),
            (
                ReviewBuilder::new("u").resource("", "v1", "pods").to_bytes(),
                Stage::CheckResourceKind,
            ),
            (
                ReviewBuilder::new("u").without_object().to_bytes(),
                Stage::DecodeWorkload,
            ),
        ];

        for (body, stage) in cases {
            let failure = handler().review(&body).unwrap_err();
            assert_eq!(failure.stage, stage, "{failure}");
        }
    }
}

mod config_tests {
    use memory_guard::WebhookConfig;

    #[test]
    fn test_default_paths() {
        let config = WebhookConfig::default();
        assert_eq!(config.port, 7443);
        assert!(config.cert_path.ends_with("tls.crt"));
        assert!(config.key_path.ends_with("tls.key"));
    }
}
