//! Shared schema for the runnable examples.
//!
//! Builds a small `demo.v1` package in code, the way a host tool would after
//! reading its own descriptors.

use protoflag_core::{
    DURATION_MESSAGE, EnumSpec, FieldKind, FieldSpec, MessageSpec, SchemaSet, TIMESTAMP_MESSAGE,
};

/// Root message of [`deploy_schema`].
pub const DEPLOY_REQUEST: &str = "demo.v1.DeployRequest";

/// A deploy request with one level of repeated targets, each carrying an
/// optional health check.
pub fn deploy_schema() -> SchemaSet {
    SchemaSet::new()
        .with_message(
            MessageSpec::new(DEPLOY_REQUEST)
                .with_description("Roll out a service to one or more targets")
                .with_field(
                    FieldSpec::new("service", FieldKind::String)
                        .required()
                        .with_description("Service name"),
                )
                .with_field(FieldSpec::new("dryRun", FieldKind::Bool))
                .with_field(
                    FieldSpec::new("notBefore", FieldKind::Message(TIMESTAMP_MESSAGE.into()))
                        .with_description("Earliest start time"),
                )
                .with_field(
                    FieldSpec::new("timeout", FieldKind::Message(DURATION_MESSAGE.into()))
                        .with_default("5m"),
                )
                .with_field(
                    FieldSpec::new("target", FieldKind::Message("demo.v1.Target".into()))
                        .repeated()
                        .required(),
                ),
        )
        .with_message(
            MessageSpec::new("demo.v1.Target")
                .with_field(FieldSpec::new("region", FieldKind::String).required())
                .with_field(FieldSpec::new("tier", FieldKind::Enum("demo.v1.Tier".into())))
                .with_field(FieldSpec::new("zones", FieldKind::String).repeated())
                .with_field(FieldSpec::new("check", FieldKind::Message("demo.v1.HealthCheck".into()))),
        )
        .with_message(
            MessageSpec::new("demo.v1.HealthCheck")
                .with_field(FieldSpec::new("path", FieldKind::String).with_default("/healthz"))
                .with_field(FieldSpec::new("interval", FieldKind::Duration).with_default("10s")),
        )
        .with_enum(
            EnumSpec::new("demo.v1.Tier")
                .with_value("TIER_UNSPECIFIED", 0)
                .with_value("TIER_CANARY", 1)
                .with_value("TIER_PRODUCTION", 2),
        )
}
