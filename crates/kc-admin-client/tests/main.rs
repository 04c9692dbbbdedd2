//! HTTP-level tests against a mocked Keycloak admin API.

mod common;
mod enrichment;
