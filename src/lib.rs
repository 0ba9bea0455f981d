pub mod backend;
pub mod batch;
pub mod companies;
pub mod configuration;
pub mod graphql;
pub mod migration;
pub mod push;
pub mod test_registrants;
pub mod types;
