//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check required settings are present before scheduling begins
//! - Detect appliance pairs that cannot form a valid topology
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic violation in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required scalar setting is missing or empty.
    #[error("required setting `{0}` is not set")]
    MissingRequired(&'static str),

    /// A required list setting has no entries.
    #[error("setting `{0}` must contain at least one entry")]
    EmptyList(&'static str),

    /// The appliance pair is not actually a pair.
    #[error("primary and secondary appliance names must differ")]
    IdenticalAppliances,
}

/// Validate the merged configuration, reporting every violation at once.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.appliances.primary.is_empty() {
        errors.push(ValidationError::MissingRequired("appliances.primary"));
    }
    if config.appliances.secondary.is_empty() {
        errors.push(ValidationError::MissingRequired("appliances.secondary"));
    }
    if !config.appliances.primary.is_empty()
        && config.appliances.primary == config.appliances.secondary
    {
        errors.push(ValidationError::IdenticalAppliances);
    }
    if config.appliances.subscription_id.is_empty() {
        errors.push(ValidationError::MissingRequired("appliances.subscription_id"));
    }
    if config.appliances.resource_groups.is_empty() {
        errors.push(ValidationError::EmptyList("appliances.resource_groups"));
    }
    if config.routes.tag_key.is_empty() {
        errors.push(ValidationError::MissingRequired("routes.tag_key"));
    }
    if config.routes.route_names.is_empty() {
        errors.push(ValidationError::EmptyList("routes.route_names"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ApplianceConfig, RouteSelectionConfig};

    fn valid_config() -> AppConfig {
        AppConfig {
            appliances: ApplianceConfig {
                primary: "nva-a".into(),
                secondary: "nva-b".into(),
                subscription_id: "sub-a".into(),
                resource_groups: vec!["rg-nva".into()],
            },
            routes: RouteSelectionConfig {
                tag_key: "nva-managed".into(),
                route_names: vec!["default".into()],
                subscriptions: vec![],
            },
            ..Default::default()
        }
    }

    #[test]
    fn accepts_complete_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn reports_every_missing_setting_in_one_pass() {
        let errors = validate_config(&AppConfig::default()).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingRequired("appliances.primary")));
        assert!(errors.contains(&ValidationError::MissingRequired("appliances.secondary")));
        assert!(errors.contains(&ValidationError::MissingRequired("appliances.subscription_id")));
        assert!(errors.contains(&ValidationError::EmptyList("appliances.resource_groups")));
        assert!(errors.contains(&ValidationError::MissingRequired("routes.tag_key")));
        assert!(errors.contains(&ValidationError::EmptyList("routes.route_names")));
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn rejects_identical_appliance_names() {
        let mut config = valid_config();
        config.appliances.secondary = config.appliances.primary.clone();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::IdenticalAppliances]);
    }
}
