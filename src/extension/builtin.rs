//! Static registration table of the implementations shipped with the runtime.

use super::capability::CapabilityType;
use super::registry::{CandidateProbe, DiscoveryError, ExtensionCandidate};

pub const PULL_JOB_DELEGATE: &str = "PullJobDelegate";
pub const PUSH_JOB_DELEGATE: &str = "PushJobDelegate";
pub const LIVE_SYNC_JOB_DELEGATE: &str = "LiveSyncJobDelegate";
pub const MACRO_JOB_DELEGATE: &str = "MacroJobDelegate";
pub const GROUP_MEMBER_PROVISION_JOB_DELEGATE: &str = "GroupMemberProvisionTaskJobDelegate";
pub const EXPRESSION_ITEM_TRANSFORMER: &str = "ExpressionItemTransformer";

pub const EXPIRED_TOKEN_CLEANUP_JOB_DELEGATE: &str = "ExpiredAccessTokenCleanup";
pub const DEFAULT_PASSWORD_RULE: &str = "DefaultPasswordRule";
pub const DEFAULT_ACCOUNT_RULE: &str = "DefaultAccountRule";
pub const DEFAULT_INBOUND_CORRELATION_RULE: &str = "DefaultInboundCorrelationRule";
pub const DEFAULT_PUSH_CORRELATION_RULE: &str = "DefaultPushCorrelationRule";
pub const SAMPLE_REPORT_DELEGATE: &str = "SampleReportJobDelegate";
pub const DEFAULT_PROVISION_SORTER: &str = "DefaultProvisionSorter";

pub const DEFAULT_PASSWORD_RULE_CONF: &str = "DefaultPasswordRuleConf";
pub const DEFAULT_ACCOUNT_RULE_CONF: &str = "DefaultAccountRuleConf";
pub const DEFAULT_INBOUND_CORRELATION_RULE_CONF: &str = "DefaultInboundCorrelationRuleConf";
pub const DEFAULT_PUSH_CORRELATION_RULE_CONF: &str = "DefaultPushCorrelationRuleConf";
pub const SAMPLE_REPORT_CONF: &str = "SampleReportConf";

type Probe = std::result::Result<ExtensionCandidate, DiscoveryError>;

fn abstract_provisioning_delegate() -> Probe {
    Ok(ExtensionCandidate::abstract_base(
        "AbstractProvisioningJobDelegate",
        &[CapabilityType::TaskJobDelegate],
    ))
}

fn pull_job_delegate() -> Probe {
    Ok(ExtensionCandidate::concrete(
        PULL_JOB_DELEGATE,
        &[CapabilityType::TaskJobDelegate],
    ))
}

fn push_job_delegate() -> Probe {
    Ok(ExtensionCandidate::concrete(
        PUSH_JOB_DELEGATE,
        &[CapabilityType::TaskJobDelegate],
    ))
}

fn live_sync_job_delegate() -> Probe {
    Ok(ExtensionCandidate::concrete(
        LIVE_SYNC_JOB_DELEGATE,
        &[CapabilityType::TaskJobDelegate],
    ))
}

fn macro_job_delegate() -> Probe {
    Ok(ExtensionCandidate::concrete(
        MACRO_JOB_DELEGATE,
        &[CapabilityType::TaskJobDelegate],
    ))
}

fn group_member_provision_delegate() -> Probe {
    Ok(ExtensionCandidate::concrete(
        GROUP_MEMBER_PROVISION_JOB_DELEGATE,
        &[CapabilityType::TaskJobDelegate],
    ))
}

fn expired_token_cleanup() -> Probe {
    Ok(ExtensionCandidate::concrete(
        EXPIRED_TOKEN_CLEANUP_JOB_DELEGATE,
        &[CapabilityType::TaskJobDelegate],
    ))
}

fn sample_report_delegate() -> Probe {
    Ok(
        ExtensionCandidate::concrete(SAMPLE_REPORT_DELEGATE, &[CapabilityType::ReportDelegate])
            .configured_by(SAMPLE_REPORT_CONF),
    )
}

fn default_password_rule() -> Probe {
    Ok(
        ExtensionCandidate::concrete(DEFAULT_PASSWORD_RULE, &[CapabilityType::PasswordRule])
            .configured_by(DEFAULT_PASSWORD_RULE_CONF),
    )
}

fn default_account_rule() -> Probe {
    Ok(
        ExtensionCandidate::concrete(DEFAULT_ACCOUNT_RULE, &[CapabilityType::AccountRule])
            .configured_by(DEFAULT_ACCOUNT_RULE_CONF),
    )
}

fn default_inbound_correlation_rule() -> Probe {
    Ok(ExtensionCandidate::concrete(
        DEFAULT_INBOUND_CORRELATION_RULE,
        &[CapabilityType::InboundCorrelationRule],
    )
    .configured_by(DEFAULT_INBOUND_CORRELATION_RULE_CONF))
}

fn default_push_correlation_rule() -> Probe {
    Ok(ExtensionCandidate::concrete(
        DEFAULT_PUSH_CORRELATION_RULE,
        &[CapabilityType::PushCorrelationRule],
    )
    .configured_by(DEFAULT_PUSH_CORRELATION_RULE_CONF))
}

fn expression_item_transformer() -> Probe {
    Ok(ExtensionCandidate::concrete(
        EXPRESSION_ITEM_TRANSFORMER,
        &[CapabilityType::ItemTransformer],
    ))
}

fn default_provision_sorter() -> Probe {
    Ok(ExtensionCandidate::concrete(
        DEFAULT_PROVISION_SORTER,
        &[CapabilityType::ProvisionSorter],
    ))
}

fn default_recipients_provider() -> Probe {
    Ok(ExtensionCandidate::concrete(
        "StaticRecipientsProvider",
        &[CapabilityType::RecipientsProvider],
    ))
}

fn log_audit_appender() -> Probe {
    Ok(ExtensionCandidate::concrete(
        "TracingAuditAppender",
        &[CapabilityType::AuditAppender],
    ))
}

pub static BUILTIN_EXTENSIONS: &[CandidateProbe] = &[
    abstract_provisioning_delegate,
    pull_job_delegate,
    push_job_delegate,
    live_sync_job_delegate,
    macro_job_delegate,
    group_member_provision_delegate,
    expired_token_cleanup,
    sample_report_delegate,
    default_password_rule,
    default_account_rule,
    default_inbound_correlation_rule,
    default_push_correlation_rule,
    expression_item_transformer,
    default_provision_sorter,
    default_recipients_provider,
    log_audit_appender,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionRegistry;

    #[test]
    fn test_builtin_table_discovers_generic_delegates_only() {
        let registry = ExtensionRegistry::discover(BUILTIN_EXTENSIONS);

        let delegates = registry.lookup(CapabilityType::TaskJobDelegate);
        assert_eq!(delegates.len(), 1);
        assert!(delegates.contains(EXPIRED_TOKEN_CLEANUP_JOB_DELEGATE));
        assert!(registry
            .lookup(CapabilityType::ItemTransformer)
            .is_empty());
    }

    #[test]
    fn test_builtin_configurations_resolve() {
        let registry = ExtensionRegistry::discover(BUILTIN_EXTENSIONS);

        assert_eq!(
            registry.resolve_for(DEFAULT_PASSWORD_RULE_CONF),
            Some(DEFAULT_PASSWORD_RULE)
        );
        assert_eq!(
            registry.resolve_for(SAMPLE_REPORT_CONF),
            Some(SAMPLE_REPORT_DELEGATE)
        );
    }
}
