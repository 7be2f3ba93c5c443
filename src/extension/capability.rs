use serde::{Deserialize, Serialize};

/// Extension point kinds an implementation can be discovered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityType {
    TaskJobDelegate,
    ReportDelegate,
    RecipientsProvider,
    AuditAppender,
    AccountRule,
    PasswordRule,
    ItemTransformer,
    LogicActions,
    MacroActions,
    AttrValueValidator,
    DropdownValueProvider,
    Command,
    ReconFilterBuilder,
    PropagationActions,
    InboundActions,
    PushActions,
    InboundCorrelationRule,
    PushCorrelationRule,
    ProvisionSorter,
    LiveSyncDeltaMapper,
}

impl CapabilityType {
    pub const ALL: [CapabilityType; 20] = [
        Self::TaskJobDelegate,
        Self::ReportDelegate,
        Self::RecipientsProvider,
        Self::AuditAppender,
        Self::AccountRule,
        Self::PasswordRule,
        Self::ItemTransformer,
        Self::LogicActions,
        Self::MacroActions,
        Self::AttrValueValidator,
        Self::DropdownValueProvider,
        Self::Command,
        Self::ReconFilterBuilder,
        Self::PropagationActions,
        Self::InboundActions,
        Self::PushActions,
        Self::InboundCorrelationRule,
        Self::PushCorrelationRule,
        Self::ProvisionSorter,
        Self::LiveSyncDeltaMapper,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskJobDelegate => "TASKJOB_DELEGATE",
            Self::ReportDelegate => "REPORT_DELEGATE",
            Self::RecipientsProvider => "RECIPIENTS_PROVIDER",
            Self::AuditAppender => "AUDIT_APPENDER",
            Self::AccountRule => "ACCOUNT_RULE",
            Self::PasswordRule => "PASSWORD_RULE",
            Self::ItemTransformer => "ITEM_TRANSFORMER",
            Self::LogicActions => "LOGIC_ACTIONS",
            Self::MacroActions => "MACRO_ACTIONS",
            Self::AttrValueValidator => "ATTR_VALUE_VALIDATOR",
            Self::DropdownValueProvider => "DROPDOWN_VALUE_PROVIDER",
            Self::Command => "COMMAND",
            Self::ReconFilterBuilder => "RECON_FILTER_BUILDER",
            Self::PropagationActions => "PROPAGATION_ACTIONS",
            Self::InboundActions => "INBOUND_ACTIONS",
            Self::PushActions => "PUSH_ACTIONS",
            Self::InboundCorrelationRule => "INBOUND_CORRELATION_RULE",
            Self::PushCorrelationRule => "PUSH_CORRELATION_RULE",
            Self::ProvisionSorter => "PROVISION_SORTER",
            Self::LiveSyncDeltaMapper => "LIVE_SYNC_DELTA_MAPPER",
        }
    }

    /// Whether implementations must declare the configuration type they handle.
    pub fn requires_configuration(self) -> bool {
        matches!(
            self,
            Self::ReportDelegate
                | Self::AccountRule
                | Self::PasswordRule
                | Self::InboundCorrelationRule
                | Self::PushCorrelationRule
        )
    }

    /// Implementations that have a dedicated code path and must stay out of the
    /// generic bucket for this capability.
    pub fn excluded_specializations(self) -> &'static [&'static str] {
        use super::builtin;

        match self {
            Self::TaskJobDelegate => &[
                builtin::PULL_JOB_DELEGATE,
                builtin::PUSH_JOB_DELEGATE,
                builtin::LIVE_SYNC_JOB_DELEGATE,
                builtin::MACRO_JOB_DELEGATE,
                builtin::GROUP_MEMBER_PROVISION_JOB_DELEGATE,
            ],
            Self::ItemTransformer => &[builtin::EXPRESSION_ITEM_TRANSFORMER],
            _ => &[],
        }
    }
}

impl std::str::FromStr for CapabilityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|capability| capability.as_str() == normalized)
            .ok_or_else(|| format!("Unknown capability type: {}", s))
    }
}

impl std::fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
