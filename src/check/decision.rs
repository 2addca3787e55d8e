//! Kick / escalation policy over an aggregated cohort.
//!
//! Pure: everything the decision depends on is passed in, including a roster
//! snapshot taken at decision time.

use super::cohort::Cohort;
use super::reputation::ReputationReport;
use super::store::IdentityRecord;
use crate::config::AltCheckConfig;
use crate::roster::PlayerSession;

/// What triggered the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOrigin {
    /// Operator command from chat or the messaging channel.
    Command,
    /// A player just connected; carries their identity.
    Connect(IdentityRecord),
}

impl CheckOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Connect(_) => "connect",
        }
    }
}

/// Action taken when a cohort member has cheating bans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Escalation {
    #[default]
    None,
    Kick,
    RolePing,
}

/// Policy switches read by [`decide`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AltPolicy {
    pub kick_if_alt_detected: bool,
    pub only_kick_online_alt: bool,
    pub enable_cheater_alt_kicks: bool,
    pub role_ping_for_cheater_alt: bool,
}

impl From<&AltCheckConfig> for AltPolicy {
    fn from(config: &AltCheckConfig) -> Self {
        Self {
            kick_if_alt_detected: config.kick_if_alt_detected,
            only_kick_online_alt: config.only_kick_online_alt,
            enable_cheater_alt_kicks: config.enable_cheater_alt_kicks,
            role_ping_for_cheater_alt: config.role_ping_for_cheater_alt,
        }
    }
}

/// Outcome of one alt check.
#[derive(Debug, Clone)]
pub struct Decision {
    pub cohort: Cohort,
    /// Index-aligned with `cohort.members`.
    pub reports: Vec<ReputationReport>,
    /// Live session of each member at decision time, index-aligned.
    pub online: Vec<Option<PlayerSession>>,
    pub should_kick: bool,
    pub kick_target: Option<IdentityRecord>,
    pub cheater_detected: bool,
    pub cheater_member: Option<IdentityRecord>,
    pub escalation: Escalation,
}

impl Decision {
    /// Members with their report and live session, in cohort order.
    pub fn members(
        &self,
    ) -> impl Iterator<Item = (&IdentityRecord, &ReputationReport, Option<&PlayerSession>)> {
        self.cohort
            .members
            .iter()
            .zip(&self.reports)
            .zip(&self.online)
            .map(|((member, report), session)| (member, report, session.as_ref()))
    }
}

/// Apply policy to a cohort and its reports.
pub fn decide(
    cohort: Cohort,
    reports: Vec<ReputationReport>,
    roster: &[PlayerSession],
    origin: &CheckOrigin,
    policy: &AltPolicy,
) -> Decision {
    let cheater_detected = super::reputation::cheater_detected(&reports);
    let online: Vec<Option<PlayerSession>> = cohort
        .members
        .iter()
        .map(|m| live_session(m, roster).cloned())
        .collect();

    if !cohort.has_alts() {
        return Decision {
            cohort,
            reports,
            online,
            should_kick: false,
            kick_target: None,
            cheater_detected,
            cheater_member: None,
            escalation: Escalation::None,
        };
    }

    let mut should_kick = false;
    let mut kick_target = None;
    if let CheckOrigin::Connect(connecting) = origin
        && policy.kick_if_alt_detected
    {
        let online_alt = cohort
            .members
            .iter()
            .zip(&online)
            .any(|(m, session)| session.is_some() && !m.same_platform_id(connecting));

        if online_alt || !policy.only_kick_online_alt {
            should_kick = true;
            kick_target = Some(connecting.clone());
        }
    }

    let cheater_member = cohort
        .members
        .iter()
        .zip(&reports)
        .find(|(_, report)| report.is_cheater())
        .map(|(member, _)| member.clone());

    let escalation = match cheater_member {
        None => Escalation::None,
        Some(_) if policy.enable_cheater_alt_kicks => Escalation::Kick,
        Some(_) if policy.role_ping_for_cheater_alt => Escalation::RolePing,
        Some(_) => Escalation::None,
    };

    Decision {
        cohort,
        reports,
        online,
        should_kick,
        kick_target,
        cheater_detected,
        cheater_member,
        escalation,
    }
}

fn live_session<'a>(member: &IdentityRecord, roster: &'a [PlayerSession]) -> Option<&'a PlayerSession> {
    let id = member.platform_id.as_deref()?;
    roster.iter().find(|s| s.platform_id == id)
}
