//! Account slot table and bulk user reconciliation.

use super::Idrac8;
use crate::context::OperationContext;
use crate::driver::domain::{DriverError, UserConfig, UserFailure, UserReconciliation, UserRole};
use crate::driver::ports::DriverResult;
use crate::providers::status::OK;
use crate::transport::ports::{HttpBody, HttpRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const USERS: &str = "sysmgmt/2012/server/configgroup/iDRAC.Users";
/// Slot 1 holds the built-in anonymous account and is never allocated.
const RESERVED_SLOT: u8 = 1;

/// One account slot as the controller reports and accepts it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct UserSlot {
    #[serde(default)]
    pub(super) user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) password: Option<String>,
    #[serde(default)]
    pub(super) enable: String,
    #[serde(default)]
    pub(super) privilege: String,
    #[serde(default)]
    pub(super) ipmi_lan_privilege: String,
    #[serde(default)]
    pub(super) sol_enable: String,
}

impl UserSlot {
    /// Rewrites the slot for an enabled account.
    fn enable(&mut self, config: &UserConfig) {
        let (privilege, lan_privilege) = match config.role {
            UserRole::Admin => ("511", "Administrator"),
            UserRole::User => ("499", "Operator"),
        };
        config.name.clone_into(&mut self.user_name);
        self.password = Some(config.password.clone());
        "Enabled".clone_into(&mut self.enable);
        "Enabled".clone_into(&mut self.sol_enable);
        privilege.clone_into(&mut self.privilege);
        lan_privilege.clone_into(&mut self.ipmi_lan_privilege);
    }

    /// Rewrites the slot for a disabled account; the name is kept.
    fn disable(&mut self) {
        self.password = None;
        "Disabled".clone_into(&mut self.enable);
        "Disabled".clone_into(&mut self.sol_enable);
        "0".clone_into(&mut self.privilege);
        "No Access".clone_into(&mut self.ipmi_lan_privilege);
    }
}

/// Slot table keyed by slot number.
pub(super) type SlotTable = BTreeMap<u8, UserSlot>;

#[derive(Debug, Deserialize)]
struct UsersReply {
    #[serde(rename = "iDRAC.Users")]
    users: SlotTable,
}

/// Returns the slot holding `name`.
fn find_slot(table: &SlotTable, name: &str) -> Option<u8> {
    table
        .iter()
        .find(|(_, slot)| slot.user_name == name)
        .map(|(id, _)| *id)
}

/// Returns the lowest unused, non-reserved slot.
fn empty_slot(table: &SlotTable) -> Option<u8> {
    table
        .iter()
        .find(|(id, slot)| **id != RESERVED_SLOT && slot.user_name.is_empty())
        .map(|(id, _)| *id)
}

/// Planned change for one desired account.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum SlotChange {
    /// Write `slot` to slot `id`.
    Write { id: u8, slot: UserSlot },
    /// Desired state already holds; nothing to send.
    Unchanged,
}

/// Decides the write for `config` and reserves the slot in `table`.
pub(super) fn plan(table: &mut SlotTable, config: &UserConfig) -> DriverResult<SlotChange> {
    let existing = find_slot(table, &config.name);
    if !config.enable {
        let Some(id) = existing else {
            return Ok(SlotChange::Unchanged);
        };
        let mut slot = table.get(&id).cloned().unwrap_or_default();
        slot.disable();
        return Ok(SlotChange::Write { id, slot });
    }
    let id = existing.or_else(|| empty_slot(table)).ok_or_else(|| {
        DriverError::Protocol(format!("no free account slot for '{}'", config.name))
    })?;
    let reserved = table.entry(id).or_default();
    let mut slot = reserved.clone();
    slot.enable(config);
    config.name.clone_into(&mut reserved.user_name);
    Ok(SlotChange::Write { id, slot })
}

impl Idrac8 {
    pub(super) async fn user_slots(&self, ctx: &OperationContext) -> DriverResult<SlotTable> {
        let response = self.call(ctx, HttpRequest::get(USERS), OK).await?;
        let reply: UsersReply = response
            .json()
            .map_err(|err| DriverError::Protocol(format!("{USERS}: {err}")))?;
        Ok(reply.users)
    }

    async fn write_slot(&self, ctx: &OperationContext, id: u8, slot: &UserSlot) -> DriverResult<()> {
        let body = serde_json::json!({ "iDRAC.Users": slot });
        let endpoint = format!("{USERS}.{id}");
        self.call(ctx, HttpRequest::put(endpoint, HttpBody::Json(body)), OK)
            .await
            .map(drop)
    }

    /// Walks `users` once, writing each account and recording failures.
    pub(super) async fn reconcile_users(
        &self,
        ctx: &OperationContext,
        users: &[UserConfig],
    ) -> DriverResult<UserReconciliation> {
        for user in users {
            user.validate()?;
        }
        let mut table = self
            .user_slots(ctx)
            .await
            .map_err(|err| err.in_step("query users"))?;
        let mut report = UserReconciliation::default();
        for user in users {
            ctx.check()?;
            let applied = match plan(&mut table, user) {
                Ok(SlotChange::Write { id, slot }) => self.write_slot(ctx, id, &slot).await,
                Ok(SlotChange::Unchanged) => Ok(()),
                Err(err) => Err(err),
            };
            match applied {
                Ok(()) => {
                    debug!(user = %user.name, "user parameters applied");
                    report.applied.push(user.name.clone());
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(user = %user.name, error = %err, "user reconciliation failed");
                    report.failures.push(UserFailure {
                        name: user.name.clone(),
                        error: err,
                    });
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> UserSlot {
        UserSlot {
            user_name: name.to_owned(),
            enable: "Enabled".to_owned(),
            ..UserSlot::default()
        }
    }

    fn table() -> SlotTable {
        SlotTable::from([
            (1, UserSlot::default()),
            (2, named("root")),
            (3, UserSlot::default()),
            (4, UserSlot::default()),
        ])
    }

    #[test]
    fn existing_user_keeps_its_slot() {
        let mut slots = table();
        let config = UserConfig::enabled("root", "calvin", UserRole::Admin);

        let change = plan(&mut slots, &config).expect("slot 2 holds root");

        let SlotChange::Write { id, slot } = change else {
            panic!("expected a write");
        };
        assert_eq!(id, 2);
        assert_eq!(slot.privilege, "511");
        assert_eq!(slot.ipmi_lan_privilege, "Administrator");
        assert_eq!(slot.password.as_deref(), Some("calvin"));
    }

    #[test]
    fn new_users_take_distinct_free_slots_skipping_the_reserved_one() {
        let mut slots = table();

        let first = plan(&mut slots, &UserConfig::enabled("alice", "pw", UserRole::User))
            .expect("slot 3 is free");
        let second = plan(&mut slots, &UserConfig::enabled("bob", "pw", UserRole::User))
            .expect("slot 4 is free");

        assert!(matches!(first, SlotChange::Write { id: 3, ref slot } if slot.privilege == "499"));
        assert!(matches!(second, SlotChange::Write { id: 4, .. }));
    }

    #[test]
    fn full_table_is_reported() {
        let mut slots = SlotTable::from([(1, UserSlot::default()), (2, named("root"))]);

        let error = plan(&mut slots, &UserConfig::enabled("carol", "pw", UserRole::User))
            .expect_err("no free slot");

        assert!(error.to_string().contains("carol"));
    }

    #[test]
    fn disabling_an_existing_user_revokes_privileges() {
        let mut slots = table();

        let change = plan(&mut slots, &UserConfig::disabled("root")).expect("root exists");

        let SlotChange::Write { id, slot } = change else {
            panic!("expected a write");
        };
        assert_eq!(id, 2);
        assert_eq!(slot.user_name, "root");
        assert_eq!(slot.enable, "Disabled");
        assert_eq!(slot.privilege, "0");
        assert_eq!(slot.ipmi_lan_privilege, "No Access");
        assert!(slot.password.is_none());
    }

    #[test]
    fn disabling_an_absent_user_sends_nothing() {
        let mut slots = table();

        let change = plan(&mut slots, &UserConfig::disabled("ghost")).expect("nothing to do");

        assert_eq!(change, SlotChange::Unchanged);
    }
}
