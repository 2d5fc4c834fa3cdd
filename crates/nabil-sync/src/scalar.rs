//! # Scalar Slots
//!
//! Single per-user values that follow the same remote-then-local policy as
//! collections. The earnings total is the one slot in use.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EARNINGS                                                               │
//! │  remote: profiles.total_earnings where id = <user id>                  │
//! │  local:  NabilInventory_TOTAL_EARNINGS = "125.5"                       │
//! │                                                                         │
//! │  read:  session + remote answers  → remote value (local untouched)     │
//! │         otherwise                 → local value, absent → 0            │
//! │  write: session → upsert {id, total_earnings} (failure: warn)          │
//! │         always  → local value                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use nabil_core::{keys, Money, EARNINGS_FIELD, ID_FIELD, PROFILES_TABLE};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::access::{Attempt, DataAccess};
use crate::error::SyncResult;

/// Where a scalar lives remotely and locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarSlot {
    /// Remote table holding one row per user.
    pub table: &'static str,
    /// Column matched against the user id.
    pub key_column: &'static str,
    /// Column holding the value.
    pub field: &'static str,
    /// Local key suffix (behind the namespace prefix).
    pub local_key: &'static str,
}

/// The user's running earnings total.
pub const EARNINGS: ScalarSlot = ScalarSlot {
    table: PROFILES_TABLE,
    key_column: ID_FIELD,
    field: EARNINGS_FIELD,
    local_key: keys::TOTAL_EARNINGS,
};

/// Reads a money amount from a remote field value.
///
/// Numeric columns arrive as JSON numbers, `numeric` columns sometimes as
/// strings. `None` for null or anything unreadable.
fn remote_money(value: &Value) -> Option<Money> {
    match value {
        Value::Number(n) => n.as_f64().and_then(|f| Money::from_decimal(f).ok()),
        Value::String(s) => Money::parse_decimal(s).ok(),
        _ => None,
    }
}

impl DataAccess {
    /// Current value of a slot.
    pub async fn read_scalar(&self, slot: &ScalarSlot) -> SyncResult<Money> {
        let attempt = self
            .attempt(move |user| async move {
                self.tables()
                    .select_field(slot.table, slot.key_column, &user.id, slot.field)
                    .await
            })
            .await?;

        match attempt {
            Attempt::Done(Some(value)) => {
                if let Some(amount) = remote_money(&value) {
                    return Ok(amount);
                }
                warn!(table = slot.table, field = slot.field, %value, "Unreadable remote value, using local");
            }
            Attempt::Done(None) => {
                debug!(table = slot.table, "No remote row, using local value");
            }
            Attempt::Failed(e) => {
                warn!(table = slot.table, ?e, "Remote read failed, using local value");
            }
            Attempt::NoSession => {}
        }

        let local = self.local().scalars().load_money(slot.local_key).await?;
        Ok(local.unwrap_or_default())
    }

    /// Stores a slot value remotely (when signed in) and locally.
    pub async fn write_scalar(&self, slot: &ScalarSlot, value: Money) -> SyncResult<()> {
        let attempt = self
            .attempt(move |user| async move {
                let mut row = Map::new();
                row.insert(slot.key_column.to_string(), Value::String(user.id));
                row.insert(slot.field.to_string(), Value::from(value.to_decimal()));
                self.tables().upsert(slot.table, &Value::Object(row)).await
            })
            .await?;
        if let Attempt::Failed(e) = attempt {
            warn!(table = slot.table, ?e, "Remote write failed, saving locally only");
        }

        self.local().scalars().save_money(slot.local_key, value).await?;
        debug!(slot = slot.local_key, %value, "Scalar saved");
        Ok(())
    }

    /// The earnings total; zero when nothing was ever recorded.
    pub async fn get_earnings(&self) -> SyncResult<Money> {
        self.read_scalar(&EARNINGS).await
    }

    pub async fn save_earnings(&self, amount: Money) -> SyncResult<()> {
        self.write_scalar(&EARNINGS, amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, signed_in_fixture, TEST_USER_ID};
    use nabil_db::KeyValueStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_absent_earnings_is_zero() {
        let fx = fixture();
        assert_eq!(fx.access.get_earnings().await.unwrap(), Money::zero());
    }

    #[tokio::test]
    async fn test_offline_save_then_read() {
        let fx = fixture();
        fx.access
            .save_earnings(Money::from_cents(12550))
            .await
            .unwrap();

        assert_eq!(
            fx.access.get_earnings().await.unwrap(),
            Money::from_cents(12550)
        );
        assert_eq!(
            fx.store
                .get("NabilInventory_TOTAL_EARNINGS")
                .await
                .unwrap()
                .as_deref(),
            Some("125.5")
        );
    }

    #[tokio::test]
    async fn test_remote_value_preferred() {
        let fx = signed_in_fixture().await;
        fx.store
            .set("NabilInventory_TOTAL_EARNINGS", "10")
            .await
            .unwrap();
        fx.remote.seed(
            "profiles",
            vec![json!({"id": TEST_USER_ID, "total_earnings": 99.75})],
        );

        assert_eq!(
            fx.access.get_earnings().await.unwrap(),
            Money::from_cents(9975)
        );
        // Reads never overwrite the local value.
        assert_eq!(
            fx.store
                .get("NabilInventory_TOTAL_EARNINGS")
                .await
                .unwrap()
                .as_deref(),
            Some("10")
        );
    }

    #[tokio::test]
    async fn test_missing_profile_falls_back() {
        let fx = signed_in_fixture().await;
        fx.store
            .set("NabilInventory_TOTAL_EARNINGS", "42.5")
            .await
            .unwrap();

        assert_eq!(
            fx.access.get_earnings().await.unwrap(),
            Money::from_cents(4250)
        );
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back() {
        let fx = signed_in_fixture().await;
        fx.access
            .save_earnings(Money::from_cents(500))
            .await
            .unwrap();
        fx.remote.set_offline(true);

        assert_eq!(
            fx.access.get_earnings().await.unwrap(),
            Money::from_cents(500)
        );
    }

    #[tokio::test]
    async fn test_save_upserts_profile_row() {
        let fx = signed_in_fixture().await;
        fx.access
            .save_earnings(Money::from_cents(2025))
            .await
            .unwrap();

        assert_eq!(
            fx.remote.rows("profiles"),
            vec![json!({"id": TEST_USER_ID, "total_earnings": 20.25})]
        );
    }

    #[test]
    fn test_remote_money() {
        assert_eq!(remote_money(&json!(12.5)), Some(Money::from_cents(1250)));
        assert_eq!(remote_money(&json!("7.25")), Some(Money::from_cents(725)));
        assert_eq!(remote_money(&Value::Null), None);
    }
}
