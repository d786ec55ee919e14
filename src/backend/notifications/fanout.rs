/**
 * New-Recipe Fan-out
 *
 * Delivers a new recipe to every registered push subscription except the one
 * belonging to the session that created it.
 *
 * # Eviction
 *
 * Any failure for a registration (undecodable entry, rejected delivery,
 * transport error) removes that registration. There is no retry: a single
 * transient failure unregisters the browser until it subscribes again.
 *
 * # Detachment
 *
 * [`NotificationFanout::spawn_new_recipe`] runs the fan-out on its own task.
 * The request that created the recipe does not wait for it, and fan-out
 * errors are only logged.
 */

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use super::push::{PushDelivery, PushSubscription, Registration};
use crate::backend::kv::{PushRegistrationStore, StoreError};
use crate::shared::Recipe;

/// What one fan-out run did
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FanoutReport {
    pub delivered: usize,
    pub evicted: usize,
    /// Registrations not attempted (the originating session)
    pub skipped: usize,
}

/// Push registry plus the delivery transport
#[derive(Clone)]
pub struct NotificationFanout {
    registrations: Arc<dyn PushRegistrationStore>,
    delivery: Option<Arc<dyn PushDelivery>>,
}

impl NotificationFanout {
    /// `delivery` is `None` when push is not configured; registrations are
    /// still accepted but nothing is sent.
    pub fn new(
        registrations: Arc<dyn PushRegistrationStore>,
        delivery: Option<Arc<dyn PushDelivery>>,
    ) -> Self {
        Self {
            registrations,
            delivery,
        }
    }

    /// Store the subscription of a session, replacing any earlier one
    pub async fn register(
        &self,
        session_id: &str,
        user_name: &str,
        subscription: PushSubscription,
    ) -> Result<(), StoreError> {
        let registration = Registration {
            subscription,
            user_name: user_name.to_string(),
        };
        let value = serde_json::to_string(&registration).map_err(|err| StoreError::corrupt(err.to_string()))?;
        self.registrations.put_registration(session_id, value).await?;
        tracing::info!("[Push] Subscribed session {}", session_id);
        Ok(())
    }

    /// Deliver `recipe` to every registration except `exclude_session`
    pub async fn notify_new_recipe(
        &self,
        recipe: &Recipe,
        exclude_session: Option<&str>,
    ) -> Result<FanoutReport, StoreError> {
        let Some(delivery) = &self.delivery else {
            tracing::debug!("[Push] Delivery disabled, skipping recipe {}", recipe.id);
            return Ok(FanoutReport::default());
        };

        let payload = serde_json::to_string(recipe).map_err(|err| StoreError::corrupt(err.to_string()))?;
        let mut report = FanoutReport::default();

        tracing::info!(
            "[Push] Sending recipe {} to subscribers, excluding {:?}",
            recipe.id,
            exclude_session
        );

        for (session_id, raw) in self.registrations.registrations().await? {
            if Some(session_id.as_str()) == exclude_session {
                report.skipped += 1;
                continue;
            }

            let outcome = match serde_json::from_str::<Registration>(&raw) {
                Ok(registration) => delivery
                    .deliver(&registration.subscription, &payload)
                    .await
                    .map_err(|err| err.to_string()),
                Err(err) => Err(format!("undecodable registration: {}", err)),
            };

            match outcome {
                Ok(()) => {
                    tracing::debug!("[Push] Sent to {}", session_id);
                    report.delivered += 1;
                }
                Err(reason) => {
                    tracing::info!("[Push] Removing {} because of {}", session_id, reason);
                    self.registrations.remove_registration(&session_id).await?;
                    report.evicted += 1;
                }
            }
        }

        Ok(report)
    }

    /// Run [`Self::notify_new_recipe`] on a detached task
    pub fn spawn_new_recipe(&self, recipe: Recipe, exclude_session: Option<String>) -> JoinHandle<()> {
        let fanout = self.clone();
        tokio::spawn(async move {
            match fanout
                .notify_new_recipe(&recipe, exclude_session.as_deref())
                .await
            {
                Ok(report) => tracing::info!(
                    "[Push] Recipe {}: {} delivered, {} evicted",
                    recipe.id,
                    report.delivered,
                    report.evicted
                ),
                Err(err) => tracing::error!("[Push] Fan-out for recipe {} failed: {}", recipe.id, err),
            }
        })
    }
}
