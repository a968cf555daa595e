//! WhatsApp gateway client
//!
//! The gateway owns the actual WhatsApp session; this client is the single
//! process-wide handle to it. Connection readiness is an explicit state
//! machine driven by a background monitor task, so callers can tell the
//! difference between "not connected yet" and "gateway unreachable" instead
//! of discovering it on the first failed send.
//!
//! OTP delivery failures are hard errors (registration cannot proceed
//! without the code); order notifications degrade to a warning and never
//! fail the booking that triggered them.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::models::{Barber, Order};

/// Connection state of the gateway's WhatsApp session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// Gateway reachable but the WhatsApp session is not linked yet.
    Connecting,
    /// Session linked; messages can be sent.
    Ready,
    /// Gateway unreachable.
    Unavailable,
}

/// WhatsApp gateway configuration
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Base URL of the gateway
    pub base_url: String,
    /// Seconds between connection-state probes
    pub status_poll_seconds: u64,
}

impl WhatsAppConfig {
    /// Create a new WhatsAppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `WHATSAPP_GATEWAY_URL`: gateway base URL (default: "http://localhost:3100")
    /// - `WHATSAPP_STATUS_POLL_SECONDS`: probe interval (default: 15)
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("WHATSAPP_GATEWAY_URL")
            .unwrap_or_else(|_| "http://localhost:3100".to_string());
        let status_poll_seconds = std::env::var("WHATSAPP_STATUS_POLL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(15);

        Ok(Self {
            base_url,
            status_poll_seconds,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    connected: bool,
}

/// Client for the WhatsApp gateway
#[derive(Clone)]
pub struct WhatsAppClient {
    http: reqwest::Client,
    config: WhatsAppConfig,
    state: Arc<RwLock<GatewayState>>,
}

impl WhatsAppClient {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            state: Arc::new(RwLock::new(GatewayState::Connecting)),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> GatewayState {
        *self.state.read().expect("gateway state lock poisoned")
    }

    pub fn is_ready(&self) -> bool {
        self.state() == GatewayState::Ready
    }

    fn transition(&self, next: GatewayState) {
        let mut state = self.state.write().expect("gateway state lock poisoned");
        if *state != next {
            match next {
                GatewayState::Ready => info!("WhatsApp gateway is ready"),
                GatewayState::Connecting => info!("WhatsApp gateway is connecting"),
                GatewayState::Unavailable => warn!("WhatsApp gateway is unreachable"),
            }
            *state = next;
        }
    }

    /// Spawn the background task that keeps the connection state current.
    pub fn spawn_connection_monitor(&self) {
        let client = self.clone();
        let interval = Duration::from_secs(client.config.status_poll_seconds);

        tokio::spawn(async move {
            loop {
                let next = match client.probe().await {
                    Ok(true) => GatewayState::Ready,
                    Ok(false) => GatewayState::Connecting,
                    Err(_) => GatewayState::Unavailable,
                };
                client.transition(next);
                sleep(interval).await;
            }
        });
    }

    async fn probe(&self) -> Result<bool> {
        let status: StatusResponse = self
            .http
            .get(format!("{}/status", self.config.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(status.connected)
    }

    async fn send_text(&self, number: &str, text: &str) -> Result<()> {
        self.http
            .post(format!("{}/messages", self.config.base_url))
            .json(&json!({ "to": number, "body": text }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Send a verification code. Fails when the session is not ready; the
    /// caller must not proceed without delivery.
    pub async fn send_otp_message(&self, number: &str, code: &str) -> Result<()> {
        if !self.is_ready() {
            anyhow::bail!("WhatsApp gateway is not ready");
        }

        let text = format!(
            "[SharpCuts] Your verification code is: {}. Do not share it with anyone.",
            code
        );
        self.send_text(number, &text).await?;
        info!("OTP message sent to {}", number);

        Ok(())
    }

    /// Notify a barber about a new order. Fire-and-forget: logs a warning on
    /// any failure instead of propagating it.
    pub async fn send_order_notification(&self, barber: &Barber, order: &Order) {
        if !self.is_ready() {
            warn!("WhatsApp gateway not ready, new-order notification skipped");
            return;
        }

        let text = format!(
            "New order from {} ({}) at {}.",
            order.customer_name,
            order.service_type,
            order.order_start_time.format("%Y-%m-%d %H:%M")
        );

        match self.send_text(&barber.whatsapp_number, &text).await {
            Ok(()) => info!("New-order notification sent to {}", barber.name),
            Err(e) => warn!("Failed to notify barber {}: {}", barber.name, e),
        }
    }
}
