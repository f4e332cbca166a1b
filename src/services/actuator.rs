//! actuator.rs
//!
//! Действия над местами на странице продавца.
//!
//! Алгоритм выбора зависит только от трейта `SeatActuator`. Боевая реализация
//! `PageBridgeClient` ходит по HTTP в мост, запущенный внутри страницы, и тот
//! уже вызывает `removeSeat`, `seatToggle`, `setAttribute` и `doBuyTicket`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ActuatorError;

/// Атрибут элемента места, в который пишется ценовой код.
pub const PRICE_CODE_ATTRIBUTE: &str = "P";

/// Идентификатор элемента места на схеме: `IMG{row}C{seat}`.
pub fn element_id(row_index: usize, seat_index: usize) -> String {
    format!("IMG{}C{}", row_index, seat_index)
}

#[async_trait]
pub trait SeatActuator: Send + Sync {
    /// Снимает текущий выбор мест. Возвращает число снятых мест.
    async fn clear(&self) -> Result<usize, ActuatorError>;

    /// Переключает место; `true`, если место после этого выбрано.
    async fn toggle(&self, row_index: usize, seat_index: usize) -> Result<bool, ActuatorError>;

    async fn set_price_code(&self, row_index: usize, seat_index: usize, code: &str) -> Result<(), ActuatorError>;

    /// Отправляет выбранные места в корзину.
    async fn commit(&self) -> Result<(), ActuatorError>;
}

// --- Протокол моста ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatCommand<'a> {
    element_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttributeCommand<'a> {
    element_id: &'a str,
    name: &'a str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct ToggleResponse {
    found: bool,
    selected: bool,
}

#[derive(Debug, Deserialize)]
struct ClearResponse {
    cleared: usize,
}

/// Клиент моста внутри страницы.
#[derive(Clone)]
pub struct PageBridgeClient {
    base_url: String,
    http_client: reqwest::Client,
    /// Уже выбранные элементы (`selectedImageIDByManifest`), если страница их отдала.
    known_selection: Vec<String>,
}

impl PageBridgeClient {
    pub fn new(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            known_selection: Vec::new(),
        }
    }

    pub fn with_known_selection(mut self, ids: Vec<String>) -> Self {
        self.known_selection = ids.into_iter().filter(|id| !id.trim().is_empty()).collect();
        self
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        action: &'static str,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ActuatorError> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ActuatorError::Rejected { action, status: status.as_u16() });
        }
        Ok(response)
    }
}

#[async_trait]
impl SeatActuator for PageBridgeClient {
    async fn clear(&self) -> Result<usize, ActuatorError> {
        if self.known_selection.is_empty() {
            // Мост сам найдёт выбранные элементы на странице
            let response = self.post("clear", "/selection/clear", &serde_json::json!({})).await?;
            return Ok(response.json::<ClearResponse>().await?.cleared);
        }

        debug!("Clearing {} seats from the known selection", self.known_selection.len());
        let mut cleared = 0;
        for id in &self.known_selection {
            match self.post("remove", "/seats/remove", &SeatCommand { element_id: id }).await {
                Ok(_) => cleared += 1,
                Err(e) => warn!("Error removing seat {}: {}", id, e),
            }
        }
        Ok(cleared)
    }

    async fn toggle(&self, row_index: usize, seat_index: usize) -> Result<bool, ActuatorError> {
        let id = element_id(row_index, seat_index);
        let response = self.post("toggle", "/seats/toggle", &SeatCommand { element_id: &id }).await?;
        let toggled: ToggleResponse = response.json().await?;
        if !toggled.found {
            return Err(ActuatorError::NotFound(id));
        }
        Ok(toggled.selected)
    }

    async fn set_price_code(&self, row_index: usize, seat_index: usize, code: &str) -> Result<(), ActuatorError> {
        let id = element_id(row_index, seat_index);
        let command = AttributeCommand { element_id: &id, name: PRICE_CODE_ATTRIBUTE, value: code };
        self.post("set attribute", "/seats/attribute", &command).await?;
        Ok(())
    }

    async fn commit(&self) -> Result<(), ActuatorError> {
        self.post("commit", "/cart/commit", &serde_json::json!({})).await?;
        Ok(())
    }
}
