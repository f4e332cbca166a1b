//! navigation.rs
//!
//! Переход к схеме мест выбранной секции: форма `showManifest` с
//! идентификатором представления и секцией, отправляемая POST-ом продавцу.

use reqwest::{header::CONTENT_TYPE, Url};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::NavigationError;

/// Путь формы по умолчанию.
pub const MANIFEST_PATH: &str = "/ticket/mvc/legacyOnlineSale/performance/sale/showManifest";
pub const SELECTION_METHOD: &str = "byManifest";

const SELECTION_FIELD: &str = "selection";

/// Поле формы.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FormField {
    fn new(name: &str, value: &str) -> Self {
        FormField { name: name.to_string(), value: value.to_string() }
    }
}

/// Форма `imageMapfrm`, уже присутствующая на странице.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExistingForm {
    pub action: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

/// Идентификатор представления: третий сегмент пути страницы.
pub fn performance_id_from_path(path: &str) -> Option<&str> {
    path.split('/').nth(3).filter(|segment| !segment.is_empty())
}

/// Путь страницы из полного URL или из уже готового пути.
fn page_path(page_url: &str) -> String {
    match Url::parse(page_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => page_url.to_string(),
    }
}

/// Форма перехода к схеме секции.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestForm {
    pub action: String,
    pub fields: Vec<FormField>,
    /// Форма взята со страницы, а не собрана заново.
    pub reused: bool,
}

impl ManifestForm {
    /// Собирает форму для секции.
    ///
    /// Существующая форма страницы переиспользуется как есть, меняется
    /// только поле `selection`, если оно в ней есть. Иначе форма
    /// собирается заново с `performance_id` из пути страницы.
    pub fn for_section(
        section: &str,
        page_url: &str,
        existing: Option<&ExistingForm>,
        manifest_path: &str,
    ) -> Result<Self, NavigationError> {
        if let Some(form) = existing {
            info!("Using existing form to navigate to manifest");
            let fields = form
                .fields
                .iter()
                .map(|field| match field.name.as_str() {
                    SELECTION_FIELD => FormField::new(SELECTION_FIELD, section),
                    _ => field.clone(),
                })
                .collect();
            return Ok(ManifestForm { action: form.action.clone(), fields, reused: true });
        }

        info!("Creating new form to navigate to manifest");
        let path = page_path(page_url);
        let performance_id = performance_id_from_path(&path)
            .ok_or_else(|| NavigationError::MissingPerformanceId(path.clone()))?;

        Ok(ManifestForm {
            action: manifest_path.to_string(),
            fields: vec![
                FormField::new("performance_id", performance_id),
                FormField::new("current_selection_method", SELECTION_METHOD),
                FormField::new(SELECTION_FIELD, section),
            ],
            reused: false,
        })
    }

    /// Тело запроса в `application/x-www-form-urlencoded`.
    pub fn encoded_body(&self) -> Result<String, NavigationError> {
        let pairs: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|field| (field.name.as_str(), field.value.as_str()))
            .collect();
        Ok(serde_urlencoded::to_string(pairs)?)
    }
}

/// Ответ продавца на отправку формы.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationOutcome {
    pub status: u16,
    pub url: String,
}

/// Отправляет формы перехода на сайт продавца.
#[derive(Clone)]
pub struct ManifestNavigator {
    base_url: Url,
    http_client: reqwest::Client,
}

impl ManifestNavigator {
    pub fn new(base_url: &str, http_client: reqwest::Client) -> Result<Self, NavigationError> {
        let base_url = Url::parse(base_url).map_err(|e| NavigationError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { base_url, http_client })
    }

    /// Абсолютный адрес отправки; относительный `action` берётся от базового URL.
    pub fn target(&self, form: &ManifestForm) -> Result<Url, NavigationError> {
        self.base_url.join(&form.action).map_err(|e| NavigationError::InvalidUrl {
            url: form.action.clone(),
            reason: e.to_string(),
        })
    }

    pub async fn submit(&self, form: &ManifestForm) -> Result<NavigationOutcome, NavigationError> {
        let target = self.target(form)?;
        let body = form.encoded_body()?;
        info!("Submitting manifest form to {}", target);

        let response = self
            .http_client
            .post(target)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::Rejected(status.as_u16()));
        }

        Ok(NavigationOutcome { status: status.as_u16(), url: response.url().to_string() })
    }
}
