//! ticket_limit.rs
//!
//! Определение лимита билетов на заказ.
//!
//! Лимит ищется цепочкой стратегий `LimitResolver`, по порядку:
//! 1.  `upperTicketLimitPerOrder` со страницы;
//! 2.  минимум из `ticketUpperLimits` по ценовым кодам;
//! 3.  текст страницы вида "Limit N per order";
//! 4.  присваивание `upperTicketLimitPerOrder = N` во встроенных скриптах;
//! 5.  константа `DEFAULT_TICKET_LIMIT`.
//!
//! Первый положительный результат выигрывает. Ошибки разбора любой стратегии
//! означают "нет результата" и передают ход следующей.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Лимит по умолчанию, когда страница ничего не сообщила.
pub const DEFAULT_TICKET_LIMIT: u32 = 8;

const PER_ORDER_VARIABLE: &str = "upperTicketLimitPerOrder";

/// Сигналы о лимите, собранные скриптом на странице.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitSignals {
    /// Значение `upperTicketLimitPerOrder` как есть (учитываются только числа).
    pub upper_ticket_limit_per_order: Option<Value>,
    /// Значение `ticketUpperLimits` как есть.
    pub ticket_upper_limits: Option<Vec<Value>>,
    /// `document.body.innerText`.
    pub page_text: Option<String>,
    /// Содержимое `<script>` без `src`.
    #[serde(default)]
    pub inline_scripts: Vec<String>,
}

/// Итоговый лимит и стратегия, которая его дала.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedLimit {
    pub limit: u32,
    pub source: &'static str,
}

/// Одна стратегия поиска лимита.
pub trait LimitResolver: Send + Sync {
    fn source(&self) -> &'static str;
    fn resolve(&self, signals: &LimitSignals) -> Option<u32>;
}

/// Положительное число из JSON; дробные значения усекаются.
fn positive_number(value: &Value) -> Option<u32> {
    let number = value.as_f64()?;
    if !number.is_finite() || number < 1.0 || number > u32::MAX as f64 {
        return None;
    }
    Some(number.trunc() as u32)
}

fn positive_digits(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|limit| *limit > 0)
}

fn positive_capture(pattern: &Regex, text: &str) -> Option<u32> {
    positive_digits(pattern.captures(text)?.get(1)?.as_str())
}

pub struct PerOrderLimit;

impl LimitResolver for PerOrderLimit {
    fn source(&self) -> &'static str {
        PER_ORDER_VARIABLE
    }

    fn resolve(&self, signals: &LimitSignals) -> Option<u32> {
        signals.upper_ticket_limit_per_order.as_ref().and_then(positive_number)
    }
}

pub struct PriceCodeLimits;

impl LimitResolver for PriceCodeLimits {
    fn source(&self) -> &'static str {
        "ticketUpperLimits"
    }

    fn resolve(&self, signals: &LimitSignals) -> Option<u32> {
        signals
            .ticket_upper_limits
            .as_ref()?
            .iter()
            .filter_map(positive_number)
            .min()
    }
}

pub struct PageTextLimit {
    pattern: Regex,
}

impl PageTextLimit {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(PageTextLimit { pattern: Regex::new(r"(?i)Limit ([0-9]+) per order")? })
    }
}

impl LimitResolver for PageTextLimit {
    fn source(&self) -> &'static str {
        "page content"
    }

    fn resolve(&self, signals: &LimitSignals) -> Option<u32> {
        positive_capture(&self.pattern, signals.page_text.as_deref()?)
    }
}

pub struct ScriptAssignmentLimit {
    pattern: Regex,
}

impl ScriptAssignmentLimit {
    pub fn new() -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"{}\s*=\s*([0-9]+)", PER_ORDER_VARIABLE))?;
        Ok(ScriptAssignmentLimit { pattern })
    }
}

impl LimitResolver for ScriptAssignmentLimit {
    fn source(&self) -> &'static str {
        "script content"
    }

    fn resolve(&self, signals: &LimitSignals) -> Option<u32> {
        signals
            .inline_scripts
            .iter()
            .filter(|script| script.contains(PER_ORDER_VARIABLE))
            .find_map(|script| self.pattern.captures(script))
            .and_then(|captures| positive_digits(captures.get(1)?.as_str()))
    }
}

/// Упорядоченная цепочка стратегий с запасным значением.
pub struct TicketLimitChain {
    resolvers: Vec<Box<dyn LimitResolver>>,
    fallback: u32,
}

impl TicketLimitChain {
    pub fn new(resolvers: Vec<Box<dyn LimitResolver>>, fallback: u32) -> Self {
        Self { resolvers, fallback }
    }

    /// Стандартный порядок стратегий.
    pub fn standard() -> Result<Self, regex::Error> {
        Ok(Self::new(
            vec![
                Box::new(PerOrderLimit),
                Box::new(PriceCodeLimits),
                Box::new(PageTextLimit::new()?),
                Box::new(ScriptAssignmentLimit::new()?),
            ],
            DEFAULT_TICKET_LIMIT,
        ))
    }

    pub fn sources(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.source()).collect()
    }

    pub fn resolve(&self, signals: &LimitSignals) -> ResolvedLimit {
        for resolver in &self.resolvers {
            match resolver.resolve(signals) {
                Some(limit) => {
                    info!("Using ticket limit of {} (source: {})", limit, resolver.source());
                    return ResolvedLimit { limit, source: resolver.source() };
                }
                None => debug!("No ticket limit from {}", resolver.source()),
            }
        }

        info!("Using ticket limit of {} (source: default value)", self.fallback);
        ResolvedLimit { limit: self.fallback, source: "default value" }
    }
}
