//! Static translation table keyed by `(locale, message_key)`.
//!
//! Supported locales: `zh-CN`, `en-US`. Lookups fall back to `en-US`, then to
//! the caller's default.

use std::collections::HashMap;
use std::sync::LazyLock;

pub const DEFAULT_LOCALE: &str = "zh-CN";

const FALLBACK_LOCALE: &str = "en-US";

pub const SUPPORTED_LOCALES: &[&str] = &["zh-CN", "en-US"];

pub struct Translations {
    map: HashMap<(&'static str, &'static str), &'static str>,
}

impl Translations {
    /// Translated string for `locale` and `key`, falling back to `en-US` and
    /// then to `default`.
    pub fn get<'a>(&self, locale: &str, key: &str, default: &'a str) -> &'a str {
        if let Some(&val) = self.map.get(&(locale, key)) {
            return val;
        }
        if locale != FALLBACK_LOCALE {
            if let Some(&val) = self.map.get(&(FALLBACK_LOCALE, key)) {
                return val;
            }
        }
        default
    }
}

pub static TRANSLATIONS: LazyLock<Translations> = LazyLock::new(|| {
    let mut map = HashMap::new();

    macro_rules! t {
        ($locale:expr, $key:expr, $val:expr) => {
            map.insert(($locale, $key), $val);
        };
    }

    // ---- Toast prefixes ----
    t!("zh-CN", "notify.prefix.error", "异常预警: ");
    t!("en-US", "notify.prefix.error", "Alert: ");
    t!("zh-CN", "notify.prefix.warning", "警告: ");
    t!("en-US", "notify.prefix.warning", "Warning: ");
    t!("zh-CN", "notify.prefix.info", "提示: ");
    t!("en-US", "notify.prefix.info", "Notice: ");

    // ---- Feed ----
    t!("zh-CN", "feed.fetch_failed", "获取数据失败");
    t!("en-US", "feed.fetch_failed", "Failed to fetch data");

    // ---- Metric titles ----
    t!("zh-CN", "metric.onlineUsers", "实时在线人数");
    t!("en-US", "metric.onlineUsers", "Online users");
    t!("zh-CN", "metric.totalViews", "累计观看人次");
    t!("en-US", "metric.totalViews", "Total views");
    t!("zh-CN", "metric.salesAmount", "销售额");
    t!("en-US", "metric.salesAmount", "Sales amount");
    t!("zh-CN", "metric.orderCount", "订单量");
    t!("en-US", "metric.orderCount", "Orders");
    t!("zh-CN", "metric.avgOrderValue", "客单价");
    t!("en-US", "metric.avgOrderValue", "Average order value");
    t!("zh-CN", "metric.conversionRate", "转化率");
    t!("en-US", "metric.conversionRate", "Conversion rate");

    // ---- Default alert rules ----
    t!("zh-CN", "rule.onlineUsers.low", "在线人数过低，建议调整直播策略");
    t!(
        "en-US",
        "rule.onlineUsers.low",
        "Online users are low, consider adjusting the stream plan"
    );
    t!("zh-CN", "rule.conversionRate.low", "转化率过低，需要优化商品展示或价格策略");
    t!(
        "en-US",
        "rule.conversionRate.low",
        "Conversion rate is low, review product display or pricing"
    );
    t!("zh-CN", "rule.salesAmount.low", "销售额低于预期，建议推出促销活动");
    t!(
        "en-US",
        "rule.salesAmount.low",
        "Sales are below target, consider running a promotion"
    );
    t!("zh-CN", "rule.avgOrderValue.low", "客单价偏低，可推荐高价值商品");
    t!(
        "en-US",
        "rule.avgOrderValue.low",
        "Average order value is low, recommend higher-value products"
    );

    Translations { map }
});

/// Shorthand for `TRANSLATIONS.get(locale, key, key)`.
pub fn tr<'a>(locale: &str, key: &'a str) -> &'a str {
    TRANSLATIONS.get(locale, key, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_locale() {
        assert_eq!(tr("zh-CN", "feed.fetch_failed"), "获取数据失败");
        assert_eq!(tr("en-US", "feed.fetch_failed"), "Failed to fetch data");
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(tr("fr-FR", "notify.prefix.warning"), "Warning: ");
    }

    #[test]
    fn unknown_key_returns_default() {
        assert_eq!(TRANSLATIONS.get("zh-CN", "missing.key", "fallback"), "fallback");
        assert_eq!(tr("zh-CN", "missing.key"), "missing.key");
    }

    #[test]
    fn every_key_exists_in_all_locales() {
        let keys: std::collections::HashSet<&str> =
            TRANSLATIONS.map.keys().map(|(_, k)| *k).collect();
        for key in keys {
            for locale in SUPPORTED_LOCALES {
                assert!(
                    TRANSLATIONS.map.contains_key(&(*locale, key)),
                    "{key} missing for {locale}"
                );
            }
        }
    }
}
