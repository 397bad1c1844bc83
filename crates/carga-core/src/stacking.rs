//! 容器堆疊相容規則模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 堆疊相容規則：某供應商允許的（底層, 上層）容器組合及其比率
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackingRule {
    /// 供應商代碼
    pub supplier_code: i64,

    /// 底層容器類型
    pub base_container: String,

    /// 上層容器類型
    pub overlay_container: String,

    /// 每 1 個上層容器消耗的底層容器數
    pub base_units_per_overlay: Decimal,
}

impl StackingRule {
    pub fn new(
        supplier_code: i64,
        base_container: String,
        overlay_container: String,
        base_units_per_overlay: Decimal,
    ) -> Self {
        Self {
            supplier_code,
            base_container,
            overlay_container,
            base_units_per_overlay,
        }
    }
}

/// 堆疊相容規則目錄
#[derive(Debug, Clone, Default)]
pub struct StackingCatalog {
    rules: HashMap<(i64, String, String), StackingRule>,
    bases: HashSet<(i64, String)>,
    overlays: HashSet<(i64, String)>,
}

impl StackingCatalog {
    pub fn from_rules(rules: Vec<StackingRule>) -> Self {
        let mut map = HashMap::new();
        let mut bases = HashSet::new();
        let mut overlays = HashSet::new();

        for rule in rules {
            bases.insert((rule.supplier_code, rule.base_container.to_uppercase()));
            overlays.insert((rule.supplier_code, rule.overlay_container.to_uppercase()));
            map.entry((
                rule.supplier_code,
                rule.base_container.to_uppercase(),
                rule.overlay_container.to_uppercase(),
            ))
            .or_insert(rule);
        }

        Self {
            rules: map,
            bases,
            overlays,
        }
    }

    /// 規則查找；無相容規則時回傳 None（該組合直接跳過，不是錯誤）
    pub fn rule(&self, supplier_code: i64, base: &str, overlay: &str) -> Option<&StackingRule> {
        self.rules.get(&(
            supplier_code,
            base.to_uppercase(),
            overlay.to_uppercase(),
        ))
    }

    /// 該容器是否在此供應商的任一規則中作為底層
    pub fn is_base(&self, supplier_code: i64, container_type: &str) -> bool {
        self.bases
            .contains(&(supplier_code, container_type.to_uppercase()))
    }

    /// 該容器是否在此供應商的任一規則中作為上層
    pub fn is_overlay(&self, supplier_code: i64, container_type: &str) -> bool {
        self.overlays
            .contains(&(supplier_code, container_type.to_uppercase()))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
