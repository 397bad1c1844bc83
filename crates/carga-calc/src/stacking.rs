//! 容器堆疊計算（貪婪配對）

use crate::aggregation::SaturationRow;
use carga_core::StackingCatalog;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 堆疊模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackingMode {
    /// 一般模式：採用規則宣告的底層比率
    Standard,
    /// 幹線（line-haul）模式：一律 1:1，忽略規則宣告的比率
    LineHaul,
}

/// 堆疊行：一個（供應商, 底層容器, 上層容器）組合的消耗結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackingRow {
    /// 供應商代碼
    pub supplier_code: i64,

    /// 底層容器類型
    pub base_container: String,

    /// 上層容器類型
    pub overlay_container: String,

    /// 底層行的車輛容量
    pub vehicle_capacity: Option<Decimal>,

    /// 底層可用容器數（消耗前）
    pub base_available: Decimal,

    /// 上層可用容器數（消耗前）
    pub overlay_available: Decimal,

    /// 底層已消耗數
    pub base_consumed: Decimal,

    /// 上層已消耗數
    pub overlay_consumed: Decimal,

    /// 底層剩餘數
    pub base_remaining: Decimal,

    /// 上層剩餘數
    pub overlay_remaining: Decimal,

    /// 合併容器數 = 底層消耗 + 上層消耗
    pub combined_units: Decimal,

    /// 實際採用的底層比率
    pub ratio_used: Decimal,

    /// 堆疊飽和度 = 合併容器數 / 底層行容量（容量未知時為 None）
    pub saturation: Option<Decimal>,
}

/// 堆疊計算器
pub struct StackingCalculator;

impl StackingCalculator {
    /// 一般模式入口
    pub fn combine(rows: &[SaturationRow], catalog: &StackingCatalog) -> Vec<StackingRow> {
        Self::combine_with_mode(rows, catalog, StackingMode::Standard)
    }

    /// 幹線模式入口：比率固定 1:1，規則宣告的比率被忽略
    pub fn combine_line_haul(rows: &[SaturationRow], catalog: &StackingCatalog) -> Vec<StackingRow> {
        Self::combine_with_mode(rows, catalog, StackingMode::LineHaul)
    }

    /// 對每一對相容的（底層, 上層）飽和度行執行貪婪合併
    ///
    /// 每一步消耗 `ratio` 個底層容器配 1 個上層容器，
    /// 任一側不足一步時即停止；無相容規則的組合直接跳過。
    /// 這是確定性的貪婪近似，不做最佳化搜尋；餘數照實回報。
    pub fn combine_with_mode(
        rows: &[SaturationRow],
        catalog: &StackingCatalog,
        mode: StackingMode,
    ) -> Vec<StackingRow> {
        let mut results = Vec::new();

        for base_row in rows.iter().filter(|r| r.is_stacking_base) {
            for overlay_row in rows.iter().filter(|r| r.is_stacking_overlay) {
                if base_row.supplier_code != overlay_row.supplier_code {
                    continue;
                }

                let rule = match catalog.rule(
                    base_row.supplier_code,
                    &base_row.container_type,
                    &overlay_row.container_type,
                ) {
                    Some(rule) => rule,
                    None => continue,
                };

                let ratio = match mode {
                    StackingMode::Standard => rule.base_units_per_overlay,
                    StackingMode::LineHaul => Decimal::ONE,
                };
                if ratio <= Decimal::ZERO {
                    tracing::warn!(
                        "堆疊規則比率無效，跳過: 供應商 {} {}→{}",
                        base_row.supplier_code,
                        base_row.container_type,
                        overlay_row.container_type
                    );
                    continue;
                }

                let mut base_remaining = base_row.total_packages;
                let mut overlay_remaining = overlay_row.total_packages;
                let mut base_consumed = Decimal::ZERO;
                let mut overlay_consumed = Decimal::ZERO;

                while base_remaining >= ratio && overlay_remaining >= Decimal::ONE {
                    base_remaining -= ratio;
                    overlay_remaining -= Decimal::ONE;
                    base_consumed += ratio;
                    overlay_consumed += Decimal::ONE;
                }

                let combined_units = base_consumed + overlay_consumed;

                let saturation = match base_row.capacity {
                    Some(capacity) if capacity > Decimal::ZERO => Some(combined_units / capacity),
                    _ => None,
                };

                results.push(StackingRow {
                    supplier_code: base_row.supplier_code,
                    base_container: base_row.container_type.clone(),
                    overlay_container: overlay_row.container_type.clone(),
                    vehicle_capacity: base_row.capacity,
                    base_available: base_row.total_packages,
                    overlay_available: overlay_row.total_packages,
                    base_consumed,
                    overlay_consumed,
                    base_remaining,
                    overlay_remaining,
                    combined_units,
                    ratio_used: ratio,
                    saturation,
                });
            }
        }

        results
    }
}
